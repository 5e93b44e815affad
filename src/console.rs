//! Line-oriented terminal input shared by the interactive screens.

use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

pub struct Console<R> {
    lines: Lines<R>,
}

impl Console<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Console<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Next trimmed line, `None` at end of input. Cancel-safe.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }

    pub async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        print!("{} ", label.bold());
        std::io::stdout().flush()?;
        self.next_line().await
    }

    /// Asks until the answer is non-empty (or `default` applies on empty).
    pub async fn ask(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>> {
        let label = match default {
            Some(d) => format!("{label} [{d}]:"),
            None => format!("{label}:"),
        };
        loop {
            let Some(answer) = self.prompt(&label).await? else {
                return Ok(None);
            };
            if !answer.is_empty() {
                return Ok(Some(answer));
            }
            if let Some(d) = default {
                return Ok(Some(d.to_string()));
            }
        }
    }

    pub async fn confirm(&mut self, label: &str) -> Result<bool> {
        let answer = self.prompt(&format!("{label} [y/N]")).await?;
        Ok(matches!(
            answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y" | "yes")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_trimmed_lines_until_eof() {
        let mut c = Console::new(&b"  hello \n\nworld\n"[..]);
        assert_eq!(c.next_line().await.unwrap().as_deref(), Some("hello"));
        assert_eq!(c.ask("name", None).await.unwrap().as_deref(), Some("world"));
        assert_eq!(c.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn ask_uses_default_and_confirm_parses() {
        let mut c = Console::new(&b"\nYes\nno\n"[..]);
        assert_eq!(c.ask("days", Some("3")).await.unwrap().as_deref(), Some("3"));
        assert!(c.confirm("approve?").await.unwrap());
        assert!(!c.confirm("approve?").await.unwrap());
        assert!(!c.confirm("approve?").await.unwrap());
    }
}
