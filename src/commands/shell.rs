//! Interactive shell: the whole CLI, one line at a time, with the active plan
//! kept in memory between commands.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tokio::io::AsyncBufRead;

use super::{AppContext, dispatch, error};
use crate::{cli::Cli, console::Console};

/// Splits a command line on whitespace, keeping double-quoted runs together.
pub(crate) fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut cur = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    args.push(std::mem::take(&mut cur));
                    pending = false;
                }
            }
            c => {
                cur.push(c);
                pending = true;
            }
        }
    }
    if pending {
        args.push(cur);
    }
    args
}

pub async fn run<R: AsyncBufRead + Unpin>(ctx: &mut AppContext, console: &mut Console<R>) -> Result<()> {
    println!("{}", "Rex fitness coach".bold().cyan());
    println!(
        "{}",
        "Type a command (e.g. `onboard`, `dashboard`, `session`), `help`, or `exit`.".dimmed()
    );

    loop {
        let Some(line) = console.prompt("rex>").await? else {
            println!();
            return Ok(());
        };

        let mut args = split_args(&line);
        match args.first().map(String::as_str) {
            None => continue,
            Some("exit" | "quit" | "q") => return Ok(()),
            _ => {}
        }
        args.insert(0, "rex".to_string());

        let cli = match Cli::try_parse_from(&args) {
            Ok(cli) => cli,
            Err(e) => {
                println!("{}", e.render());
                continue;
            }
        };
        let Some(cmd) = cli.cmd else {
            continue;
        };
        if cli.plan.is_some() {
            error("--plan only applies at start-up; use `plan import FILE`");
            continue;
        }

        let fmt = ctx.fmt;
        if cli.json {
            ctx.fmt = crate::types::OutputFmt::Json;
        }
        let result = dispatch(cmd, ctx, console).await;
        ctx.fmt = fmt;

        if let Err(e) = result {
            tracing::debug!(error = ?e, "command failed");
            error(format!("{:#}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_quotes() {
        assert_eq!(split_args("  plan   show "), ["plan", "show"]);
        assert_eq!(
            split_args(r#"plan edit 1 2 --name "Incline Bench" --reps 8"#),
            ["plan", "edit", "1", "2", "--name", "Incline Bench", "--reps", "8"]
        );
        assert_eq!(split_args(r#"x """#), ["x", ""]);
        assert!(split_args("").is_empty());
    }
}
