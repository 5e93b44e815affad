use once_cell::sync::Lazy;
use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Keys understood by `rex config`.
pub const CONFIG_KEYS: [&str; 4] = ["api_key", "model", "api_base", "timeout_secs"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFmt {
    Text,
    Json,
}

/// Prints `value` as pretty JSON when asked to, otherwise runs the text renderer.
pub fn emit<T: Serialize>(fmt: OutputFmt, value: &T, text: impl FnOnce(&T)) -> Result<()> {
    match fmt {
        OutputFmt::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFmt::Text => text(value),
    }
    Ok(())
}

/// Flat key/value settings file stored as TOML.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    pub map: BTreeMap<String, String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join("rex").join("config"))
            .context("Could not determine config directory")
    }

    /// Missing file means empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        let raw = toml::to_string(self)?;
        fs::write(path, raw).with_context(|| format!("Failed to write config: {}", path.display()))
    }
}

/// Resolved runtime settings for the model client.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl Settings {
    /// Environment variables win over the config file.
    pub fn resolve(cfg: &Config) -> Self {
        Self::resolve_with(cfg, |k| std::env::var(k).ok())
    }

    pub fn resolve_with(cfg: &Config, env: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |env_key: &str, cfg_key: &str| {
            env(env_key)
                .or_else(|| cfg.map.get(cfg_key).cloned())
                .filter(|v| !v.trim().is_empty())
        };

        let timeout = pick("REX_TIMEOUT_SECS", "timeout_secs")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_key: pick("GEMINI_API_KEY", "api_key"),
            model: pick("REX_MODEL", "model").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: pick("REX_API_BASE", "api_base")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout: Duration::from_secs(timeout),
        }
    }
}

pub static ALLOWED_GOALS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "lose-fat",
        "gain-muscle",
        "increase-strength",
        "improve-endurance",
        "recomposition",
    ])
});

pub const GENDERS: [&str; 3] = ["male", "female", "other"];

pub const DIET_STYLES: [&str; 6] = [
    "omnivore",
    "vegetarian",
    "vegan",
    "pescatarian",
    "keto",
    "paleo",
];

pub const WORKOUT_TIMES: [&str; 6] = [
    "early-morning",
    "morning",
    "midday",
    "afternoon",
    "evening",
    "night",
];

/// Human label for a goal slug ("gain-muscle" -> "Gain Lean Muscle").
pub fn goal_label(slug: &str) -> &str {
    match slug {
        "lose-fat" => "Lose Fat / Cut",
        "gain-muscle" => "Gain Lean Muscle",
        "increase-strength" => "Increase Strength",
        "improve-endurance" => "Improve Endurance",
        "recomposition" => "Body Recomposition",
        other => other,
    }
}

/// Canonical lowercase choice, or `None` if it is not one of `allowed`.
pub fn canonical_choice<'a, I>(input: &str, allowed: I) -> Option<&'static str>
where
    I: IntoIterator<Item = &'a &'static str>,
{
    let inp = input.trim().to_ascii_lowercase();
    allowed.into_iter().copied().find(|c| *c == inp)
}

/// Closest allowed choice for `input`
/// if similarity ≥ 0.80 *and* clearly better than the runner-up.
pub fn best_suggestion<'a, I>(input: &str, allowed: I) -> Option<&'static str>
where
    I: IntoIterator<Item = &'a &'static str>,
{
    let inp = input.trim().to_ascii_lowercase();
    if inp.is_empty() {
        return None;
    }

    let mut scores: Vec<(&'static str, f64)> = allowed
        .into_iter()
        .copied()
        .map(|c| (c, jaro_winkler(&inp, c)))
        .collect();
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (best, best_score) = *scores.first()?;
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best)
    } else {
        None
    }
}
