use anyhow::Result;
use colored::Colorize;

use super::{AppContext, info, warning};
use crate::{
    cli::ConfigCmd,
    types::{CONFIG_KEYS, Config, emit},
};

/// Keys whose values are masked when listed.
const SECRET_KEYS: [&str; 1] = ["api_key"];

fn shown(key: &str, val: &str) -> String {
    if SECRET_KEYS.contains(&key) && val.chars().count() > 4 {
        format!("{}…", val.chars().take(4).collect::<String>())
    } else {
        val.to_string()
    }
}

pub fn handle(cmd: ConfigCmd, ctx: &AppContext) -> Result<()> {
    let path = &ctx.config_path;
    let mut cfg = Config::load(path)?;

    match cmd {
        ConfigCmd::List => emit(ctx.fmt, &cfg.map, |map| {
            if map.is_empty() {
                println!("{}", "(no config set)".dimmed());
                return;
            }
            println!("{}", "Config:".cyan().bold());
            for (k, v) in map {
                println!("  {} = {}", k.green(), shown(k, v));
            }
        })?,

        ConfigCmd::Get { key } => match cfg.map.get(&key) {
            Some(val) => println!("{}", val),
            None => warning(format!("key `{}` not found", key)),
        },

        ConfigCmd::Set { key, val } => {
            if !CONFIG_KEYS.contains(&key.as_str()) {
                warning(format!(
                    "`{}` is not a known key ({}); saving anyway",
                    key,
                    CONFIG_KEYS.join(", ")
                ));
            }
            cfg.map.insert(key.clone(), val.clone());
            cfg.save(path)?;
            info(format!("set `{}` = `{}`", key.green(), shown(&key, &val)));
            if key != "timeout_secs" || val.trim().parse::<u64>().is_ok() {
                info("takes effect on next start");
            } else {
                warning("timeout_secs must be a whole number of seconds; the default is used");
            }
        }

        ConfigCmd::Unset { key } => {
            if cfg.map.remove(&key).is_some() {
                cfg.save(path)?;
                info(format!("removed `{}`", key.green()));
            } else {
                warning(format!("key `{}` not found", key));
            }
        }
    }

    Ok(())
}
