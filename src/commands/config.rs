use crate::{cli::ConfigCmd, commands::Env};
use anyhow::Result;
use colored::Colorize;
use fitlog::config::{KEY_API_BASE_URL, KEY_DB_PATH, KEY_TIMEOUT_SECS};

const KNOWN_KEYS: [&str; 3] = [KEY_DB_PATH, KEY_API_BASE_URL, KEY_TIMEOUT_SECS];

pub async fn handle(cmd: ConfigCmd, env: &mut Env) -> Result<()> {
    let cfg = &mut env.config;

    match cmd {
        ConfigCmd::List => {
            if cfg.map.is_empty() {
                println!("{}", "(no config set)".dimmed());
            } else {
                println!("{}", "Config:".cyan().bold());
                for (k, v) in &cfg.map {
                    println!("  {} = {}", k.green(), v);
                }
            }
        }

        ConfigCmd::Get { key } => match cfg.map.get(&key) {
            Some(val) => println!("{}", val),
            None => println!("{} key `{}` not found", "warning:".yellow().bold(), key),
        },

        ConfigCmd::Set { key, val } => {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                println!(
                    "{} `{}` is not used by fitlog (known keys: {})",
                    "warning:".yellow().bold(),
                    key,
                    KNOWN_KEYS.join(", ")
                );
            }
            cfg.map.insert(key.clone(), val.clone());
            if key == KEY_TIMEOUT_SECS {
                // never persist a timeout that fails to parse
                if let Err(e) = cfg.timeout() {
                    cfg.map.remove(&key);
                    return Err(e.into());
                }
            }
            cfg.save(&env.config_path)?;
            println!("{} set `{}` = `{}`", "info:".blue().bold(), key.green(), val);
        }

        ConfigCmd::Unset { key } => {
            if cfg.map.remove(&key).is_some() {
                cfg.save(&env.config_path)?;
                println!("{} removed `{}`", "info:".blue().bold(), key.green());
            } else {
                println!("{} key `{}` not found", "warning:".yellow().bold(), key);
            }
        }
    }

    Ok(())
}
