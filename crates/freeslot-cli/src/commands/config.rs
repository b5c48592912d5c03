use std::path::Path;

use clap::Subcommand;
use freeslot_core::Config;

use super::{load_config, CommandResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "engine.working_start", "preferences.avoid")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value (JSON for lists, e.g. '[{"start":"12:00","end":"13:00"}]')
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction, path: Option<&Path>) -> CommandResult {
    match action {
        ConfigAction::Get { key } => {
            let config = load_config(path)?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = load_config(path)?;
            config.set(&key, &value)?;
            save(&config, path)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = load_config(path)?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            save(&Config::default(), path)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

fn save(config: &Config, path: Option<&Path>) -> Result<(), freeslot_core::ConfigError> {
    match path {
        Some(path) => config.save_to(path),
        None => config.save(),
    }
}
