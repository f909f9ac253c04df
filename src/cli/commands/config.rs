//! Configuration inspection commands.

use crate::cli::{ConfigCommands, Output};
use crate::config::MinerConfig;
use anyhow::{Result, bail};

pub fn execute(cmd: ConfigCommands, config_path: Option<&str>, output: &Output) -> Result<()> {
    let config = MinerConfig::load(config_path)?;

    match cmd {
        ConfigCommands::Show => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        ConfigCommands::Validate => {
            if let Some(value) = config.mining.min_support {
                if value <= 0 {
                    bail!("minimum support must be positive, got {value}");
                }
            }
            output.success("Configuration is valid");
            Ok(())
        }
    }
}
