//! Config command handlers.

use anyhow::Result;
use redraft_core::config::{Config, paths};

use crate::cli::ConfigCommands;

pub fn run(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            println!("{}", paths::config_path().display());
            Ok(())
        }
        ConfigCommands::Init => {
            let path = paths::config_path();
            Config::init(&path)?;
            println!("Created {}", path.display());
            Ok(())
        }
        ConfigCommands::SetUrl { url } => {
            Config::save_base_url(url)?;
            println!("Backend set to {url}");
            Ok(())
        }
    }
}
