//! Configuration inspection

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use wallctl_core::WallctlConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (file + environment) as TOML, password redacted
    Show,
    /// Print the config file location
    Path,
}

pub fn run_config(args: ConfigArgs, config: &WallctlConfig, explicit: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let mut shown = config.clone();
            shown.bootstrap_admin_password = "<redacted>".to_string();
            print!("{}", shown.to_toml()?);
        }
        ConfigCommands::Path => {
            let path = explicit.map(Path::to_path_buf).unwrap_or_else(WallctlConfig::config_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
