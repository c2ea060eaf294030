//! wallctl CLI - wallpaper catalog server and account administration
//!
//! - `serve`: run the HTTP server (creates the schema and the default admin)
//! - `user`: create accounts, reset passwords, list users with counts
//! - `config`: show the effective configuration and its file location
//! - `completions`: shell completion scripts

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use wallctl_core::WallctlConfig;

mod commands;
mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "wallctl",
    author,
    version,
    about = "Multi-user wallpaper catalog: server and administration",
    long_about = "Serve a shared wallpaper library with tags, colors, device filters and \
                  personal collections, and manage the accounts that use it."
)]
struct Cli {
    /// Config file (default: ~/.wallctl/config.toml)
    #[arg(long, global = true, env = "WALLCTL_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Manage user accounts (create, reset-password, list)
    User(commands::user::UserArgs),
    /// Inspect configuration (show, path)
    Config(commands::config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Defaults, then the config file, then `WALLCTL_*` variables.
fn load_config(path: Option<&Path>) -> Result<WallctlConfig> {
    WallctlConfig::load(path).context("Failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => {
            let config = load_config(cli.config.as_deref())?;
            commands::run_serve(args, config).await?
        }
        Commands::User(args) => {
            let config = load_config(cli.config.as_deref())?;
            commands::run_user(args, &config).await?
        }
        Commands::Config(args) => {
            let config = load_config(cli.config.as_deref())?;
            commands::run_config(args, &config, cli.config.as_deref())?
        }
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
