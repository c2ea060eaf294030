//! HTTP server command
//!
//! Opens (and if needed creates) the database, applies the schema, makes
//! sure the `admin` account exists, then serves until Ctrl+C / SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use wallctl_core::models::Password;
use wallctl_core::WallctlConfig;
use wallctl_server::auth::ensure_default_admin;
use wallctl_server::{bootstrap, create_pool, run_server, AppState, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[arg(long, short = 'b', env = "WALLCTL_BIND")]
    pub bind: Option<SocketAddr>,

    /// SQLite database file (overrides config/environment)
    #[arg(long, value_name = "PATH", env = "WALLCTL_DATABASE_PATH")]
    pub database: Option<PathBuf>,

    /// Upload directory (overrides config/environment)
    #[arg(long, value_name = "DIR", env = "WALLCTL_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,
}

impl ServeArgs {
    /// Flags win over everything loaded before them.
    fn apply(self, config: &mut WallctlConfig) {
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(database) = self.database {
            config.database_path = database;
        }
        if let Some(upload_dir) = self.upload_dir {
            config.upload_dir = upload_dir;
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, mut config: WallctlConfig) -> Result<()> {
    args.apply(&mut config);

    tracing::info!(
        bind = %config.bind,
        database = %config.database_path.display(),
        "Starting wallctl server"
    );

    let pool = create_pool(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    bootstrap(&pool).await.context("Failed to apply database schema")?;

    let admin_password =
        Password::new(&config.bootstrap_admin_password).context("Invalid bootstrap admin password")?;
    ensure_default_admin(&pool, &admin_password)
        .await
        .context("Failed to create default admin account")?;

    let state = AppState::new(pool, &config);

    // Run server (blocks until shutdown)
    run_server(state, ServerConfig::from(&config))
        .await
        .context("Server error")?;

    Ok(())
}
