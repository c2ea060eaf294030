//! User account commands
//!
//! The same operations the admin dashboard offers, run directly against the
//! database file so a fresh install can be administered without a browser.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use wallctl_core::models::{Email, Password, Username};
use wallctl_core::WallctlConfig;
use wallctl_server::auth::hash_password;
use wallctl_server::db::{SqlitePool, UserRepo, UserSummary};
use wallctl_server::{bootstrap, create_pool, DbError};

// === Arg Structs ===

#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a new account
    Create(CreateUserArgs),
    /// Replace an account's password
    ResetPassword(ResetPasswordArgs),
    /// List accounts with wallpaper and collection counts
    List(ListUsersArgs),
}

#[derive(Parser, Debug)]
pub struct CreateUserArgs {
    /// Login name (2-150 characters)
    pub username: String,

    /// Initial password
    #[arg(long, env = "WALLCTL_NEW_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Grant administrator rights
    #[arg(long)]
    pub admin: bool,

    /// Contact email (optional)
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ResetPasswordArgs {
    /// Login name of the account to update
    pub username: String,

    /// New password
    #[arg(long, env = "WALLCTL_NEW_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Parser, Debug)]
pub struct ListUsersArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

// === Dispatcher ===

pub async fn run_user(args: UserArgs, config: &WallctlConfig) -> Result<()> {
    let pool = open(config).await?;

    match args.command {
        UserCommands::Create(args) => create_user(&pool, args).await,
        UserCommands::ResetPassword(args) => reset_password(&pool, args).await,
        UserCommands::List(args) => list_users(&pool, args).await,
    }
}

/// Open the configured database and make sure the schema exists.
async fn open(config: &WallctlConfig) -> Result<SqlitePool> {
    let pool = create_pool(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    bootstrap(&pool).await.context("Failed to apply database schema")?;
    Ok(pool)
}

async fn create_user(pool: &SqlitePool, args: CreateUserArgs) -> Result<()> {
    let username = Username::new(&args.username)?;
    let password = Password::new(&args.password)?;
    let email = Email::parse_optional(args.email.as_deref())?;
    let hash = hash_password(&password)?;

    let user = match UserRepo::new(pool)
        .create(&username, &hash, args.admin, email.as_ref())
        .await
    {
        Err(DbError::Conflict { .. }) => return Err(anyhow!("username '{username}' is already taken")),
        other => other.context("Failed to create user")?,
    };

    println!(
        "Created {} '{}' (id {})",
        if user.is_admin { "admin" } else { "user" },
        user.username,
        user.id
    );
    Ok(())
}

async fn reset_password(pool: &SqlitePool, args: ResetPasswordArgs) -> Result<()> {
    let password = Password::new(&args.password)?;
    let repo = UserRepo::new(pool);

    let (user, _) = repo
        .find_credentials(args.username.trim())
        .await?
        .ok_or_else(|| anyhow!("no user named '{}'", args.username.trim()))?;

    let hash = hash_password(&password)?;
    repo.set_password_hash(user.id, &hash).await?;

    println!("Password updated for '{}'", user.username);
    Ok(())
}

async fn list_users(pool: &SqlitePool, args: ListUsersArgs) -> Result<()> {
    let users = UserRepo::new(pool).list_with_counts().await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&users)?),
        OutputFormat::Text => print!("{}", render_table(&users)),
    }
    Ok(())
}

fn render_table(users: &[UserSummary]) -> String {
    let width = users
        .iter()
        .map(|u| u.username.chars().count())
        .max()
        .unwrap_or(0)
        .max("USERNAME".len());

    let mut out = format!(
        "{:>4}  {:<width$}  {:<5}  {:>10}  {:>11}  EMAIL\n",
        "ID", "USERNAME", "ADMIN", "WALLPAPERS", "COLLECTIONS"
    );
    for u in users {
        out.push_str(&format!(
            "{:>4}  {:<width$}  {:<5}  {:>10}  {:>11}  {}\n",
            u.id,
            u.username,
            if u.is_admin { "yes" } else { "no" },
            u.wallpaper_count,
            u.collection_count,
            u.email.as_deref().unwrap_or("-"),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: i64, name: &str, is_admin: bool) -> UserSummary {
        UserSummary {
            id,
            username: name.to_string(),
            is_admin,
            email: None,
            wallpaper_count: 3,
            collection_count: 1,
        }
    }

    #[test]
    fn table_has_header_and_one_row_per_user() {
        let table = render_table(&[summary(1, "admin", true), summary(2, "alice", false)]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("USERNAME"));
        assert!(lines[1].contains("admin") && lines[1].contains("yes"));
        assert!(lines[2].contains("alice") && lines[2].contains(" no "));
    }
}
