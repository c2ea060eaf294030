//! Password hashing, credential checks and session issuing

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sqlx::SqlitePool;
use wallctl_core::models::{Password, Username, ValidationError};

use crate::db::{DbError, Session, SessionRepo, User, UserRepo};

/// Name of the bootstrap administrator account
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Session token entropy in bytes (256 bits)
const TOKEN_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Hash a password into a PHC string.
pub fn hash_password(password: &Password) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.expose().as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string. Malformed hashes never verify.
pub fn verify_password(password: &Password, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.expose().as_bytes(), &parsed)
        .is_ok()
}

/// Random URL-safe session token.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Resolve credentials to a user.
///
/// Unknown usernames and wrong passwords both yield `InvalidCredentials`.
pub async fn authenticate(pool: &SqlitePool, username: &str, password: &Password) -> Result<User, AuthError> {
    let Some((user, hash)) = UserRepo::new(pool).find_credentials(username.trim()).await? else {
        tracing::info!(username, "login failed: unknown user");
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(password, &hash) {
        tracing::info!(user_id = user.id, "login failed: wrong password");
        return Err(AuthError::InvalidCredentials);
    }
    Ok(user)
}

/// Authenticate and open a session valid for `ttl_secs`.
///
/// Expired sessions are purged on the way.
pub async fn login(
    pool: &SqlitePool,
    username: &str,
    password: &Password,
    ttl_secs: i64,
) -> Result<(User, Session), AuthError> {
    let user = authenticate(pool, username, password).await?;

    let sessions = SessionRepo::new(pool);
    let purged = sessions.purge_expired().await?;
    if purged > 0 {
        tracing::debug!(purged, "expired sessions removed");
    }

    let session = sessions.create(&generate_session_token(), user.id, ttl_secs).await?;
    tracing::info!(user_id = user.id, "user logged in");
    Ok((user, session))
}

/// Create the `admin` account if it does not exist yet.
///
/// Returns true if the account was created.
pub async fn ensure_default_admin(pool: &SqlitePool, password: &Password) -> Result<bool, AuthError> {
    let users = UserRepo::new(pool);
    if users.exists(DEFAULT_ADMIN_USERNAME).await? {
        return Ok(false);
    }

    let username = Username::new(DEFAULT_ADMIN_USERNAME)?;
    match users.create(&username, &hash_password(password)?, true, None).await {
        Ok(user) => {
            tracing::warn!(
                user_id = user.id,
                "created default admin account; change its password"
            );
            Ok(true)
        }
        // Raced with another process
        Err(DbError::Conflict { .. }) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
