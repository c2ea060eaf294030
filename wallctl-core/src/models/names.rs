//! Validated names and credentials
//!
//! Length limits match the database columns: usernames 2-150 characters,
//! wallpaper and collection names up to 100, emails up to 150.

use std::fmt;

use super::validation::{check_length, ValidationError};

const USERNAME_MIN: usize = 2;
const USERNAME_MAX: usize = 150;
const WALLPAPER_NAME_MAX: usize = 100;
const COLLECTION_NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 150;

/// Login name, trimmed, 2-150 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        check_length("username", s, USERNAME_MIN, USERNAME_MAX)?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plain-text password as submitted. Never trimmed, never printed.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Display name of a wallpaper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperName(String);

impl WallpaperName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        check_length("wallpaper name", s, 1, WALLPAPER_NAME_MAX)?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Name of a user's collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionName(String);

impl CollectionName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        check_length("collection name", s, 1, COLLECTION_NAME_MAX)?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Optional contact address. Only a shape check, no deliverability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    /// Blank input means "no email".
    pub fn parse_optional(s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match s.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Self::new(s).map(Some),
        }
    }

    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        check_length("email", s, 3, EMAIL_MAX)?;
        match s.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(s.to_owned()))
            }
            _ => Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like name@domain",
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
