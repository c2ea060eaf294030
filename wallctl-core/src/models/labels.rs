//! Tag and color label lists
//!
//! Both arrive as comma-separated free text. Tokens are trimmed, empty
//! tokens dropped and exact duplicates collapsed. Matching against stored
//! labels is case-sensitive, so "Red" and "red" are different labels.

use super::validation::{check_length, ValidationError};

const LABEL_MAX: usize = 50;

/// Which label table a list belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Tag,
    Color,
}

impl LabelKind {
    pub fn field(&self) -> &'static str {
        match self {
            LabelKind::Tag => "tags",
            LabelKind::Color => "colors",
        }
    }
}

/// Ordered, de-duplicated label names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelList {
    kind: LabelKind,
    names: Vec<String>,
}

impl LabelList {
    /// Parse a comma-separated field. At least one name is required.
    pub fn parse(kind: LabelKind, input: &str) -> Result<Self, ValidationError> {
        let mut names: Vec<String> = Vec::new();
        for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            check_length(kind.field(), token, 1, LABEL_MAX)?;
            if !names.iter().any(|n| n == token) {
                names.push(token.to_owned());
            }
        }

        if names.is_empty() {
            return Err(ValidationError::Empty { field: kind.field() });
        }

        Ok(Self { kind, names })
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
