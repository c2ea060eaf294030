//! Wallpaper search input

use super::{Device, ValidationError};

/// Case folding used for every search comparison.
///
/// Stored names keep a folded copy written with this function, so terms
/// and columns always fold the same way (full Unicode, not ASCII only).
pub fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

/// Comma-separated search terms, lowercased for case-insensitive matching
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchTerms(Vec<String>);

impl SearchTerms {
    /// Parse `?search=`; blank input yields no terms (match everything).
    pub fn parse(input: Option<&str>) -> Self {
        let terms = input
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(fold_case)
            .collect();
        Self(terms)
    }

    pub fn terms(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if any term is a substring of any candidate (case-insensitive).
    pub fn matches<'a, I>(&self, candidates: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.0.is_empty() {
            return true;
        }
        let lowered: Vec<String> = candidates.into_iter().map(fold_case).collect();
        self.0
            .iter()
            .any(|term| lowered.iter().any(|c| c.contains(term.as_str())))
    }
}

/// Optional `?device=` filter. Blank means no filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceFilter(Option<Device>);

impl DeviceFilter {
    pub fn parse(input: Option<&str>) -> Result<Self, ValidationError> {
        match input.map(str::trim) {
            None | Some("") => Ok(Self(None)),
            Some(s) => s.parse().map(|d| Self(Some(d))),
        }
    }

    pub fn device(&self) -> Option<Device> {
        self.0
    }
}

impl From<Device> for DeviceFilter {
    fn from(device: Device) -> Self {
        Self(Some(device))
    }
}
