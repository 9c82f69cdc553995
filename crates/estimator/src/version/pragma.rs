//! Solidity version pragma extraction
//!
//! Reads the first `pragma solidity` statement of a source and turns it into the key used
//! against the release catalog.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{EstimateError, Result};

static FULL_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").unwrap());

/// A `pragma solidity ...;` statement. Any whitespace, newlines included, may separate the
/// keywords; group 1 is the constraint text up to the semicolon.
pub(crate) static PRAGMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpragma\s+solidity\s+([^;]+);").unwrap());

/// A version requirement as written by the contract author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersionConstraint {
    declared: String,
    key: String,
}

impl VersionConstraint {
    /// Builds a constraint from pragma text such as `^0.8.19` or `>=0.7.0 <0.9.0`.
    /// The catalog key is the first full `major.minor.patch` in it.
    pub fn parse(declared: &str) -> Option<Self> {
        let declared = declared.trim();
        let key = FULL_VERSION_RE.find(declared)?.as_str().to_string();
        Some(Self {
            declared: declared.to_string(),
            key,
        })
    }

    /// The text between `pragma solidity` and `;`.
    pub fn declared(&self) -> &str {
        &self.declared
    }

    /// Release catalog key, e.g. `0.8.19`.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.declared)
    }
}

/// Only the first `pragma solidity` statement is considered, even when a file declares
/// several.
pub fn extract_constraint(source: &str) -> Result<VersionConstraint> {
    let declared = PRAGMA_RE
        .captures(source)
        .and_then(|c| c.get(1))
        .ok_or(EstimateError::MissingVersionDeclaration)?;

    VersionConstraint::parse(declared.as_str()).ok_or(EstimateError::MissingVersionDeclaration)
}
