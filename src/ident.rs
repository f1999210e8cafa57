//! Validated identifier newtypes.
//!
//! Project ids and commit hashes arrive from the frontend and end up in
//! filesystem paths and git argument lists. `ProjectId::parse` and
//! `CommitHash::parse` are the only way to construct these types, so
//! everything downstream can join paths and build argument arrays without
//! re-checking the input.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::IdentifierError;

/// A validated project identifier: non-empty, `[A-Za-z0-9_-]` only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Validate a raw project id.
    ///
    /// The `..` and separator checks are technically implied by the
    /// charset check, but stay explicit so each rejection reports what
    /// was actually wrong with the input.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        if raw.is_empty() {
            return Err(IdentifierError::EmptyProjectId);
        }
        if raw.contains("..") || raw.contains('/') || raw.contains('\\') {
            return Err(IdentifierError::PathTraversal(raw.to_string()));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IdentifierError::InvalidCharacters(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProjectId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated commit hash: non-empty, ASCII hexadecimal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommitHash(String);

impl CommitHash {
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        if raw.is_empty() {
            return Err(IdentifierError::EmptyHash);
        }
        if !raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdentifierError::NonHexHash(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CommitHash {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
