// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracker identifiers.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Unique identifier for one node of a tracker tree.
///
/// Generated ids have the form `trk-{nanoid}` (23 characters, which fits
/// `SmolStr` inline). Ids read back from storage or supplied by callers are
/// kept verbatim and need not carry the prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackerId(SmolStr);

impl TrackerId {
    pub const PREFIX: &'static str = "trk-";

    /// Generate a new random ID with the type prefix
    pub fn new() -> Self {
        Self(SmolStr::new(format!("{}{}", Self::PREFIX, nanoid::nanoid!(19))))
    }

    /// Create ID from an existing string (caller-supplied or loaded from storage)
    pub fn from_string(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TrackerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TrackerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackerId {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<String> for TrackerId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<str> for TrackerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TrackerId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TrackerId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::borrow::Borrow<str> for TrackerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for TrackerId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
