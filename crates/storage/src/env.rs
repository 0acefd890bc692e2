// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for locating the tracker store.

use std::path::PathBuf;
use thiserror::Error;

/// Snapshot file name inside the state directory
pub const STORE_FILE: &str = "trackers.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("cannot locate state directory: set ROLLUP_STORE, ROLLUP_STATE_DIR, or HOME")]
    NoStateDir,
}

/// Resolve the snapshot path: ROLLUP_STORE > ROLLUP_STATE_DIR/trackers.json >
/// XDG_STATE_HOME/rollup/trackers.json > ~/.local/state/rollup/trackers.json
pub fn store_path() -> Result<PathBuf, EnvError> {
    resolve_store_path(|name| std::env::var(name).ok())
}

/// [`store_path`] against an arbitrary variable lookup.
pub fn resolve_store_path(lookup: impl Fn(&str) -> Option<String>) -> Result<PathBuf, EnvError> {
    if let Some(path) = non_empty(&lookup, "ROLLUP_STORE") {
        return Ok(PathBuf::from(path));
    }
    Ok(resolve_state_dir(&lookup)?.join(STORE_FILE))
}

fn resolve_state_dir(lookup: &dyn Fn(&str) -> Option<String>) -> Result<PathBuf, EnvError> {
    if let Some(dir) = non_empty(lookup, "ROLLUP_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty(lookup, "XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("rollup"));
    }
    let home = non_empty(lookup, "HOME").ok_or(EnvError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/rollup"))
}

fn non_empty(lookup: &dyn Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
