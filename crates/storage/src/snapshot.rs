// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk snapshot of a keyspace.
//!
//! One JSON document per store, replaced atomically (write to `<path>.tmp`,
//! fsync, rename) after every committed write.

use rollup_core::{GatewayError, Keyspace};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current snapshot schema version
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur in snapshot operations
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version {0} (expected {CURRENT_SNAPSHOT_VERSION})")]
    UnsupportedVersion(u32),
}

impl From<SnapshotError> for GatewayError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Io { path, source } => GatewayError::Io { path, source },
            SnapshotError::Json(e) => GatewayError::Json(e),
            other @ SnapshotError::UnsupportedVersion(_) => {
                GatewayError::Unavailable(other.to_string())
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    #[serde(rename = "v")]
    version: u32,
    keyspace: Keyspace,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    #[serde(rename = "v")]
    version: u32,
    keyspace: &'a Keyspace,
}

/// Read the keyspace stored at `path`; a missing file is an empty keyspace.
pub fn load(path: &Path) -> Result<Keyspace, SnapshotError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no snapshot, starting empty");
            return Ok(Keyspace::new());
        }
        Err(source) => return Err(SnapshotError::Io { path: path.to_path_buf(), source }),
    };
    let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
    if snapshot.version != CURRENT_SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.version));
    }
    tracing::debug!(path = %path.display(), keys = snapshot.keyspace.len(), "loaded snapshot");
    Ok(snapshot.keyspace)
}

/// Atomically replace the snapshot at `path` with `keyspace`.
pub fn save(path: &Path, keyspace: &Keyspace) -> Result<(), SnapshotError> {
    let json = serde_json::to_vec(&SnapshotRef { version: CURRENT_SNAPSHOT_VERSION, keyspace })?;
    let tmp_path = tmp_path(path);
    write_synced(&tmp_path, &json)
        .and_then(|_| fs::rename(&tmp_path, path))
        .map_err(|source| SnapshotError::Io { path: path.to_path_buf(), source })
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
