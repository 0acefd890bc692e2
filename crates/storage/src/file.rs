// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway persisted to a JSON snapshot file.

use crate::snapshot;
use parking_lot::Mutex;
use rollup_core::{Batch, Fields, Gateway, GatewayError, Keyspace};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct FileStore {
    path: PathBuf,
    keyspace: Keyspace,
}

impl FileStore {
    /// Apply `change` to a copy, save it, and keep it only if the save succeeds.
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut Keyspace) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let mut staged = self.keyspace.clone();
        let value = change(&mut staged)?;
        snapshot::save(&self.path, &staged)?;
        self.keyspace = staged;
        Ok(value)
    }
}

/// Gateway whose keyspace lives in one snapshot file.
///
/// The whole keyspace is held in memory and the file is rewritten after
/// every committed batch or increment. Clones share the same store; separate
/// `open` calls on one path do not see each other's writes.
#[derive(Clone)]
pub struct FileGateway {
    inner: Arc<Mutex<FileStore>>,
}

impl FileGateway {
    /// Open the store at `path`. A missing file starts empty and is created
    /// on the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let path = path.as_ref().to_path_buf();
        let keyspace = snapshot::load(&path)?;
        tracing::debug!(path = %path.display(), keys = keyspace.len(), "opened file gateway");
        Ok(Self { inner: Arc::new(Mutex::new(FileStore { path, keyspace })) })
    }

    pub fn path(&self) -> PathBuf {
        self.inner.lock().path.clone()
    }
}

impl Gateway for FileGateway {
    fn read_hash(&self, key: &str) -> Result<Option<Fields>, GatewayError> {
        Ok(self.inner.lock().keyspace.read_hash(key)?.cloned())
    }

    fn read_set(&self, key: &str) -> Result<BTreeSet<String>, GatewayError> {
        self.inner.lock().keyspace.read_set(key)
    }

    fn read_alias(&self, alias: &str) -> Result<Option<String>, GatewayError> {
        Ok(self.inner.lock().keyspace.read_string(alias)?.map(str::to_string))
    }

    fn exists(&self, key: &str) -> Result<bool, GatewayError> {
        Ok(self.inner.lock().keyspace.exists(key))
    }

    fn increment_field(&self, key: &str, field: &str, delta: i64) -> Result<i64, GatewayError> {
        self.inner.lock().commit(|keyspace| keyspace.increment(key, field, delta))
    }

    fn execute(&self, batch: Batch) -> Result<(), GatewayError> {
        let mut store = self.inner.lock();
        let result = store.commit(|keyspace| keyspace.apply(&batch));
        if let Err(e) = &result {
            tracing::warn!(path = %store.path.display(), error = %e, "batch rejected");
        }
        result
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
