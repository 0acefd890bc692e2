// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-local gateway.

use parking_lot::Mutex;
use rollup_core::{Batch, Fields, Gateway, GatewayError, Keyspace};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Gateway backed by an in-memory [`Keyspace`]. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    keyspace: Arc<Mutex<Keyspace>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyspace(keyspace: Keyspace) -> Self {
        Self { keyspace: Arc::new(Mutex::new(keyspace)) }
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Keyspace {
        self.keyspace.lock().clone()
    }
}

impl Gateway for MemoryGateway {
    fn read_hash(&self, key: &str) -> Result<Option<Fields>, GatewayError> {
        Ok(self.keyspace.lock().read_hash(key)?.cloned())
    }

    fn read_set(&self, key: &str) -> Result<BTreeSet<String>, GatewayError> {
        self.keyspace.lock().read_set(key)
    }

    fn read_alias(&self, alias: &str) -> Result<Option<String>, GatewayError> {
        Ok(self.keyspace.lock().read_string(alias)?.map(str::to_string))
    }

    fn exists(&self, key: &str) -> Result<bool, GatewayError> {
        Ok(self.keyspace.lock().exists(key))
    }

    fn increment_field(&self, key: &str, field: &str, delta: i64) -> Result<i64, GatewayError> {
        self.keyspace.lock().increment(key, field, delta)
    }

    fn execute(&self, batch: Batch) -> Result<(), GatewayError> {
        self.keyspace.lock().apply(&batch)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
