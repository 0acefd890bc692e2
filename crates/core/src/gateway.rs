// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence gateway contract.
//!
//! Trackers persist into a key-value store offering three kinds of value
//! per key: a hash record (sparse field map), a set of strings, and a plain
//! string (used for friendly-id aliases). Writes are grouped into a [`Batch`]
//! that the gateway commits all-or-nothing.
//!
//! [`Keyspace`] is the in-memory model of these semantics; gateway
//! implementations in `rollup-storage` and the test fake wrap it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use thiserror::Error;

/// Sparse hash record: only fields that are set are present.
pub type Fields = BTreeMap<String, Value>;

/// Errors from gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("key {key} holds a different kind of value")]
    WrongType { key: String },

    #[error("field {field} of {key} is not an integer")]
    NotAnInteger { key: String, field: String },

    #[error("gateway unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One write in a [`Batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Upsert the given fields; fields not mentioned are left as they are.
    WriteHash { key: String, fields: Fields },
    AddToSet { key: String, members: Vec<String> },
    SetAlias { alias: String, id: String },
}

impl WriteOp {
    pub fn key(&self) -> &str {
        match self {
            WriteOp::WriteHash { key, .. } | WriteOp::AddToSet { key, .. } => key,
            WriteOp::SetAlias { alias, .. } => alias,
        }
    }

    fn kind(&self) -> KeyKind {
        match self {
            WriteOp::WriteHash { .. } => KeyKind::Hash,
            WriteOp::AddToSet { .. } => KeyKind::Set,
            WriteOp::SetAlias { .. } => KeyKind::String,
        }
    }
}

/// Writes committed together as one atomic unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    ops: Vec<WriteOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_hash(&mut self, key: impl Into<String>, fields: Fields) -> &mut Self {
        self.ops.push(WriteOp::WriteHash { key: key.into(), fields });
        self
    }

    pub fn add_to_set<I, S>(&mut self, key: impl Into<String>, members: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = members.into_iter().map(Into::into).collect();
        self.ops.push(WriteOp::AddToSet { key: key.into(), members });
        self
    }

    pub fn set_alias(&mut self, alias: impl Into<String>, id: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::SetAlias { alias: alias.into(), id: id.into() });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Keys touched by this batch, in op order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().map(WriteOp::key)
    }
}

/// Key-value store backing tracker persistence.
///
/// Handles are cheap to clone and share the same underlying store.
pub trait Gateway: Clone + Send + Sync + 'static {
    fn read_hash(&self, key: &str) -> Result<Option<Fields>, GatewayError>;

    /// Members of the set at `key`; empty when absent.
    fn read_set(&self, key: &str) -> Result<BTreeSet<String>, GatewayError>;

    /// Id stored under a friendly-id alias.
    fn read_alias(&self, alias: &str) -> Result<Option<String>, GatewayError>;

    fn exists(&self, key: &str) -> Result<bool, GatewayError>;

    /// Atomically add `delta` to an integer hash field, returning the new value.
    fn increment_field(&self, key: &str, field: &str, delta: i64) -> Result<i64, GatewayError>;

    /// Commit every op in `batch`, or none of them.
    fn execute(&self, batch: Batch) -> Result<(), GatewayError>;
}

/// In-memory keyspace with the gateway's semantics.
///
/// A key holds exactly one kind of value; writing another kind to an occupied
/// key fails with [`GatewayError::WrongType`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyspace {
    #[serde(default)]
    hashes: BTreeMap<String, Fields>,
    #[serde(default)]
    sets: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    strings: BTreeMap<String, String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Hash,
    Set,
    String,
}

impl Keyspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_hash(&self, key: &str) -> Result<Option<&Fields>, GatewayError> {
        self.check_kind(key, KeyKind::Hash)?;
        Ok(self.hashes.get(key))
    }

    pub fn read_set(&self, key: &str) -> Result<BTreeSet<String>, GatewayError> {
        self.check_kind(key, KeyKind::Set)?;
        Ok(self.sets.get(key).cloned().unwrap_or_default())
    }

    pub fn read_string(&self, key: &str) -> Result<Option<&str>, GatewayError> {
        self.check_kind(key, KeyKind::String)?;
        Ok(self.strings.get(key).map(String::as_str))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.kind_of(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.hashes.len() + self.sets.len() + self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply every op in `batch`, leaving the keyspace untouched on failure.
    ///
    /// Key kinds are checked for the whole batch before anything is written,
    /// including kinds claimed by earlier ops in the same batch.
    pub fn apply(&mut self, batch: &Batch) -> Result<(), GatewayError> {
        let mut claimed: HashMap<&str, KeyKind> = HashMap::new();
        for op in batch.ops() {
            let key = op.key();
            let kind = claimed.get(key).copied().or_else(|| self.kind_of(key));
            if kind.is_some_and(|kind| kind != op.kind()) {
                return Err(GatewayError::WrongType { key: key.to_string() });
            }
            claimed.insert(key, op.kind());
        }
        for op in batch.ops() {
            self.write_op(op);
        }
        Ok(())
    }

    pub fn increment(&mut self, key: &str, field: &str, delta: i64) -> Result<i64, GatewayError> {
        self.check_kind(key, KeyKind::Hash)?;
        let current = match self.hashes.get(key).and_then(|fields| fields.get(field)) {
            None => Some(0),
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(_) => None,
        }
        .ok_or_else(|| not_an_integer(key, field))?;
        let next = current.checked_add(delta).ok_or_else(|| not_an_integer(key, field))?;
        self.hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), Value::from(next));
        Ok(next)
    }

    fn write_op(&mut self, op: &WriteOp) {
        match op {
            WriteOp::WriteHash { key, fields } => {
                let stored = self.hashes.entry(key.clone()).or_default();
                stored.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            WriteOp::AddToSet { key, members } => {
                self.sets.entry(key.clone()).or_default().extend(members.iter().cloned());
            }
            WriteOp::SetAlias { alias, id } => {
                self.strings.insert(alias.clone(), id.clone());
            }
        }
    }

    fn kind_of(&self, key: &str) -> Option<KeyKind> {
        if self.hashes.contains_key(key) {
            Some(KeyKind::Hash)
        } else if self.sets.contains_key(key) {
            Some(KeyKind::Set)
        } else if self.strings.contains_key(key) {
            Some(KeyKind::String)
        } else {
            None
        }
    }

    fn check_kind(&self, key: &str, expected: KeyKind) -> Result<(), GatewayError> {
        match self.kind_of(key) {
            Some(kind) if kind != expected => Err(GatewayError::WrongType { key: key.to_string() }),
            _ => Ok(()),
        }
    }
}

fn not_an_integer(key: &str, field: &str) -> GatewayError {
    GatewayError::NotAnInteger { key: key.to_string(), field: field.to_string() }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Batch, Fields, Gateway, GatewayError, Keyspace};
    use parking_lot::Mutex;
    use std::collections::{BTreeSet, HashSet};
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeGatewayState {
        keyspace: Keyspace,
        committed: Vec<Batch>,
        failing_keys: HashSet<String>,
        offline: bool,
    }

    /// Fake gateway for testing: records committed batches and can be told
    /// to fail writes.
    #[derive(Clone, Default)]
    pub struct FakeGateway {
        inner: Arc<Mutex<FakeGatewayState>>,
    }

    impl FakeGateway {
        pub fn new() -> Self {
            Self::default()
        }

        /// Copy of the current keyspace
        pub fn keyspace(&self) -> Keyspace {
            self.inner.lock().keyspace.clone()
        }

        /// Batches committed so far, in order
        pub fn committed(&self) -> Vec<Batch> {
            self.inner.lock().committed.clone()
        }

        /// Fail any batch or increment touching `key`
        pub fn fail_writes_to(&self, key: impl Into<String>) {
            self.inner.lock().failing_keys.insert(key.into());
        }

        /// Fail every operation, reads included
        pub fn set_offline(&self, offline: bool) {
            self.inner.lock().offline = offline;
        }

        pub fn clear_failures(&self) {
            let mut state = self.inner.lock();
            state.failing_keys.clear();
            state.offline = false;
        }

        /// Apply writes directly, bypassing failure injection and the commit log
        pub fn seed(&self, batch: &Batch) -> Result<(), GatewayError> {
            self.inner.lock().keyspace.apply(batch)
        }

        fn check_online(state: &FakeGatewayState) -> Result<(), GatewayError> {
            if state.offline {
                return Err(GatewayError::Unavailable("fake gateway offline".to_string()));
            }
            Ok(())
        }
    }

    impl Gateway for FakeGateway {
        fn read_hash(&self, key: &str) -> Result<Option<Fields>, GatewayError> {
            let state = self.inner.lock();
            Self::check_online(&state)?;
            Ok(state.keyspace.read_hash(key)?.cloned())
        }

        fn read_set(&self, key: &str) -> Result<BTreeSet<String>, GatewayError> {
            let state = self.inner.lock();
            Self::check_online(&state)?;
            state.keyspace.read_set(key)
        }

        fn read_alias(&self, alias: &str) -> Result<Option<String>, GatewayError> {
            let state = self.inner.lock();
            Self::check_online(&state)?;
            Ok(state.keyspace.read_string(alias)?.map(str::to_string))
        }

        fn exists(&self, key: &str) -> Result<bool, GatewayError> {
            let state = self.inner.lock();
            Self::check_online(&state)?;
            Ok(state.keyspace.exists(key))
        }

        fn increment_field(&self, key: &str, field: &str, delta: i64) -> Result<i64, GatewayError> {
            let mut state = self.inner.lock();
            Self::check_online(&state)?;
            if state.failing_keys.contains(key) {
                return Err(GatewayError::Unavailable(format!("injected failure for {key}")));
            }
            state.keyspace.increment(key, field, delta)
        }

        fn execute(&self, batch: Batch) -> Result<(), GatewayError> {
            let mut state = self.inner.lock();
            Self::check_online(&state)?;
            if let Some(key) = batch.keys().find(|k| state.failing_keys.contains(*k)) {
                return Err(GatewayError::Unavailable(format!("injected failure for {key}")));
            }
            state.keyspace.apply(&batch)?;
            state.committed.push(batch);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeGateway;

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
