// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tree orchestrator.
//!
//! A [`Magician`] is the root of one tracker tree. It owns the [`Registry`],
//! validates and attaches new trackers, drives their transitions with its
//! clock, and flushes dirty trackers through its [`Gateway`].
//!
//! Flushing is ancestor-first: before a tracker is written, each dirty
//! registered ancestor is written top-down, so a stored child never names a
//! parent whose record is older than its own. Each tracker's writes commit as
//! one batch; there is no transaction across trackers.

use crate::clock::{Clock, SystemClock};
use crate::error::{PreconditionError, TrackerError};
use crate::gateway::Gateway;
use crate::id::TrackerId;
use crate::loader::load_tree;
use crate::record;
use crate::registry::Registry;
use crate::tracker::{StartOptions, StartOutcome, Tracker, TrackerConfig, TransitionOutcome};
use std::time::Duration;

/// Root-owning orchestrator for one tracker tree.
pub struct Magician<G: Gateway, C: Clock = SystemClock> {
    root_id: TrackerId,
    registry: Registry,
    gateway: G,
    clock: C,
}

impl<G: Gateway, C: Clock> Magician<G, C> {
    /// Create a new tree whose root is built from `config`.
    ///
    /// The root is dirty until the first flush. A `parent_id` in `config` is
    /// ignored.
    pub fn new(mut config: TrackerConfig, gateway: G, clock: C) -> Self {
        config.parent_id = None;
        let root = Tracker::new(config, &clock);
        let root_id = root.id().clone();
        let mut registry = Registry::new();
        registry.insert(root);
        tracing::debug!(tracker_id = %root_id, "created tracker tree");
        Self { root_id, registry, gateway, clock }
    }

    /// Rehydrate the tree rooted at `id`, or `None` if no record exists.
    pub fn load(
        id: impl Into<TrackerId>,
        gateway: G,
        clock: C,
    ) -> Result<Option<Self>, TrackerError> {
        let root_id = id.into();
        let mut registry = Registry::new();
        if !load_tree(&gateway, &root_id, &mut registry)? {
            tracing::debug!(tracker_id = %root_id, "no stored tracker");
            return Ok(None);
        }
        tracing::info!(tracker_id = %root_id, trackers = registry.len(), "loaded tracker tree");
        Ok(Some(Self { root_id, registry, gateway, clock }))
    }

    /// Resolve `alias` through the gateway, then [`load`](Self::load) its tree.
    pub fn load_by_friendly_id(
        alias: &str,
        gateway: G,
        clock: C,
    ) -> Result<Option<Self>, TrackerError> {
        let resolved = gateway
            .read_alias(alias)
            .map_err(|e| TrackerError::persistence(&TrackerId::from(alias), e))?;
        match resolved {
            Some(id) => Self::load(id, gateway, clock),
            None => Ok(None),
        }
    }

    pub fn root_id(&self) -> &TrackerId {
        &self.root_id
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Register `tracker` under its declared parent, or under the root when
    /// it declares none.
    ///
    /// A friendly id already carried by a registered tracker is rejected.
    pub fn attach(&mut self, mut tracker: Tracker) -> Result<TrackerId, TrackerError> {
        let id = tracker.id().clone();
        if self.registry.contains(&id) {
            return Err(PreconditionError::AlreadyRegistered { id }.into());
        }
        if let Some(alias) = tracker.friendly_id() {
            if let Some(owner) = self.registry.find_by_friendly_id(alias) {
                return Err(PreconditionError::AliasTaken {
                    alias: alias.to_string(),
                    id: owner.id().clone(),
                }
                .into());
            }
        }
        let parent = tracker.parent_id().cloned().unwrap_or_else(|| self.root_id.clone());
        if parent == id {
            return Err(PreconditionError::SelfParent { id }.into());
        }
        let Some(parent_tracker) = self.registry.get_mut(&parent) else {
            return Err(PreconditionError::ParentMissing { id, parent }.into());
        };
        parent_tracker.with_child(id.clone());
        tracker.assign_parent(parent);
        tracing::debug!(tracker_id = %id, parent_id = ?tracker.parent_id(), "attached tracker");
        self.registry.insert(tracker);
        Ok(id)
    }

    /// Build a tracker from `config` with this orchestrator's clock and attach it.
    pub fn create(&mut self, config: TrackerConfig) -> Result<TrackerId, TrackerError> {
        let tracker = Tracker::new(config, &self.clock);
        self.attach(tracker)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Tracker> {
        self.registry.get(id)
    }

    pub fn find_by_friendly_id(&self, friendly_id: &str) -> Option<&Tracker> {
        self.registry.find_by_friendly_id(friendly_id)
    }

    /// Mutable access for the change-tracking setters.
    pub fn tracker_mut(&mut self, id: &str) -> Option<&mut Tracker> {
        self.registry.get_mut(id)
    }

    pub fn start(&mut self, id: &str, options: StartOptions) -> Result<StartOutcome, TrackerError> {
        let now = self.clock.now();
        let parent_status = self.registry.parent_status(self.require(id)?);
        self.require_mut(id)?.start(parent_status, options, now)
    }

    pub fn succeed(&mut self, id: &str) -> Result<TransitionOutcome, TrackerError> {
        let now = self.clock.now();
        Ok(self.require_mut(id)?.succeed(now))
    }

    pub fn cancel(&mut self, id: &str) -> Result<TransitionOutcome, TrackerError> {
        let now = self.clock.now();
        Ok(self.require_mut(id)?.cancel(now))
    }

    pub fn fail(&mut self, id: &str) -> Result<TransitionOutcome, TrackerError> {
        let now = self.clock.now();
        Ok(self.require_mut(id)?.fail(now))
    }

    pub fn elapsed(&self, id: &str) -> Result<Duration, TrackerError> {
        Ok(self.require(id)?.elapsed(self.clock.now()))
    }

    pub fn remaining(&self, id: &str) -> Result<Option<Duration>, TrackerError> {
        Ok(self.require(id)?.remaining(self.clock.now()))
    }

    pub fn count_descendants(&self, id: &str) -> Result<usize, TrackerError> {
        self.registry.count_descendants(id)
    }

    /// Add `delta` to the stored progress counter, returning the new value.
    ///
    /// Goes straight to the gateway; the tracker's dirty flag is untouched.
    pub fn increment_progress(&mut self, id: &str, delta: i64) -> Result<i64, TrackerError> {
        let tracker_id = self.require(id)?.id().clone();
        let value = self
            .gateway
            .increment_field(id, record::CURRENT_PROGRESS, delta)
            .map_err(|e| TrackerError::persistence(&tracker_id, e))?;
        self.require_mut(id)?.current_progress = value;
        Ok(value)
    }

    /// Persist `id` if dirty, after first persisting each dirty registered
    /// ancestor from the top down. Returns the number of trackers written.
    pub fn update(&mut self, id: &str) -> Result<usize, TrackerError> {
        let ancestors = self.registry.ancestors(id)?;
        let mut written = 0;
        for ancestor in ancestors.iter().rev().map(TrackerId::as_str).chain([id]) {
            if self.registry.get(ancestor).is_some_and(Tracker::is_dirty) {
                self.persist(ancestor)?;
                written += 1;
            }
        }
        Ok(written)
    }

    /// Persist every tracker dirty at call time, then the root if still dirty.
    ///
    /// Stops at the first failure; trackers not yet written stay dirty so a
    /// retry picks them up. Returns the number of trackers written.
    pub fn flush_all(&mut self) -> Result<usize, TrackerError> {
        let root_id = self.root_id.clone();
        let dirty = self.registry.dirty_ids();
        let mut written = 0;
        for id in dirty.iter().filter(|id| **id != root_id) {
            // An earlier ancestor walk may already have written it.
            if self.registry.get(id).is_some_and(Tracker::is_dirty) {
                written += self.update(id)?;
            }
        }
        if self.registry.get(&root_id).is_some_and(Tracker::is_dirty) {
            written += self.update(&root_id)?;
        }
        if written > 0 {
            tracing::debug!(tracker_id = %root_id, written, "flushed trackers");
        }
        Ok(written)
    }

    fn persist(&mut self, id: &str) -> Result<(), TrackerError> {
        let Some(tracker) = self.registry.get_mut(id) else {
            return Err(TrackerError::NotRegistered(TrackerId::from(id)));
        };
        self.gateway
            .execute(record::flush_batch(tracker))
            .map_err(|e| TrackerError::persistence(tracker.id(), e))?;
        tracker.mark_clean();
        tracing::debug!(tracker_id = %id, "persisted tracker");
        Ok(())
    }

    fn require(&self, id: &str) -> Result<&Tracker, TrackerError> {
        self.registry
            .get(id)
            .ok_or_else(|| TrackerError::NotRegistered(TrackerId::from(id)))
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut Tracker, TrackerError> {
        self.registry
            .get_mut(id)
            .ok_or_else(|| TrackerError::NotRegistered(TrackerId::from(id)))
    }
}

#[cfg(test)]
#[path = "magician_tests.rs"]
mod tests;
