// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory index of every tracker an orchestrator knows about.
//!
//! Trackers refer to each other by id only; the registry owns them all, so
//! parent and child lookups go through it.

use crate::error::TrackerError;
use crate::id::TrackerId;
use crate::tracker::{Tracker, TrackerStatus};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Id-keyed tracker arena, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    trackers: IndexMap<TrackerId, Tracker>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.trackers.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Tracker> {
        self.trackers.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Tracker> {
        self.trackers.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tracker> {
        self.trackers.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &TrackerId> {
        self.trackers.keys()
    }

    /// Register `tracker`, replacing any tracker with the same id.
    pub(crate) fn insert(&mut self, tracker: Tracker) -> Option<Tracker> {
        self.trackers.insert(tracker.id().clone(), tracker)
    }

    /// Linear scan for the tracker carrying `friendly_id`.
    pub fn find_by_friendly_id(&self, friendly_id: &str) -> Option<&Tracker> {
        self.trackers.values().find(|t| t.friendly_id() == Some(friendly_id))
    }

    /// Ids of trackers with unflushed changes, in registration order.
    pub fn dirty_ids(&self) -> Vec<TrackerId> {
        self.trackers.values().filter(|t| t.is_dirty()).map(|t| t.id().clone()).collect()
    }

    /// Status of `tracker`'s parent, or `None` for a root or an unregistered parent.
    pub fn parent_status(&self, tracker: &Tracker) -> Option<TrackerStatus> {
        tracker.parent_id().and_then(|parent| self.get(parent)).map(Tracker::status)
    }

    /// Ids from `id`'s parent up to the topmost registered ancestor,
    /// nearest first.
    pub fn ancestors(&self, id: &str) -> Result<Vec<TrackerId>, TrackerError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.require(id)?;
        seen.insert(current.id().clone());
        while let Some(parent) = current.parent_id() {
            let Some(next) = self.get(parent) else { break };
            if !seen.insert(parent.clone()) {
                return Err(TrackerError::CycleDetected(parent.clone()));
            }
            chain.push(parent.clone());
            current = next;
        }
        Ok(chain)
    }

    /// Number of trackers below `id`, at any depth.
    ///
    /// A child id with no registered tracker counts once and is not descended into.
    pub fn count_descendants(&self, id: &str) -> Result<usize, TrackerError> {
        let root = self.require(id)?;
        let mut seen = HashSet::from([root.id().clone()]);
        let mut stack: Vec<&TrackerId> = root.children().iter().collect();
        let mut count = 0;
        while let Some(child) = stack.pop() {
            if !seen.insert(child.clone()) {
                return Err(TrackerError::CycleDetected(child.clone()));
            }
            count += 1;
            if let Some(tracker) = self.get(child) {
                stack.extend(tracker.children());
            }
        }
        Ok(count)
    }

    fn require(&self, id: &str) -> Result<&Tracker, TrackerError> {
        self.get(id).ok_or_else(|| TrackerError::NotRegistered(TrackerId::from(id)))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
