// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracker state machine.
//!
//! A [`Tracker`] is one node of a job tree. It moves through
//! `NotStarted → InProgress → {Succeeded, Canceled, Failed}`; terminal states
//! accept no further transitions. Every change to a persisted field marks the
//! tracker dirty until the orchestrator flushes it.

use crate::clock::Clock;
use crate::error::{PreconditionError, TrackerError};
use crate::id::TrackerId;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Lifecycle status of a tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerStatus {
    #[default]
    NotStarted,
    InProgress,
    Succeeded,
    Canceled,
    Failed,
}

impl TrackerStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TrackerStatus::Succeeded | TrackerStatus::Canceled | TrackerStatus::Failed)
    }
}

crate::simple_display! {
    TrackerStatus {
        NotStarted => "NotStarted",
        InProgress => "InProgress",
        Succeeded => "Succeeded",
        Canceled => "Canceled",
        Failed => "Failed",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tracker status: {0:?}")]
pub struct ParseStatusError(pub String);

impl FromStr for TrackerStatus {
    type Err = ParseStatusError;

    /// Case- and whitespace-insensitive, so `"In Progress"` and `"inprogress"`
    /// both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String =
            s.chars()
                .filter(|c| !c.is_whitespace() && *c != '_')
                .flat_map(char::to_lowercase)
                .collect();
        match folded.as_str() {
            "notstarted" => Ok(TrackerStatus::NotStarted),
            "inprogress" => Ok(TrackerStatus::InProgress),
            "succeeded" => Ok(TrackerStatus::Succeeded),
            "canceled" | "cancelled" => Ok(TrackerStatus::Canceled),
            "failed" => Ok(TrackerStatus::Failed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Result of a successful `start` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// Already in progress; nothing changed.
    AlreadyActive,
    /// Already in a terminal state; nothing changed.
    AlreadyDone,
}

/// Result of a terminal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Changed,
    Unchanged,
}

/// Optional arguments to `start`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Defaults to the current time.
    pub start_time: Option<DateTime<Utc>>,
    /// Replaces the configured estimate when set.
    pub estimated_seconds: Option<u64>,
}

impl StartOptions {
    crate::setters! {
        option {
            start_time: DateTime<Utc>,
            estimated_seconds: u64,
        }
    }
}

/// Configuration for creating a new tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Generated when absent.
    pub id: Option<TrackerId>,
    pub name: String,
    pub friendly_id: Option<String>,
    /// Absent for a root; `attach` fills in the orchestrator's id.
    pub parent_id: Option<TrackerId>,
    pub estimated_seconds: Option<u64>,
    pub source: Option<String>,
}

impl TrackerConfig {
    pub fn builder(name: impl Into<String>) -> TrackerConfigBuilder {
        TrackerConfigBuilder {
            id: None,
            name: name.into(),
            friendly_id: None,
            parent_id: None,
            estimated_seconds: None,
            source: None,
        }
    }
}

pub struct TrackerConfigBuilder {
    id: Option<TrackerId>,
    name: String,
    friendly_id: Option<String>,
    parent_id: Option<TrackerId>,
    estimated_seconds: Option<u64>,
    source: Option<String>,
}

impl TrackerConfigBuilder {
    crate::setters! {
        option {
            id: TrackerId,
            friendly_id: String,
            parent_id: TrackerId,
            estimated_seconds: u64,
            source: String,
        }
    }

    pub fn build(self) -> TrackerConfig {
        TrackerConfig {
            id: self.id,
            name: self.name,
            friendly_id: self.friendly_id,
            parent_id: self.parent_id,
            estimated_seconds: self.estimated_seconds,
            source: self.source,
        }
    }
}

/// One node of a job-progress tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracker {
    pub(crate) id: TrackerId,
    pub(crate) friendly_id: Option<String>,
    pub(crate) name: String,
    pub(crate) parent_id: Option<TrackerId>,
    pub(crate) children: IndexSet<TrackerId>,
    pub(crate) status: TrackerStatus,
    pub(crate) done: bool,
    pub(crate) in_progress: bool,
    pub(crate) estimated_seconds: Option<u64>,
    pub(crate) start_time: Option<DateTime<Utc>>,
    pub(crate) finish_time: Option<DateTime<Utc>>,
    pub(crate) status_msg: Option<String>,
    pub(crate) source: Option<String>,
    pub(crate) last_update: DateTime<Utc>,
    /// Mirror of the `curr_prog` counter; only the gateway mutates the stored value.
    pub(crate) current_progress: i64,
    pub(crate) dirty: bool,
}

impl Tracker {
    /// Create a new, unpersisted (dirty) tracker
    pub fn new(config: TrackerConfig, clock: &impl Clock) -> Self {
        Self::new_at(config, clock.now())
    }

    /// Create a new tracker with an explicit creation time
    pub fn new_at(config: TrackerConfig, now: DateTime<Utc>) -> Self {
        Self {
            id: config.id.unwrap_or_default(),
            friendly_id: config.friendly_id,
            name: config.name,
            parent_id: config.parent_id,
            children: IndexSet::new(),
            status: TrackerStatus::NotStarted,
            done: false,
            in_progress: false,
            estimated_seconds: config.estimated_seconds,
            start_time: None,
            finish_time: None,
            status_msg: None,
            source: config.source,
            last_update: now,
            current_progress: 0,
            dirty: true,
        }
    }

    /// Blank, clean tracker used as the base for decoding a stored record.
    pub(crate) fn restored(id: TrackerId) -> Self {
        Self {
            id,
            friendly_id: None,
            name: String::new(),
            parent_id: None,
            children: IndexSet::new(),
            status: TrackerStatus::NotStarted,
            done: false,
            in_progress: false,
            estimated_seconds: None,
            start_time: None,
            finish_time: None,
            status_msg: None,
            source: None,
            last_update: DateTime::<Utc>::default(),
            current_progress: 0,
            dirty: false,
        }
    }

    pub fn id(&self) -> &TrackerId {
        &self.id
    }

    pub fn friendly_id(&self) -> Option<&str> {
        self.friendly_id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_id(&self) -> Option<&TrackerId> {
        self.parent_id.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn children(&self) -> &IndexSet<TrackerId> {
        &self.children
    }

    pub fn status(&self) -> TrackerStatus {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn estimated_seconds(&self) -> Option<u64> {
        self.estimated_seconds
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn finish_time(&self) -> Option<DateTime<Utc>> {
        self.finish_time
    }

    pub fn status_msg(&self) -> Option<&str> {
        self.status_msg.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    pub fn current_progress(&self) -> i64 {
        self.current_progress
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Move to `InProgress`.
    ///
    /// `parent_status` is the status of this tracker's parent as found in the
    /// registry, or `None` when the parent is not registered. It is ignored for
    /// a root.
    pub fn start(
        &mut self,
        parent_status: Option<TrackerStatus>,
        options: StartOptions,
        now: DateTime<Utc>,
    ) -> Result<StartOutcome, TrackerError> {
        if self.in_progress {
            tracing::warn!(tracker_id = %self.id, "tracker already started, ignoring start");
            return Ok(StartOutcome::AlreadyActive);
        }
        if self.done {
            tracing::warn!(
                tracker_id = %self.id,
                status = %self.status,
                "tracker is done, ignoring start"
            );
            return Ok(StartOutcome::AlreadyDone);
        }
        if let Some(parent) = &self.parent_id {
            match parent_status {
                None => {
                    return Err(PreconditionError::ParentMissing {
                        id: self.id.clone(),
                        parent: parent.clone(),
                    }
                    .into())
                }
                Some(status) if status != TrackerStatus::InProgress => {
                    return Err(PreconditionError::ParentNotStarted {
                        id: self.id.clone(),
                        parent: parent.clone(),
                        status,
                    }
                    .into())
                }
                Some(_) => {}
            }
        }

        self.in_progress = true;
        self.status = TrackerStatus::InProgress;
        self.start_time = Some(options.start_time.unwrap_or(now));
        if options.estimated_seconds.is_some() {
            self.estimated_seconds = options.estimated_seconds;
        }
        self.last_update = now;
        self.dirty = true;
        Ok(StartOutcome::Started)
    }

    pub fn succeed(&mut self, now: DateTime<Utc>) -> TransitionOutcome {
        self.finish(TrackerStatus::Succeeded, now)
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> TransitionOutcome {
        self.finish(TrackerStatus::Canceled, now)
    }

    pub fn fail(&mut self, now: DateTime<Utc>) -> TransitionOutcome {
        self.finish(TrackerStatus::Failed, now)
    }

    fn finish(&mut self, status: TrackerStatus, now: DateTime<Utc>) -> TransitionOutcome {
        if self.done {
            tracing::debug!(
                tracker_id = %self.id,
                current = %self.status,
                requested = %status,
                "tracker already done, ignoring transition"
            );
            return TransitionOutcome::Unchanged;
        }
        self.status = status;
        self.done = true;
        self.in_progress = false;
        self.finish_time = Some(now);
        self.last_update = now;
        self.dirty = true;
        TransitionOutcome::Changed
    }

    /// Time since start, or zero if never started.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        self.start_time.and_then(|start| (now - start).to_std().ok()).unwrap_or_default()
    }

    /// Estimated time left, if an estimate exists and has not been exceeded.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let estimate = Duration::from_secs(self.estimated_seconds?);
        let elapsed = self.elapsed(now);
        (estimate > elapsed).then(|| estimate - elapsed)
    }

    pub fn with_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.dirty |= replace(&mut self.name, name.into());
        self
    }

    pub fn with_friendly_id(&mut self, friendly_id: impl Into<String>) -> &mut Self {
        self.dirty |= replace(&mut self.friendly_id, Some(friendly_id.into()));
        self
    }

    pub fn with_estimated_seconds(&mut self, seconds: u64) -> &mut Self {
        self.dirty |= replace(&mut self.estimated_seconds, Some(seconds));
        self
    }

    pub fn with_source(&mut self, source: impl Into<String>) -> &mut Self {
        self.dirty |= replace(&mut self.source, Some(source.into()));
        self
    }

    pub fn with_status_msg(&mut self, msg: impl Into<String>) -> &mut Self {
        self.dirty |= replace(&mut self.status_msg, Some(msg.into()));
        self
    }

    pub fn with_start_time(&mut self, time: DateTime<Utc>) -> &mut Self {
        self.dirty |= replace(&mut self.start_time, Some(time));
        self
    }

    pub fn with_finish_time(&mut self, time: DateTime<Utc>) -> &mut Self {
        self.dirty |= replace(&mut self.finish_time, Some(time));
        self
    }

    pub fn with_last_update(&mut self, time: DateTime<Utc>) -> &mut Self {
        self.dirty |= replace(&mut self.last_update, time);
        self
    }

    /// Add a direct child. Duplicates and the tracker's own id are ignored.
    pub fn with_child(&mut self, child: TrackerId) -> &mut Self {
        if child != self.id && self.children.insert(child) {
            self.dirty = true;
        }
        self
    }

    /// Replace the set of direct children. The tracker's own id is dropped.
    pub fn with_children(&mut self, children: impl IntoIterator<Item = TrackerId>) -> &mut Self {
        let children: IndexSet<TrackerId> =
            children.into_iter().filter(|c| *c != self.id).collect();
        // IndexSet equality ignores order, matching the persisted set.
        self.dirty |= replace(&mut self.children, children);
        self
    }

    pub(crate) fn assign_parent(&mut self, parent: TrackerId) {
        self.dirty |= replace(&mut self.parent_id, Some(parent));
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// Store `value` in `slot`, reporting whether it differed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
