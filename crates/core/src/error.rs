// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by tracker operations.

use crate::gateway::GatewayError;
use crate::id::TrackerId;
use crate::tracker::TrackerStatus;
use thiserror::Error;

/// A state-machine or tree-shape rule was violated by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("cannot start {id}: parent {parent} is {status}, not InProgress")]
    ParentNotStarted { id: TrackerId, parent: TrackerId, status: TrackerStatus },

    #[error("parent {parent} of {id} is not registered")]
    ParentMissing { id: TrackerId, parent: TrackerId },

    #[error("{id} cannot be its own parent")]
    SelfParent { id: TrackerId },

    #[error("{id} is already registered")]
    AlreadyRegistered { id: TrackerId },

    #[error("friendly id {alias} already names {id}")]
    AliasTaken { alias: String, id: TrackerId },
}

/// Errors from tracker, registry, and orchestrator operations.
///
/// Lookups that miss are not errors; they return `None`.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("gateway failure for tracker {id}: {source}")]
    Persistence {
        id: TrackerId,
        #[source]
        source: GatewayError,
    },

    #[error("cycle detected at tracker {0}")]
    CycleDetected(TrackerId),

    #[error("tracker {0} is not registered")]
    NotRegistered(TrackerId),
}

impl TrackerError {
    pub fn is_precondition(&self) -> bool {
        matches!(self, TrackerError::Precondition(_))
    }

    pub(crate) fn persistence(id: &TrackerId, source: GatewayError) -> Self {
        tracing::error!(tracker_id = %id, error = %source, "gateway operation failed");
        TrackerError::Persistence { id: id.clone(), source }
    }
}
