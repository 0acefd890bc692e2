// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rebuild a tracker subtree from the gateway.

use crate::error::TrackerError;
use crate::gateway::Gateway;
use crate::id::TrackerId;
use crate::record;
use crate::registry::Registry;
use std::collections::HashSet;

/// Load `id` and everything below it into `registry`.
///
/// Returns `false` when no record exists for `id`. Children listed in a
/// children set without a record of their own are skipped.
pub fn load_tree<G: Gateway>(
    gateway: &G,
    id: &TrackerId,
    registry: &mut Registry,
) -> Result<bool, TrackerError> {
    let mut seen = HashSet::new();
    load_node(gateway, id, registry, &mut seen)
}

fn load_node<G: Gateway>(
    gateway: &G,
    id: &TrackerId,
    registry: &mut Registry,
    seen: &mut HashSet<TrackerId>,
) -> Result<bool, TrackerError> {
    if !seen.insert(id.clone()) {
        return Err(TrackerError::CycleDetected(id.clone()));
    }
    let Some(fields) = gateway.read_hash(id).map_err(|e| TrackerError::persistence(id, e))? else {
        return Ok(false);
    };
    let child_ids = gateway
        .read_set(&record::children_key(id))
        .map_err(|e| TrackerError::persistence(id, e))?;

    let mut tracker = record::decode(id.clone(), &fields);
    tracker.with_children(child_ids.iter().map(|c| TrackerId::from(c.as_str())));
    tracker.mark_clean();
    registry.insert(tracker);

    for child in child_ids {
        let child = TrackerId::from(child);
        if !load_node(gateway, &child, registry, seen)? {
            tracing::warn!(
                tracker_id = %id,
                child_id = %child,
                "child listed without a record, skipping"
            );
        }
    }
    Ok(true)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
