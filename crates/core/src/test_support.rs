// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::gateway::{Batch, Fields, Gateway, GatewayError};
use crate::record;
use crate::{Tracker, TrackerConfig, TrackerId};
use chrono::{DateTime, Utc};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for tracker state machine types.
pub mod strategies {
    use crate::clock::FakeClock;
    use crate::{Clock, Tracker, TrackerConfig, TrackerId, TrackerStatus};
    use chrono::TimeDelta;
    use indexmap::IndexSet;
    use proptest::prelude::*;

    /// A lifecycle call made against a tracker.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TrackerOp {
        Start,
        Succeed,
        Cancel,
        Fail,
    }

    pub fn arb_tracker_op() -> impl Strategy<Value = TrackerOp> {
        prop_oneof![
            Just(TrackerOp::Start),
            Just(TrackerOp::Succeed),
            Just(TrackerOp::Cancel),
            Just(TrackerOp::Fail),
        ]
    }

    pub fn arb_status() -> impl Strategy<Value = TrackerStatus> {
        prop_oneof![
            Just(TrackerStatus::NotStarted),
            Just(TrackerStatus::InProgress),
            Just(TrackerStatus::Succeeded),
            Just(TrackerStatus::Canceled),
            Just(TrackerStatus::Failed),
        ]
    }

    fn arb_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 _.-]{0,24}"
    }

    fn arb_offset() -> impl Strategy<Value = TimeDelta> {
        // Whole microseconds: the stored form keeps nothing finer.
        (0i64..86_400_000_000).prop_map(TimeDelta::microseconds)
    }

    /// Any tracker whose flags agree with its status.
    pub fn arb_tracker() -> impl Strategy<Value = Tracker> {
        (
            (arb_text(), proptest::option::of(arb_text()), proptest::option::of(arb_text())),
            (proptest::option::of("[a-z]{1,8}"), proptest::collection::vec("[a-z]{1,8}", 0..4)),
            (arb_status(), proptest::option::of(0u64..100_000), proptest::option::of(arb_text())),
            (proptest::option::of(arb_offset()), proptest::option::of(arb_offset()), arb_offset()),
        )
            .prop_map(
                |((name, friendly_id, source), (parent, children), (status, estimate, msg), times)|
                {
                    let epoch = FakeClock::new().now();
                    let (start, finish, last_update) = times;
                    let mut tracker = Tracker::new_at(
                        TrackerConfig {
                            id: Some(TrackerId::from("trk-prop")),
                            name,
                            friendly_id,
                            parent_id: parent.map(TrackerId::from),
                            estimated_seconds: estimate,
                            source,
                        },
                        epoch + last_update,
                    );
                    tracker.children =
                        children.into_iter().map(TrackerId::from).collect::<IndexSet<_>>();
                    tracker.status = status;
                    tracker.in_progress = status == TrackerStatus::InProgress;
                    tracker.done = status.is_terminal();
                    tracker.start_time = start.map(|d| epoch + d);
                    tracker.finish_time = finish.map(|d| epoch + d);
                    tracker.status_msg = msg;
                    tracker
                },
            )
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────────

/// Config for a tracker with a fixed id and optional parent.
pub fn config(id: &str, parent: Option<&str>) -> TrackerConfig {
    TrackerConfig {
        id: Some(TrackerId::from(id)),
        name: format!("{id} job"),
        friendly_id: None,
        parent_id: parent.map(TrackerId::from),
        estimated_seconds: None,
        source: None,
    }
}

/// A stored tracker created at `now`, ready to seed a gateway with.
pub fn stored_tracker(id: &str, parent: Option<&str>, now: DateTime<Utc>) -> Tracker {
    Tracker::new_at(config(id, parent), now)
}

/// Write raw fields and children for `id`, bypassing the tracker codec.
pub fn seed_record<G: Gateway>(
    gateway: &G,
    id: &str,
    fields: Fields,
    children: &[&str],
) -> Result<(), GatewayError> {
    let mut batch = Batch::new();
    batch.write_hash(id, fields);
    if !children.is_empty() {
        batch.add_to_set(record::children_key(id), children.iter().copied());
    }
    gateway.execute(batch)
}

/// Persist trackers exactly as a flush would.
pub fn seed_trackers<'a, G: Gateway>(
    gateway: &G,
    trackers: impl IntoIterator<Item = &'a Tracker>,
) -> Result<(), GatewayError> {
    for tracker in trackers {
        gateway.execute(record::flush_batch(tracker))?;
    }
    Ok(())
}
