// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for workspace specs.

pub use rollup_core::{
    FakeClock, Gateway, Magician, StartOptions, StartOutcome, TrackerConfig, TrackerError,
    TrackerId, TrackerStatus, TransitionOutcome,
};
pub use rollup_storage::{FileGateway, MemoryGateway};
pub use std::time::Duration;

/// Config for a tracker with a fixed id, named after it.
pub fn job(id: &str, parent: Option<&str>) -> TrackerConfig {
    let builder = TrackerConfig::builder(format!("{id} job")).id(id);
    match parent {
        Some(parent) => builder.parent_id(parent).build(),
        None => builder.build(),
    }
}

/// Root `release` with children `build` (alias `nightly`) and `test`.
pub fn release<G: Gateway>(gateway: G, clock: FakeClock) -> Magician<G, FakeClock> {
    let mut magician = Magician::new(job("release", None), gateway, clock);
    let mut build = job("build", None);
    build.friendly_id = Some("nightly".to_string());
    magician.create(build).unwrap();
    magician.create(job("test", None)).unwrap();
    magician
}

pub fn status_of<G: Gateway>(magician: &Magician<G, FakeClock>, id: &str) -> TrackerStatus {
    magician.find_by_id(id).unwrap().status()
}
