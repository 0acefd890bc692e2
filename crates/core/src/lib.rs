// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rollup-core: hierarchical job-progress trackers and their persistence contract

pub mod macros;

pub mod clock;
pub mod error;
pub mod gateway;
pub mod id;
pub mod loader;
pub mod magician;
pub mod progress;
pub mod record;
pub mod registry;
pub mod tracker;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{PreconditionError, TrackerError};
#[cfg(any(test, feature = "test-support"))]
pub use gateway::FakeGateway;
pub use gateway::{Batch, Fields, Gateway, GatewayError, Keyspace, WriteOp};
pub use id::TrackerId;
pub use loader::load_tree;
pub use magician::Magician;
pub use progress::{Progress, ProgressCounter, ProgressTotals};
pub use registry::Registry;
pub use tracker::{
    ParseStatusError, StartOptions, StartOutcome, Tracker, TrackerConfig, TrackerConfigBuilder,
    TrackerStatus, TransitionOutcome,
};
