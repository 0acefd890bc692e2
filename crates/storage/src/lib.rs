// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rollup-storage: gateway implementations for tracker persistence

pub mod env;
mod file;
mod memory;
pub mod snapshot;

pub use env::{store_path, EnvError};
pub use file::FileGateway;
pub use memory::MemoryGateway;
pub use snapshot::SnapshotError;
