// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle specs
//!
//! A release tree driven through start and terminal transitions, then
//! read back from the store.

use crate::prelude::*;

#[test]
fn release_run_is_read_back_from_store() {
    let gateway = MemoryGateway::new();
    let clock = FakeClock::new();
    let mut magician = release(gateway.clone(), clock.clone());

    assert_eq!(magician.start("release", StartOptions::default()).unwrap(), StartOutcome::Started);
    magician.start("build", StartOptions::default().estimated_seconds(120u64)).unwrap();
    clock.advance(Duration::from_secs(30));
    assert_eq!(magician.remaining("build").unwrap(), Some(Duration::from_secs(90)));
    magician.succeed("build").unwrap();
    magician.start("test", StartOptions::default()).unwrap();
    magician.fail("test").unwrap();
    magician.fail("release").unwrap();
    assert_eq!(magician.flush_all().unwrap(), 3);

    let loaded = Magician::load("release", gateway, clock).unwrap().unwrap();
    assert_eq!(loaded.count_descendants("release").unwrap(), 2);
    assert_eq!(status_of(&loaded, "release"), TrackerStatus::Failed);
    assert_eq!(status_of(&loaded, "build"), TrackerStatus::Succeeded);
    assert_eq!(status_of(&loaded, "test"), TrackerStatus::Failed);
    assert_eq!(loaded.find_by_friendly_id("nightly").unwrap().id(), "build");
    assert!(loaded.registry().dirty_ids().is_empty());
}

#[test]
fn child_cannot_start_before_its_parent() {
    let mut magician = release(MemoryGateway::new(), FakeClock::new());

    let err = magician.start("build", StartOptions::default()).unwrap_err();
    assert!(err.is_precondition(), "unexpected error: {err}");
    assert_eq!(status_of(&magician, "build"), TrackerStatus::NotStarted);

    magician.start("release", StartOptions::default()).unwrap();
    assert_eq!(magician.start("build", StartOptions::default()).unwrap(), StartOutcome::Started);
}

#[test]
fn terminal_states_do_not_change() {
    let mut magician = release(MemoryGateway::new(), FakeClock::new());
    magician.start("release", StartOptions::default()).unwrap();
    magician.cancel("build").unwrap();

    assert_eq!(magician.succeed("build").unwrap(), TransitionOutcome::Unchanged);
    assert_eq!(magician.fail("build").unwrap(), TransitionOutcome::Unchanged);
    let outcome = magician.start("build", StartOptions::default()).unwrap();
    assert_eq!(outcome, StartOutcome::AlreadyDone);
    assert_eq!(status_of(&magician, "build"), TrackerStatus::Canceled);
}

#[test]
fn updating_a_child_writes_its_ancestors_first() {
    let gateway = MemoryGateway::new();
    let mut magician = release(gateway.clone(), FakeClock::new());

    assert_eq!(magician.update("build").unwrap(), 2);

    assert!(gateway.read_hash("release").unwrap().is_some());
    assert!(gateway.read_hash("build").unwrap().is_some());
    assert!(gateway.read_hash("test").unwrap().is_none());
    assert_eq!(gateway.read_alias("nightly").unwrap().as_deref(), Some("build"));
    assert_eq!(magician.registry().dirty_ids(), vec![TrackerId::from("test")]);
}

#[test]
fn unknown_tracker_is_reported() {
    let mut magician = release(MemoryGateway::new(), FakeClock::new());
    assert!(matches!(magician.succeed("ghost"), Err(TrackerError::NotRegistered(_))));
    assert!(magician.find_by_id("ghost").is_none());
}
