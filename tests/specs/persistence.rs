// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence specs
//!
//! Trees written through the file gateway, and stores whose contents do
//! not form a clean tree.

use crate::prelude::*;
use rollup_core::{Batch, Fields};
use serde_json::json;

fn record(name: &str) -> Fields {
    Fields::from([("name".to_string(), json!(name))])
}

#[test]
fn tree_survives_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("trackers.json");
    {
        let mut magician = release(FileGateway::open(&path).unwrap(), FakeClock::new());
        magician.start("release", StartOptions::default()).unwrap();
        magician.start("build", StartOptions::default()).unwrap();
        magician.flush_all().unwrap();
    }

    let gateway = FileGateway::open(&path).unwrap();
    let subtree = Magician::load_by_friendly_id("nightly", gateway.clone(), FakeClock::new())
        .unwrap()
        .unwrap();
    assert_eq!(subtree.root_id(), "build");
    assert_eq!(subtree.registry().len(), 1);
    assert_eq!(status_of(&subtree, "build"), TrackerStatus::InProgress);

    let whole = Magician::load("release", gateway, FakeClock::new()).unwrap().unwrap();
    assert_eq!(whole.registry().len(), 3);
}

#[test]
fn rejected_batch_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trackers.json");
    let gateway = FileGateway::open(&path).unwrap();
    let mut magician = release(gateway.clone(), FakeClock::new());
    magician.flush_all().unwrap();

    let mut batch = Batch::new();
    batch.write_hash("deploy", record("deploy")).add_to_set("nightly", ["deploy"]);
    assert!(gateway.execute(batch).is_err());

    let reopened = FileGateway::open(&path).unwrap();
    assert!(reopened.read_hash("deploy").unwrap().is_none());
    assert_eq!(reopened.read_alias("nightly").unwrap().as_deref(), Some("build"));
}

#[test]
fn cyclic_store_fails_to_load() {
    let gateway = MemoryGateway::new();
    let mut batch = Batch::new();
    batch
        .write_hash("a", record("a"))
        .add_to_set("a:children", ["b"])
        .write_hash("b", record("b"))
        .add_to_set("b:children", ["a"]);
    gateway.execute(batch).unwrap();

    let result = Magician::load("a", gateway, FakeClock::new());
    assert!(matches!(result, Err(TrackerError::CycleDetected(_))));
}

#[test]
fn missing_child_record_is_skipped() {
    let gateway = MemoryGateway::new();
    let mut batch = Batch::new();
    batch.write_hash("a", record("a")).add_to_set("a:children", ["ghost"]);
    gateway.execute(batch).unwrap();

    let magician = Magician::load("a", gateway, FakeClock::new()).unwrap().unwrap();
    assert_eq!(magician.registry().len(), 1);
    assert_eq!(magician.count_descendants("a").unwrap(), 1);
    assert_eq!(status_of(&magician, "a"), TrackerStatus::NotStarted);
}

#[test]
fn missing_root_loads_nothing() {
    let gateway = MemoryGateway::new();
    assert!(Magician::load("nope", gateway.clone(), FakeClock::new()).unwrap().is_none());
    assert!(Magician::load_by_friendly_id("nope", gateway, FakeClock::new()).unwrap().is_none());
}
