// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rollup show` specs

use crate::prelude::*;

const TREE: &str = "\
release [InProgress] root
  build [Succeeded] build (nightly)
    test [Failed] test - flaky
  deploy [NotStarted] deploy
";

#[test]
fn show_by_id_prints_whole_tree() {
    let store = Store::seeded();
    let output = cli().store(&store.path).args(&["show", "root"]).passes();
    similar_asserts::assert_eq!(output.stdout().as_str(), TREE);
}

#[test]
fn show_by_alias_prints_subtree() {
    let store = Store::seeded();
    let output = cli().store(&store.path).args(&["show", "nightly"]).passes();
    similar_asserts::assert_eq!(
        output.stdout().as_str(),
        "build [Succeeded] build (nightly)\n  test [Failed] test - flaky\n"
    );
}

#[test]
fn show_json_nests_children() {
    let store = Store::seeded();
    let output = cli().store(&store.path).args(&["show", "root", "--format", "json"]).passes();
    let json: serde_json::Value = serde_json::from_str(&output.stdout()).unwrap();

    assert_eq!(json["id"], "root");
    assert_eq!(json["status"], "InProgress");
    assert_eq!(json["children"][0]["friendly_id"], "nightly");
    assert_eq!(json["children"][0]["children"][0]["status_msg"], "flaky");
    assert_eq!(json["children"][1]["name"], "deploy");
}

#[test]
fn show_miss_exits_one() {
    let store = Store::seeded();
    cli()
        .store(&store.path)
        .args(&["show", "ghost"])
        .exits(1)
        .stderr_has("error: no tracker found for 'ghost'");
}

#[test]
fn show_children_key_exits_one() {
    let store = Store::seeded();
    cli()
        .store(&store.path)
        .args(&["show", "root:children"])
        .exits(1)
        .stderr_has("error: no tracker found for 'root:children'");
}

#[test]
fn show_with_empty_store_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    cli().store(&dir.path().join("none.json")).args(&["show", "root"]).exits(1);
}

#[test]
fn store_comes_from_environment() {
    let store = Store::seeded();
    cli()
        .env("ROLLUP_STORE", &store.path)
        .args(&["show", "deploy"])
        .passes()
        .stdout_has("deploy [NotStarted]");
}

#[test]
fn corrupt_store_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trackers.json");
    std::fs::write(&path, "{ not json").unwrap();
    cli().store(&path).args(&["show", "root"]).exits(1).stderr_has("failed to open tracker store");
}
