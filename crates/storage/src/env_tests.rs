// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

fn resolve(vars: &[(&str, &str)]) -> Result<PathBuf, EnvError> {
    let vars: HashMap<String, String> =
        vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    resolve_store_path(|name| vars.get(name).cloned())
}

#[yare::parameterized(
    explicit_store = {
        &[("ROLLUP_STORE", "/data/t.json"), ("ROLLUP_STATE_DIR", "/state")],
        "/data/t.json"
    },
    state_dir = {
        &[("ROLLUP_STATE_DIR", "/state"), ("XDG_STATE_HOME", "/xdg")],
        "/state/trackers.json"
    },
    xdg = {
        &[("XDG_STATE_HOME", "/xdg"), ("HOME", "/home/u")],
        "/xdg/rollup/trackers.json"
    },
    home = { &[("HOME", "/home/u")], "/home/u/.local/state/rollup/trackers.json" },
    empty_skipped = {
        &[("ROLLUP_STORE", ""), ("HOME", "/home/u")],
        "/home/u/.local/state/rollup/trackers.json"
    },
)]
fn store_path_precedence(vars: &[(&str, &str)], expected: &str) {
    assert_eq!(resolve(vars).unwrap(), PathBuf::from(expected));
}

#[test]
fn no_home_is_an_error() {
    assert_eq!(resolve(&[]), Err(EnvError::NoStateDir));
}
