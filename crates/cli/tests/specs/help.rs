// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help and usage specs

use crate::prelude::*;

#[test]
fn rollup_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:").stdout_has("show");
}

#[test]
fn rollup_show_help_lists_formats() {
    cli().args(&["show", "--help"]).passes().stdout_has("ID_OR_ALIAS").stdout_has("--format");
}

#[test]
fn rollup_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}

#[test]
fn missing_argument_is_a_usage_error() {
    cli().args(&["show"]).exits(2).stderr_has("Usage:");
}

#[test]
fn unknown_format_is_a_usage_error() {
    cli().args(&["show", "root", "--format", "yaml"]).exits(2);
}
