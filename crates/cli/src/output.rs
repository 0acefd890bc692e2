// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rollup_core::{Registry, Tracker, TrackerStatus};
use serde::Serialize;
use std::fmt::Write;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One tracker and its registered descendants, as shown by `show`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerNode {
    pub id: String,
    pub name: String,
    pub status: TrackerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_time: Option<DateTime<Utc>>,
    pub last_update: DateTime<Utc>,
    pub current_progress: i64,
    pub children: Vec<TrackerNode>,
}

impl TrackerNode {
    /// Build the subtree under `id`. Children without a registered tracker are left out.
    pub fn build(registry: &Registry, id: &str) -> Option<Self> {
        let tracker = registry.get(id)?;
        let children =
            tracker.children().iter().filter_map(|child| Self::build(registry, child)).collect();
        Some(Self::from_tracker(tracker, children))
    }

    fn from_tracker(tracker: &Tracker, children: Vec<TrackerNode>) -> Self {
        Self {
            id: tracker.id().to_string(),
            name: tracker.name().to_string(),
            status: tracker.status(),
            friendly_id: tracker.friendly_id().map(str::to_string),
            parent_id: tracker.parent_id().map(|p| p.to_string()),
            status_msg: tracker.status_msg().map(str::to_string),
            source: tracker.source().map(str::to_string),
            estimated_seconds: tracker.estimated_seconds(),
            start_time: tracker.start_time(),
            finish_time: tracker.finish_time(),
            last_update: tracker.last_update(),
            current_progress: tracker.current_progress(),
            children,
        }
    }
}

/// Indented tree, one tracker per line:
/// `<name> [<status>] <id> (<alias>) - <status_msg>`.
pub fn render_tree(root: &TrackerNode) -> String {
    let mut out = String::new();
    render_node(&mut out, root, 0);
    out
}

fn render_node(out: &mut String, node: &TrackerNode, depth: usize) {
    let _ = write!(
        out,
        "{:indent$}{} [{}] {}",
        "",
        crate::color::header(&node.name),
        crate::color::status(node.status),
        crate::color::muted(&node.id),
        indent = depth * 2
    );
    if let Some(alias) = &node.friendly_id {
        let _ = write!(out, " ({alias})");
    }
    if let Some(msg) = &node.status_msg {
        let _ = write!(out, " - {msg}");
    }
    out.push('\n');
    for child in &node.children {
        render_node(out, child, depth + 1);
    }
}

/// Print `root` in the requested format.
pub fn print_tree(root: &TrackerNode, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_tree(root)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(root)?),
    }
    Ok(())
}
