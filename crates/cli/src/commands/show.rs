// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rollup show`: print a stored tracker tree

use anyhow::{Context, Result};
use clap::Args;
use rollup_core::{Gateway, GatewayError, Magician, SystemClock};
use rollup_storage::FileGateway;
use std::path::Path;

use crate::exit_error::ExitError;
use crate::output::{print_tree, OutputFormat, TrackerNode};

#[derive(Args)]
pub struct ShowArgs {
    /// Tracker id or friendly alias
    #[arg(value_name = "ID_OR_ALIAS")]
    pub query: String,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

pub fn handle(args: ShowArgs, store: &Path) -> Result<()> {
    let gateway = FileGateway::open(store)
        .with_context(|| format!("failed to open tracker store {}", store.display()))?;
    let node = find_tree(gateway, &args.query)?
        .ok_or_else(|| ExitError::tracker_not_found(&args.query))?;
    print_tree(&node, args.format)
}

/// Load the tree for `query`, trying it as an id first and then as an alias.
///
/// A key of another kind, such as a children set, matches neither.
pub fn find_tree<G: Gateway>(gateway: G, query: &str) -> Result<Option<TrackerNode>> {
    let root_id = match gateway.read_hash(query) {
        Ok(Some(_)) => Some(query.to_string()),
        Ok(None) | Err(GatewayError::WrongType { .. }) => match gateway.read_alias(query) {
            Ok(id) => id,
            Err(GatewayError::WrongType { .. }) => None,
            Err(e) => return Err(e.into()),
        },
        Err(e) => return Err(e.into()),
    };
    let Some(root_id) = root_id else {
        return Ok(None);
    };
    let magician = Magician::<G, SystemClock>::load(root_id, gateway, SystemClock)?;
    Ok(magician.and_then(|m| TrackerNode::build(m.registry(), m.root_id())))
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
