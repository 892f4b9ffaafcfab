//! # Source Module
//!
//! Host adapters that build a [`Round`] for the processor.
//!
//! - **Rust sources** - `.rs` files parsed with `syn`. Markers are attributes
//!   named after the marker vocabulary (`#[rest_controller]`,
//!   `#[get_mapping("/orders/{id}")]`, ...); the attribute path is matched on
//!   its last segment. Qualified names come from the optional root package,
//!   the file's location and any inline `mod` blocks.
//! - **Manifests** - YAML or JSON lists of declarations, for hosts that
//!   resolve declarations themselves.
//!
//! Everything passed to one [`collect_round`] call forms a single round.

mod manifest;
mod rust;

pub use manifest::{load_manifest, Manifest};
pub use rust::{module_path, parse_markers, scan_source_tree, type_string};

use std::path::PathBuf;

use crate::scan::Round;

/// Merge Rust source trees and manifests into one round, in argument order.
pub fn collect_round(
    sources: &[PathBuf],
    manifests: &[PathBuf],
    root_package: Option<&str>,
) -> anyhow::Result<Round> {
    let mut round = Round::default();
    for source in sources {
        round.extend(scan_source_tree(source, root_package)?);
    }
    for manifest in manifests {
        round.extend(load_manifest(manifest)?);
    }
    Ok(round)
}
