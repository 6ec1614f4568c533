//! The `graph` command: map and print the build graph

use seltest_core::{GraphMapper, ManifestGraphMapper};
use std::path::Path;

/// Map the graph for `root` and print it as JSON.
///
/// # Errors
/// Surfaces mapping errors (unreadable directories, malformed manifests).
pub fn execute_graph(root: &Path) -> miette::Result<()> {
    let graph = ManifestGraphMapper::new().map(root)?;
    let rendered = serde_json::to_string_pretty(&graph)
        .map_err(|e| miette::miette!("Failed to encode graph: {e}"))?;
    println!("{rendered}");
    Ok(())
}
