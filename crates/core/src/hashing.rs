//! Content hashing of graph targets
//!
//! Computes a stable content hash per [`GraphTarget`] from:
//! - The target name and owning project path
//! - The declared source files' contents
//! - Additional seed strings (cross-cutting cache-busting inputs, opaque
//!   to the engine)
//!
//! The mapping is keyed by the full graph-target identity, never the bare
//! target name, so same-named targets in different projects hash apart.

use crate::model::{Graph, GraphTarget};
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// Maps every target in a graph to a stable content-hash string.
///
/// Implementations must cover every target reachable from resolved
/// candidates; a resolved target without a hash is a defect downstream.
pub trait GraphContentHasher {
    /// Hash all targets of the graph.
    ///
    /// `additional` strings are folded into every target's hash; they carry
    /// cross-cutting inputs such as environment fingerprints.
    ///
    /// # Errors
    /// Returns an error when source files cannot be read.
    fn hash_graph(
        &self,
        graph: &Graph,
        additional: &[String],
    ) -> Result<BTreeMap<GraphTarget, String>>;
}

/// Digest accumulator for one target's content hash
struct DigestBuilder {
    hasher: Sha256,
}

impl DigestBuilder {
    fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    fn add_str(&mut self, value: &str) -> &mut Self {
        self.hasher.update(value.as_bytes());
        self.hasher.update([0u8]); // separator
        self
    }

    fn add_file(&mut self, path: &Path, relative: &str) -> Result<&mut Self> {
        self.add_str(relative);
        if path.is_file() {
            let content = std::fs::read(path).map_err(|e| Error::io(e, path, "read"))?;
            self.hasher.update(&content);
        } else {
            // A declared-but-absent source still contributes its path, so
            // adding the file later changes the hash.
            self.hasher.update(b"ABSENT");
        }
        self.hasher.update([0u8]);
        Ok(self)
    }

    fn finalize(self) -> String {
        format!("sha256:{}", hex::encode(self.hasher.finalize()))
    }
}

/// Content hasher over declared target sources (sha256).
#[derive(Debug, Clone, Default)]
pub struct ContentHasher;

impl ContentHasher {
    /// Create a new content hasher
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn hash_target(
        graph_root: &Path,
        target: &GraphTarget,
        additional: &[String],
    ) -> Result<String> {
        let mut builder = DigestBuilder::new();
        builder
            .add_str(&target.project_path.display().to_string())
            .add_str(&target.target.name);

        let project_dir = graph_root.join(&target.project_path);
        for source in &target.target.sources {
            builder.add_file(&project_dir.join(source), source)?;
        }
        for extra in additional {
            builder.add_str(extra);
        }

        Ok(builder.finalize())
    }
}

impl GraphContentHasher for ContentHasher {
    fn hash_graph(
        &self,
        graph: &Graph,
        additional: &[String],
    ) -> Result<BTreeMap<GraphTarget, String>> {
        let mut hashes = BTreeMap::new();
        for target in graph.all_targets() {
            let hash = Self::hash_target(&graph.root, &target, additional)?;
            tracing::trace!(target = %target, hash = %hash, "Hashed target");
            hashes.insert(target, hash);
        }
        tracing::debug!(targets = hashes.len(), "Graph content hashes computed");
        Ok(hashes)
    }
}
