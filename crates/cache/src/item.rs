//! Cache identity types
//!
//! A cache entry for selective tests is identified by (name, hash, category).
//! Fetched items additionally carry provenance: which store they came from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A namespace partition within the cache backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum CacheCategory {
    /// Records that a test target's content hash passed a previous run.
    /// Entries in this category carry no artifact payload.
    SelectiveTests,
}

impl CacheCategory {
    /// Directory name used by disk-backed stores
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::SelectiveTests => "selective-tests",
        }
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Where a cache hit came from.
///
/// `Miss` is only ever assigned by the engine after a run; backends never
/// return it from a fetch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CacheSource {
    /// Entry served from the local store
    Local,
    /// Entry served from a remote store
    Remote,
    /// No cached entry existed; the target was executed this run
    Miss,
}

impl fmt::Display for CacheSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Miss => "miss",
        };
        f.write_str(label)
    }
}

/// A classified cache entry: identity triple plus provenance.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct CacheItem {
    /// Entry name (the test identifier)
    pub name: String,
    /// Content hash the entry was stored under
    pub hash: String,
    /// Namespace the entry lives in
    pub category: CacheCategory,
    /// Which store served the entry, or `Miss` after execution
    pub source: CacheSource,
}

impl CacheItem {
    /// Create a cache item
    pub fn new(
        name: impl Into<String>,
        hash: impl Into<String>,
        category: CacheCategory,
        source: CacheSource,
    ) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            category,
            source,
        }
    }

    /// Copy of this item with a different provenance tag
    #[must_use]
    pub fn with_source(mut self, source: CacheSource) -> Self {
        self.source = source;
        self
    }
}

/// A (name, hash) pair submitted for storage.
///
/// For the selective-tests category the artifact payload is an empty path
/// list: the cache records *that a hash passed*, not file contents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStorableItem {
    /// Entry name (the test identifier)
    pub name: String,
    /// Content hash to store the entry under
    pub hash: String,
    /// Artifact paths associated with the entry
    #[serde(default)]
    pub artifacts: Vec<PathBuf>,
}

impl CacheStorableItem {
    /// Create a storable item with no artifact payload
    pub fn new(name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            artifacts: Vec::new(),
        }
    }
}
