//! Run-scoped reporting ledger
//!
//! The ledger records every classified cache item for one run, keyed by
//! owning project path and test name, together with the graph the run used.
//! It is created at the top of a run, mutated only by the dispatch
//! orchestrator, and read-only for reporting afterwards; it has no meaning
//! beyond the lifetime of a single invocation and is never global state.

use seltest_cache::{CacheItem, CacheSource};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Run-lifetime record of classified cache items and the graph used.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLedger {
    graph: seltest_core::Graph,
    tests: BTreeMap<PathBuf, BTreeMap<String, CacheItem>>,
}

/// Hit/miss counts accumulated over one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LedgerSummary {
    /// Targets served from the local store
    pub local: usize,
    /// Targets served from a remote store
    pub remote: usize,
    /// Targets that were executed this run
    pub missed: usize,
}

impl LedgerSummary {
    /// Total number of recorded targets
    #[must_use]
    pub fn total(&self) -> usize {
        self.local + self.remote + self.missed
    }
}

impl fmt::Display for LedgerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} targets: {} local, {} remote, {} executed",
            self.total(),
            self.local,
            self.remote,
            self.missed
        )
    }
}

impl RunLedger {
    /// Create the ledger for one run over the given graph
    #[must_use]
    pub fn new(graph: seltest_core::Graph) -> Self {
        Self {
            graph,
            tests: BTreeMap::new(),
        }
    }

    /// The graph this run used
    #[must_use]
    pub fn graph(&self) -> &seltest_core::Graph {
        &self.graph
    }

    /// Record a classified item under its owning project path.
    ///
    /// Entries merge into prior recordings from the same run: a later
    /// project's targets never overwrite an earlier project's.
    pub fn record(&mut self, project_path: &Path, item: CacheItem) {
        self.tests
            .entry(project_path.to_path_buf())
            .or_default()
            .insert(item.name.clone(), item);
    }

    /// All recorded items, keyed by project path then test name
    #[must_use]
    pub fn tests(&self) -> &BTreeMap<PathBuf, BTreeMap<String, CacheItem>> {
        &self.tests
    }

    /// Hit/miss counts across all projects
    #[must_use]
    pub fn summary(&self) -> LedgerSummary {
        let mut summary = LedgerSummary::default();
        for item in self.tests.values().flat_map(BTreeMap::values) {
            match item.source {
                CacheSource::Local => summary.local += 1,
                CacheSource::Remote => summary.remote += 1,
                CacheSource::Miss => summary.missed += 1,
            }
        }
        summary
    }
}
