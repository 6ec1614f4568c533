//! Selective-testing verification capability
//!
//! Fetching proves a cache entry *exists*; this service proves it *applies*.
//! The two-phase split is deliberate: an entry can exist for a stale hash or
//! a different configuration axis, and the matching policy may evolve
//! independently of the dispatch flow. The engine treats the service's
//! answer as authoritative for skip eligibility.

use seltest_cache::{CacheCategory, CacheItem};
use seltest_core::{Graph, GraphTarget, Scheme, TestIdentifier};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Decides which test identifiers are verified-skippable given the current
/// hashes and the fetched cache entries.
pub trait SelectiveTestingService: Send + Sync {
    /// The verified-skippable subset of the graph's test identifiers.
    fn cached_tests(
        &self,
        scheme: &Scheme,
        graph: &Graph,
        hashes: &BTreeMap<GraphTarget, String>,
        fetched: &BTreeMap<CacheItem, PathBuf>,
    ) -> BTreeSet<TestIdentifier>;
}

/// Default policy: an identifier is verified when a fetched entry in the
/// selective-tests category matches its name and current content hash
/// exactly.
#[derive(Debug, Clone, Default)]
pub struct HashVerifiedService;

impl HashVerifiedService {
    /// Create the default service
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SelectiveTestingService for HashVerifiedService {
    fn cached_tests(
        &self,
        _scheme: &Scheme,
        _graph: &Graph,
        hashes: &BTreeMap<GraphTarget, String>,
        fetched: &BTreeMap<CacheItem, PathBuf>,
    ) -> BTreeSet<TestIdentifier> {
        let mut verified = BTreeSet::new();
        for item in fetched.keys() {
            if item.category != CacheCategory::SelectiveTests {
                continue;
            }
            let matches_current_hash = hashes.iter().any(|(target, hash)| {
                target.target.name == item.name && *hash == item.hash
            });
            if matches_current_hash {
                verified.insert(TestIdentifier::new(&item.name));
            } else {
                tracing::debug!(
                    name = %item.name,
                    hash = %item.hash,
                    "Fetched entry does not match the current hash; not skippable"
                );
            }
        }
        verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seltest_cache::CacheSource;
    use seltest_core::{Project, Target};
    use std::path::Path;

    fn scheme() -> Scheme {
        Scheme {
            name: "App".to_string(),
            test_action: None,
        }
    }

    fn graph_and_hashes(entries: &[(&str, &str)]) -> (Graph, BTreeMap<GraphTarget, String>) {
        let graph = Graph::new(
            ".",
            [Project {
                path: PathBuf::from("App"),
                targets: entries
                    .iter()
                    .map(|(name, _)| Target {
                        name: (*name).to_string(),
                        sources: vec![],
                    })
                    .collect(),
                schemes: vec![],
            }],
        );
        let hashes = entries
            .iter()
            .map(|(name, hash)| {
                (
                    GraphTarget::new(
                        "App",
                        Target {
                            name: (*name).to_string(),
                            sources: vec![],
                        },
                    ),
                    (*hash).to_string(),
                )
            })
            .collect();
        (graph, hashes)
    }

    fn fetched(entries: &[(&str, &str)]) -> BTreeMap<CacheItem, PathBuf> {
        entries
            .iter()
            .map(|(name, hash)| {
                (
                    CacheItem::new(*name, *hash, CacheCategory::SelectiveTests, CacheSource::Local),
                    Path::new("loc").join(name),
                )
            })
            .collect()
    }

    #[test]
    fn matching_entries_are_verified() {
        let (graph, hashes) = graph_and_hashes(&[("ATests", "h1"), ("BTests", "h2")]);
        let fetched = fetched(&[("ATests", "h1")]);

        let verified = HashVerifiedService::new().cached_tests(&scheme(), &graph, &hashes, &fetched);
        assert_eq!(verified, BTreeSet::from([TestIdentifier::from("ATests")]));
    }

    #[test]
    fn stale_hash_is_not_verified() {
        let (graph, hashes) = graph_and_hashes(&[("ATests", "h1")]);
        let fetched = fetched(&[("ATests", "old-hash")]);

        let verified = HashVerifiedService::new().cached_tests(&scheme(), &graph, &hashes, &fetched);
        assert!(verified.is_empty());
    }

    #[test]
    fn empty_fetch_verifies_nothing() {
        let (graph, hashes) = graph_and_hashes(&[("ATests", "h1")]);
        let verified = HashVerifiedService::new().cached_tests(
            &scheme(),
            &graph,
            &hashes,
            &BTreeMap::new(),
        );
        assert!(verified.is_empty());
    }
}
