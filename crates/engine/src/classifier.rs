//! Cache classification of resolved test targets
//!
//! For each resolved candidate the classifier needs two answers before a
//! skip decision exists: whether the backend holds an entry for the
//! target's current (name, hash) key, and whether the selective-testing
//! service deems that entry applicable. Only targets with both are
//! skippable. Classification runs once the complete hash mapping and fetch
//! result are available; there are no streaming partial decisions.

use crate::resolver::ResolvedTestTarget;
use crate::service::SelectiveTestingService;
use crate::Result;
use seltest_cache::{CacheBackend, CacheCategory, CacheItem, CacheStorableItem};
use seltest_core::{Error as CoreError, Graph, GraphTarget, Scheme, TestIdentifier};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Outcome of classifying the resolved candidates against the cache.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Classified items keyed by identifier: every identifier present in
    /// the fetch result, tagged with the backend-reported provenance.
    /// Identifiers absent here are pending until after execution.
    pub items: BTreeMap<TestIdentifier, CacheItem>,
    /// Identifiers that are both fetched and verified, in declaration order
    pub skippable: Vec<TestIdentifier>,
    /// The raw fetch result: found entries mapped to storage locations
    pub fetched: BTreeMap<CacheItem, PathBuf>,
}

impl Classification {
    /// Whether the identifier is a hit (fetched and verified).
    #[must_use]
    pub fn is_hit(&self, identifier: &TestIdentifier) -> bool {
        self.skippable.contains(identifier)
    }

    /// Whether every resolved candidate is a hit.
    #[must_use]
    pub fn all_cached(&self, resolved: &[ResolvedTestTarget]) -> bool {
        !resolved.is_empty()
            && resolved
                .iter()
                .all(|candidate| self.is_hit(&candidate.identifier))
    }
}

/// Look up the hash for every resolved candidate.
///
/// The hash mapping must contain exactly one entry per candidate; a missing
/// entry is a defect in the hash provider, not a legitimate state.
pub(crate) fn candidate_keys(
    resolved: &[ResolvedTestTarget],
    hashes: &BTreeMap<GraphTarget, String>,
) -> std::result::Result<Vec<CacheStorableItem>, CoreError> {
    resolved
        .iter()
        .map(|candidate| {
            let hash = hashes
                .get(&candidate.graph_target)
                .ok_or_else(|| CoreError::missing_hash(candidate.identifier.as_str()))?;
            Ok(CacheStorableItem::new(candidate.identifier.as_str(), hash))
        })
        .collect()
}

/// Classify the resolved candidates: fetch their cache entries and compute
/// the verified-skippable subset.
///
/// # Errors
/// Fails when a candidate has no hash, or when the backend fetch fails
/// (backend errors are surfaced, never degraded to a miss).
pub async fn classify(
    scheme: &Scheme,
    graph: &Graph,
    resolved: &[ResolvedTestTarget],
    hashes: &BTreeMap<GraphTarget, String>,
    backend: &dyn CacheBackend,
    service: &dyn SelectiveTestingService,
) -> Result<Classification> {
    let keys = candidate_keys(resolved, hashes)?;
    let fetched = backend.fetch(&keys, CacheCategory::SelectiveTests).await?;
    let verified = service.cached_tests(scheme, graph, hashes, &fetched);

    let mut items = BTreeMap::new();
    let mut skippable = Vec::new();
    for candidate in resolved {
        let identifier = &candidate.identifier;
        let fetched_item = fetched
            .keys()
            .find(|item| item.name == identifier.as_str())
            .cloned();

        if let Some(item) = fetched_item {
            if verified.contains(identifier) {
                skippable.push(identifier.clone());
            }
            items.insert(identifier.clone(), item);
        }
    }

    tracing::debug!(
        scheme = %scheme.name,
        resolved = resolved.len(),
        fetched = fetched.len(),
        skippable = skippable.len(),
        backend = backend.name(),
        "Classified test targets against the cache"
    );

    Ok(Classification {
        items,
        skippable,
        fetched,
    })
}
