//! Cache backend abstraction
//!
//! Defines the [`CacheBackend`] trait for pluggable cache implementations:
//! a local disk store, a remote store behind the same contract, or layered
//! combinations of both.

use crate::item::{CacheCategory, CacheItem, CacheStorableItem};
use crate::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Cache backend contract: fetch entries by (name, hash) keys and store
/// entries for executed targets.
///
/// Implementations must be thread-safe (`Send + Sync`); fetch and store may
/// parallelize internally. Semantics are at-least-once: storing the same
/// (name, hash) twice is harmless. Retry and backoff, if any, belong to the
/// implementation, never to callers.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch entries matching the given keys within a category.
    ///
    /// Returns the found entries, tagged with this backend's provenance,
    /// mapped to their storage location. Keys with no entry are simply
    /// absent from the result; that is not an error.
    ///
    /// # Errors
    /// Returns an error when the store itself is unreachable or corrupt.
    async fn fetch(
        &self,
        keys: &[CacheStorableItem],
        category: CacheCategory,
    ) -> Result<BTreeMap<CacheItem, PathBuf>>;

    /// Store entries within a category.
    ///
    /// # Errors
    /// Returns an error if storage fails.
    async fn store(&self, items: &[CacheStorableItem], category: CacheCategory) -> Result<()>;

    /// Backend name for logging/metrics
    fn name(&self) -> &'static str;

    /// Check if the backend is available/connected
    ///
    /// # Errors
    /// Returns an error when the backend cannot serve fetch/store calls.
    async fn health_check(&self) -> Result<()>;
}
