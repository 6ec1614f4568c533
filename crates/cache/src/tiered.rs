//! Tiered local-over-remote cache backend
//!
//! Fetches consult the local layer first; keys it does not hold are fetched
//! from the inner backend and reported with remote provenance. Remote hits
//! are replicated into the local layer so the next run serves them locally.
//! Stores go to both layers.

use crate::backend::CacheBackend;
use crate::item::{CacheCategory, CacheItem, CacheSource, CacheStorableItem};
use crate::local::LocalCacheBackend;
use crate::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Cache backend layering a local store over an inner (typically remote)
/// store.
pub struct TieredCacheBackend<R: CacheBackend> {
    local: LocalCacheBackend,
    remote: R,
}

impl<R: CacheBackend> TieredCacheBackend<R> {
    /// Create a tiered backend
    pub fn new(local: LocalCacheBackend, remote: R) -> Self {
        Self { local, remote }
    }
}

#[async_trait]
impl<R: CacheBackend> CacheBackend for TieredCacheBackend<R> {
    async fn fetch(
        &self,
        keys: &[CacheStorableItem],
        category: CacheCategory,
    ) -> Result<BTreeMap<CacheItem, PathBuf>> {
        let mut found = self.local.fetch(keys, category).await?;

        let outstanding: Vec<CacheStorableItem> = keys
            .iter()
            .filter(|key| {
                !found
                    .keys()
                    .any(|item| item.name == key.name && item.hash == key.hash)
            })
            .cloned()
            .collect();

        if outstanding.is_empty() {
            return Ok(found);
        }

        let remote_found = self.remote.fetch(&outstanding, category).await?;
        if !remote_found.is_empty() {
            // Replicate remote hits into the local layer; next run serves
            // them without the round-trip.
            let replicate: Vec<CacheStorableItem> = remote_found
                .keys()
                .map(|item| CacheStorableItem::new(&item.name, &item.hash))
                .collect();
            self.local.store(&replicate, category).await?;
            tracing::debug!(
                entries = replicate.len(),
                backend = self.remote.name(),
                "Replicated remote cache hits into local layer"
            );
        }

        for (item, location) in remote_found {
            found.insert(item.with_source(CacheSource::Remote), location);
        }
        Ok(found)
    }

    async fn store(&self, items: &[CacheStorableItem], category: CacheCategory) -> Result<()> {
        self.local.store(items, category).await?;
        self.remote.store(items, category).await
    }

    fn name(&self) -> &'static str {
        "tiered"
    }

    async fn health_check(&self) -> Result<()> {
        self.local.health_check().await?;
        self.remote.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCacheBackend;
    use tempfile::TempDir;

    const HASH_A: &str = "sha256:aabbccddeeff00112233445566778899aabbccddeeff00112233445566778899";
    const HASH_B: &str = "sha256:bbccddeeff00112233445566778899aabbccddeeff00112233445566778899aa";

    #[tokio::test]
    async fn remote_hits_are_tagged_remote_and_replicated() {
        let tmp = TempDir::new().expect("tempdir");
        let local = LocalCacheBackend::new(tmp.path());
        let remote = MemoryCacheBackend::new();
        remote.seed("AppTests", HASH_A);
        let tiered = TieredCacheBackend::new(local.clone(), remote);

        let keys = vec![CacheStorableItem::new("AppTests", HASH_A)];
        let found = tiered
            .fetch(&keys, CacheCategory::SelectiveTests)
            .await
            .expect("fetch");

        assert_eq!(found.len(), 1);
        assert_eq!(
            found.keys().next().expect("one entry").source,
            CacheSource::Remote
        );

        // Replicated: the local layer now serves the same key itself.
        let local_found = local
            .fetch(&keys, CacheCategory::SelectiveTests)
            .await
            .expect("fetch local");
        assert_eq!(local_found.len(), 1);
    }

    #[tokio::test]
    async fn local_hits_shadow_the_remote_layer() {
        let tmp = TempDir::new().expect("tempdir");
        let local = LocalCacheBackend::new(tmp.path());
        let keys = vec![CacheStorableItem::new("AppTests", HASH_A)];
        local
            .store(&keys, CacheCategory::SelectiveTests)
            .await
            .expect("store");

        let remote = MemoryCacheBackend::new();
        remote.seed("AppTests", HASH_A);
        let tiered = TieredCacheBackend::new(local, remote);

        let found = tiered
            .fetch(&keys, CacheCategory::SelectiveTests)
            .await
            .expect("fetch");
        assert_eq!(
            found.keys().next().expect("one entry").source,
            CacheSource::Local
        );
        // The remote was never consulted for a key the local layer held.
        assert!(tiered.remote.fetch_calls().is_empty());
    }

    #[tokio::test]
    async fn mixed_provenance_fetch() {
        let tmp = TempDir::new().expect("tempdir");
        let local = LocalCacheBackend::new(tmp.path());
        local
            .store(
                &[CacheStorableItem::new("AppTests", HASH_A)],
                CacheCategory::SelectiveTests,
            )
            .await
            .expect("store");

        let remote = MemoryCacheBackend::new();
        remote.seed("LibTests", HASH_B);
        let tiered = TieredCacheBackend::new(local, remote);

        let keys = vec![
            CacheStorableItem::new("AppTests", HASH_A),
            CacheStorableItem::new("LibTests", HASH_B),
        ];
        let found = tiered
            .fetch(&keys, CacheCategory::SelectiveTests)
            .await
            .expect("fetch");

        let sources: BTreeMap<&str, CacheSource> = found
            .keys()
            .map(|item| (item.name.as_str(), item.source))
            .collect();
        assert_eq!(sources.get("AppTests"), Some(&CacheSource::Local));
        assert_eq!(sources.get("LibTests"), Some(&CacheSource::Remote));
    }

    #[tokio::test]
    async fn store_reaches_both_layers() {
        let tmp = TempDir::new().expect("tempdir");
        let local = LocalCacheBackend::new(tmp.path());
        let remote = MemoryCacheBackend::new();
        let tiered = TieredCacheBackend::new(local.clone(), remote);

        let items = vec![CacheStorableItem::new("AppTests", HASH_A)];
        tiered
            .store(&items, CacheCategory::SelectiveTests)
            .await
            .expect("store");

        assert_eq!(tiered.remote.store_calls().len(), 1);
        let local_found = local
            .fetch(&items, CacheCategory::SelectiveTests)
            .await
            .expect("fetch");
        assert_eq!(local_found.len(), 1);
    }
}
