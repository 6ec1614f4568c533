//! In-memory cache backend
//!
//! Backs engine and CLI tests: entries live in a `BTreeSet`, every fetch and
//! store call is recorded, and failures can be injected to exercise error
//! paths. Also usable as the inner layer of a
//! [`crate::TieredCacheBackend`] in tests that need remote provenance.

use crate::backend::CacheBackend;
use crate::item::{CacheCategory, CacheItem, CacheSource, CacheStorableItem};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Mutex;

/// In-memory cache backend with call recording and failure injection.
#[derive(Debug, Default)]
pub struct MemoryCacheBackend {
    source: Option<CacheSource>,
    entries: Mutex<BTreeSet<(String, String)>>,
    fetch_calls: Mutex<Vec<Vec<CacheStorableItem>>>,
    store_calls: Mutex<Vec<Vec<CacheStorableItem>>>,
    fail_fetch: bool,
    fail_store: bool,
}

impl MemoryCacheBackend {
    /// Create an empty backend reporting local provenance
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that tags fetched entries with the given provenance
    #[must_use]
    pub fn with_source(source: CacheSource) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    /// Make every fetch fail with a configuration error
    #[must_use]
    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Make every store fail with a configuration error
    #[must_use]
    pub fn failing_store(mut self) -> Self {
        self.fail_store = true;
        self
    }

    /// Seed an entry the backend will serve on fetch
    pub fn seed(&self, name: impl Into<String>, hash: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert((name.into(), hash.into()));
    }

    /// Key lists passed to every fetch call, in call order
    #[must_use]
    pub fn fetch_calls(&self) -> Vec<Vec<CacheStorableItem>> {
        self.fetch_calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Item lists passed to every store call, in call order
    #[must_use]
    pub fn store_calls(&self) -> Vec<Vec<CacheStorableItem>> {
        self.store_calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn fetch(
        &self,
        keys: &[CacheStorableItem],
        category: CacheCategory,
    ) -> Result<BTreeMap<CacheItem, PathBuf>> {
        self.fetch_calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(keys.to_vec());

        if self.fail_fetch {
            return Err(Error::configuration("injected fetch failure"));
        }

        let entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let source = self.source.unwrap_or(CacheSource::Local);
        let mut found = BTreeMap::new();
        for key in keys {
            if entries.contains(&(key.name.clone(), key.hash.clone())) {
                found.insert(
                    CacheItem::new(&key.name, &key.hash, category, source),
                    PathBuf::from(format!("mem/{}-{}", key.name, key.hash)),
                );
            }
        }
        Ok(found)
    }

    async fn store(&self, items: &[CacheStorableItem], _category: CacheCategory) -> Result<()> {
        self.store_calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(items.to_vec());

        if self.fail_store {
            return Err(Error::configuration("injected store failure"));
        }

        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for item in items {
            entries.insert((item.name.clone(), item.hash.clone()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
