//! Local disk cache backend
//!
//! Stores entries on the local filesystem using a two-level fan-out layout
//! to avoid oversized directories:
//! `{root}/{category}/{hash[0:2]}/{hash[2:4]}/{name}-{hash}/metadata.json`

use crate::backend::CacheBackend;
use crate::item::{CacheCategory, CacheItem, CacheSource, CacheStorableItem};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dirs::cache_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata stored with each cache entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntryMetadata {
    /// Entry name (the test identifier)
    pub name: String,
    /// Content hash the entry was stored under
    pub hash: String,
    /// Namespace the entry lives in
    pub category: CacheCategory,
    /// When the entry was created
    pub created_at: DateTime<Utc>,
    /// seltest version that created the entry
    pub tool_version: String,
    /// Artifact paths relative to the entry directory
    #[serde(default)]
    pub artifacts: Vec<PathBuf>,
}

/// Inputs for determining the cache root directory
#[derive(Debug, Clone)]
struct CacheRootInputs {
    override_dir: Option<PathBuf>,
    xdg_cache_home: Option<PathBuf>,
    os_cache_dir: Option<PathBuf>,
    temp_dir: PathBuf,
}

fn cache_root_from_inputs(inputs: CacheRootInputs) -> Result<PathBuf> {
    // Resolution order (first writable wins):
    // 1) SELTEST_CACHE_DIR (explicit override)
    // 2) XDG_CACHE_HOME/seltest
    // 3) OS cache dir/seltest
    // 4) TMPDIR/seltest/cache (fallback)
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(dir) = inputs.override_dir.filter(|p| !p.as_os_str().is_empty()) {
        candidates.push(dir);
    }
    if let Some(xdg) = inputs.xdg_cache_home {
        candidates.push(xdg.join("seltest"));
    }
    if let Some(os_cache) = inputs.os_cache_dir {
        candidates.push(os_cache.join("seltest"));
    }
    candidates.push(inputs.temp_dir.join("seltest/cache"));

    for path in candidates {
        // An existing path must be writable; some CI environments provide
        // read-only cache directories under $HOME.
        if path.exists() {
            let probe = path.join(".write_probe");
            match fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&probe)
            {
                Ok(_) => {
                    let _ = fs::remove_file(&probe);
                    return Ok(path);
                }
                Err(_) => continue,
            }
        }
        if fs::create_dir_all(&path).is_ok() {
            return Ok(path);
        }
    }
    Err(Error::configuration(
        "Failed to determine a writable cache directory",
    ))
}

/// Local file-based cache backend.
///
/// Suitable for single-machine development; pair with a remote backend via
/// [`crate::TieredCacheBackend`] for shared caches.
#[derive(Debug, Clone)]
pub struct LocalCacheBackend {
    cache_root: PathBuf,
}

impl LocalCacheBackend {
    /// Create a backend rooted at the given directory
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
        }
    }

    /// Create a backend at the default, environment-resolved root
    ///
    /// # Errors
    /// Returns an error when no writable cache directory can be found.
    pub fn at_default_root() -> Result<Self> {
        let inputs = CacheRootInputs {
            override_dir: std::env::var("SELTEST_CACHE_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            xdg_cache_home: std::env::var("XDG_CACHE_HOME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            os_cache_dir: cache_dir(),
            temp_dir: std::env::temp_dir(),
        };
        Ok(Self::new(cache_root_from_inputs(inputs)?))
    }

    /// The backend's root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.cache_root
    }

    /// Compute the entry directory for a (name, hash) key
    fn entry_path(&self, key: &CacheStorableItem, category: CacheCategory) -> PathBuf {
        // Strip the "sha256:" prefix if present
        let hash = key.hash.strip_prefix("sha256:").unwrap_or(&key.hash);
        let base = self.cache_root.join(category.dir_name());

        if hash.len() < 4 {
            // Fallback for very short hashes (shouldn't happen)
            return base.join(format!("{}-{}", key.name, hash));
        }
        base.join(&hash[..2])
            .join(&hash[2..4])
            .join(format!("{}-{}", key.name, hash))
    }
}

#[async_trait]
impl CacheBackend for LocalCacheBackend {
    async fn fetch(
        &self,
        keys: &[CacheStorableItem],
        category: CacheCategory,
    ) -> Result<BTreeMap<CacheItem, PathBuf>> {
        let mut found = BTreeMap::new();

        for key in keys {
            let entry_dir = self.entry_path(key, category);
            let metadata_path = entry_dir.join("metadata.json");
            if !metadata_path.exists() {
                tracing::debug!(name = %key.name, hash = %key.hash, "Cache miss");
                continue;
            }

            let content = fs::read_to_string(&metadata_path)
                .map_err(|e| Error::io(e, &metadata_path, "read"))?;
            match serde_json::from_str::<CacheEntryMetadata>(&content) {
                Ok(_) => {
                    tracing::debug!(
                        name = %key.name,
                        hash = %key.hash,
                        path = %entry_dir.display(),
                        "Cache hit"
                    );
                    found.insert(
                        CacheItem::new(&key.name, &key.hash, category, CacheSource::Local),
                        entry_dir,
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        name = %key.name,
                        error = %e,
                        "Unreadable cache metadata, treating as miss"
                    );
                }
            }
        }

        Ok(found)
    }

    async fn store(&self, items: &[CacheStorableItem], category: CacheCategory) -> Result<()> {
        for item in items {
            let entry_dir = self.entry_path(item, category);
            fs::create_dir_all(&entry_dir).map_err(|e| Error::io(e, &entry_dir, "create"))?;

            let meta = CacheEntryMetadata {
                name: item.name.clone(),
                hash: item.hash.clone(),
                category,
                created_at: Utc::now(),
                tool_version: seltest_core::VERSION.to_string(),
                artifacts: item.artifacts.clone(),
            };
            let meta_path = entry_dir.join("metadata.json");
            let json = serde_json::to_string_pretty(&meta)
                .map_err(|e| Error::serialization(format!("Failed to encode metadata: {e}")))?;
            fs::write(&meta_path, json).map_err(|e| Error::io(e, &meta_path, "write"))?;

            tracing::debug!(
                name = %item.name,
                hash = %item.hash,
                path = %entry_dir.display(),
                "Cache entry stored"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }

    async fn health_check(&self) -> Result<()> {
        // The local cache is available if we can create its root
        fs::create_dir_all(&self.cache_root)
            .map_err(|e| Error::io(e, &self.cache_root, "create"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HASH_A: &str = "sha256:aabbccddeeff00112233445566778899aabbccddeeff00112233445566778899";

    #[tokio::test]
    async fn fetch_misses_on_empty_cache() {
        let tmp = TempDir::new().expect("tempdir");
        let backend = LocalCacheBackend::new(tmp.path());
        let keys = vec![CacheStorableItem::new("AppTests", HASH_A)];

        let found = backend
            .fetch(&keys, CacheCategory::SelectiveTests)
            .await
            .expect("fetch");
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn store_then_fetch_hits_with_local_provenance() {
        let tmp = TempDir::new().expect("tempdir");
        let backend = LocalCacheBackend::new(tmp.path());
        let keys = vec![CacheStorableItem::new("AppTests", HASH_A)];

        backend
            .store(&keys, CacheCategory::SelectiveTests)
            .await
            .expect("store");
        let found = backend
            .fetch(&keys, CacheCategory::SelectiveTests)
            .await
            .expect("fetch");

        assert_eq!(found.len(), 1);
        let (item, location) = found.first_key_value().expect("one entry");
        assert_eq!(item.name, "AppTests");
        assert_eq!(item.hash, HASH_A);
        assert_eq!(item.source, CacheSource::Local);
        assert!(location.join("metadata.json").exists());
    }

    #[tokio::test]
    async fn entry_layout_fans_out_on_hash() {
        let tmp = TempDir::new().expect("tempdir");
        let backend = LocalCacheBackend::new(tmp.path());
        let key = CacheStorableItem::new("AppTests", HASH_A);

        let path = backend.entry_path(&key, CacheCategory::SelectiveTests);
        let expected = tmp
            .path()
            .join("selective-tests/aa/bb")
            .join(format!("AppTests-{}", HASH_A.trim_start_matches("sha256:")));
        assert_eq!(path, expected);
    }

    #[tokio::test]
    async fn different_hash_is_a_miss() {
        let tmp = TempDir::new().expect("tempdir");
        let backend = LocalCacheBackend::new(tmp.path());

        backend
            .store(
                &[CacheStorableItem::new("AppTests", HASH_A)],
                CacheCategory::SelectiveTests,
            )
            .await
            .expect("store");

        let other = "sha256:ffee00112233445566778899aabbccddeeff00112233445566778899aabbccdd";
        let found = backend
            .fetch(
                &[CacheStorableItem::new("AppTests", other)],
                CacheCategory::SelectiveTests,
            )
            .await
            .expect("fetch");
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn corrupt_metadata_is_treated_as_miss() {
        let tmp = TempDir::new().expect("tempdir");
        let backend = LocalCacheBackend::new(tmp.path());
        let key = CacheStorableItem::new("AppTests", HASH_A);

        let entry_dir = backend.entry_path(&key, CacheCategory::SelectiveTests);
        fs::create_dir_all(&entry_dir).expect("create entry dir");
        fs::write(entry_dir.join("metadata.json"), "{ corrupt").expect("write junk");

        let found = backend
            .fetch(&[key], CacheCategory::SelectiveTests)
            .await
            .expect("fetch");
        assert!(found.is_empty());
    }

    #[test]
    fn cache_root_respects_override() {
        let tmp = TempDir::new().expect("tempdir");
        let override_dir = tmp.path().join("override");
        let inputs = CacheRootInputs {
            override_dir: Some(override_dir.clone()),
            xdg_cache_home: None,
            os_cache_dir: None,
            temp_dir: std::env::temp_dir(),
        };
        let root = cache_root_from_inputs(inputs).expect("resolve root");
        assert_eq!(root, override_dir);
    }

    #[test]
    fn cache_root_skips_unwritable_candidates() {
        let tmp = std::env::temp_dir();
        let inputs = CacheRootInputs {
            override_dir: None,
            xdg_cache_home: Some(PathBuf::from("/proc/definitely-unwritable")),
            os_cache_dir: None,
            temp_dir: tmp.clone(),
        };
        let root = cache_root_from_inputs(inputs).expect("resolve root");
        assert!(root.starts_with(&tmp));
    }
}
