//! Cache items and fetch/store backends for seltest
//!
//! This crate provides the caching infrastructure the selective-testing
//! engine builds on:
//! - Cache identity types ([`CacheItem`], [`CacheStorableItem`]) and the
//!   [`CacheCategory`] namespace partition
//! - The pluggable [`CacheBackend`] fetch/store contract
//! - A local disk backend, a tiered local-over-remote backend, and an
//!   in-memory backend for tests
//!
//! # Provenance
//!
//! Backends tag every fetched item with where it came from
//! ([`CacheSource::Local`] or [`CacheSource::Remote`]).
//! [`CacheSource::Miss`] is never returned by a backend; it is assigned by
//! the engine after a target actually ran.

mod backend;
mod error;
mod item;
mod local;
mod memory;
mod tiered;

// Re-export error types at crate root
pub use error::{Error, Result};

// Re-export main types
pub use backend::CacheBackend;
pub use item::{CacheCategory, CacheItem, CacheSource, CacheStorableItem};
pub use local::{CacheEntryMetadata, LocalCacheBackend};
pub use memory::MemoryCacheBackend;
pub use tiered::TieredCacheBackend;
