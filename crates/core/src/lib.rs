//! Core types for seltest
//!
//! This crate provides the domain model shared by the selective-testing
//! engine and the CLI:
//! - The build graph (projects, targets, schemes, test plans)
//! - Graph mapping from on-disk project manifests
//! - Content hashing of graph targets for cache keys
//!
//! # Overview
//!
//! A [`Graph`] is an immutable snapshot of the build description for one
//! invocation, keyed by project path. Schemes group testable targets, either
//! directly or through test plans. [`GraphTarget`] is the resolved identity
//! (project path + target) used as the hashing key, because two projects may
//! contain same-named targets.

mod error;
pub mod hashing;
pub mod manifest;
pub mod model;

// Re-export error types at crate root
pub use error::{Error, Result};

// Re-export main types
pub use hashing::{ContentHasher, GraphContentHasher};
pub use manifest::{GraphMapper, ManifestGraphMapper, PROJECT_MANIFEST_NAME};
pub use model::{
    Graph, GraphTarget, Project, Scheme, Target, TargetReference, TestAction, TestIdentifier,
    TestPlan,
};

/// seltest version, stamped into stored cache metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
