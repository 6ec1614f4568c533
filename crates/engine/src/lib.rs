//! Selective-test dispatch engine for seltest
//!
//! Given a test invocation for a scheme (or one of its test plans), this
//! crate decides which test targets can be skipped because an equivalent
//! previous run already passed:
//!
//! 1. [`resolver`] turns the scheme/test-plan selection into an ordered set
//!    of candidate test targets.
//! 2. [`classifier`] fetches cache entries for the candidates' content
//!    hashes and asks the [`SelectiveTestingService`] which of them are
//!    verified-skippable.
//! 3. [`arguments`] composes the reduced invocation, appending one
//!    `-skip-testing:` directive per skippable target.
//! 4. [`orchestrator`] drives the whole flow: short-circuits when everything
//!    is cached, otherwise invokes the underlying tool, then records
//!    freshly-executed targets into the cache and the [`RunLedger`].

pub mod arguments;
pub mod classifier;
mod error;
pub mod ledger;
pub mod orchestrator;
pub mod resolver;
pub mod runner;
pub mod service;

// Re-export error types at crate root
pub use error::{Error, Result};

// Re-export main types
pub use classifier::Classification;
pub use ledger::{LedgerSummary, RunLedger};
pub use orchestrator::{DispatchOutcome, TestDispatcher};
pub use resolver::{ResolvedTestTarget, resolve_test_targets};
pub use runner::{ProcessTestRunner, RunnerError, TestRunner};
pub use service::{HashVerifiedService, SelectiveTestingService};
