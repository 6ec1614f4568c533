//! Error types for the engine crate

use miette::Diagnostic;
use thiserror::Error;

/// Error type for engine operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Domain error (resolution, hashing, graph mapping)
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] seltest_core::Error),

    /// Cache backend error (fetch/store)
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] seltest_cache::Error),

    /// Underlying tool invocation error
    #[error(transparent)]
    #[diagnostic(code(seltest::engine::runner))]
    Runner(#[from] crate::runner::RunnerError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;
