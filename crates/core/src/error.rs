//! Error types for the core crate

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Error type for core operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No scheme designation was present in the invocation arguments
    #[error("No scheme was passed to the test invocation")]
    #[diagnostic(
        code(seltest::core::scheme_not_passed),
        help("Pass the scheme with '-scheme <name>' in the tool arguments")
    )]
    SchemeNotPassed,

    /// The requested scheme exists in no project of the graph
    #[error("Scheme '{scheme}' was not found in any project")]
    #[diagnostic(
        code(seltest::core::scheme_not_found),
        help("Check the scheme name against the project manifests")
    )]
    SchemeNotFound {
        /// The scheme name that was requested
        scheme: String,
    },

    /// The requested test plan does not exist in the scheme
    #[error("Test plan '{test_plan}' was not found in scheme '{scheme}'")]
    #[diagnostic(code(seltest::core::test_plan_not_found))]
    TestPlanNotFound {
        /// The test plan name that was requested
        test_plan: String,
        /// The scheme the plan was looked up in
        scheme: String,
    },

    /// A scheme or test plan references a target its project does not define
    #[error("Target '{target}' was not found in project '{project}'")]
    #[diagnostic(code(seltest::core::target_not_found))]
    TargetNotFound {
        /// The referenced target name
        target: String,
        /// The project path the reference points into
        project: String,
    },

    /// The hash mapping is missing an entry for a resolved candidate target
    #[error("No content hash was computed for target '{target}'")]
    #[diagnostic(
        code(seltest::core::missing_hash),
        help("The hash provider must cover every target reachable from the resolved candidates")
    )]
    MissingHash {
        /// The target the hash mapping does not cover
        target: String,
    },

    /// A project manifest could not be parsed
    #[error("Malformed project manifest at {path}: {message}")]
    #[diagnostic(code(seltest::core::manifest))]
    Manifest {
        /// Path of the manifest file
        path: String,
        /// Parser error description
        message: String,
    },

    /// I/O error with path and operation context
    #[error("I/O {operation} failed: {}", path.display())]
    #[diagnostic(code(seltest::core::io))]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error
        path: Box<Path>,
        /// Operation that failed (e.g., "read", "walk")
        operation: String,
    },
}

impl Error {
    /// Create a scheme-not-found error
    #[must_use]
    pub fn scheme_not_found(scheme: impl Into<String>) -> Self {
        Self::SchemeNotFound {
            scheme: scheme.into(),
        }
    }

    /// Create a test-plan-not-found error
    #[must_use]
    pub fn test_plan_not_found(test_plan: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self::TestPlanNotFound {
            test_plan: test_plan.into(),
            scheme: scheme.into(),
        }
    }

    /// Create a target-not-found error
    #[must_use]
    pub fn target_not_found(target: impl Into<String>, project: impl AsRef<Path>) -> Self {
        Self::TargetNotFound {
            target: target.into(),
            project: project.as_ref().display().to_string(),
        }
    }

    /// Create a missing-hash error
    #[must_use]
    pub fn missing_hash(target: impl Into<String>) -> Self {
        Self::MissingHash {
            target: target.into(),
        }
    }

    /// Create a manifest error
    #[must_use]
    pub fn manifest(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: path.as_ref().into(),
            operation: operation.into(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_not_found_carries_requested_name() {
        let err = Error::scheme_not_found("CI");
        assert!(matches!(err, Error::SchemeNotFound { ref scheme } if scheme == "CI"));
        assert!(err.to_string().contains("'CI'"));
    }

    #[test]
    fn io_error_mentions_operation_and_path() {
        let err = Error::io(
            std::io::Error::other("denied"),
            "/tmp/manifest.json",
            "read",
        );
        let msg = err.to_string();
        assert!(msg.contains("read"));
        assert!(msg.contains("/tmp/manifest.json"));
    }
}
