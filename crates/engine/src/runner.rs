//! Underlying build tool invocation
//!
//! The engine drives the native build/test tool through a single blocking
//! call: pass the composed argument vector, wait for the exit status.
//! Whatever parallelism the tool uses internally is opaque here. Failures
//! are propagated unmodified; retries, if any, belong to the tool.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Default underlying tool binary
pub const DEFAULT_TOOL: &str = "xcodebuild";

/// Error types for tool invocation
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Process spawn failed
    #[error("Failed to spawn '{tool}': {source}")]
    Spawn {
        /// The tool binary that could not be spawned
        tool: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The tool exited with a non-zero status
    #[error("'{tool}' exited with {}", code.map_or_else(|| "signal".to_string(), |c| format!("status {c}")))]
    Failed {
        /// The tool binary that failed
        tool: String,
        /// Exit code, if the process exited normally
        code: Option<i32>,
    },
}

/// Invokes the underlying build/test tool with an argument vector.
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Run the tool to completion.
    ///
    /// # Errors
    /// Returns an error when the process cannot be spawned or exits
    /// non-zero.
    async fn run(&self, arguments: &[String]) -> Result<(), RunnerError>;
}

/// Runner spawning the configured tool binary as a child process, stdio
/// inherited so the tool's own output reaches the user directly.
#[derive(Debug, Clone)]
pub struct ProcessTestRunner {
    tool: String,
    working_dir: Option<PathBuf>,
}

impl ProcessTestRunner {
    /// Create a runner for the given tool binary
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            working_dir: None,
        }
    }

    /// Run the tool from the given working directory
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl Default for ProcessTestRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL)
    }
}

#[async_trait]
impl TestRunner for ProcessTestRunner {
    #[tracing::instrument(name = "run_tool", fields(tool = %self.tool), skip(self, arguments))]
    async fn run(&self, arguments: &[String]) -> Result<(), RunnerError> {
        let mut command = Command::new(&self.tool);
        command
            .args(arguments)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        tracing::info!(arguments = ?arguments, "Invoking underlying tool");
        let status = command.status().await.map_err(|source| RunnerError::Spawn {
            tool: self.tool.clone(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(RunnerError::Failed {
                tool: self.tool.clone(),
                code: status.code(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_invocation() {
        let runner = ProcessTestRunner::new("true");
        runner.run(&[]).await.expect("should succeed");
    }

    #[tokio::test]
    async fn non_zero_exit_is_failed() {
        let runner = ProcessTestRunner::new("false");
        let err = runner.run(&[]).await.expect_err("should fail");
        assert!(matches!(err, RunnerError::Failed { code: Some(1), .. }));
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let runner = ProcessTestRunner::new("seltest-no-such-binary");
        let err = runner.run(&[]).await.expect_err("should fail");
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }

    #[tokio::test]
    async fn arguments_reach_the_tool() {
        // `sh -c 'exit 7'` proves the argument vector is passed verbatim.
        let runner = ProcessTestRunner::new("sh");
        let err = runner
            .run(&["-c".to_string(), "exit 7".to_string()])
            .await
            .expect_err("should fail");
        assert!(matches!(err, RunnerError::Failed { code: Some(7), .. }));
    }
}
