//! Command-line surface

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace-level output
    Trace,
    /// Debug-level output
    Debug,
    /// Informational output
    Info,
    /// Warnings only
    Warn,
    /// Errors only
    Error,
}

impl LogLevel {
    /// The equivalent tracing level filter directive
    #[must_use]
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Selective test caching around a native build tool's test invocation
#[derive(Debug, Parser)]
#[command(name = "seltest", version, about)]
pub struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log level
    #[arg(long, short = 'l', global = true, value_enum, default_value = "warn")]
    pub level: LogLevel,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run tests, skipping targets whose content hash already passed
    Test {
        /// Root directory containing project manifests
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Cache directory (overrides the environment-resolved default)
        #[arg(long, env = "SELTEST_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        /// Underlying build tool binary to invoke
        #[arg(long, env = "SELTEST_TOOL", default_value = seltest_engine::runner::DEFAULT_TOOL)]
        tool: String,

        /// Extra seed strings folded into every target hash
        #[arg(long = "hash-seed", value_name = "STRING")]
        hash_seeds: Vec<String>,

        /// Print the run ledger as JSON after completion
        #[arg(long)]
        report_json: bool,

        /// Passthrough arguments for the underlying tool; must include
        /// '-scheme <name>', may include '-testPlan <name>'
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        arguments: Vec<String>,
    },

    /// Map and print the build graph for the given root
    Graph {
        /// Root directory containing project manifests
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}
