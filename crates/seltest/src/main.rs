//! seltest CLI application
//!
//! Wraps a native build tool's test invocation with selective test caching:
//! targets whose content hash already passed an equivalent previous run are
//! skipped, and freshly-executed targets are recorded back into the cache.

// CLI binary outputs to stdout/stderr as part of its normal operation
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::test::TestOptions;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code for SIGINT (128 + signal number 2)
const EXIT_SIGINT: u8 = 130;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Fatal error: failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(cli))
}

/// Initialize tracing from CLI flags; RUST_LOG takes precedence when set.
fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.level.as_filter()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // Ignore the error if a subscriber is already installed (e.g., in tests)
    if cli.json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

async fn run(cli: Cli) -> ExitCode {
    // Biased select so an interrupt wins over normal completion. Dropping
    // the in-flight dispatch future on Ctrl-C means a cancelled run never
    // reaches the cache-recording step.
    tokio::select! {
        biased;

        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; no cache entries were written for this run");
            ExitCode::from(EXIT_SIGINT)
        }
        result = execute(cli) => {
            match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(report) => {
                    eprintln!("{report:?}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn execute(cli: Cli) -> miette::Result<()> {
    match cli.command {
        Commands::Test {
            root,
            cache_dir,
            tool,
            hash_seeds,
            report_json,
            arguments,
        } => {
            commands::test::execute_test(TestOptions {
                root,
                cache_dir,
                tool,
                hash_seeds,
                report_json,
                arguments,
            })
            .await
        }
        Commands::Graph { root } => commands::graph::execute_graph(&root),
    }
}
