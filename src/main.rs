//! sqlhelper - Main entry point.
//!
//! Runs one insert, update, select or raw statement against a SQLite file or a
//! MySQL database and prints the result to stdout.

use sqlhelper::cli::render_outcome;
use sqlhelper::config::Config;
use sqlhelper::db::{LockRegistry, open_store};
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging. Logs go to stderr so that
/// stdout carries only results.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse_args();

    // Initialize logging
    init_tracing(&config);

    debug!(
        db_type = %config.database.db_type(),
        "Starting sqlhelper v{}",
        env!("CARGO_PKG_VERSION")
    );

    let store = open_store(&config.database, LockRegistry::global())?;
    let operation = config.command.into_operation();

    match store.apply(&operation) {
        Ok(outcome) => {
            let stdout = std::io::stdout();
            render_outcome(&outcome, &mut stdout.lock())?;
            Ok(())
        }
        Err(e) => {
            error!(operation = operation.kind(), error = %e, "Operation failed");
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Hint: {}", suggestion);
            }
            Err(e.into())
        }
    }
}
