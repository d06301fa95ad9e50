//! Logging setup for florister processes.
//!
//! Installs a `tracing-subscriber` fmt layer producing one timestamped line per
//! event:
//! - error-level lines go to stderr
//! - info and debug lines go to stdout
//! - filtering comes from `RUST_LOG`, or from the given default directive

use std::io;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Error returned when a global subscriber is already installed.
#[derive(Debug, thiserror::Error)]
#[error("logging already initialized: {0}")]
pub struct LoggingError(#[from] TryInitError);

/// Installs the global subscriber.
///
/// `default_filter` is used only when `RUST_LOG` is unset or invalid
/// (e.g. `"info"`, `"florister=debug"`).
pub fn init_logging(default_filter: &str) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let writer = io::stderr
        .with_max_level(Level::ERROR)
        .or_else(io::stdout);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .with_ansi(false)
        .finish()
        .try_init()?;
    Ok(())
}
