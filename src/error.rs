//! Error types used by the florister runtime and its collaborators.
//!
//! This module defines the error enums raised at each seam of the pipeline:
//!
//! - [`LockError`]: failures of a non-blocking [`TryMutex`](crate::TryMutex) acquire.
//! - [`SourceError`]: failures reported by a [`StateSource`](crate::StateSource).
//! - [`HandoffError`]: a forward to the consumer that did not complete.
//! - [`ConfigError`]: invalid runtime configuration, rejected at startup.
//! - [`FloristError`]: failures reported by the consumer.
//! - [`RuntimeError`]: errors surfaced by the runtime itself to the caller.
//!
//! Every type provides `as_label` (stable snake_case label for logs).

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by a non-blocking lock acquire.
///
/// "Lock is busy" is **not** an error: [`TryMutex::try_lock`](crate::TryMutex::try_lock)
/// reports it as `Ok(None)`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockError {
    /// The cancellation token bound to the lock has fired.
    ///
    /// Expected during shutdown; callers abandon the attempt without logging.
    #[error("context cancelled")]
    Canceled,

    /// A previous holder panicked while holding the lock.
    #[error("lock poisoned by a panicked holder")]
    Poisoned,
}

impl LockError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use florister::LockError;
    ///
    /// assert_eq!(LockError::Canceled.as_label(), "lock_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LockError::Canceled => "lock_canceled",
            LockError::Poisoned => "lock_poisoned",
        }
    }
}

/// # Errors produced by a state source.
///
/// The poller does not distinguish between kinds: every failure skips the
/// current tick and the next tick retries naturally.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source has no state recorded for the requested identity.
    #[error("no state recorded for {identity}")]
    NotFound {
        /// Identity that was looked up (`soil/seed`).
        identity: String,
    },

    /// Transient failure (network, storage, ...).
    #[error("source unavailable: {error}")]
    Unavailable {
        /// The underlying error message.
        error: String,
    },
}

impl SourceError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SourceError::NotFound { .. } => "source_not_found",
            SourceError::Unavailable { .. } => "source_unavailable",
        }
    }
}

/// # Errors produced by a handoff send.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffError {
    /// Cancellation won the race against the consumer; the state was abandoned.
    #[error("context cancelled")]
    Canceled,

    /// The consumer dropped its receiver.
    #[error("handoff receiver closed")]
    Closed,
}

impl HandoffError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandoffError::Canceled => "handoff_canceled",
            HandoffError::Closed => "handoff_closed",
        }
    }
}

/// # Invalid runtime configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The tick interval must be strictly positive.
    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    /// The startup status window must be strictly positive.
    #[error("status lookback must be greater than zero")]
    ZeroLookback,

    /// The identity pair has an empty component.
    #[error("identity has an empty {field}")]
    EmptyIdentity {
        /// Which half of the pair is empty (`soil` or `seed`).
        field: &'static str,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroInterval => "config_zero_interval",
            ConfigError::ZeroLookback => "config_zero_lookback",
            ConfigError::EmptyIdentity { .. } => "config_empty_identity",
        }
    }
}

/// # Errors produced by the consumer.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FloristError {
    /// Consumer could not be prepared from the initial status.
    #[error("florist setup failed: {error}")]
    Setup {
        /// The underlying error message.
        error: String,
    },

    /// Consumer failed while working on a state.
    #[error("florist failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl FloristError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            FloristError::Setup { .. } => "florist_setup",
            FloristError::Fail { .. } => "florist_failed",
        }
    }
}

/// # Errors surfaced by the florister runtime.
///
/// Startup failures (`Config`, `Source`) are returned synchronously before any
/// polling starts. Nothing raised inside a single poll attempt ever reaches
/// this type: attempts log and skip.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration rejected at startup.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Initial status fetch failed at startup.
    #[error("initial status fetch failed: {0}")]
    Source(#[from] SourceError),

    /// The consumer returned an error.
    #[error(transparent)]
    Florist(#[from] FloristError),

    /// Shutdown grace period was exceeded; remaining attempts were aborted.
    #[error("shutdown timeout {grace:?} exceeded; {in_flight} attempt(s) aborted")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Number of attempts still running when the grace period ended.
        in_flight: usize,
    },

    /// The poller task itself panicked or was aborted.
    #[error("poller task failed: {error}")]
    Join {
        /// The underlying join error message.
        error: String,
    },

    /// OS signal listeners could not be registered.
    #[error("signal registration failed: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use florister::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), in_flight: 1 };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Config(_) => "runtime_config",
            RuntimeError::Source(_) => "runtime_source",
            RuntimeError::Florist(_) => "runtime_florist",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Join { .. } => "runtime_join",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(LockError::Poisoned.as_label(), "lock_poisoned");
        assert_eq!(HandoffError::Closed.as_label(), "handoff_closed");
        assert_eq!(
            SourceError::Unavailable { error: "down".into() }.as_label(),
            "source_unavailable"
        );
        assert_eq!(
            RuntimeError::from(ConfigError::ZeroInterval).as_label(),
            "runtime_config"
        );
    }

    #[test]
    fn test_source_error_wraps_into_runtime() {
        let err: RuntimeError = SourceError::NotFound {
            identity: "bitflyer/BTC_JPY".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "initial status fetch failed: no state recorded for bitflyer/BTC_JPY"
        );
    }
}
