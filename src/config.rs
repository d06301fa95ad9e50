//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the poller and the florister runtime.
//!
//! Config is used in two ways:
//! 1. **Poller creation**: `Poller::new(config, identity, source, token)` (or `Poller::start`)
//! 2. **Startup**: `Florister::new(config, identity, source)` reads the status window
//!
//! ## Sentinel values
//! - `grace = 0s` → do not wait for in-flight attempts on shutdown, abort them immediately
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::error::ConfigError;

/// Global configuration for the florister runtime.
///
/// ## Field semantics
/// - `interval`: Tick period of the poller (must be `> 0`)
/// - `grace`: Maximum wait for in-flight attempts on shutdown
/// - `bus_capacity`: Event bus ring buffer size (min 1)
/// - `status_lookback`: Width of the history window fetched once at startup (must be `> 0`)
#[derive(Clone, Debug)]
pub struct Config {
    /// Period between two poll attempts.
    ///
    /// Ticks missed while the runtime was busy are skipped, never replayed in a burst.
    pub interval: Duration,

    /// Maximum time to wait for in-flight attempts once cancellation fires.
    ///
    /// Attempts race every suspension point against cancellation, so they normally
    /// converge well within one tick. Past `grace` they are aborted and the poller
    /// reports `RuntimeError::GraceExceeded`.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// How far back the initial status is fetched before polling starts.
    pub status_lookback: Duration,
}

impl Config {
    /// Checks the configuration before anything is spawned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval == Duration::ZERO {
            return Err(ConfigError::ZeroInterval);
        }
        if self.status_lookback == Duration::ZERO {
            return Err(ConfigError::ZeroLookback);
        }
        Ok(())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Sets the tick period.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the shutdown grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `interval = 1s`
    /// - `grace = 5s`
    /// - `bus_capacity = 1024`
    /// - `status_lookback = 24h`
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
            status_lookback: Duration::from_secs(24 * 60 * 60),
        }
    }
}
