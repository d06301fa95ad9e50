//! # Snapshot data model.
//!
//! A [`State`] is an immutable, timestamped snapshot of a monitored instrument,
//! addressed by an [`Identity`] (`soil` = venue, `seed` = instrument).
//!
//! ## Identity of a snapshot
//! Two states are "the same" for forwarding purposes when their `observed_at`
//! instants are **exactly equal**, regardless of payload. Ordering is not
//! consulted: a state whose timestamp moves backwards is still considered new.

use std::fmt;
use std::time::SystemTime;

use crate::error::ConfigError;

/// Identity pair addressing one monitored entity in a state source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    soil: String,
    seed: String,
}

impl Identity {
    /// Creates an identity; both halves must be non-empty.
    ///
    /// # Example
    /// ```
    /// use florister::Identity;
    ///
    /// let id = Identity::new("bitflyer", "BTC_JPY").unwrap();
    /// assert_eq!(id.to_string(), "bitflyer/BTC_JPY");
    /// assert!(Identity::new("", "BTC_JPY").is_err());
    /// ```
    pub fn new(soil: impl Into<String>, seed: impl Into<String>) -> Result<Self, ConfigError> {
        let soil = soil.into();
        let seed = seed.into();
        if soil.is_empty() {
            return Err(ConfigError::EmptyIdentity { field: "soil" });
        }
        if seed.is_empty() {
            return Err(ConfigError::EmptyIdentity { field: "seed" });
        }
        Ok(Self { soil, seed })
    }

    /// Venue half of the pair.
    pub fn soil(&self) -> &str {
        &self.soil
    }

    /// Instrument half of the pair.
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.soil, self.seed)
    }
}

/// Immutable snapshot of externally observed status.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    /// Instant the source observed this snapshot.
    pub observed_at: SystemTime,
    /// Best ask price.
    pub ask: f64,
    /// Best bid price.
    pub bid: f64,
}

impl State {
    /// Creates a new snapshot.
    pub fn new(observed_at: SystemTime, ask: f64, bid: f64) -> Self {
        Self {
            observed_at,
            ask,
            bid,
        }
    }

    /// Returns `true` if both snapshots carry exactly the same timestamp.
    ///
    /// Payload is ignored.
    #[inline]
    pub fn same_instant(&self, other: &State) -> bool {
        self.observed_at == other.observed_at
    }

    /// Mid price between ask and bid.
    pub fn mid(&self) -> f64 {
        (self.ask + self.bid) / 2.0
    }
}

/// History of states observed inside a time window.
///
/// Fetched once at startup to seed the consumer; oldest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InitialStatus {
    states: Vec<State>,
}

impl InitialStatus {
    /// Builds a status from states, sorting them oldest first.
    pub fn new(mut states: Vec<State>) -> Self {
        states.sort_by_key(|s| s.observed_at);
        Self { states }
    }

    /// All states, oldest first.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Most recent state of the window, if any.
    pub fn latest(&self) -> Option<&State> {
        self.states.last()
    }

    /// Number of states in the window.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if the window holds no state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
