//! # Runtime events emitted by the poller and its attempts.
//!
//! The [`EventKind`] enum classifies events across two categories:
//! - **Attempt outcomes**: what a single tick did (skipped, forwarded, failed, ...)
//! - **Lifecycle events**: poller start, shutdown request, stop, grace exceeded
//!
//! The [`Event`] struct carries metadata such as timestamps, identity, tick number,
//! the forwarded snapshot instant and error messages.
//!
//! ## Ordering guarantees
//! Each event published on a [`Bus`](super::Bus) receives a sequence number (`seq`)
//! that increases monotonically per bus.
//!
//! ## Example
//! ```rust
//! use florister::{Event, EventKind, Severity};
//!
//! let ev = Event::new(EventKind::FetchFailed)
//!     .with_identity("bitflyer/BTC_JPY")
//!     .with_tick(3)
//!     .with_error("timeout");
//!
//! assert_eq!(ev.kind.severity(), Severity::Error);
//! assert_eq!(ev.tick, Some(3));
//! ```

use std::sync::Arc;
use std::time::SystemTime;

/// Log severity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational lifecycle line.
    Info,
    /// Something failed; the poller keeps going.
    Error,
    /// High-frequency detail.
    Debug,
}

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Attempt outcomes ===
    /// Tick skipped: another attempt holds the lock.
    ///
    /// Sets: `identity`, `tick`
    AttemptSkipped,

    /// Lock acquire failed for a reason other than cancellation.
    ///
    /// Sets: `identity`, `tick`, `error`
    LockFailed,

    /// The state source failed; the next tick retries.
    ///
    /// Sets: `identity`, `tick`, `error`
    FetchFailed,

    /// Fetched state carries the same timestamp as the last forwarded one.
    ///
    /// Sets: `identity`, `tick`, `observed_at`
    DuplicateSkipped,

    /// A new state was taken by the consumer.
    ///
    /// Sets: `identity`, `tick`, `observed_at`
    StateForwarded,

    /// A new state was dropped before the consumer took it (cancellation or closed receiver).
    ///
    /// Sets: `identity`, `tick`, `observed_at`, `error`
    ForwardAbandoned,

    /// An attempt panicked; the poller cleared the lock poison and keeps ticking.
    ///
    /// Sets: `identity`, `error`
    AttemptPanicked,

    // === Lifecycle ===
    /// Poller loop started ticking.
    ///
    /// Sets: `identity`
    PollerStarted,

    /// Cancellation observed by the poller loop.
    ///
    /// Sets: `identity`, `tick` (last tick number)
    ShutdownRequested,

    /// Every attempt exited and the handoff channel is closed.
    ///
    /// Sets: `identity`, `tick` (last tick number)
    PollerStopped,

    /// Attempts were still running after the grace period and got aborted.
    ///
    /// Sets: `identity`, `error`
    GraceExceeded,
}

impl EventKind {
    /// Severity used when the event is written to the log.
    pub fn severity(&self) -> Severity {
        match self {
            EventKind::LockFailed
            | EventKind::FetchFailed
            | EventKind::DuplicateSkipped
            | EventKind::AttemptPanicked
            | EventKind::GraceExceeded => Severity::Error,
            EventKind::PollerStarted | EventKind::ShutdownRequested | EventKind::PollerStopped => {
                Severity::Info
            }
            EventKind::AttemptSkipped
            | EventKind::StateForwarded
            | EventKind::ForwardAbandoned => Severity::Debug,
        }
    }

    /// Short stable label (kebab-case) used as the log line prefix.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::AttemptSkipped => "attempt-skipped",
            EventKind::LockFailed => "lock-failed",
            EventKind::FetchFailed => "fetch-failed",
            EventKind::DuplicateSkipped => "duplicate-skipped",
            EventKind::StateForwarded => "state-forwarded",
            EventKind::ForwardAbandoned => "forward-abandoned",
            EventKind::AttemptPanicked => "attempt-panicked",
            EventKind::PollerStarted => "poller-started",
            EventKind::ShutdownRequested => "shutdown-requested",
            EventKind::PollerStopped => "poller-stopped",
            EventKind::GraceExceeded => "grace-exceeded",
        }
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic sequence assigned by the bus on publish
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Sequence number, assigned by [`Bus::publish`](super::Bus::publish).
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Monitored identity (`soil/seed`).
    pub identity: Option<Arc<str>>,
    /// Tick number (starting from 1).
    pub tick: Option<u64>,
    /// Timestamp of the snapshot involved, if any.
    pub observed_at: Option<SystemTime>,
    /// Human-readable error message.
    pub error: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: 0,
            at: SystemTime::now(),
            kind,
            identity: None,
            tick: None,
            observed_at: None,
            error: None,
        }
    }

    /// Attaches the monitored identity.
    #[inline]
    pub fn with_identity(mut self, identity: impl Into<Arc<str>>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Attaches a tick number.
    #[inline]
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Attaches the snapshot instant.
    #[inline]
    pub fn with_observed_at(mut self, at: SystemTime) -> Self {
        self.observed_at = Some(at);
        self
    }

    /// Attaches an error message.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Writes the event through `tracing` at its kind's severity.
    pub fn log(&self) {
        let line = self.to_line();
        match self.kind.severity() {
            Severity::Info => tracing::info!("{line}"),
            Severity::Error => tracing::error!("{line}"),
            Severity::Debug => tracing::debug!("{line}"),
        }
    }

    /// Renders the event as a single log line.
    pub fn to_line(&self) -> String {
        let mut line = format!("[{}]", self.kind.as_label());
        if let Some(identity) = &self.identity {
            line.push_str(&format!(" {identity}"));
        }
        if let Some(tick) = self.tick {
            line.push_str(&format!(" tick={tick}"));
        }
        if let Some(at) = self.observed_at {
            match at.duration_since(SystemTime::UNIX_EPOCH) {
                Ok(d) => line.push_str(&format!(" observed_at={}.{:09}", d.as_secs(), d.subsec_nanos())),
                Err(_) => line.push_str(" observed_at=pre-epoch"),
            }
        }
        if let Some(error) = &self.error {
            line.push_str(&format!(" err='{error}'"));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_duplicate_logged_as_error() {
        assert_eq!(EventKind::DuplicateSkipped.severity(), Severity::Error);
        assert_eq!(EventKind::AttemptSkipped.severity(), Severity::Debug);
        assert_eq!(EventKind::PollerStopped.severity(), Severity::Info);
        assert_eq!(EventKind::AttemptPanicked.severity(), Severity::Error);
    }

    #[test]
    fn test_line_rendering() {
        let ev = Event::new(EventKind::DuplicateSkipped)
            .with_identity("bitflyer/BTC_JPY")
            .with_tick(7)
            .with_observed_at(SystemTime::UNIX_EPOCH + Duration::from_millis(1500));
        assert_eq!(
            ev.to_line(),
            "[duplicate-skipped] bitflyer/BTC_JPY tick=7 observed_at=1.500000000"
        );
    }

    #[test]
    fn test_line_with_error() {
        let ev = Event::new(EventKind::FetchFailed).with_error("down");
        assert_eq!(ev.to_line(), "[fetch-failed] err='down'");
    }
}
