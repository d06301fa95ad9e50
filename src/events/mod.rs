//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the poller loop and its attempts.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`Severity`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the `Poller` loop and `PollAttempt::run`.
//! - **Consumers**: anyone holding `PollerHandle::subscribe()`; every event is also
//!   written to the `tracing` log when reported.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, Severity};
