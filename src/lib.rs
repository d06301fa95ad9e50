//! # florister
//!
//! **Florister** watches a periodically-updated state source and forwards only
//! genuinely new snapshots to a downstream consumer (the *florist*), with at
//! most one fetch in flight and a clean teardown on cancellation.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌───────────────┐                          ┌─────────────────┐
//!   │  StateSource  │◄──── last_state() ───────│  PollAttempt    │ (one per tick)
//!   │  (registry)   │                          │  try_lock()     │
//!   └───────────────┘                          │  fetch          │
//!                                              │  compare/update │
//!   ┌───────────────────────────────┐          │  handoff.send() │
//!   │ Poller (timer loop)           │─spawn───►└────────┬────────┘
//!   │ - interval (1 tick / period)  │                   │
//!   │ - TryMutex<last_forwarded>    │                   ▼
//!   │ - JoinSet of attempts         │        ┌─────────────────────┐
//!   │ - Bus (events + log lines)    │        │ handoff (rendezvous)│
//!   └───────────────────────────────┘        └──────────┬──────────┘
//!                                                       ▼
//!                                              ┌─────────────────┐
//!                                              │ Florist (consumer)
//!                                              └─────────────────┘
//! ```
//!
//! ### Attempt lifecycle
//! ```text
//! tick ──► attempt:
//!   ├─► try_lock()        busy → Skipped │ cancelled → silent │ poisoned → Errored
//!   ├─► last_state()      error → Errored (logged, next tick retries)
//!   ├─► same timestamp?   yes → Duplicate (logged)
//!   ├─► last_forwarded = timestamp
//!   ├─► handoff.send()    cancelled → abandoned silently
//!   └─► guard dropped     (lock released on every path)
//!
//! token cancelled:
//!   stop ticking ─► join every attempt (grace) ─► close channel ─► PollerStopped
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                       |
//! |-------------------|--------------------------------------------------------------|------------------------------------------|
//! | **Polling**       | Timer-driven, deduplicating, non-overlapping poll loop.      | [`Poller`], [`PollerHandle`]             |
//! | **Locking**       | Non-blocking exclusive lock bound to a cancellation token.   | [`TryMutex`], [`TryMutexGuard`]          |
//! | **Handoff**       | Zero-capacity rendezvous channel to the consumer.            | [`HandoffSender`], [`HandoffReceiver`]   |
//! | **Boundaries**    | External state source and consumer.                          | [`StateSource`], [`Florist`]             |
//! | **Runtime**       | Startup wiring, OS signals, shutdown ordering.               | [`Florister`]                            |
//! | **Events**        | Per-attempt outcomes, broadcast and logged.                  | [`Event`], [`EventKind`], [`Bus`]        |
//! | **Errors**        | Typed errors for every seam.                                 | [`RuntimeError`], [`LockError`], ...     |
//! | **Configuration** | Centralize runtime settings.                                 | [`Config`]                               |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::{Duration, SystemTime};
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use florister::{Config, Identity, InitialStatus, Poller, SourceError, State, StateSource};
//!
//! struct Clock;
//!
//! #[async_trait]
//! impl StateSource for Clock {
//!     async fn last_state(&self, _id: &Identity) -> Result<State, SourceError> {
//!         Ok(State::new(SystemTime::now(), 101.0, 100.0))
//!     }
//!
//!     async fn status(
//!         &self,
//!         _id: &Identity,
//!         _from: SystemTime,
//!         _to: SystemTime,
//!     ) -> Result<InitialStatus, SourceError> {
//!         Ok(InitialStatus::default())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let token = CancellationToken::new();
//!     let cfg = Config::default().with_interval(Duration::from_millis(10));
//!     let identity = Identity::new("bitflyer", "BTC_JPY")?;
//!
//!     let (poller, mut states) = Poller::start(cfg, identity, Arc::new(Clock), token.clone())?;
//!
//!     let first = states.recv().await.expect("one state");
//!     assert_eq!(first.ask, 101.0);
//!
//!     token.cancel();
//!     while states.recv().await.is_some() {}
//!     poller.join().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod florist;
pub mod logging;
mod state;
mod sync;

// ---- Public re-exports ----

pub use config::Config;
pub use self::core::{AttemptOutcome, Florister, Poller, PollerHandle, PollerReport};
pub use error::{
    ConfigError, FloristError, HandoffError, LockError, RuntimeError, SourceError,
};
pub use events::{Bus, Event, EventKind, Severity};
pub use florist::Florist;
pub use state::{Identity, InitialStatus, SourceRef, State, StateSource};
pub use sync::{HandoffReceiver, HandoffSender, TryMutex, TryMutexGuard, handoff};
