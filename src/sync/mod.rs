//! Synchronization primitives used between poll attempts and the consumer.
//!
//! ## Contents
//! - [`TryMutex`], [`TryMutexGuard`] non-blocking exclusive lock bound to a cancellation token
//! - [`handoff`] zero-capacity rendezvous channel carrying [`State`](crate::State)s

pub mod handoff;
mod try_mutex;

pub use handoff::{HandoffReceiver, HandoffSender};
pub use try_mutex::{TryMutex, TryMutexGuard};
