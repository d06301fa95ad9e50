//! Runtime core: polling loop and lifecycle.
//!
//! Internal modules:
//! - [`attempt`]: one lock/fetch/compare/forward sequence with event reporting;
//! - [`poller`]: timer loop, attempt tracking, graceful shutdown;
//! - [`florister`]: startup wiring of source, poller and florist;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod attempt;
mod florister;
mod poller;
mod shutdown;

pub use attempt::AttemptOutcome;
pub use florister::Florister;
pub use poller::{Poller, PollerHandle, PollerReport};
