//! # Consumer boundary.
//!
//! A [`Florist`] performs domain work driven by new states. It receives the
//! history fetched at startup, then reads the handoff channel until it closes.
//!
//! A florist receives a [`CancellationToken`]; cancelling it (from inside, or
//! from the runtime on an OS signal) makes the poller close the channel, which
//! is the florist's cue to finish.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::FloristError;
use crate::state::InitialStatus;
use crate::sync::HandoffReceiver;

/// # Consumer of forwarded states.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use florister::{Florist, FloristError, HandoffReceiver, InitialStatus};
///
/// struct Counter(usize);
///
/// #[async_trait]
/// impl Florist for Counter {
///     fn name(&self) -> &str { "counter" }
///
///     async fn run(
///         &mut self,
///         _ctx: CancellationToken,
///         _initial: InitialStatus,
///         mut states: HandoffReceiver,
///     ) -> Result<(), FloristError> {
///         while states.recv().await.is_some() {
///             self.0 += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Florist: Send + 'static {
    /// Returns a stable, human-readable name.
    fn name(&self) -> &str;

    /// Consumes states until `states` yields `None`.
    ///
    /// Returning (with or without error) shuts the whole pipeline down.
    async fn run(
        &mut self,
        ctx: CancellationToken,
        initial: InitialStatus,
        states: HandoffReceiver,
    ) -> Result<(), FloristError>;

    /// Releases resources once the pipeline has stopped.
    fn release(&mut self) {}
}
