//! # State source boundary.
//!
//! This module defines the [`StateSource`] trait implemented by registries that
//! record the latest observed state of each [`Identity`].
//! The common handle type is [`SourceRef`], an `Arc<dyn StateSource>` shared between
//! the runtime and every poll attempt.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::state::{Identity, InitialStatus, State};

/// Shared handle to a state source.
pub type SourceRef = Arc<dyn StateSource>;

/// # External registry of observed states.
///
/// Implementations may fail transiently; callers never distinguish between kinds.
///
/// # Example
/// ```
/// use std::time::SystemTime;
/// use async_trait::async_trait;
/// use florister::{Identity, InitialStatus, SourceError, State, StateSource};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl StateSource for Fixed {
///     async fn last_state(&self, _id: &Identity) -> Result<State, SourceError> {
///         Ok(State::new(SystemTime::UNIX_EPOCH, 101.0, 100.0))
///     }
///
///     async fn status(
///         &self,
///         _id: &Identity,
///         _from: SystemTime,
///         _to: SystemTime,
///     ) -> Result<InitialStatus, SourceError> {
///         Ok(InitialStatus::default())
///     }
/// }
/// ```
#[async_trait]
pub trait StateSource: Send + Sync + 'static {
    /// Returns the most recent snapshot known for `identity`.
    async fn last_state(&self, identity: &Identity) -> Result<State, SourceError>;

    /// Returns every snapshot observed for `identity` in `[from, to]`.
    ///
    /// Used once at startup, never by the polling loop.
    async fn status(
        &self,
        identity: &Identity,
        from: SystemTime,
        to: SystemTime,
    ) -> Result<InitialStatus, SourceError>;
}
