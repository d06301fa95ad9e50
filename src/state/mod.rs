//! Monitored-state data model and the external source boundary.
//!
//! ## Contents
//! - [`Identity`], [`State`], [`InitialStatus`] the snapshot data model
//! - [`StateSource`] the async trait implemented by registries/adapters

mod snapshot;
mod source;

pub use snapshot::{Identity, InitialStatus, State};
pub use source::{SourceRef, StateSource};
