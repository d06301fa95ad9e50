//! # Zero-capacity handoff channel.
//!
//! A rendezvous conduit from the poller to the consumer: a send completes only
//! once the receiver has **taken** the state. Nothing is buffered on behalf of
//! a sender that gave up.
//!
//! ## Architecture
//! ```text
//! HandoffSender::send(state, token)
//!   ├─► push Parcel{ state, ack } ──► mpsc(1) ──► HandoffReceiver::recv()
//!   │                                                 ├─ ack.send(()) ok  → deliver state
//!   │                                                 └─ ack dropped      → sender abandoned, skip
//!   └─► wait ack ◄────────────────────────────────────┘
//!
//! Every await on the sender side races `token.cancelled()`.
//! ```
//!
//! ## Rules
//! - States are delivered in the order their sends completed (FIFO).
//! - A send abandoned on cancellation is never delivered afterwards.
//! - `recv()` yields `None` once every [`HandoffSender`] is dropped: the channel is
//!   closed exactly once, when the last sender goes away.

use tokio::select;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::error::HandoffError;
use crate::state::State;

#[derive(Debug)]
struct Parcel {
    state: State,
    ack: oneshot::Sender<()>,
}

/// Creates a connected sender/receiver pair.
pub fn channel() -> (HandoffSender, HandoffReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (HandoffSender { tx }, HandoffReceiver { rx })
}

/// Send side of the handoff. Cloneable; the channel closes when the last clone drops.
#[derive(Clone, Debug)]
pub struct HandoffSender {
    tx: mpsc::Sender<Parcel>,
}

impl HandoffSender {
    /// Hands `state` to the consumer, waiting until it has been taken.
    ///
    /// ### Errors
    /// - [`HandoffError::Canceled`] → `token` fired first; the state is abandoned
    /// - [`HandoffError::Closed`] → the receiver was dropped
    pub async fn send(&self, state: State, token: &CancellationToken) -> Result<(), HandoffError> {
        let (ack, mut taken) = oneshot::channel();

        select! {
            biased;
            _ = token.cancelled() => return Err(HandoffError::Canceled),
            res = self.tx.send(Parcel { state, ack }) => {
                res.map_err(|_| HandoffError::Closed)?;
            }
        }

        select! {
            biased;
            res = &mut taken => res.map_err(|_| HandoffError::Closed),
            _ = token.cancelled() => {
                // Once closed, the consumer's ack fails and it skips the parcel.
                // An ack that landed first means the state was already taken.
                taken.close();
                match taken.try_recv() {
                    Ok(()) => Ok(()),
                    Err(_) => Err(HandoffError::Canceled),
                }
            }
        }
    }

    /// Returns `true` if the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receive side of the handoff, handed to the consumer.
#[derive(Debug)]
pub struct HandoffReceiver {
    rx: mpsc::Receiver<Parcel>,
}

impl HandoffReceiver {
    /// Takes the next state.
    ///
    /// Returns `None` once every sender is dropped and nothing is pending.
    pub async fn recv(&mut self) -> Option<State> {
        while let Some(parcel) = self.rx.recv().await {
            if parcel.ack.send(()).is_ok() {
                return Some(parcel.state);
            }
        }
        None
    }
}
