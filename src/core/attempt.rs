//! # Run a single poll attempt.
//!
//! One attempt is spawned per tick. It performs the whole
//! lock → fetch → compare → update → forward sequence and reports exactly one
//! [`AttemptOutcome`].
//!
//! ## Flow
//!
//! ```text
//! try_lock()
//!   ├─ Err(Canceled)  → Canceled   (silent)
//!   ├─ Err(other)     → Errored    (LockFailed)
//!   ├─ Ok(None)       → Skipped    (AttemptSkipped)
//!   └─ Ok(guard) ─► last_state()   (raced against cancellation)
//!                    ├─ cancelled  → Canceled
//!                    ├─ Err        → Errored    (FetchFailed)
//!                    └─ Ok(state)
//!                         ├─ same instant as *guard → Duplicate (DuplicateSkipped)
//!                         └─ *guard = instant ─► handoff.send() (raced against cancellation)
//!                                                 ├─ Ok            → Forwarded (StateForwarded)
//!                                                 ├─ Err(Canceled) → Canceled  (silent)
//!                                                 └─ Err(Closed)   → Abandoned (ForwardAbandoned)
//! guard dropped → lock released on every path
//! ```
//!
//! ## Rules
//! - The lock guards `last_forwarded` itself: the compare-and-update is only
//!   reachable while the lock is held, so it never runs concurrently.
//! - Cancellation is never logged as an error.

use std::sync::Arc;
use std::time::SystemTime;

use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{HandoffError, LockError},
    events::{Bus, Event, EventKind},
    state::{Identity, SourceRef},
    sync::{HandoffSender, TryMutex},
};

/// Result of one poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Another attempt held the lock.
    Skipped,
    /// Fetched state had the same timestamp as the last forwarded one.
    Duplicate,
    /// A new state was taken by the consumer.
    Forwarded,
    /// Lock or fetch failure; the next tick retries.
    Errored,
    /// The consumer went away before taking the state.
    Abandoned,
    /// Cancellation observed; nothing was forwarded.
    Canceled,
}

/// Everything an attempt needs, shared by all attempts of one poller.
pub(crate) struct PollAttempt {
    pub identity: Identity,
    pub label: Arc<str>,
    pub source: SourceRef,
    pub last_forwarded: TryMutex<Option<SystemTime>>,
    pub handoff: HandoffSender,
    pub bus: Bus,
}

impl PollAttempt {
    /// Executes one attempt for `tick`.
    pub async fn run(&self, tick: u64, token: &CancellationToken) -> AttemptOutcome {
        let mut last = match self.last_forwarded.try_lock() {
            Ok(Some(guard)) => guard,
            Ok(None) => {
                self.bus.report(self.event(EventKind::AttemptSkipped, tick));
                return AttemptOutcome::Skipped;
            }
            Err(LockError::Canceled) => return AttemptOutcome::Canceled,
            Err(e) => {
                self.bus
                    .report(self.event(EventKind::LockFailed, tick).with_error(e.to_string()));
                return AttemptOutcome::Errored;
            }
        };

        let fetched = select! {
            biased;
            _ = token.cancelled() => return AttemptOutcome::Canceled,
            res = self.source.last_state(&self.identity) => res,
        };
        let state = match fetched {
            Ok(state) => state,
            Err(e) => {
                self.bus
                    .report(self.event(EventKind::FetchFailed, tick).with_error(e.to_string()));
                return AttemptOutcome::Errored;
            }
        };

        let observed_at = state.observed_at;
        if *last == Some(observed_at) {
            self.bus.report(
                self.event(EventKind::DuplicateSkipped, tick)
                    .with_observed_at(observed_at),
            );
            return AttemptOutcome::Duplicate;
        }
        *last = Some(observed_at);

        match self.handoff.send(state, token).await {
            Ok(()) => {
                self.bus.report(
                    self.event(EventKind::StateForwarded, tick)
                        .with_observed_at(observed_at),
                );
                AttemptOutcome::Forwarded
            }
            Err(HandoffError::Canceled) => {
                // Published but not logged: abandoning on shutdown is expected.
                self.bus.publish(
                    self.event(EventKind::ForwardAbandoned, tick)
                        .with_observed_at(observed_at)
                        .with_error(HandoffError::Canceled.to_string()),
                );
                AttemptOutcome::Canceled
            }
            Err(e) => {
                self.bus.report(
                    self.event(EventKind::ForwardAbandoned, tick)
                        .with_observed_at(observed_at)
                        .with_error(e.to_string()),
                );
                AttemptOutcome::Abandoned
            }
        }
    }

    fn event(&self, kind: EventKind, tick: u64) -> Event {
        Event::new(kind)
            .with_identity(Arc::clone(&self.label))
            .with_tick(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::error::SourceError;
    use crate::state::{InitialStatus, State, StateSource};
    use crate::sync::handoff;

    struct Fixed(Result<State, SourceError>);

    #[async_trait]
    impl StateSource for Fixed {
        async fn last_state(&self, _id: &Identity) -> Result<State, SourceError> {
            self.0.clone()
        }

        async fn status(
            &self,
            _id: &Identity,
            _from: SystemTime,
            _to: SystemTime,
        ) -> Result<InitialStatus, SourceError> {
            Ok(InitialStatus::default())
        }
    }

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn attempt(
        source: Fixed,
        token: &CancellationToken,
    ) -> (PollAttempt, handoff::HandoffReceiver) {
        let (tx, rx) = handoff::channel();
        let identity = Identity::new("bitflyer", "BTC_JPY").unwrap();
        let attempt = PollAttempt {
            label: identity.to_string().into(),
            identity,
            source: Arc::new(source),
            last_forwarded: TryMutex::new(None, token.clone()),
            handoff: tx,
            bus: Bus::new(16),
        };
        (attempt, rx)
    }

    #[tokio::test]
    async fn test_forward_then_duplicate() {
        let token = CancellationToken::new();
        let (attempt, mut rx) = attempt(Fixed(Ok(State::new(at(1), 2.0, 1.0))), &token);

        let consumer = tokio::spawn(async move { rx.recv().await });
        assert_eq!(attempt.run(1, &token).await, AttemptOutcome::Forwarded);
        assert!(consumer.await.unwrap().is_some());

        assert_eq!(attempt.run(2, &token).await, AttemptOutcome::Duplicate);
        assert!(!attempt.last_forwarded.is_locked());
    }

    #[tokio::test]
    async fn test_busy_lock_skips() {
        let token = CancellationToken::new();
        let (attempt, _rx) = attempt(Fixed(Ok(State::new(at(1), 2.0, 1.0))), &token);

        let _held = attempt.last_forwarded.try_lock().unwrap().unwrap();
        assert_eq!(attempt.run(1, &token).await, AttemptOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_fetch_error_releases_lock() {
        let token = CancellationToken::new();
        let err = SourceError::Unavailable { error: "down".into() };
        let (attempt, _rx) = attempt(Fixed(Err(err)), &token);

        let mut events = attempt.bus.subscribe();
        assert_eq!(attempt.run(1, &token).await, AttemptOutcome::Errored);
        assert!(!attempt.last_forwarded.is_locked());

        let ev = events.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::FetchFailed);
        assert_eq!(ev.error.as_deref(), Some("source unavailable: down"));
    }

    #[tokio::test]
    async fn test_cancelled_token_is_silent() {
        let token = CancellationToken::new();
        let (attempt, _rx) = attempt(Fixed(Ok(State::new(at(1), 2.0, 1.0))), &token);
        let mut events = attempt.bus.subscribe();

        token.cancel();
        assert_eq!(attempt.run(1, &token).await, AttemptOutcome::Canceled);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_poisoned_lock_is_reported_and_non_fatal() {
        let token = CancellationToken::new();
        let (attempt, mut rx) = attempt(Fixed(Ok(State::new(at(1), 2.0, 1.0))), &token);
        let mut events = attempt.bus.subscribe();

        let holder = attempt.last_forwarded.clone();
        let res = tokio::spawn(async move {
            let _guard = holder.try_lock().unwrap().unwrap();
            let failing = true;
            if failing {
                panic!("attempt failed mid-update");
            }
        })
        .await;
        assert!(res.is_err());

        assert_eq!(attempt.run(1, &token).await, AttemptOutcome::Errored);
        let ev = events.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::LockFailed);
        assert_eq!(ev.tick, Some(1));
        assert_eq!(ev.error.as_deref(), Some("lock poisoned by a panicked holder"));

        attempt.last_forwarded.clear_poison();
        let consumer = tokio::spawn(async move { rx.recv().await });
        assert_eq!(attempt.run(2, &token).await, AttemptOutcome::Forwarded);
        assert!(consumer.await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_closed_consumer_abandons() {
        let token = CancellationToken::new();
        let (attempt, rx) = attempt(Fixed(Ok(State::new(at(1), 2.0, 1.0))), &token);
        drop(rx);
        assert_eq!(attempt.run(1, &token).await, AttemptOutcome::Abandoned);
    }
}
