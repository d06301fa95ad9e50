//! # Poller: timer loop, attempt tracking, and clean shutdown.
//!
//! The [`Poller`] owns a periodic timer, the lock guarding the last forwarded
//! timestamp, the send side of the handoff channel, and the set of in-flight attempts.
//!
//! ## High-level architecture
//! ```text
//! Poller::spawn()
//!   └─► loop {
//!         select! {
//!           token.cancelled()     → break
//!           ticker.tick()         → attempts.spawn(PollAttempt::run(tick))
//!           attempts.join_next()  → PollerReport::record(outcome)      (reaping)
//!         }
//!       }
//!
//! Shutdown path:
//!   token fired
//!     └─► publish ShutdownRequested
//!     └─► drain(cfg.grace):
//!            ├─ Ok (all joined)   → continue
//!            └─ Timeout exceeded  → abort_all, join, publish GraceExceeded
//!     └─► drop the last HandoffSender  → receiver observes end of stream
//!     └─► publish PollerStopped
//! ```
//!
//! ## Rules
//! - The loop only terminates via the cancellation token; attempt failures never stop it.
//! - Every attempt lives in a [`JoinSet`]; the handoff channel closes only once the set is empty,
//!   so no attempt can write after close.
//! - First tick fires one `interval` after start; missed ticks are skipped.

use std::sync::Arc;

use tokio::{
    select,
    sync::broadcast,
    task::{JoinError, JoinHandle, JoinSet},
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    core::attempt::{AttemptOutcome, PollAttempt},
    error::{ConfigError, RuntimeError},
    events::{Bus, Event, EventKind},
    state::{Identity, SourceRef},
    sync::{HandoffReceiver, TryMutex, handoff},
};

/// Counters accumulated over the poller lifetime.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollerReport {
    /// Timer ticks observed (one attempt spawned per tick).
    pub ticks: u64,
    /// States taken by the consumer.
    pub forwarded: u64,
    /// Fetched states skipped as duplicates.
    pub duplicates: u64,
    /// Ticks skipped because another attempt held the lock.
    pub skipped: u64,
    /// Lock/fetch failures, and panicked attempts.
    pub errored: u64,
    /// States dropped because the consumer went away.
    pub abandoned: u64,
    /// Attempts that observed cancellation (or were aborted past the grace period).
    pub canceled: u64,
}

impl PollerReport {
    fn record(&mut self, res: Result<AttemptOutcome, JoinError>) -> Option<JoinError> {
        match res {
            Ok(AttemptOutcome::Skipped) => self.skipped += 1,
            Ok(AttemptOutcome::Duplicate) => self.duplicates += 1,
            Ok(AttemptOutcome::Forwarded) => self.forwarded += 1,
            Ok(AttemptOutcome::Errored) => self.errored += 1,
            Ok(AttemptOutcome::Abandoned) => self.abandoned += 1,
            Ok(AttemptOutcome::Canceled) => self.canceled += 1,
            Err(e) if e.is_cancelled() => self.canceled += 1,
            Err(e) => {
                self.errored += 1;
                return Some(e);
            }
        }
        None
    }
}

/// Live-state poller for one [`Identity`].
pub struct Poller {
    cfg: Config,
    attempt: Arc<PollAttempt>,
    token: CancellationToken,
}

impl Poller {
    /// Creates a poller and the receive side of its handoff channel.
    ///
    /// Nothing runs until [`Poller::spawn`] is called.
    pub fn new(
        cfg: Config,
        identity: Identity,
        source: SourceRef,
        token: CancellationToken,
    ) -> Result<(Self, HandoffReceiver), ConfigError> {
        cfg.validate()?;
        let (tx, rx) = handoff::channel();
        let attempt = PollAttempt {
            label: identity.to_string().into(),
            identity,
            source,
            last_forwarded: TryMutex::new(None, token.clone()),
            handoff: tx,
            bus: Bus::new(cfg.bus_capacity_clamped()),
        };
        let poller = Self {
            cfg,
            attempt: Arc::new(attempt),
            token,
        };
        Ok((poller, rx))
    }

    /// Creates and immediately spawns a poller.
    ///
    /// Returns the running poller's handle and the receive-only side of the handoff channel.
    pub fn start(
        cfg: Config,
        identity: Identity,
        source: SourceRef,
        token: CancellationToken,
    ) -> Result<(PollerHandle, HandoffReceiver), ConfigError> {
        let (poller, rx) = Self::new(cfg, identity, source, token)?;
        Ok((poller.spawn(), rx))
    }

    /// Creates a receiver observing every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.attempt.bus.subscribe()
    }

    /// Spawns the timer loop onto the current tokio runtime.
    pub fn spawn(self) -> PollerHandle {
        let bus = self.attempt.bus.clone();
        PollerHandle {
            join: tokio::spawn(self.run()),
            bus,
        }
    }

    /// Runs the loop until the token fires, then shuts down cleanly.
    pub async fn run(self) -> Result<PollerReport, RuntimeError> {
        let Poller {
            cfg,
            attempt,
            token,
        } = self;
        let bus = attempt.bus.clone();
        let label = Arc::clone(&attempt.label);

        let mut report = PollerReport::default();
        let mut attempts: JoinSet<AttemptOutcome> = JoinSet::new();
        let mut ticker = time::interval_at(Instant::now() + cfg.interval, cfg.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        bus.report(Event::new(EventKind::PollerStarted).with_identity(Arc::clone(&label)));

        loop {
            select! {
                biased;
                _ = token.cancelled() => break,
                Some(res) = attempts.join_next(), if !attempts.is_empty() => {
                    if let Some(e) = report.record(res) {
                        recover_from_panic(&attempt, &e);
                    }
                }
                _ = ticker.tick() => {
                    report.ticks += 1;
                    let tick = report.ticks;
                    let attempt = Arc::clone(&attempt);
                    let token = token.clone();
                    attempts.spawn(async move { attempt.run(tick, &token).await });
                }
            }
        }

        bus.report(
            Event::new(EventKind::ShutdownRequested)
                .with_identity(Arc::clone(&label))
                .with_tick(report.ticks),
        );
        let drained = drain(&cfg, &attempt, &mut attempts, &mut report).await;
        if let Err(e) = &drained {
            bus.report(
                Event::new(EventKind::GraceExceeded)
                    .with_identity(Arc::clone(&label))
                    .with_error(e.to_string()),
            );
        }

        // Last sender: the consumer observes end of stream from here on.
        drop(attempt);
        bus.report(
            Event::new(EventKind::PollerStopped)
                .with_identity(label)
                .with_tick(report.ticks),
        );
        drained.map(|()| report)
    }
}

/// Waits for every in-flight attempt within the grace period, aborting the rest.
async fn drain(
    cfg: &Config,
    attempt: &PollAttempt,
    attempts: &mut JoinSet<AttemptOutcome>,
    report: &mut PollerReport,
) -> Result<(), RuntimeError> {
    let grace = cfg.grace;
    let done = async {
        while let Some(res) = attempts.join_next().await {
            if let Some(e) = report.record(res) {
                recover_from_panic(attempt, &e);
            }
        }
    };
    let timed = time::timeout(grace, done).await;

    match timed {
        Ok(()) => Ok(()),
        Err(_elapsed) => {
            let in_flight = attempts.len();
            attempts.abort_all();
            while let Some(res) = attempts.join_next().await {
                report.record(res);
            }
            Err(RuntimeError::GraceExceeded { grace, in_flight })
        }
    }
}

/// A panicked attempt poisons the lock; the guarded timestamp is always a valid value,
/// so the poller reports the panic and makes the lock usable again.
fn recover_from_panic(attempt: &PollAttempt, err: &JoinError) {
    attempt.bus.report(
        Event::new(EventKind::AttemptPanicked)
            .with_identity(Arc::clone(&attempt.label))
            .with_error(err.to_string()),
    );
    attempt.last_forwarded.clear_poison();
}

/// Handle to a running poller.
pub struct PollerHandle {
    join: JoinHandle<Result<PollerReport, RuntimeError>>,
    bus: Bus,
}

impl PollerHandle {
    /// Creates a receiver observing every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Returns `true` once the poller has stopped and closed the handoff channel.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the poller to stop.
    ///
    /// Resolves only after cancellation, once every attempt has exited.
    pub async fn join(self) -> Result<PollerReport, RuntimeError> {
        self.join.await.map_err(|e| RuntimeError::Join {
            error: e.to_string(),
        })?
    }
}
