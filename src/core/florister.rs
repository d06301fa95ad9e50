//! # Florister: wires a state source, a poller and a florist together.
//!
//! ## Lifecycle
//! ```text
//! Florister::run(florist)
//!   ├─► cfg.validate()                          (startup error on failure)
//!   ├─► ShutdownSignal::register()              (startup error on failure, optional)
//!   ├─► source.status(now - lookback, now)      (startup error on failure)
//!   ├─► Poller::spawn()
//!   ├─► florist.run(token, initial, receiver)
//!   │        ▲                       ▲
//!   │        │   OS signal ─► token.cancel() ─► poller closes the channel
//!   ├─► token.cancel()                          (florist returned)
//!   ├─► poller.join()
//!   └─► florist.release()
//! ```
//!
//! Errors are surfaced in this order: florist, then poller.

use std::time::SystemTime;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    config::Config,
    core::{
        poller::{Poller, PollerReport},
        shutdown::ShutdownSignal,
    },
    error::RuntimeError,
    florist::Florist,
    state::{Identity, SourceRef},
};

/// Runtime owning the cancellation token of one monitored identity.
pub struct Florister {
    cfg: Config,
    identity: Identity,
    source: SourceRef,
    token: CancellationToken,
    handle_signals: bool,
}

impl Florister {
    /// Creates a runtime with a fresh cancellation token and OS signal handling enabled.
    pub fn new(cfg: Config, identity: Identity, source: SourceRef) -> Self {
        Self {
            cfg,
            identity,
            source,
            token: CancellationToken::new(),
            handle_signals: true,
        }
    }

    /// Uses an externally owned token instead of a fresh one.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Enables or disables cancelling on SIGINT/SIGTERM/SIGQUIT.
    pub fn with_os_signals(mut self, enabled: bool) -> Self {
        self.handle_signals = enabled;
        self
    }

    /// Token cancelling the whole pipeline.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Runs until the florist returns, an OS signal arrives, or the token is cancelled.
    pub async fn run<F: Florist>(self, mut florist: F) -> Result<PollerReport, RuntimeError> {
        let Florister {
            cfg,
            identity,
            source,
            token,
            handle_signals,
        } = self;
        cfg.validate()?;

        let signals = if handle_signals {
            Some(ShutdownSignal::register()?)
        } else {
            None
        };

        let to = SystemTime::now();
        let from = to
            .checked_sub(cfg.status_lookback)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let initial = source.status(&identity, from, to).await?;

        let (poller, states) = Poller::new(cfg, identity, source, token.clone())?;
        let poller = poller.spawn();
        let _cancel_on_drop = token.clone().drop_guard();

        if let Some(signals) = signals {
            tokio::spawn(cancel_on_signal(signals, token.clone()));
        }

        info!("Start {} {}", florist.name(), env!("CARGO_PKG_VERSION"));
        let florist_res = florist.run(token.clone(), initial, states).await;
        token.cancel();

        let poller_res = poller.join().await;
        florist.release();
        info!("Stop {}", florist.name());

        florist_res?;
        poller_res
    }
}

async fn cancel_on_signal(mut signals: ShutdownSignal, token: CancellationToken) {
    tokio::select! {
        _ = signals.recv() => {
            info!("shutdown signal received");
            token.cancel();
        }
        _ = token.cancelled() => {}
    }
}
