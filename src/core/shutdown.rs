//! # Cross-platform OS signal handling.
//!
//! Provides [`ShutdownSignal`]: listeners registered up front (so a registration
//! failure is a startup error), awaited later by the runtime.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Registered termination-signal listeners.
#[cfg(unix)]
pub struct ShutdownSignal {
    sigint: Signal,
    sigterm: Signal,
    sigquit: Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    /// Registers the listeners; fails if the OS refuses registration.
    pub fn register() -> std::io::Result<Self> {
        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Completes when any termination signal is received.
    pub async fn recv(&mut self) {
        tokio::select! {
            _ = self.sigint.recv()  => {},
            _ = self.sigterm.recv() => {},
            _ = self.sigquit.recv() => {},
        }
    }
}

/// Registered termination-signal listeners.
#[cfg(not(unix))]
pub struct ShutdownSignal;

#[cfg(not(unix))]
impl ShutdownSignal {
    /// Registers the listeners.
    pub fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    /// Completes when Ctrl-C is received.
    pub async fn recv(&mut self) {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
