//! OS signal handling.
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGINT/SIGTERM trigger shutdown
//! - SIGHUP triggers a route table reload, not shutdown (unix only)
//! - Streams are registered once and polled for the life of the process

use std::io;

/// What a received signal asks the process to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    Shutdown,
    Reload,
}

/// Signal streams the process listens on.
#[cfg(unix)]
pub struct Signals {
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    /// Register the handlers. Must be called inside a Tokio runtime.
    pub fn new() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    /// Wait for the next signal of interest.
    pub async fn recv(&mut self) -> io::Result<SignalEvent> {
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.map(|_| SignalEvent::Shutdown),
            _ = self.terminate.recv() => Ok(SignalEvent::Shutdown),
            _ = self.hangup.recv() => Ok(SignalEvent::Reload),
        }
    }
}

#[cfg(not(unix))]
pub struct Signals;

#[cfg(not(unix))]
impl Signals {
    pub fn new() -> io::Result<Self> {
        Ok(Self)
    }

    pub async fn recv(&mut self) -> io::Result<SignalEvent> {
        tokio::signal::ctrl_c().await.map(|_| SignalEvent::Shutdown)
    }
}
