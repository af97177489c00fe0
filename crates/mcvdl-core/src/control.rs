//! Cancellation signal shared by the pool, the retry loop and running jobs.
//!
//! The signal only moves forward: `Running` → `SoftCancel` → `HardExit`.
//! Workers read it between jobs; jobs get a `CancelToken` so long transfers
//! can notice a shutdown while they run.

use std::sync::Arc;
use tokio::sync::watch;

/// Shutdown level, ordered so that `state >= SoftCancel` means "stop starting work".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShutdownState {
    /// Normal operation.
    Running,
    /// Finish what is in flight, start nothing new.
    SoftCancel,
    /// Stop immediately.
    HardExit,
}

/// Write side of the shutdown state. Cheap to clone; all clones share one state.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<ShutdownState>>,
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ShutdownState::Running);
        Self { tx: Arc::new(tx) }
    }

    /// Current state.
    pub fn state(&self) -> ShutdownState {
        *self.tx.borrow()
    }

    /// Advance to `to`. Returns false if the signal was already at or past it.
    pub fn advance(&self, to: ShutdownState) -> bool {
        self.tx.send_if_modified(|state| {
            if to > *state {
                *state = to;
                true
            } else {
                false
            }
        })
    }

    pub fn request_soft_cancel(&self) -> bool {
        self.advance(ShutdownState::SoftCancel)
    }

    pub fn request_hard_exit(&self) -> bool {
        self.advance(ShutdownState::HardExit)
    }

    /// Read-only token handed to workers and jobs.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Resolves once the state is at least `level`.
    pub async fn wait_for(&self, level: ShutdownState) {
        self.token().reached(level).await
    }
}

/// Read side of a `CancelSignal`.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<ShutdownState>,
}

impl CancelToken {
    pub fn state(&self) -> ShutdownState {
        *self.rx.borrow()
    }

    /// True once any shutdown (soft or hard) was requested.
    pub fn is_cancelled(&self) -> bool {
        self.state() >= ShutdownState::SoftCancel
    }

    pub fn is_hard_exit(&self) -> bool {
        self.state() == ShutdownState::HardExit
    }

    /// Resolves once the state is at least `level`. Never resolves if the
    /// signal was dropped before getting there.
    pub async fn reached(&mut self, level: ShutdownState) {
        if self.rx.wait_for(|state| *state >= level).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Resolves once shutdown (soft or hard) was requested.
    pub async fn cancelled(&mut self) {
        self.reached(ShutdownState::SoftCancel).await
    }

    /// Resolves once a hard exit was requested.
    pub async fn hard_exit(&mut self) {
        self.reached(ShutdownState::HardExit).await
    }
}
