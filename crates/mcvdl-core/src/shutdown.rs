//! Two-stage interrupt handling.
//!
//! The first interrupt asks for a graceful stop (finish running downloads,
//! start nothing new); the second asks for an immediate exit. Interrupts
//! arrive on a channel so the binary can feed it from Ctrl-C and tests can
//! feed it by hand.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::control::{CancelSignal, ShutdownState};

/// Process exit code used when the user forces an exit with a second interrupt.
pub const HARD_EXIT_CODE: i32 = 255;

/// Sender half of an interrupt source.
pub type InterruptSender = mpsc::UnboundedSender<()>;
/// Receiver half of an interrupt source.
pub type Interrupts = mpsc::UnboundedReceiver<()>;

/// New interrupt channel.
pub fn interrupt_channel() -> (InterruptSender, Interrupts) {
    mpsc::unbounded_channel()
}

/// Lifecycle of a run as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
    Running,
    SoftCancelling,
    /// The pool drained (normally or after a soft cancel).
    Terminated,
    HardExit,
}

/// Drives the `CancelSignal` from interrupt events.
pub struct ShutdownController {
    signal: CancelSignal,
    interrupts: Interrupts,
}

impl ShutdownController {
    pub fn new(signal: CancelSignal, interrupts: Interrupts) -> Self {
        Self { signal, interrupts }
    }

    /// Consumes interrupts until a hard exit or until the source closes.
    /// Returns the phase reached.
    pub async fn run(mut self) -> ShutdownPhase {
        if self.interrupts.recv().await.is_none() {
            return phase_of(self.signal.state());
        }
        if self.signal.request_soft_cancel() {
            tracing::warn!("interrupt received, waiting for downloads to finish");
            tracing::warn!("press ^C again to exit instantly");
        }

        if self.interrupts.recv().await.is_none() {
            return phase_of(self.signal.state());
        }
        self.signal.request_hard_exit();
        tracing::warn!("second interrupt received, exiting immediately");
        ShutdownPhase::HardExit
    }

    /// Runs the controller as a background task.
    pub fn spawn(self) -> ShutdownHandle {
        let signal = self.signal.clone();
        ShutdownHandle {
            task: tokio::spawn(self.run()),
            signal,
        }
    }
}

fn phase_of(state: ShutdownState) -> ShutdownPhase {
    match state {
        ShutdownState::Running => ShutdownPhase::Running,
        ShutdownState::SoftCancel => ShutdownPhase::SoftCancelling,
        ShutdownState::HardExit => ShutdownPhase::HardExit,
    }
}

/// Handle to a spawned controller.
pub struct ShutdownHandle {
    task: JoinHandle<ShutdownPhase>,
    signal: CancelSignal,
}

impl ShutdownHandle {
    pub fn phase(&self) -> ShutdownPhase {
        phase_of(self.signal.state())
    }

    /// Resolves when a hard exit has been requested.
    pub async fn hard_exit_requested(&self) {
        self.signal.wait_for(ShutdownState::HardExit).await
    }

    /// Call once the pool has drained: stops listening for interrupts.
    /// Returns `Terminated` unless a hard exit already happened.
    pub fn terminate(self) -> ShutdownPhase {
        self.task.abort();
        match self.signal.state() {
            ShutdownState::HardExit => ShutdownPhase::HardExit,
            _ => ShutdownPhase::Terminated,
        }
    }
}
