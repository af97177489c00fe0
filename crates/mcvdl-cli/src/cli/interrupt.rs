//! Ctrl-C wiring: every SIGINT becomes one event on the interrupt channel.

use anyhow::{Context, Result};
use mcvdl_core::shutdown::InterruptSender;

pub fn install(tx: InterruptSender) -> Result<()> {
    ctrlc::set_handler(move || {
        // Receiver is gone once the controller reached hard exit.
        let _ = tx.send(());
    })
    .context("failed to set Ctrl-C handler")
}
