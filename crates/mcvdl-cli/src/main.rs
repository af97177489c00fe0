use clap::Parser;
use mcvdl_core::logging;
use mcvdl_core::shutdown::{self, HARD_EXIT_CODE};

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Log file under XDG state dir; stderr only if that fails.
    if logging::init_logging(cli.verbose).is_err() {
        logging::init_logging_stderr(cli.verbose);
    }

    let (interrupt_tx, interrupts) = shutdown::interrupt_channel();
    if let Err(err) = cli::install_interrupt_handler(interrupt_tx) {
        eprintln!("mcvdl error: {:#}", err);
        std::process::exit(1);
    }

    match cli.run(interrupts).await {
        Ok(0) => {}
        Ok(HARD_EXIT_CODE) => {
            eprintln!("\nKilled!");
            std::process::exit(HARD_EXIT_CODE);
        }
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("mcvdl error: {:#}", err);
            std::process::exit(1);
        }
    }
}
