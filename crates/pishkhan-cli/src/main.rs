use pishkhan_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    logging::init();

    // Parse CLI and dispatch. Per-item crawl failures are recorded in the
    // ledger and do not reach this point; only configuration errors do.
    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("pishkhan error: {:#}", err);
        std::process::exit(1);
    }
}
