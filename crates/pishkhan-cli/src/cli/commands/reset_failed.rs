//! `pishkhan reset-failed` – make failed items eligible for the next run.

use anyhow::{bail, Result};
use pishkhan_core::config::CrawlConfig;
use pishkhan_core::ledger::StatusLedger;

pub fn run_reset_failed(cfg: &CrawlConfig) -> Result<()> {
    let path = cfg.ledger_path();
    if !path.exists() {
        bail!("no ledger at {}", path.display());
    }
    let mut ledger = StatusLedger::open(&path)?;
    let reset = ledger.reset_failed()?;
    if reset == 1 {
        println!("Reset 1 failed entry to pending.");
    } else {
        println!("Reset {reset} failed entries to pending.");
    }
    Ok(())
}
