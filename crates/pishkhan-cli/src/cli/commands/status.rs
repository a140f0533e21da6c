//! `pishkhan status` – summarize the status ledger.

use anyhow::Result;
use pishkhan_core::config::CrawlConfig;
use pishkhan_core::ledger::StatusLedger;

pub fn run_status(cfg: &CrawlConfig) -> Result<()> {
    let path = cfg.ledger_path();
    if !path.exists() {
        println!("No ledger at {} (nothing crawled yet).", path.display());
        return Ok(());
    }
    let ledger = StatusLedger::open(&path)?;
    let counts = ledger.counts();
    println!("{:<12} {}", "pending", counts.pending);
    println!("{:<12} {}", "downloaded", counts.downloaded);
    println!("{:<12} {}", "failed", counts.failed);
    println!("{:<12} {}", "total", counts.total());
    Ok(())
}
