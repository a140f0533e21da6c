//! `pishkhan run` – crawl the configured range.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use pishkhan_core::config::CrawlConfig;
use pishkhan_core::crawler::{Crawler, ItemOutcome};
use pishkhan_core::dates::date_range;

pub fn run_crawl(mut cfg: CrawlConfig, start: Option<String>, end: Option<String>) -> Result<()> {
    if let Some(start) = start {
        cfg.start_date = start;
    }
    if let Some(end) = end {
        cfg.end_date = end;
    }
    cfg.validate()?;

    let (first, last) = cfg.date_bounds()?;
    let total = date_range(first, last)?.len() * cfg.publications.len();

    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let crawler = Crawler::from_config(cfg)?;
    let report = crawler.run_with_progress(|date, publication, outcome| {
        bar.set_message(format!("{publication} {date}: {}", outcome_label(outcome)));
        bar.inc(1);
    })?;
    bar.finish_and_clear();

    println!(
        "downloaded {}  failed {}  already on disk {}  settled in ledger {}",
        report.downloaded, report.failed, report.skipped_existing, report.skipped_ledger
    );
    Ok(())
}

fn outcome_label(outcome: ItemOutcome) -> &'static str {
    match outcome {
        ItemOutcome::Downloaded => "downloaded",
        ItemOutcome::Failed => "failed",
        ItemOutcome::SkippedExisting => "on disk",
        ItemOutcome::SkippedLedger => "settled",
    }
}
