//! Crawl orchestration: the per-item state machine and the outer iteration.
//!
//! For every (date, publication) pair in ascending date order, then
//! configured publication order:
//!
//! 1. a non-empty file at the storage path means done — repair the ledger if
//!    it disagrees, no network I/O;
//! 2. a ledger entry that is already `downloaded` (or `failed`, until
//!    explicitly reset) is skipped without I/O;
//! 3. otherwise resolve + fetch under the retry policy, then record the
//!    outcome in the ledger.
//!
//! Per-item errors become ledger transitions and log lines; they never abort
//! the run. The pacing delay runs after every item regardless of outcome.

use crate::calendar::SolarDate;
use crate::config::{CrawlConfig, ResolverBackend};
use crate::dates::date_range;
use crate::error::CrawlError;
use crate::http::HttpOptions;
use crate::ledger::{Status, StatusLedger};
use crate::resolver::{ArtifactResolver, PageScanResolver, RedirectResolver};
use crate::retry::{run_with_retry, PacingPolicy, RetryPolicy};
use crate::store;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use url::Url;

/// Downloads a resolved URL into a destination path. Split from the resolver
/// so the crawler can be exercised without a network.
pub trait ArtifactFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), CrawlError>;
}

/// Production fetcher: HTTP GET with content-type verification.
pub struct HttpFetcher {
    http: HttpOptions,
}

impl HttpFetcher {
    pub fn new(http: HttpOptions) -> Self {
        Self { http }
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), CrawlError> {
        store::fetch_artifact(url, dest, &self.http)
    }
}

/// Final state of one work item within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Storage path already held a non-empty file.
    SkippedExisting,
    /// Ledger already recorded a settled status.
    SkippedLedger,
    Downloaded,
    Failed,
}

/// Per-run totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub downloaded: usize,
    pub failed: usize,
    pub skipped_existing: usize,
    pub skipped_ledger: usize,
}

impl CrawlReport {
    fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::SkippedExisting => self.skipped_existing += 1,
            ItemOutcome::SkippedLedger => self.skipped_ledger += 1,
            ItemOutcome::Downloaded => self.downloaded += 1,
            ItemOutcome::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.downloaded + self.failed + self.skipped_existing + self.skipped_ledger
    }
}

/// Drives the whole crawl. Owns the ledger for the duration of a run and
/// processes one work item at a time; the request cadence must stay close
/// to human browsing speed.
pub struct Crawler {
    config: CrawlConfig,
    resolver: Box<dyn ArtifactResolver>,
    fetcher: Box<dyn ArtifactFetcher>,
    retry: RetryPolicy,
    pacing: PacingPolicy,
}

impl Crawler {
    /// Build the production crawler from a validated configuration.
    pub fn from_config(config: CrawlConfig) -> Result<Self> {
        config.validate()?;
        let base = Url::parse(&config.viewer_base_url)
            .with_context(|| format!("invalid viewer base URL: {}", config.viewer_base_url))?;
        let http = config.http_options();
        let resolver: Box<dyn ArtifactResolver> = match config.resolver {
            ResolverBackend::Redirect => {
                Box::new(RedirectResolver::new(base, http.clone()))
            }
            ResolverBackend::PageScan => Box::new(PageScanResolver::new(base, http.clone())),
        };
        let fetcher = Box::new(HttpFetcher::new(http));
        Ok(Self::with_collaborators(config, resolver, fetcher))
    }

    /// Assemble a crawler around explicit collaborators (test seam).
    pub fn with_collaborators(
        config: CrawlConfig,
        resolver: Box<dyn ArtifactResolver>,
        fetcher: Box<dyn ArtifactFetcher>,
    ) -> Self {
        let retry = config.retry_policy();
        let pacing = config.pacing_policy();
        Crawler {
            config,
            resolver,
            fetcher,
            retry,
            pacing,
        }
    }

    /// Run the full iteration. Individual item failures are recorded, not
    /// propagated; only configuration and ledger-persistence errors abort.
    pub fn run(&self) -> Result<CrawlReport> {
        self.run_with_progress(|_, _, _| {})
    }

    /// Like [`run`](Self::run), with a callback after every work item (used
    /// by the CLI progress bar).
    pub fn run_with_progress<F>(&self, mut on_item: F) -> Result<CrawlReport>
    where
        F: FnMut(&SolarDate, &str, ItemOutcome),
    {
        let (start, end) = self.config.date_bounds()?;
        let dates = date_range(start, end)?;
        let mut ledger = StatusLedger::load_or_init(
            &self.config.ledger_path(),
            &dates,
            &self.config.publications,
        )?;

        tracing::info!(
            %start,
            %end,
            publications = self.config.publications.len(),
            items = dates.len() * self.config.publications.len(),
            "crawl started"
        );

        let mut report = CrawlReport::default();
        for date in &dates {
            for publication in &self.config.publications {
                let outcome = self.process_item(&mut ledger, date, publication)?;
                report.record(outcome);
                on_item(date, publication, outcome);
                self.pacing.pause();
            }
        }

        tracing::info!(
            downloaded = report.downloaded,
            failed = report.failed,
            skipped_existing = report.skipped_existing,
            skipped_ledger = report.skipped_ledger,
            "crawl finished"
        );
        Ok(report)
    }

    /// One pass of the per-item state machine. Returns Err only when the
    /// ledger itself cannot be read or persisted.
    fn process_item(
        &self,
        ledger: &mut StatusLedger,
        date: &SolarDate,
        publication: &str,
    ) -> Result<ItemOutcome> {
        let dest = store::artifact_path(&self.config.output_root, publication, date);

        // Filesystem check comes first, regardless of ledger state, so no
        // network call is spent on an artifact that is already on disk.
        if file_present(&dest) {
            if ledger.get(date, publication)? != Status::Downloaded {
                tracing::info!(publication, %date, "file present, repairing stale ledger entry");
                ledger.set(date, publication, Status::Downloaded)?;
            } else {
                tracing::debug!(publication, %date, "already downloaded, skipping");
            }
            return Ok(ItemOutcome::SkippedExisting);
        }

        match ledger.get(date, publication)? {
            Status::Downloaded => {
                tracing::debug!(publication, %date, "ledger records downloaded, skipping");
                return Ok(ItemOutcome::SkippedLedger);
            }
            Status::Failed => {
                // Settled negatives stay settled until explicitly reset.
                tracing::debug!(publication, %date, "ledger records failed, skipping");
                return Ok(ItemOutcome::SkippedLedger);
            }
            Status::Pending => {}
        }

        tracing::info!(publication, %date, "attempting");
        let attempt = run_with_retry(&self.retry, || {
            let url = self.resolver.resolve(publication, date)?;
            self.fetcher.fetch(&url, &dest)
        });

        match attempt {
            Ok(()) => {
                ledger.set(date, publication, Status::Downloaded)?;
                Ok(ItemOutcome::Downloaded)
            }
            Err(e) => {
                tracing::warn!(publication, %date, error = %e, "work item failed");
                ledger.set(date, publication, Status::Failed)?;
                Ok(ItemOutcome::Failed)
            }
        }
    }
}

/// Non-empty file at `path`. Empty files do not count as done; an interrupted
/// out-of-band placement must not mask a missing edition.
fn file_present(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
}
