//! Durable per-item status table.
//!
//! One plain-text table under the output root, re-read on start and flushed
//! wholesale after every transition. The flush-per-write policy trades
//! throughput for crash-safety: the table is never less current than the
//! last completed work item. The table is single-writer; only the crawler
//! (and the CLI maintenance commands) mutate it.
//!
//! On-disk layout: header `date,<pub1>,<pub2>,...`, then one row per date
//! with the 8-digit compact date and one status cell per publication.

use crate::calendar::SolarDate;
use crate::error::CrawlError;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome state of one (date, publication) work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Pending,
    Downloaded,
    Failed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Downloaded => "downloaded",
            Status::Failed => "failed",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Status::Pending),
            "downloaded" => Some(Status::Downloaded),
            "failed" => Some(Status::Failed),
            _ => None,
        }
    }
}

/// Per-status totals, for the `status` subcommand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub downloaded: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.downloaded + self.failed
    }
}

/// In-memory view of the durable table.
pub struct StatusLedger {
    path: PathBuf,
    /// Column order of the on-disk table.
    publications: Vec<String>,
    /// compact date -> publication -> status.
    rows: BTreeMap<String, BTreeMap<String, Status>>,
}

impl StatusLedger {
    /// Load the table if present, then extend it so every expected
    /// (date, publication) key exists; missing keys start as `pending`.
    /// An existing table is never replaced, only extended. Fresh or extended
    /// tables are flushed before returning.
    pub fn load_or_init(
        path: &Path,
        dates: &[SolarDate],
        publications: &[String],
    ) -> Result<Self> {
        let mut ledger = if path.exists() {
            Self::open(path)?
        } else {
            StatusLedger {
                path: path.to_path_buf(),
                publications: Vec::new(),
                rows: BTreeMap::new(),
            }
        };

        let mut grew = false;
        for p in publications {
            if !ledger.publications.contains(p) {
                ledger.publications.push(p.clone());
                grew = true;
            }
        }
        for date in dates {
            let row = ledger.rows.entry(date.compact()).or_default();
            for p in publications {
                if !row.contains_key(p) {
                    row.insert(p.clone(), Status::Pending);
                    grew = true;
                }
            }
        }
        if grew {
            ledger.flush()?;
        }
        Ok(ledger)
    }

    /// Parse an existing table without registering any keys.
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read ledger: {}", path.display()))?;
        let mut lines = data.lines();
        let header = lines
            .next()
            .ok_or_else(|| CrawlError::Ledger("empty table file".into()))?;
        let mut cols = header.split(',');
        if cols.next() != Some("date") {
            return Err(CrawlError::Ledger(format!(
                "header must start with 'date': {header:?}"
            ))
            .into());
        }
        let publications: Vec<String> = cols.map(|c| c.trim().to_string()).collect();

        let mut rows = BTreeMap::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let mut cells = line.split(',');
            let date = cells
                .next()
                .ok_or_else(|| CrawlError::Ledger(format!("malformed row: {line:?}")))?
                .trim()
                .to_string();
            let cells: Vec<&str> = cells.collect();
            if cells.len() > publications.len() {
                return Err(CrawlError::Ledger(format!(
                    "row for date {date} has {} status cells for {} columns",
                    cells.len(),
                    publications.len()
                ))
                .into());
            }
            let mut row = BTreeMap::new();
            for (publication, cell) in publications.iter().zip(cells) {
                let status = Status::parse(cell.trim()).ok_or_else(|| {
                    CrawlError::Ledger(format!("unknown status {cell:?} for date {date}"))
                })?;
                row.insert(publication.clone(), status);
            }
            // Rows shorter than the header come from a table extended with
            // new publications; the missing cells materialize as pending.
            for publication in &publications {
                row.entry(publication.clone()).or_insert(Status::Pending);
            }
            rows.insert(date, row);
        }

        Ok(StatusLedger {
            path: path.to_path_buf(),
            publications,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Status of one registered key.
    pub fn get(&self, date: &SolarDate, publication: &str) -> Result<Status, CrawlError> {
        self.rows
            .get(&date.compact())
            .and_then(|row| row.get(publication))
            .copied()
            .ok_or_else(|| CrawlError::UnknownKey {
                date: date.compact(),
                publication: publication.to_string(),
            })
    }

    /// Record a transition and flush the whole table to disk.
    pub fn set(&mut self, date: &SolarDate, publication: &str, status: Status) -> Result<()> {
        let cell = self
            .rows
            .get_mut(&date.compact())
            .and_then(|row| row.get_mut(publication))
            .ok_or_else(|| CrawlError::UnknownKey {
                date: date.compact(),
                publication: publication.to_string(),
            })?;
        *cell = status;
        self.flush()
    }

    /// Per-status totals across all registered keys.
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for row in self.rows.values() {
            for status in row.values() {
                match status {
                    Status::Pending => counts.pending += 1,
                    Status::Downloaded => counts.downloaded += 1,
                    Status::Failed => counts.failed += 1,
                }
            }
        }
        counts
    }

    /// Flip every `failed` entry back to `pending` so the next run retries
    /// it. Returns the number of entries reset; flushes once at the end.
    pub fn reset_failed(&mut self) -> Result<usize> {
        let mut reset = 0;
        for row in self.rows.values_mut() {
            for status in row.values_mut() {
                if *status == Status::Failed {
                    *status = Status::Pending;
                    reset += 1;
                }
            }
        }
        if reset > 0 {
            self.flush()?;
        }
        Ok(reset)
    }

    /// Serialize the whole table and swap it into place atomically, so a
    /// crash mid-write cannot truncate the previous version.
    fn flush(&self) -> Result<()> {
        let mut out = String::from("date");
        for p in &self.publications {
            out.push(',');
            out.push_str(p);
        }
        out.push('\n');
        for (date, row) in &self.rows {
            out.push_str(date);
            for p in &self.publications {
                out.push(',');
                out.push_str(row.get(p).copied().unwrap_or(Status::Pending).as_str());
            }
            out.push('\n');
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("csv.tmp");
        fs::write(&tmp, out)
            .with_context(|| format!("failed to write ledger temp: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace ledger: {}", self.path.display()))?;
        Ok(())
    }
}
