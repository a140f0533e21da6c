//! Crawl error taxonomy.
//!
//! Per-item errors (`NoRedirect`, `Transport`, `HttpStatus`, `ContentMismatch`)
//! are caught at the crawler boundary and turned into ledger transitions;
//! only configuration-time errors abort the run.

use crate::calendar::SolarDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// End of the configured range precedes the start. Fatal before any work.
    #[error("invalid range: end date {end} precedes start date {start}")]
    InvalidRange { start: SolarDate, end: SolarDate },

    /// Malformed or out-of-range solar date.
    #[error("invalid date: {0}")]
    BadDate(String),

    /// Ledger accessed with a key outside the configured range. This is an
    /// invariant violation, not an expected runtime condition.
    #[error("ledger has no entry for {publication} on {date}")]
    UnknownKey { date: String, publication: String },

    /// The viewer page answered 200 without redirecting: no edition that day.
    #[error("no redirect from viewer page: {url}")]
    NoRedirect { url: String },

    /// Transport-level failure (timeout, DNS, connection reset).
    #[error("transport error: {0}")]
    Transport(#[from] curl::Error),

    /// Non-success HTTP status without a usable redirect.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u32, url: String },

    /// The resolved URL did not yield the expected artifact type.
    #[error("expected content type {expected}, got {actual}")]
    ContentMismatch { expected: String, actual: String },

    /// Filesystem failure while storing an artifact.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),

    /// The durable status table is malformed.
    #[error("ledger: {0}")]
    Ledger(String),
}
