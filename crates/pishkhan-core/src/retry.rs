//! Bounded retry and randomized pacing.
//!
//! The retry loop wraps the resolve-then-fetch sequence for one work item.
//! It never touches the ledger; exhaustion is reported to the crawler, which
//! records the failure. The pacing delay is separate and runs once per work
//! item regardless of how many attempts were made.

use crate::error::CrawlError;
use rand::Rng;
use std::time::Duration;

/// Fixed-cooldown retry with a bounded attempt count.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            cooldown: Duration::from_secs(3),
        }
    }
}

/// Whether another attempt could plausibly change the outcome.
///
/// Transport faults and upstream HTTP errors are transient; a viewer page
/// that did not redirect or a wrong content type will answer the same way
/// again within the run.
pub fn is_retryable(e: &CrawlError) -> bool {
    matches!(
        e,
        CrawlError::Transport(_) | CrawlError::HttpStatus { .. }
    )
}

/// Runs a closure until it succeeds, the error is not retryable, or the
/// attempt bound is reached. Sleeps the fixed cooldown between attempts and
/// logs each retry. Returns the last error on exhaustion.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, mut f: F) -> Result<T, CrawlError>
where
    F: FnMut() -> Result<T, CrawlError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                if attempt >= policy.max_attempts || !is_retryable(&e) {
                    return Err(e);
                }
                tracing::warn!(attempt, error = %e, "attempt failed, retrying after cooldown");
                std::thread::sleep(policy.cooldown);
                attempt += 1;
            }
        }
    }
}

/// Uniformly random delay window applied after every work item, to keep the
/// request cadence near human browsing speed.
#[derive(Debug, Clone, Copy)]
pub struct PacingPolicy {
    pub min: Duration,
    pub max: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(5),
            max: Duration::from_secs(10),
        }
    }
}

impl PacingPolicy {
    /// Draw one delay from the window.
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    /// Sleep for one sampled delay.
    pub fn pause(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "pacing");
            std::thread::sleep(delay);
        }
    }
}
