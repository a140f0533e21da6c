//! Crawl configuration: loaded from `~/.config/pishkhan/config.toml`.
//!
//! Everything that shapes a run lives here and is written out in full when
//! the default file is created, so repeated runs of the same configuration
//! never pick up silently changed defaults.

use crate::calendar::SolarDate;
use crate::error::CrawlError;
use crate::http::HttpOptions;
use crate::retry::{PacingPolicy, RetryPolicy};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Publication codes the archive site is known to serve.
pub const KNOWN_PUBLICATIONS: [&str; 12] = [
    "etemaad",
    "hamshahri",
    "iran",
    "kayhan",
    "shargh",
    "JomhouriEslami",
    "resalat",
    "ebtekar",
    "arman",
    "DonyayeEghtesad",
    "khorasan",
    "ghods",
];

/// Codes that currently resolve reliably; the default crawl set.
pub const DEFAULT_PUBLICATIONS: [&str; 2] = ["JomhouriEslami", "DonyayeEghtesad"];

pub const DEFAULT_VIEWER_BASE_URL: &str = "https://www.pishkhan.com/pdfviewer.php";

/// Name of the status table kept under the output root.
pub const LEDGER_FILE_NAME: &str = "status.csv";

/// Retry policy parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySection {
    /// Maximum number of attempts per work item (including the first).
    pub max_attempts: u32,
    /// Fixed cooldown in seconds between attempts.
    pub cooldown_secs: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            cooldown_secs: 3,
        }
    }
}

/// Randomized inter-item delay window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingSection {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl Default for PacingSection {
    fn default() -> Self {
        Self {
            min_secs: 5,
            max_secs: 10,
        }
    }
}

/// How viewer pages are resolved into artifact URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverBackend {
    /// Follow server-side redirects and take the final URL.
    #[default]
    Redirect,
    /// Fetch the viewer page and extract the script-driven navigation target.
    PageScan,
}

/// Full crawl configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// First date of the range, 8-digit Jalali form.
    pub start_date: String,
    /// Last date of the range (inclusive), 8-digit Jalali form.
    pub end_date: String,
    /// Publication codes to crawl, in attempt order.
    pub publications: Vec<String>,
    /// Directory artifacts and the status table are stored under.
    pub output_root: PathBuf,
    /// Viewer page endpoint taking `paper` and `date` query parameters.
    pub viewer_base_url: String,
    /// User-Agent sent on every request.
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub resolver: ResolverBackend,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub pacing: PacingSection,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_date: "14040404".to_string(),
            end_date: "14040404".to_string(),
            publications: DEFAULT_PUBLICATIONS.iter().map(|s| s.to_string()).collect(),
            output_root: PathBuf::from("newspapers"),
            viewer_base_url: DEFAULT_VIEWER_BASE_URL.to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
            resolver: ResolverBackend::default(),
            retry: RetrySection::default(),
            pacing: PacingSection::default(),
        }
    }
}

impl CrawlConfig {
    /// Parse and order-check the configured date range.
    pub fn date_bounds(&self) -> Result<(SolarDate, SolarDate), CrawlError> {
        let start = SolarDate::parse_compact(&self.start_date)?;
        let end = SolarDate::parse_compact(&self.end_date)?;
        if end < start {
            return Err(CrawlError::InvalidRange { start, end });
        }
        Ok((start, end))
    }

    /// Reject configurations that cannot produce a meaningful run.
    /// Unknown publication codes are allowed but logged, since the remote
    /// site adds titles without notice.
    pub fn validate(&self) -> Result<()> {
        self.date_bounds()?;
        if self.publications.is_empty() {
            bail!("publication list is empty");
        }
        let mut seen = HashSet::new();
        for p in &self.publications {
            if !seen.insert(p.as_str()) {
                bail!("publication {p:?} listed twice");
            }
            if !KNOWN_PUBLICATIONS.contains(&p.as_str()) {
                tracing::warn!(publication = %p, "code not in the known publication list");
            }
        }
        url::Url::parse(&self.viewer_base_url)
            .with_context(|| format!("invalid viewer base URL: {}", self.viewer_base_url))?;
        if self.pacing.min_secs > self.pacing.max_secs {
            bail!(
                "pacing window inverted: min {} > max {}",
                self.pacing.min_secs,
                self.pacing.max_secs
            );
        }
        if self.retry.max_attempts == 0 {
            bail!("retry.max_attempts must be at least 1");
        }
        Ok(())
    }

    /// Where the durable status table lives.
    pub fn ledger_path(&self) -> PathBuf {
        self.output_root.join(LEDGER_FILE_NAME)
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            user_agent: self.user_agent.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            cooldown: Duration::from_secs(self.retry.cooldown_secs),
        }
    }

    pub fn pacing_policy(&self) -> PacingPolicy {
        PacingPolicy {
            min: Duration::from_secs(self.pacing.min_secs),
            max: Duration::from_secs(self.pacing.max_secs),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pishkhan")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<CrawlConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let cfg: CrawlConfig =
        toml::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CrawlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CrawlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}
