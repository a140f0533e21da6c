//! Resolving a (publication, date) pair into a direct artifact URL.
//!
//! The crawler only depends on the [`ArtifactResolver`] trait. Two
//! implementations exist: [`RedirectResolver`] follows the server-side
//! redirect chain of the viewer page, [`PageScanResolver`] reads the page
//! body and extracts the client-side navigation target that a browser
//! session would have followed. Both honor the same contract: a URL, or
//! `NoRedirect` when the site has no edition for that day.

use crate::calendar::SolarDate;
use crate::error::CrawlError;
use crate::http::{self, HttpOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Turns a work item into the final downloadable URL.
pub trait ArtifactResolver {
    fn resolve(&self, publication: &str, date: &SolarDate) -> Result<String, CrawlError>;
}

/// Viewer page URL for one work item (`?paper=<code>&date=<YYYYMMDD>`).
pub fn viewer_url(base: &Url, publication: &str, date: &SolarDate) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("paper", publication)
        .append_pair("date", &date.compact());
    url
}

/// Resolution via the server-side redirect chain.
pub struct RedirectResolver {
    base: Url,
    http: HttpOptions,
}

impl RedirectResolver {
    pub fn new(base: Url, http: HttpOptions) -> Self {
        Self { base, http }
    }
}

impl ArtifactResolver for RedirectResolver {
    fn resolve(&self, publication: &str, date: &SolarDate) -> Result<String, CrawlError> {
        let url = viewer_url(&self.base, publication, date);
        let resp = http::get(url.as_str(), &self.http, true)?;
        if resp.status != 200 {
            return Err(CrawlError::HttpStatus {
                status: resp.status,
                url: url.into(),
            });
        }
        if resp.redirect_count == 0 {
            return Err(CrawlError::NoRedirect { url: url.into() });
        }
        tracing::debug!(publication, %date, resolved = %resp.final_url, "redirect resolved");
        Ok(resp.final_url)
    }
}

static LOCATION_ASSIGN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:window\.|top\.|document\.)?location(?:\.href)?\s*=\s*['"]([^'"]+)['"]"#)
        .expect("valid regex")
});

static META_REFRESH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)content\s*=\s*["']\s*\d+\s*;\s*url\s*=\s*([^"']+)["']"#)
        .expect("valid regex")
});

/// First client-side navigation target in a viewer page body, if any.
fn scan_navigation_target(body: &str) -> Option<&str> {
    if let Some(caps) = LOCATION_ASSIGN_RE.captures(body) {
        return caps.get(1).map(|m| m.as_str());
    }
    META_REFRESH_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Resolution by reading the viewer page itself. Stands in for a scripted
/// browser session: instead of waiting for the page script to navigate, the
/// navigation target is lifted straight out of the markup.
pub struct PageScanResolver {
    base: Url,
    http: HttpOptions,
}

impl PageScanResolver {
    pub fn new(base: Url, http: HttpOptions) -> Self {
        Self { base, http }
    }
}

impl ArtifactResolver for PageScanResolver {
    fn resolve(&self, publication: &str, date: &SolarDate) -> Result<String, CrawlError> {
        let url = viewer_url(&self.base, publication, date);
        let resp = http::get(url.as_str(), &self.http, false)?;
        if resp.status != 200 {
            return Err(CrawlError::HttpStatus {
                status: resp.status,
                url: url.into(),
            });
        }
        let body = String::from_utf8_lossy(&resp.body);
        let target = scan_navigation_target(&body)
            .ok_or_else(|| CrawlError::NoRedirect { url: url.clone().into() })?;
        let resolved = url
            .join(target)
            .map_err(|_| CrawlError::NoRedirect { url: url.into() })?;
        tracing::debug!(publication, %date, resolved = %resolved, "page scan resolved");
        Ok(resolved.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.pishkhan.com/pdfviewer.php").unwrap()
    }

    #[test]
    fn viewer_url_carries_paper_and_date() {
        let date = SolarDate::parse_compact("14040404").unwrap();
        let url = viewer_url(&base(), "JomhouriEslami", &date);
        assert_eq!(
            url.as_str(),
            "https://www.pishkhan.com/pdfviewer.php?paper=JomhouriEslami&date=14040404"
        );
    }

    #[test]
    fn scans_location_assignment() {
        let body = r#"<html><script>
            window.location = 'https://cdn.pishkhan.com/1404/04/04/JomhouriEslami.pdf';
        </script></html>"#;
        assert_eq!(
            scan_navigation_target(body),
            Some("https://cdn.pishkhan.com/1404/04/04/JomhouriEslami.pdf")
        );
    }

    #[test]
    fn scans_location_href_variant() {
        let body = r#"<script>location.href = "/archive/14040404.pdf";</script>"#;
        assert_eq!(scan_navigation_target(body), Some("/archive/14040404.pdf"));
    }

    #[test]
    fn scans_meta_refresh() {
        let body = r#"<meta http-equiv="refresh" content="0;url=https://cdn.example.com/x.pdf">"#;
        assert_eq!(
            scan_navigation_target(body),
            Some("https://cdn.example.com/x.pdf")
        );
    }

    #[test]
    fn plain_page_has_no_target() {
        let body = "<html><body>No edition was published on this date.</body></html>";
        assert_eq!(scan_navigation_target(body), None);
    }

    #[test]
    fn relative_target_joins_against_viewer_url() {
        let date = SolarDate::parse_compact("14040404").unwrap();
        let url = viewer_url(&base(), "kayhan", &date);
        let joined = url.join("/archive/14040404.pdf").unwrap();
        assert_eq!(
            joined.as_str(),
            "https://www.pishkhan.com/archive/14040404.pdf"
        );
    }
}
