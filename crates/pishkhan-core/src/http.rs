//! Blocking HTTP GET via curl (libcurl).
//!
//! One helper shared by the resolvers and the artifact fetcher. The caller
//! decides whether redirects are followed; either way the handle reports the
//! effective URL, redirect count, status and declared content type.

use crate::error::CrawlError;
use std::time::Duration;

/// Transport knobs taken from the configuration.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

/// Outcome of one GET.
#[derive(Debug, Clone)]
pub struct PageResponse {
    /// URL the transfer ended on (equals the request URL without redirects).
    pub final_url: String,
    pub status: u32,
    /// Number of redirects curl followed.
    pub redirect_count: u32,
    /// Declared `Content-Type`, verbatim (may carry parameters).
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl PageResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Perform a GET and buffer the full body.
pub fn get(
    url: &str,
    opts: &HttpOptions,
    follow_redirects: bool,
) -> Result<PageResponse, CrawlError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.useragent(&opts.user_agent)?;
    easy.follow_location(follow_redirects)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;

    let mut body: Vec<u8> = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    let redirect_count = easy.redirect_count()?;
    let final_url = easy
        .effective_url()?
        .map(|s| s.to_string())
        .unwrap_or_else(|| url.to_string());
    let content_type = easy.content_type()?.map(|s| s.to_string());

    Ok(PageResponse {
        final_url,
        status,
        redirect_count,
        content_type,
        body,
    })
}
