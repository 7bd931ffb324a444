//! Content fetching from URLs, files, and stdin.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::{Result, SiftError};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 20,
            user_agent: "Mozilla/5.0 (compatible; Blogsift/0.1; +https://github.com/blogsift/blogsift)".to_string(),
        }
    }
}

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Response body.
    pub html: String,
    /// Final URL after redirects.
    pub url: Url,
}

/// Parses `url` and checks that it is absolute http(s).
pub fn parse_http_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| SiftError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(parsed),
        scheme => Err(SiftError::InvalidUrl(format!("{url}: unsupported scheme {scheme:?}, expected http or https"))),
    }
}

/// Fetches HTML content from a URL.
///
/// Follows redirects and respects the configured timeout. Responses with a
/// non-success status are errors, not pages.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<FetchedPage> {
    let parsed_url = parse_http_url(url)?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(SiftError::HttpError)?;

    let timeout = config.timeout;
    let to_sift_error = move |e: reqwest::Error| {
        if e.is_timeout() { SiftError::Timeout { timeout } } else { SiftError::HttpError(e) }
    };

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(to_sift_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(SiftError::HttpStatus { status: status.as_u16() });
    }

    let final_url = response.url().clone();
    let html = response.text().await.map_err(to_sift_error)?;
    debug!(url = %final_url, status = status.as_u16(), bytes = html.len(), "fetched url");

    Ok(FetchedPage { html, url: final_url })
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(SiftError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(SiftError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(SiftError::from)?;

    Ok(buffer)
}
