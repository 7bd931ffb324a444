//! Error types for blogsift operations.
//!
//! Extraction itself is heuristic and degrades to fallbacks instead of failing,
//! so most variants here belong to the edges of the pipeline: fetching pages,
//! reading files, parsing user-supplied selectors and URLs.
//!
//! # Example
//!
//! ```rust
//! use blogsift_core::{SiftError, extract};
//!
//! match extract("   ") {
//!     Ok(result) => println!("{}", result.title),
//!     Err(SiftError::NoContent) => println!("nothing to extract"),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for extraction operations.
#[derive(Error, Debug)]
pub enum SiftError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, connection issues,
    /// and other transport-level problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The upstream server answered with a non-success status code.
    #[error("Upstream returned HTTP status {status}")]
    HttpStatus { status: u16 },

    /// Invalid URL provided.
    ///
    /// Returned when a page or base URL cannot be parsed, or uses a scheme
    /// other than http(s).
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A noise selector could not be parsed.
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// No content could be extracted from the document.
    ///
    /// Only returned for blank input; every other heuristic miss falls back
    /// to a wider content region.
    #[error("No content could be extracted from the document")]
    NoContent,

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    #[error("I/O error: {0}")]
    WriteError(#[from] std::io::Error),

    /// Output serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SiftError {
    /// Whether the error came from retrieving the page rather than from
    /// processing it.
    pub fn is_fetch_error(&self) -> bool {
        match self {
            #[cfg(feature = "fetch")]
            SiftError::HttpError(_) => true,
            SiftError::Timeout { .. } | SiftError::HttpStatus { .. } | SiftError::InvalidUrl(_) => true,
            _ => false,
        }
    }
}

/// Result type alias for SiftError.
pub type Result<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SiftError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_http_status_error() {
        let err = SiftError::HttpStatus { status: 404 };
        assert!(err.to_string().contains("404"));
        assert!(err.is_fetch_error());
    }

    #[test]
    fn test_timeout_error() {
        let err = SiftError::Timeout { timeout: 20 };
        assert!(err.to_string().contains("20"));
        assert!(err.is_fetch_error());
    }

    #[test]
    fn test_no_content_is_not_fetch_error() {
        assert!(!SiftError::NoContent.is_fetch_error());
    }

    #[test]
    fn test_invalid_selector_message() {
        let err = SiftError::InvalidSelector { selector: "div..x".into(), reason: "empty class".into() };
        let msg = err.to_string();
        assert!(msg.contains("div..x"));
        assert!(msg.contains("empty class"));
    }
}
