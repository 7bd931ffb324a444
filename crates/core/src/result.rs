//! Extraction output.
//!
//! [`ExtractionResult`] is the whole externally visible artifact: a title,
//! the sanitized article markup and the images it references.

use serde::{Deserialize, Serialize};

use crate::images::ImageReference;
use crate::parse::Document;
use crate::tree::Element;
use crate::{Result, SiftError};

/// Output format options for an extraction result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Sanitized article HTML.
    Html,
    /// Markdown converted from the sanitized HTML.
    #[cfg(feature = "markdown")]
    Markdown,
    /// Visible text of the article.
    PlainText,
    /// The full result as JSON.
    Json,
}

/// The result of extracting one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Resolved title, or the configured placeholder.
    pub title: String,

    /// Serialized content region after sanitization, trimmed.
    pub content_html: String,

    /// Images in first-discovery order, unique by URL.
    pub images: Vec<ImageReference>,
}

/// Packages the pipeline outputs into an [`ExtractionResult`].
pub fn assemble(title: String, region: &Element<'_>, images: Vec<ImageReference>) -> ExtractionResult {
    ExtractionResult { title, content_html: region.outer_html().trim().to_string(), images }
}

impl ExtractionResult {
    /// Converts content to the specified format.
    pub fn to_format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Html => Ok(self.content_html.clone()),
            #[cfg(feature = "markdown")]
            OutputFormat::Markdown => self.to_markdown(),
            OutputFormat::PlainText => Ok(self.to_text()),
            OutputFormat::Json => self.to_json().map(|v| v.to_string()),
        }
    }

    /// Gets the result as structured JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(SiftError::from)
    }

    /// Gets the visible text of the content.
    pub fn to_text(&self) -> String {
        Document::parse(&self.content_html)
            .map(|doc| doc.text_content())
            .unwrap_or_default()
    }

    /// Gets the content as Markdown, prefixed with the title as a heading.
    #[cfg(feature = "markdown")]
    pub fn to_markdown(&self) -> Result<String> {
        let body = htmd::convert(&self.content_html)?;
        Ok(format!("# {}\n\n{}\n", self.title, body.trim()))
    }

    /// URLs of the harvested images.
    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(|img| img.url.as_str())
    }
}
