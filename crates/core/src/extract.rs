//! Extraction pipeline.
//!
//! [`Extractor`] runs the stages in a fixed order over one parsed document:
//! title resolution, content location, noise removal, sanitization with
//! image harvesting, and finally assembly into an [`ExtractionResult`].
//!
//! # Example
//!
//! ```rust
//! use blogsift_core::{ExtractConfig, Extractor};
//!
//! let config = ExtractConfig::builder().fallback_title("No title").build();
//! let extractor = Extractor::with_config(config);
//! let html = r#"<html><body><h1>Hello</h1><p>World</p></body></html>"#;
//! let result = extractor.extract(html, Some("https://site.com/post")).unwrap();
//! assert_eq!(result.title, "Hello");
//! ```

use tracing::debug;

use crate::images::ImageHarvester;
use crate::locate::{LocatorConfig, locate_content_with_tier};
use crate::noise::{NoiseConfig, remove_noise};
use crate::parse::Document;
use crate::result::{ExtractionResult, assemble};
use crate::sanitize::{SanitizeConfig, sanitize};
use crate::selector::NodeSelector;
use crate::title::{TitleConfig, resolve_title};
use crate::{Result, SiftError};

#[cfg(feature = "fetch")]
use crate::fetch::{FetchConfig, fetch_url};

/// Configuration for every stage of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    pub title: TitleConfig,
    pub locator: LocatorConfig,
    pub noise: NoiseConfig,
    pub sanitize: SanitizeConfig,
}

impl ExtractConfig {
    /// Creates a new builder for ExtractConfig.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::new()
    }
}

/// Builder for ExtractConfig.
///
/// ```rust
/// use blogsift_core::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .min_text_length(100)
///     .default_alt("Photo")
///     .build();
/// assert_eq!(config.locator.min_text_length, 100);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title used when the page has none.
    pub fn fallback_title(mut self, value: impl Into<String>) -> Self {
        self.config.title.fallback = value.into();
        self
    }

    /// Sets the visible-text length a class-matched region must exceed.
    pub fn min_text_length(mut self, value: usize) -> Self {
        self.config.locator.min_text_length = value;
        self
    }

    /// Adds a selector to the noise list.
    pub fn noise_selector(mut self, selector: NodeSelector) -> Self {
        self.config.noise.selectors.push(selector);
        self
    }

    /// Replaces the noise configuration.
    pub fn noise(mut self, noise: NoiseConfig) -> Self {
        self.config.noise = noise;
        self
    }

    /// Sets the `alt` text given to images without one.
    pub fn default_alt(mut self, value: impl Into<String>) -> Self {
        self.config.sanitize.default_alt = value.into();
        self
    }

    pub fn build(self) -> ExtractConfig {
        self.config
    }
}

/// Extracts the article of a blog page.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    /// Creates an extractor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Runs the pipeline on `html`.
    ///
    /// `base_url` is the page URL; relative image references are resolved
    /// against it, or against the page's `<base href>` when present.
    ///
    /// # Errors
    ///
    /// [`SiftError::InvalidUrl`] if `base_url` does not parse, and
    /// [`SiftError::NoContent`] if `html` is blank.
    pub fn extract(&self, html: &str, base_url: Option<&str>) -> Result<ExtractionResult> {
        let mut doc = match base_url {
            Some(url) => Document::parse_with_url(html, url)?,
            None => Document::parse(html)?,
        };

        let title = resolve_title(&doc, &self.config.title);
        let (region, tier) = locate_content_with_tier(&doc, &self.config.locator);

        let mut images = ImageHarvester::new(doc.base_url().cloned());
        let removed = remove_noise(&mut doc, &region, &self.config.noise);
        sanitize(&mut doc, &region, &self.config.sanitize, &mut images);

        let content = doc.region(&region).ok_or(SiftError::NoContent)?;
        debug!(?tier, removed, images = images.len(), "extracted article");
        Ok(assemble(title, &content, images.into_images()))
    }

    /// Fetches `url` and extracts it, using the final URL as base.
    #[cfg(feature = "fetch")]
    pub async fn fetch_and_extract(&self, url: &str, fetch_config: &FetchConfig) -> Result<ExtractionResult> {
        let page = fetch_url(url, fetch_config).await?;
        debug!(url = %page.url, bytes = page.html.len(), "fetched page");
        self.extract(&page.html, Some(page.url.as_str()))
    }
}

/// Extracts `html` with default settings and no base URL.
pub fn extract(html: &str) -> Result<ExtractionResult> {
    Extractor::new().extract(html, None)
}

/// Extracts `html` with default settings, resolving against `url`.
pub fn extract_with_url(html: &str, url: &str) -> Result<ExtractionResult> {
    Extractor::new().extract(html, Some(url))
}

/// Fetches and extracts `url` with default settings.
///
/// ```no_run
/// use blogsift_core::fetch_and_extract;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let result = fetch_and_extract("https://example.com/post").await?;
///     println!("{}", result.title);
///     Ok(())
/// }
/// ```
#[cfg(feature = "fetch")]
pub async fn fetch_and_extract(url: &str) -> Result<ExtractionResult> {
    Extractor::new().fetch_and_extract(url, &FetchConfig::default()).await
}
