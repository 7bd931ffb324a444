//! Blog article extraction.
//!
//! Takes the raw HTML of a blog post and returns its title, a sanitized copy
//! of the article markup and the images it references.
//!
//! ```rust
//! let html = r#"<html><body><h1>Hello</h1><p>World <img src="//cdn.x/a.jpg"></p></body></html>"#;
//! let result = blogsift_core::extract_with_url(html, "https://site.com/p").unwrap();
//!
//! assert_eq!(result.title, "Hello");
//! assert_eq!(result.images[0].filename, "a.jpg");
//! ```

pub mod error;
pub mod extract;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod images;
pub mod locate;
pub mod noise;
pub mod parse;
pub mod result;
pub mod sanitize;
pub mod selector;
pub mod title;
pub mod tree;

pub use error::{Result, SiftError};
pub use extract::{ExtractConfig, ExtractConfigBuilder, Extractor, extract, extract_with_url};
#[cfg(feature = "fetch")]
pub use extract::fetch_and_extract;
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, FetchedPage, fetch_file, fetch_stdin, fetch_url};
pub use images::{ImageHarvester, ImageReference, ImageSource, harvest, normalize_image_url};
pub use locate::{DEFAULT_CONTENT_SELECTORS, LocatedBy, LocatorConfig, locate_content};
pub use noise::{DEFAULT_NOISE_SELECTORS, NoiseConfig, remove_noise};
pub use parse::{ContentRegion, Document};
pub use result::{ExtractionResult, OutputFormat, assemble};
pub use sanitize::{SanitizeConfig, sanitize};
pub use selector::NodeSelector;
pub use title::{TitleConfig, resolve_title};
pub use tree::Element;
