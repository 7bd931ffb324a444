//! CSS selectors for user-configurable element rules.
//!
//! A thin wrapper over [`scraper::Selector`] that remembers its source text,
//! so selectors given on the command line or in a config can be printed back
//! and compared.
//!
//! ```rust
//! use blogsift_core::selector::NodeSelector;
//!
//! let sel: NodeSelector = "header .entry-meta".parse().unwrap();
//! assert_eq!(sel.to_string(), "header .entry-meta");
//! ```

use std::fmt;
use std::str::FromStr;

use scraper::Selector;

use crate::tree::Element;
use crate::{Result, SiftError};

/// A parsed CSS selector list.
#[derive(Debug, Clone)]
pub struct NodeSelector {
    source: String,
    selector: Selector,
}

impl NodeSelector {
    /// Parses a selector.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidSelector`] for anything the CSS parser
    /// rejects, including an empty string.
    pub fn parse(selector: &str) -> Result<Self> {
        let source = selector.trim();
        let invalid = |reason: String| SiftError::InvalidSelector { selector: source.to_string(), reason };

        if source.is_empty() {
            return Err(invalid("selector is empty".to_string()));
        }
        let parsed = Selector::parse(source).map_err(|e| invalid(e.to_string()))?;

        Ok(Self { source: source.to_string(), selector: parsed })
    }

    /// Whether `el` matches, judged in the context of its document.
    pub fn matches(&self, el: &Element<'_>) -> bool {
        self.selector.matches(&el.as_element_ref())
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for NodeSelector {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for NodeSelector {}

impl FromStr for NodeSelector {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for NodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
