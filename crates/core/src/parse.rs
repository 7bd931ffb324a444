//! HTML parsing into a [`Document`].
//!
//! # Example
//!
//! ```rust
//! use blogsift_core::parse::Document;
//!
//! let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
//! let doc = Document::parse(html).unwrap();
//! assert_eq!(doc.title(), Some("Test".to_string()));
//! ```

use ego_tree::{NodeId, Tree};
use scraper::{Html, Node};
use url::Url;

use crate::tree::{self, Element};
use crate::{Result, SiftError};

/// A parsed HTML page plus the base URL used to resolve relative links.
///
/// The document owns its tree for the duration of one extraction; pipeline
/// stages mutate it in place through a [`ContentRegion`].
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

/// Location of the article subtree inside a [`Document`].
///
/// Holds the arena id of the region's root element rather than a copy, so
/// later stages edit the document itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRegion {
    id: NodeId,
}

impl ContentRegion {
    pub fn new(id: NodeId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// Comments and processing instructions are dropped; nothing downstream
    /// reads them and they must not reach the output.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::NoContent`] if the input is blank. Malformed markup
    /// is never an error; the parser recovers the way browsers do.
    pub fn parse(html: &str) -> Result<Self> {
        if html.trim().is_empty() {
            return Err(SiftError::NoContent);
        }

        let mut html = Html::parse_document(html);
        let dropped: Vec<NodeId> = html
            .tree
            .root()
            .descendants()
            .filter(|node| matches!(node.value(), Node::Comment(_) | Node::ProcessingInstruction(_)))
            .map(|node| node.id())
            .collect();
        for id in dropped {
            tree::detach(&mut html.tree, id);
        }

        Ok(Self { html, base_url: None })
    }

    /// Parses HTML fetched from `page_url`.
    ///
    /// A `<base href>` in the page overrides the page URL for relative link
    /// resolution, resolved against the page URL itself.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidUrl`] if `page_url` is not an absolute URL.
    pub fn parse_with_url(html: &str, page_url: &str) -> Result<Self> {
        let page_url = Url::parse(page_url).map_err(|e| SiftError::InvalidUrl(format!("{page_url}: {e}")))?;
        let mut doc = Self::parse(html)?;

        let declared = doc
            .root()
            .find(|el| el.is("base") && el.attr("href").is_some_and(|h| !h.trim().is_empty()))
            .and_then(|el| el.attr("href"))
            .and_then(|href| page_url.join(href.trim()).ok());

        doc.base_url = Some(declared.unwrap_or(page_url));
        Ok(doc)
    }

    /// Gets the base URL used for resolving relative links.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// The `<html>` root element.
    pub fn root(&self) -> Element<'_> {
        Element::new(self.html.root_element())
    }

    /// Resolves a region against this document.
    pub fn region(&self, region: &ContentRegion) -> Option<Element<'_>> {
        self.element(region.id())
    }

    /// The element with arena id `id`, if it is one.
    pub fn element(&self, id: NodeId) -> Option<Element<'_>> {
        self.html.tree.get(id).and_then(Element::wrap)
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree<Node> {
        &mut self.html.tree
    }

    /// Text of the `<title>` element, trimmed, if present and non-empty.
    pub fn title(&self) -> Option<String> {
        self.root()
            .find(|el| el.is("title"))
            .map(|el| el.visible_text())
            .filter(|t| !t.is_empty())
    }

    /// Reader-visible text of the whole document.
    pub fn text_content(&self) -> String {
        self.root().visible_text()
    }
}
