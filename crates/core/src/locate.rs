//! Content region location.
//!
//! Tiers are tried strictly in order and the first match in document order
//! wins within a tier:
//!
//! 1. the first `<article>`
//! 2. the first element matching a content rule whose visible text is
//!    longer than [`LocatorConfig::min_text_length`]
//! 3. `<body>`
//! 4. the whole document
//!
//! Location never fails; it only widens.

use tracing::debug;

use crate::parse::{ContentRegion, Document};
use crate::selector::NodeSelector;
use crate::tree::Element;

/// Default content rules: whole class tokens, class substrings, `<main>`.
pub const DEFAULT_CONTENT_SELECTORS: &[&str] = &[
    ".blog-content",
    ".post-content",
    ".entry-content",
    ".content",
    ".article-body",
    "[class*=content]",
    "[class*=entry]",
    "[class*=post]",
    "[class*=blog]",
    "main",
];

/// Configuration for content location.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Content-like signals for the second tier; an element qualifies if any matches.
    pub rules: Vec<NodeSelector>,
    /// Visible text a second-tier candidate must exceed, in characters (default: 200).
    pub min_text_length: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        let rules = DEFAULT_CONTENT_SELECTORS
            .iter()
            .filter_map(|s| NodeSelector::parse(s).ok())
            .collect();

        Self { rules, min_text_length: 200 }
    }
}

/// Which tier produced the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatedBy {
    Article,
    ContentRule,
    Body,
    Document,
}

/// Finds the article region of `doc`.
pub fn locate_content(doc: &Document, config: &LocatorConfig) -> ContentRegion {
    locate_content_with_tier(doc, config).0
}

/// Like [`locate_content`], also reporting which tier matched.
pub fn locate_content_with_tier(doc: &Document, config: &LocatorConfig) -> (ContentRegion, LocatedBy) {
    let root = doc.root();

    let (found, tier) = if let Some(el) = root.find(|el| el.is("article")) {
        (el, LocatedBy::Article)
    } else if let Some(el) = root.find(|el| is_content_candidate(el, config)) {
        (el, LocatedBy::ContentRule)
    } else if let Some(el) = root.find(|el| el.is("body")) {
        (el, LocatedBy::Body)
    } else {
        (root, LocatedBy::Document)
    };

    debug!(?tier, tag = found.name(), "located content region");
    (ContentRegion::new(found.id()), tier)
}

/// `html` and `body` are the later tiers' regions, whatever their classes say.
fn is_content_candidate(el: &Element<'_>, config: &LocatorConfig) -> bool {
    !el.is("html")
        && !el.is("body")
        && config.rules.iter().any(|rule| rule.matches(el))
        && el.visible_text_exceeds(config.min_text_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree;

    fn long_text() -> String {
        "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(5)
    }

    fn locate(html: &str) -> (Document, ContentRegion, LocatedBy) {
        let doc = Document::parse(html).unwrap();
        let (region, tier) = locate_content_with_tier(&doc, &LocatorConfig::default());
        (doc, region, tier)
    }

    #[test]
    fn test_default_rules_all_parse() {
        assert_eq!(LocatorConfig::default().rules.len(), DEFAULT_CONTENT_SELECTORS.len());
    }

    #[test]
    fn test_article_wins() {
        let html = format!(
            r#"<body><div class="post-content"><p>{}</p></div><article id="a"><p>short</p></article></body>"#,
            long_text()
        );
        let (doc, region, tier) = locate(&html);
        assert_eq!(tier, LocatedBy::Article);
        assert_eq!(doc.region(&region).unwrap().attr("id"), Some("a"));
    }

    #[test]
    fn test_class_candidate_needs_enough_text() {
        let html = format!(
            r#"<body><div class="entry-content" id="short"><p>tiny</p></div><div class="entry-content" id="long"><p>{}</p></div></body>"#,
            long_text()
        );
        let (doc, region, tier) = locate(&html);
        assert_eq!(tier, LocatedBy::ContentRule);
        assert_eq!(doc.region(&region).unwrap().attr("id"), Some("long"));
    }

    #[test]
    fn test_substring_and_main_rules() {
        let html = format!(r#"<body><section class="my-blog-wrap"><p>{}</p></section></body>"#, long_text());
        let (doc, region, _) = locate(&html);
        assert!(doc.region(&region).unwrap().is("section"));

        let html = format!(r#"<body><nav>menu</nav><main><p>{}</p></main></body>"#, long_text());
        let (doc, region, _) = locate(&html);
        assert!(doc.region(&region).unwrap().is("main"));
    }

    #[test]
    fn test_short_main_falls_back_to_body() {
        let (doc, region, tier) = locate("<body><main><p>brief</p></main></body>");
        assert_eq!(tier, LocatedBy::Body);
        assert!(doc.region(&region).unwrap().is("body"));
    }

    #[test]
    fn test_first_in_document_order_wins() {
        let html = format!(
            r#"<body><div class="wrapper content"><div class="post-content" id="inner"><p>{}</p></div></div></body>"#,
            long_text()
        );
        let (doc, region, _) = locate(&html);
        assert_eq!(doc.region(&region).unwrap().attr("class"), Some("wrapper content"));
    }

    #[test]
    fn test_body_classes_do_not_count() {
        let html = format!(
            r#"<body class="single single-post"><div class="entry-content" id="c"><p>{}</p></div></body>"#,
            long_text()
        );
        let (doc, region, tier) = locate(&html);
        assert_eq!(tier, LocatedBy::ContentRule);
        assert_eq!(doc.region(&region).unwrap().attr("id"), Some("c"));
    }

    #[test]
    fn test_body_fallback_for_short_pages() {
        let (doc, region, tier) = locate(r#"<body><div class="content"><p>Too short.</p></div></body>"#);
        assert_eq!(tier, LocatedBy::Body);
        assert!(doc.region(&region).unwrap().is("body"));
    }

    #[test]
    fn test_custom_threshold_and_rules() {
        let doc = Document::parse(r#"<body><div class="content" id="c"><p>Short but enough.</p></div></body>"#).unwrap();
        let config = LocatorConfig { min_text_length: 5, ..Default::default() };
        let region = locate_content(&doc, &config);
        assert_eq!(doc.region(&region).unwrap().attr("id"), Some("c"));

        let doc = Document::parse(r#"<body><div id="story"><p>Short but enough.</p></div></body>"#).unwrap();
        let config = LocatorConfig { rules: vec![NodeSelector::parse("#story").unwrap()], min_text_length: 5 };
        let region = locate_content(&doc, &config);
        assert_eq!(doc.region(&region).unwrap().attr("id"), Some("story"));
    }

    #[test]
    fn test_document_fallback_without_body() {
        let mut doc = Document::parse("<p>x</p>").unwrap();
        let body = doc.root().find(|el| el.is("body")).unwrap().id();
        tree::detach(doc.tree_mut(), body);

        let (region, tier) = locate_content_with_tier(&doc, &LocatorConfig::default());
        assert_eq!(tier, LocatedBy::Document);
        assert_eq!(region.id(), doc.root().id());
    }
}
