//! Removal of non-article chrome inside the content region.

use ego_tree::NodeId;
use ego_tree::iter::Edge;
use tracing::debug;

use crate::parse::{ContentRegion, Document};
use crate::selector::NodeSelector;
use crate::tree::{self, Element};

/// Selectors removed by default: meta/byline lists, tag clouds, share
/// widgets, author boxes, post navigation, button blocks, sidebars,
/// navigation, footers, header meta, forms and buttons.
pub const DEFAULT_NOISE_SELECTORS: &[&str] = &[
    "ul.entry-meta",
    "div.entry-tags",
    "div.ct-share-box",
    "div.author-box",
    "nav.post-navigation",
    "div.wp-block-buttons",
    "aside",
    "nav",
    "footer",
    "header .entry-meta",
    "form",
    "button",
    "[class*=share]",
    "[class*=tags]",
    "[class*=author]",
    "[class*=related]",
];

/// Configuration for noise removal.
#[derive(Debug, Clone)]
pub struct NoiseConfig {
    pub selectors: Vec<NodeSelector>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        let selectors = DEFAULT_NOISE_SELECTORS
            .iter()
            .filter_map(|s| NodeSelector::parse(s).ok())
            .collect();
        Self { selectors }
    }
}

impl NoiseConfig {
    /// A config that removes nothing.
    pub fn empty() -> Self {
        Self { selectors: Vec::new() }
    }

    fn matches(&self, el: &Element<'_>) -> bool {
        self.selectors.iter().any(|sel| sel.matches(el))
    }
}

/// Deletes every descendant of `region` matching a noise selector.
///
/// Matches are collected first and deleted afterwards. Selectors are judged
/// against the unmodified document, so `header .entry-meta` still sees its
/// header. A match nested inside another match is not collected separately,
/// since deleting the outer node already removes it. Returns the number of
/// subtrees removed.
pub fn remove_noise(doc: &mut Document, region: &ContentRegion, config: &NoiseConfig) -> usize {
    if config.selectors.is_empty() {
        return 0;
    }
    let Some(root) = doc.region(region) else {
        return 0;
    };

    let doomed = outermost_matches(root, config);
    let removed = doomed.len();
    for id in doomed {
        tree::detach(doc.tree_mut(), id);
    }

    debug!(removed, "removed noise subtrees");
    removed
}

fn outermost_matches(root: Element<'_>, config: &NoiseConfig) -> Vec<NodeId> {
    let mut doomed = Vec::new();
    let mut inside_match = false;

    for edge in root.as_element_ref().traverse() {
        match edge {
            Edge::Open(node) if !inside_match && node.id() != root.id() => {
                if let Some(el) = Element::wrap(node)
                    && config.matches(&el)
                {
                    doomed.push(el.id());
                    inside_match = true;
                }
            }
            Edge::Close(node) if doomed.last() == Some(&node.id()) => inside_match = false,
            _ => {}
        }
    }

    doomed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_after_noise(html: &str, config: &NoiseConfig) -> (String, usize) {
        let mut doc = Document::parse(html).unwrap();
        let body = ContentRegion::new(doc.root().find(|el| el.is("body")).unwrap().id());
        let removed = remove_noise(&mut doc, &body, config);
        (doc.region(&body).unwrap().inner_html(), removed)
    }

    fn config_with(selector: &str) -> NoiseConfig {
        NoiseConfig { selectors: vec![NodeSelector::parse(selector).unwrap()] }
    }

    #[test]
    fn test_default_selectors_all_parse() {
        assert_eq!(NoiseConfig::default().selectors.len(), DEFAULT_NOISE_SELECTORS.len());
    }

    #[test]
    fn test_removes_chrome() {
        let html = r#"<body>
            <ul class="entry-meta"><li>Posted</li></ul>
            <p>Keep me</p>
            <aside>ad</aside>
            <div class="ct-share-box">share</div>
            <nav class="post-navigation">next</nav>
            <footer>foot</footer>
            <form><button>go</button></form>
        </body>"#;
        let (out, removed) = body_after_noise(html, &NoiseConfig::default());

        assert_eq!(removed, 6);
        assert!(out.contains("<p>Keep me</p>"));
        for gone in ["Posted", "ad<", "share", "next", "foot", "go"] {
            assert!(!out.contains(gone), "{gone} should be removed from {out}");
        }
    }

    #[test]
    fn test_header_meta_only_inside_header() {
        let html = r#"<body>
            <header><h1>Title</h1><div class="entry-meta">by someone</div></header>
            <div class="entry-meta">kept meta</div>
        </body>"#;
        let (out, removed) = body_after_noise(html, &NoiseConfig::default());

        assert_eq!(removed, 1);
        assert!(out.contains("<h1>Title</h1>"));
        assert!(!out.contains("by someone"));
        assert!(out.contains("kept meta"));
    }

    #[test]
    fn test_nested_matches_do_not_fail() {
        let html = r#"<body><aside><div class="share-links"><div class="author-box">x</div></div></aside><p>y</p></body>"#;
        let (out, removed) = body_after_noise(html, &NoiseConfig::default());
        assert_eq!(removed, 1);
        assert_eq!(out, "<p>y</p>");
    }

    #[test]
    fn test_region_root_is_never_removed() {
        let mut doc = Document::parse("<body><aside><p>kept</p></aside></body>").unwrap();
        let aside = ContentRegion::new(doc.root().find(|el| el.is("aside")).unwrap().id());

        assert_eq!(remove_noise(&mut doc, &aside, &NoiseConfig::default()), 0);
        assert_eq!(doc.region(&aside).unwrap().outer_html(), "<aside><p>kept</p></aside>");
    }

    #[test]
    fn test_custom_selector() {
        let html = r#"<body><div class="newsletter">sign up</div><aside>stays</aside></body>"#;
        let (out, _) = body_after_noise(html, &config_with(".newsletter"));
        assert_eq!(out, "<aside>stays</aside>");
    }

    #[test]
    fn test_empty_config_removes_nothing() {
        let (out, removed) = body_after_noise("<body><aside>a</aside></body>", &NoiseConfig::empty());
        assert_eq!(removed, 0);
        assert_eq!(out, "<aside>a</aside>");
    }

    #[test]
    fn test_sibling_removals() {
        let html = r#"<body><aside>1</aside><p>a</p><aside>2</aside><p>b</p><aside>3</aside></body>"#;
        let (out, removed) = body_after_noise(html, &NoiseConfig::default());
        assert_eq!(removed, 3);
        assert_eq!(out, "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_deeply_nested_match() {
        let depth = 10_000;
        let html = format!("<body>{}<aside>ad</aside><p>x</p>{}</body>", "<div>".repeat(depth), "</div>".repeat(depth));
        let (out, removed) = body_after_noise(&html, &config_with("aside"));
        assert_eq!(removed, 1);
        assert!(!out.contains("ad"));
        assert!(out.contains("<p>x</p>"));
    }
}
