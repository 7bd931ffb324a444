//! Image reference harvesting and URL normalization.
//!
//! Images are discovered from three encodings:
//!
//! - `<img>`: `src`, then lazy-load attributes, then the first `srcset` candidate
//! - `<source srcset>` inside `<picture>`
//! - `url(...)` references in inline `style` attributes
//!
//! Every candidate is normalized (protocol-relative to `https:`, relative
//! resolved against the base URL, only absolute http(s) kept) and
//! deduplicated by its normalized form, keeping first-seen order.

use std::collections::HashSet;
use std::sync::LazyLock;

use ego_tree::NodeId;
use ego_tree::iter::Edge;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::tree::Element;

/// Lazy-load attributes read after `src`, in priority order.
pub const LAZY_SRC_ATTRIBUTES: &[&str] = &["data-src", "data-lazy-src", "data-lazy", "data-original", "data-background"];

/// Subtrees never scanned for images.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "svg", "noscript"];

/// `url(...)` with a double-quoted, single-quoted or bare argument. Quoted
/// forms come first so parentheses inside quotes do not end the match.
static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)]*))\s*\)"#).expect("css url pattern is valid")
});

/// An image found in the content region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageReference {
    /// Normalized absolute URL.
    pub url: String,
    /// Final path segment of the URL, query string excluded.
    pub filename: String,
}

impl ImageReference {
    fn from_url(url: &Url) -> Self {
        Self { url: url.to_string(), filename: filename_for(url) }
    }
}

/// Outcome of normalizing one raw image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Absolute http(s) URL.
    Absolute(Url),
    /// Relative reference that could not be resolved for lack of a base URL.
    Unresolved(String),
    /// Empty, a data URI, or a non-http(s) scheme.
    Rejected,
}

/// Normalizes a raw image URL against an optional base.
pub fn normalize_image_url(raw: &str, base: Option<&Url>) -> ImageSource {
    let raw = raw.trim();
    if raw.is_empty() {
        return ImageSource::Rejected;
    }

    let candidate = match raw.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => raw.to_string(),
    };

    match Url::parse(&candidate) {
        Ok(url) if is_http(&url) => ImageSource::Absolute(url),
        Ok(_) => ImageSource::Rejected,
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => match base.join(&candidate) {
                Ok(url) if is_http(&url) => ImageSource::Absolute(url),
                _ => ImageSource::Rejected,
            },
            None => ImageSource::Unresolved(candidate),
        },
        Err(_) => ImageSource::Rejected,
    }
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host().is_some()
}

/// Final non-empty path segment of `url`, or `"image"`.
fn filename_for(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("image")
        .to_string()
}

/// First URL token of a `srcset` value.
pub fn first_srcset_url(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .next()
        .and_then(|candidate| candidate.split_whitespace().next())
        .filter(|url| !url.is_empty())
}

/// Effective source of an `<img>`: `src`, then each of `lazy_attributes`,
/// then the first `srcset` candidate. Blank values count as absent.
pub fn img_source<'a>(img: &Element<'a>, lazy_attributes: &[String]) -> Option<&'a str> {
    let present = |name: &str| img.attr(name).map(str::trim).filter(|v| !v.is_empty());

    present("src")
        .or_else(|| lazy_attributes.iter().find_map(|attr| present(attr.as_str())))
        .or_else(|| present("srcset").and_then(first_srcset_url))
}

/// URL tokens inside `url(...)` references of a style string.
pub fn style_urls(style: &str) -> Vec<&str> {
    CSS_URL_RE
        .captures_iter(style)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace()))
        .filter(|url| !url.is_empty())
        .collect()
}

/// Raw image candidates carried by a single element, in discovery order.
pub fn element_image_candidates<'a>(el: &Element<'a>, lazy_attributes: &[String]) -> Vec<&'a str> {
    let mut found = Vec::new();

    if el.is("img") {
        found.extend(img_source(el, lazy_attributes));
    } else if el.is("source") {
        found.extend(el.attr("srcset").and_then(first_srcset_url));
    }

    if let Some(style) = el.attr("style") {
        found.extend(style_urls(style));
    }

    found
}

/// Accumulates normalized, deduplicated image references.
///
/// The sanitizer feeds it while rewriting the tree, since rewriting drops
/// the very attributes the references live in.
#[derive(Debug, Clone, Default)]
pub struct ImageHarvester {
    base_url: Option<Url>,
    seen: HashSet<String>,
    images: Vec<ImageReference>,
}

impl ImageHarvester {
    pub fn new(base_url: Option<Url>) -> Self {
        Self { base_url, seen: HashSet::new(), images: Vec::new() }
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Normalizes `raw` and records it if it is a new absolute http(s) URL.
    pub fn record(&mut self, raw: &str) -> ImageSource {
        let source = normalize_image_url(raw, self.base_url.as_ref());
        if let ImageSource::Absolute(url) = &source
            && self.seen.insert(url.to_string())
        {
            self.images.push(ImageReference::from_url(url));
        }
        source
    }

    /// Records every image candidate carried by `el` itself.
    pub fn record_element(&mut self, el: &Element<'_>, lazy_attributes: &[String]) {
        for raw in element_image_candidates(el, lazy_attributes) {
            self.record(raw);
        }
    }

    pub fn images(&self) -> &[ImageReference] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn into_images(self) -> Vec<ImageReference> {
        self.images
    }
}

/// Scans `region` without modifying it and returns its image references.
pub fn harvest(region: &Element<'_>, base_url: Option<&Url>) -> Vec<ImageReference> {
    let lazy: Vec<String> = LAZY_SRC_ATTRIBUTES.iter().map(|s| s.to_string()).collect();
    let mut harvester = ImageHarvester::new(base_url.cloned());
    let mut skipped: Option<NodeId> = None;

    for edge in region.as_element_ref().traverse() {
        match edge {
            Edge::Open(node) if skipped.is_none() => {
                let Some(el) = Element::wrap(node) else {
                    continue;
                };
                if SKIPPED_ELEMENTS.contains(&el.name()) {
                    skipped = Some(el.id());
                } else {
                    harvester.record_element(&el, &lazy);
                }
            }
            Edge::Close(node) if skipped == Some(node.id()) => skipped = None,
            _ => {}
        }
    }

    harvester.into_images()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;
    use rstest::rstest;

    fn base() -> Url {
        Url::parse("https://site.com/post").unwrap()
    }

    fn lazy() -> Vec<String> {
        LAZY_SRC_ATTRIBUTES.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case("//img.example.com/a.png", "https://img.example.com/a.png")]
    #[case("images/a.png", "https://site.com/images/a.png")]
    #[case("/static/b.jpg", "https://site.com/static/b.jpg")]
    #[case("  http://other.org/c.gif  ", "http://other.org/c.gif")]
    fn test_normalize_to_absolute(#[case] raw: &str, #[case] expected: &str) {
        match normalize_image_url(raw, Some(&base())) {
            ImageSource::Absolute(url) => assert_eq!(url.as_str(), expected),
            other => panic!("expected absolute for {raw}, got {other:?}"),
        }
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("data:image/png;base64,iVBORw0KGgo=")]
    #[case("javascript:alert(1)")]
    #[case("ftp://files.example.com/a.png")]
    fn test_normalize_rejects(#[case] raw: &str) {
        assert_eq!(normalize_image_url(raw, Some(&base())), ImageSource::Rejected);
    }

    #[test]
    fn test_relative_without_base_is_unresolved() {
        assert_eq!(normalize_image_url("a.png", None), ImageSource::Unresolved("a.png".to_string()));
        assert!(matches!(normalize_image_url("//cdn.x/a.png", None), ImageSource::Absolute(_)));
    }

    #[rstest]
    #[case("https://cdn.x/path/photo.jpg?w=300&h=200", "photo.jpg")]
    #[case("https://cdn.x/a.png#frag", "a.png")]
    #[case("https://cdn.x/", "image")]
    #[case("https://cdn.x/dir/", "image")]
    fn test_filename(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(filename_for(&Url::parse(url).unwrap()), expected);
    }

    #[test]
    fn test_srcset_first_token() {
        assert_eq!(first_srcset_url("a-320.jpg 320w, a-640.jpg 640w"), Some("a-320.jpg"));
        assert_eq!(first_srcset_url("  single.png  "), Some("single.png"));
        assert_eq!(first_srcset_url(""), None);
    }

    fn img_source_of(html: &str) -> Option<String> {
        let doc = Document::parse(html).unwrap();
        let img = doc.root().find(|el| el.is("img")).unwrap();
        img_source(&img, &lazy()).map(str::to_string)
    }

    #[rstest]
    #[case(r#"<img data-src="lazy.jpg" srcset="set.jpg 1x">"#, Some("lazy.jpg"))]
    #[case(r#"<img src=" " data-original="orig.jpg">"#, Some("orig.jpg"))]
    #[case(r#"<img data-background="bg.jpg" data-src="first.jpg">"#, Some("first.jpg"))]
    #[case(r#"<img srcset="set.jpg 1x, set2.jpg 2x">"#, Some("set.jpg"))]
    #[case(r#"<img alt="nothing">"#, None)]
    fn test_img_source_priority(#[case] html: &str, #[case] expected: Option<&str>) {
        assert_eq!(img_source_of(html).as_deref(), expected);
    }

    #[test]
    fn test_style_urls() {
        let urls = style_urls(r#"background-image: url("a.png"); background: URL( 'b.png' ) no-repeat, url(c.png)"#);
        assert_eq!(urls, vec!["a.png", "b.png", "c.png"]);
        assert!(style_urls("color: red").is_empty());
        assert!(style_urls("background: url()").is_empty());
    }

    #[test]
    fn test_style_urls_with_parentheses_inside_quotes() {
        let urls = style_urls(r#"background: url("a(1).png"), url('b (2).png')"#);
        assert_eq!(urls, vec!["a(1).png", "b (2).png"]);
    }

    #[test]
    fn test_harvest_all_encodings_in_order() {
        let html = r#"<body>
            <div style="background-image:url('//cdn.x/bg.jpg')"></div>
            <picture><source srcset="/img/wide.webp 2x"><img src="/img/narrow.jpg"></picture>
            <img data-lazy-src="https://cdn.x/lazy.png?v=2">
            <noscript><img src="/img/hidden.jpg"></noscript>
        </body>"#;
        let doc = Document::parse(html).unwrap();
        let images = harvest(&doc.root(), Some(&base()));

        let urls: Vec<_> = images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cdn.x/bg.jpg",
                "https://site.com/img/wide.webp",
                "https://site.com/img/narrow.jpg",
                "https://cdn.x/lazy.png?v=2",
            ]
        );
        assert_eq!(images[3].filename, "lazy.png");
    }

    #[test]
    fn test_harvester_dedups_after_normalization() {
        let mut harvester = ImageHarvester::new(Some(base()));
        harvester.record("https://site.com/a.png");
        harvester.record("/a.png");
        harvester.record("a.png");
        harvester.record("data:image/gif;base64,R0lGOD");

        assert_eq!(harvester.len(), 1);
        assert_eq!(harvester.images()[0].url, "https://site.com/a.png");
    }
}
