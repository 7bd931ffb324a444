//! Sanitization of the content region down to a minimal, safe markup.
//!
//! The first pass walks the region in document order and plans steps 1-3;
//! the second runs step 4 bottom-up once those edits are applied.
//!
//! 1. remove `script`, `style`, `svg`, `noscript` subtrees
//! 2. rewrite every `<img>` to exactly `{src, alt}`, dropping images whose
//!    source is missing, a data URI, or not http(s)
//! 3. strip every attribute from every other element, anchors included, so
//!    links survive as plain inline wrappers
//! 4. collapse degenerate wrappers: unwrap attribute-less wrappers with a
//!    single element child, delete elements with no text and no image
//!
//! Image references are recorded into an [`ImageHarvester`] before the
//! attributes carrying them are dropped. Sanitizing already sanitized
//! output is a no-op.

use std::collections::HashSet;

use ego_tree::NodeId;
use ego_tree::iter::Edge;
use scraper::Node;
use tracing::debug;

use crate::images::{ImageHarvester, ImageSource, LAZY_SRC_ATTRIBUTES, img_source, normalize_image_url};
use crate::parse::{ContentRegion, Document};
use crate::tree::{self, Element};

/// Configuration for HTML sanitization
#[derive(Debug, Clone)]
pub struct SanitizeConfig {
    /// Subtrees removed outright
    pub removed_tags: Vec<String>,
    /// Lazy-load attributes read after `src`
    pub lazy_attributes: Vec<String>,
    /// Elements unwrapped when they hold a single element child
    pub wrapper_tags: Vec<String>,
    /// Elements kept even when empty
    pub keep_empty_tags: Vec<String>,
    /// `alt` text for images without one
    pub default_alt: String,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            removed_tags: owned(&["script", "style", "svg", "noscript"]),
            lazy_attributes: owned(LAZY_SRC_ATTRIBUTES),
            wrapper_tags: owned(&["div", "section", "span"]),
            keep_empty_tags: owned(&["td", "th"]),
            default_alt: "Image".to_string(),
        }
    }
}

impl SanitizeConfig {
    fn removes(&self, el: &Element<'_>) -> bool {
        self.removed_tags.iter().any(|tag| el.is(tag))
    }

    fn is_wrapper(&self, el: &Element<'_>) -> bool {
        self.wrapper_tags.iter().any(|tag| el.is(tag))
    }

    fn keeps_empty(&self, el: &Element<'_>) -> bool {
        self.keep_empty_tags.iter().any(|tag| el.is(tag))
    }
}

/// Sanitizes `region` of `doc` in place, recording image references into
/// `images`.
///
/// The region element itself is never removed or unwrapped.
pub fn sanitize(doc: &mut Document, region: &ContentRegion, config: &SanitizeConfig, images: &mut ImageHarvester) {
    let Some(root) = doc.region(region) else {
        return;
    };

    let edits = plan_rewrites(&root, config, images);
    for edit in &edits {
        edit.apply(doc);
    }
    let collapsed = collapse(doc, region, config);

    debug!(edits = edits.len(), collapsed, images = images.len(), "sanitized content region");
}

/// A pending change to one element.
enum Rewrite {
    Remove(NodeId),
    /// Replace every attribute with exactly these.
    Attributes(NodeId, Vec<(&'static str, String)>),
}

impl Rewrite {
    fn apply(&self, doc: &mut Document) {
        match self {
            Rewrite::Remove(id) => tree::detach(doc.tree_mut(), *id),
            Rewrite::Attributes(id, attrs) => {
                let attrs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
                tree::set_attributes(doc.tree_mut(), *id, &attrs);
            }
        }
    }
}

/// Steps 1-3, read-only: walks the region once in document order, records
/// images before their attributes go, and lists the edits to make.
fn plan_rewrites(root: &Element<'_>, config: &SanitizeConfig, images: &mut ImageHarvester) -> Vec<Rewrite> {
    let mut edits = Vec::new();
    let mut skipped: Option<NodeId> = None;

    for edge in root.as_element_ref().traverse() {
        let node = match edge {
            Edge::Open(node) if skipped.is_none() => node,
            Edge::Close(node) if skipped == Some(node.id()) => {
                skipped = None;
                continue;
            }
            _ => continue,
        };
        let Some(el) = Element::wrap(node) else {
            continue;
        };
        let is_root = el.id() == root.id();

        if !is_root && config.removes(&el) {
            edits.push(Rewrite::Remove(el.id()));
            skipped = Some(el.id());
            continue;
        }

        images.record_element(&el, &config.lazy_attributes);
        if el.is("img") {
            if is_root {
                continue;
            }
            match rewrite_img(&el, config, images) {
                Some(attrs) => edits.push(Rewrite::Attributes(el.id(), attrs)),
                None => {
                    edits.push(Rewrite::Remove(el.id()));
                    skipped = Some(el.id());
                }
            }
        } else if el.has_attributes() {
            edits.push(Rewrite::Attributes(el.id(), Vec::new()));
        }
    }

    edits
}

/// Reduces an image to `{src, alt}`; `None` means the image must go.
fn rewrite_img(
    img: &Element<'_>, config: &SanitizeConfig, images: &ImageHarvester,
) -> Option<Vec<(&'static str, String)>> {
    let raw = img_source(img, &config.lazy_attributes)?;
    let src = match normalize_image_url(raw, images.base_url()) {
        ImageSource::Absolute(url) => url.to_string(),
        ImageSource::Unresolved(relative) => relative,
        ImageSource::Rejected => return None,
    };
    let alt = img
        .attr("alt")
        .map(str::trim)
        .filter(|alt| !alt.is_empty())
        .unwrap_or(&config.default_alt)
        .to_string();

    Some(vec![("src", src), ("alt", alt)])
}

/// Step 4: deletes degenerate elements and unwraps single-child wrappers.
///
/// Elements are visited in reverse document order, so every descendant is
/// final by the time its ancestor is judged. Returns the number of elements
/// removed or unwrapped.
fn collapse(doc: &mut Document, region: &ContentRegion, config: &SanitizeConfig) -> usize {
    let Some(root) = doc.region(region) else {
        return 0;
    };
    let contentful = contentful_elements(&root);
    let order: Vec<NodeId> = root.descendants().skip(1).map(|el| el.id()).collect();

    let mut collapsed = 0;
    for id in order.into_iter().rev() {
        let step = match doc.element(id) {
            Some(el) if is_degenerate(&el, &contentful, config) => Collapse::Remove,
            Some(el) => match sole_element_child(&el, config) {
                Some(child) => Collapse::Unwrap(child),
                None => continue,
            },
            None => continue,
        };

        match step {
            Collapse::Remove => tree::detach(doc.tree_mut(), id),
            Collapse::Unwrap(child) => tree::replace_with_child(doc.tree_mut(), id, child),
        }
        collapsed += 1;
    }

    collapsed
}

enum Collapse {
    Remove,
    Unwrap(NodeId),
}

/// Elements whose subtree holds visible text or an image.
///
/// Computed once before collapsing: removing empty elements and unwrapping
/// wrappers never changes whether a surviving element has content.
fn contentful_elements(root: &Element<'_>) -> HashSet<NodeId> {
    let nodes: Vec<_> = root.as_element_ref().descendants().collect();
    let mut contentful = HashSet::new();

    for node in nodes.into_iter().rev() {
        let has_content = match node.value() {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Element(el) if el.name() == "img" => {
                contentful.insert(node.id());
                true
            }
            Node::Element(el) => contentful.contains(&node.id()) && !tree::is_invisible(el.name()),
            _ => false,
        };
        if has_content && let Some(parent) = node.parent() {
            contentful.insert(parent.id());
        }
    }

    contentful
}

fn is_degenerate(el: &Element<'_>, contentful: &HashSet<NodeId>, config: &SanitizeConfig) -> bool {
    !el.is_void() && !el.has_attributes() && !config.keeps_empty(el) && !contentful.contains(&el.id())
}

/// The only meaningful child of an attribute-less wrapper, if it is an
/// element. Whitespace-only text does not count.
fn sole_element_child(el: &Element<'_>, config: &SanitizeConfig) -> Option<NodeId> {
    if el.has_attributes() || !config.is_wrapper(el) {
        return None;
    }

    let mut meaningful = el
        .as_element_ref()
        .children()
        .filter(|child| !matches!(child.value(), Node::Text(text) if text.trim().is_empty()));

    match (meaningful.next(), meaningful.next()) {
        (Some(only), None) if only.value().is_element() => Some(only.id()),
        _ => None,
    }
}
