//! Views and in-place edits over the parsed tree.
//!
//! The document stays in `scraper`'s arena (an `ego_tree::Tree`), so nodes
//! are addressed by [`NodeId`] and every walk here runs over the open/close
//! edges of a traversal instead of recursing. Nesting depth costs heap,
//! never stack.

use std::io;
use std::ops::ControlFlow;

use ego_tree::iter::Edge;
use ego_tree::{NodeId, NodeRef, Tree};
use html5ever::serialize::{AttrRef, HtmlSerializer, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, QualName, ns};
use scraper::node::Element as ElementData;
use scraper::{ElementRef, Node};

/// Elements that never have children and serialize as `<name/>`.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// Subtrees whose text is never shown to a reader.
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "svg", "template"];

/// Phrasing elements; text runs across them without a separator.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark", "q", "s", "samp",
    "small", "span", "strong", "sub", "sup", "time", "u", "var",
];

/// Whether text under an element named `name` is hidden from readers.
pub(crate) fn is_invisible(name: &str) -> bool {
    INVISIBLE_ELEMENTS.contains(&name)
}

/// A borrowed element of a parsed [`Document`](crate::parse::Document).
///
/// ```rust
/// use blogsift_core::parse::Document;
///
/// let doc = Document::parse(r#"<p class="lead">Hello <b>there</b><script>x()</script></p>"#).unwrap();
/// let p = doc.root().find(|el| el.is("p")).unwrap();
///
/// assert_eq!(p.attr("class"), Some("lead"));
/// assert_eq!(p.visible_text(), "Hello there");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub(crate) fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    pub(crate) fn wrap(node: NodeRef<'a, Node>) -> Option<Self> {
        ElementRef::wrap(node).map(Self::new)
    }

    /// Arena id of this element, stable for the life of the document.
    pub fn id(&self) -> NodeId {
        self.element.id()
    }

    /// Lowercase tag name.
    pub fn name(&self) -> &'a str {
        self.element.value().name()
    }

    pub fn is(&self, name: &str) -> bool {
        self.name() == name
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name())
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    pub fn has_attributes(&self) -> bool {
        self.element.value().attrs().next().is_some()
    }

    /// The underlying `scraper` element, for selector matching.
    pub fn as_element_ref(&self) -> ElementRef<'a> {
        self.element
    }

    /// Child elements, skipping text.
    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        self.element.child_elements().map(Self::new)
    }

    /// Elements of the subtree in document order, self first.
    pub fn descendants(&self) -> impl Iterator<Item = Element<'a>> + use<'a> {
        self.element.descendent_elements().map(Self::new)
    }

    /// First element (pre-order, self included) satisfying `pred`.
    pub fn find<P>(&self, pred: P) -> Option<Element<'a>>
    where
        P: Fn(&Element<'a>) -> bool,
    {
        self.descendants().find(|el| pred(el))
    }

    /// Reader-visible text: invisible subtrees skipped, whitespace runs
    /// collapsed to a single space, trimmed. Block-level children keep the
    /// words on either side apart.
    pub fn visible_text(&self) -> String {
        let mut text = CollapsedText::default();
        walk_visible(self.element, |piece| {
            text.push(piece);
            ControlFlow::Continue(())
        });
        text.out
    }

    /// Whether [`visible_text`](Self::visible_text) is longer than `limit`
    /// characters. Stops reading once the answer is known.
    pub fn visible_text_exceeds(&self, limit: usize) -> bool {
        let mut text = CollapsedText::default();
        let mut exceeded = false;
        walk_visible(self.element, |piece| {
            text.push(piece);
            exceeded = text.chars > limit;
            if exceeded { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        });
        exceeded
    }

    /// Serializes the element including its own tags.
    pub fn outer_html(&self) -> String {
        serialize(self.element, TraversalScope::IncludeNode)
    }

    /// Serializes the element's children.
    pub fn inner_html(&self) -> String {
        serialize(self.element, TraversalScope::ChildrenOnly(None))
    }
}

/// A step of a visible-text walk.
enum Visible<'a> {
    Text(&'a str),
    /// Start of a descendant element with this name.
    Open(&'a str),
}

/// Feeds the visible pieces of `root` to `visit` in document order.
fn walk_visible<'a>(root: ElementRef<'a>, mut visit: impl FnMut(Visible<'a>) -> ControlFlow<()>) {
    let mut hidden: Option<NodeId> = None;

    for edge in root.traverse() {
        match edge {
            Edge::Open(node) if hidden.is_none() => {
                let step = match node.value() {
                    Node::Text(text) => Visible::Text(text),
                    Node::Element(el) if is_invisible(el.name()) => {
                        hidden = Some(node.id());
                        continue;
                    }
                    Node::Element(el) if node.id() != root.id() => Visible::Open(el.name()),
                    _ => continue,
                };
                if visit(step).is_break() {
                    return;
                }
            }
            Edge::Close(node) if hidden == Some(node.id()) => hidden = None,
            _ => {}
        }
    }
}

/// Accumulates text with whitespace runs collapsed and trimmed.
#[derive(Default)]
struct CollapsedText {
    out: String,
    chars: usize,
    pending_space: bool,
}

impl CollapsedText {
    fn push(&mut self, piece: Visible<'_>) {
        match piece {
            Visible::Text(text) => {
                for c in text.chars() {
                    if c.is_whitespace() {
                        self.separate();
                        continue;
                    }
                    if self.pending_space {
                        self.out.push(' ');
                        self.chars += 1;
                        self.pending_space = false;
                    }
                    self.out.push(c);
                    self.chars += 1;
                }
            }
            Visible::Open(name) if !INLINE_ELEMENTS.contains(&name) => self.separate(),
            Visible::Open(_) => {}
        }
    }

    fn separate(&mut self) {
        self.pending_space = !self.out.is_empty();
    }
}

/// html5ever's serializer with void elements written as `<name/>`.
struct SelfClosingVoids {
    inner: HtmlSerializer<Vec<u8>>,
}

impl Serializer for SelfClosingVoids {
    fn start_elem<'a, AttrIter>(&mut self, name: QualName, attrs: AttrIter) -> io::Result<()>
    where
        AttrIter: Iterator<Item = AttrRef<'a>>,
    {
        let void = name.ns == ns!(html) && VOID_ELEMENTS.contains(&&*name.local);
        let before = self.inner.writer.len();
        self.inner.start_elem(name, attrs)?;

        let writer = &mut self.inner.writer;
        if void && writer.len() > before && writer.last() == Some(&b'>') {
            writer.pop();
            writer.extend_from_slice(b"/>");
        }
        Ok(())
    }

    fn end_elem(&mut self, name: QualName) -> io::Result<()> {
        self.inner.end_elem(name)
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.inner.write_text(text)
    }

    fn write_comment(&mut self, text: &str) -> io::Result<()> {
        self.inner.write_comment(text)
    }

    fn write_doctype(&mut self, name: &str) -> io::Result<()> {
        self.inner.write_doctype(name)
    }

    fn write_processing_instruction(&mut self, target: &str, data: &str) -> io::Result<()> {
        self.inner.write_processing_instruction(target, data)
    }
}

fn serialize(element: ElementRef<'_>, scope: TraversalScope) -> String {
    let opts = SerializeOpts { scripting_enabled: false, traversal_scope: scope.clone(), create_missing_parent: false };
    let mut serializer = SelfClosingVoids { inner: HtmlSerializer::new(Vec::new(), opts) };

    // only the in-memory writer can fail, and it does not
    if Serialize::serialize(&element, &mut serializer, scope).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&serializer.inner.writer).into_owned()
}

/// Unlinks a node and its subtree from the tree.
pub(crate) fn detach(tree: &mut Tree<Node>, id: NodeId) {
    if let Some(mut node) = tree.get_mut(id) {
        node.detach();
    }
}

/// Replaces every attribute of an element, keeping the given order.
pub(crate) fn set_attributes(tree: &mut Tree<Node>, id: NodeId, attrs: &[(&str, &str)]) {
    let Some(mut node) = tree.get_mut(id) else {
        return;
    };
    if let Node::Element(el) = node.value() {
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*name)),
                value: StrTendril::from_slice(value),
            })
            .collect();
        // rebuilt rather than edited so the cached id and classes reset
        *el = ElementData::new(el.name.clone(), attrs);
    }
}

/// Puts `child` where `wrapper` was and drops the rest of `wrapper`.
pub(crate) fn replace_with_child(tree: &mut Tree<Node>, wrapper: NodeId, child: NodeId) {
    let Some(mut node) = tree.get_mut(wrapper) else {
        return;
    };
    if wrapper == child || node.parent().is_none() {
        return;
    }
    node.insert_id_before(child);
    node.detach();
}
