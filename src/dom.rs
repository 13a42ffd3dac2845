//! In-memory document model.
//!
//! Every controller in this crate reads and writes page state through a
//! [`Document`]: an arena of elements addressed by [`NodeId`]. The model
//! carries what the widgets need from a browser DOM (tag, class list,
//! attributes, text, tree structure, focus) and nothing else. A browser host
//! mirrors these mutations onto the real DOM; tests inspect them directly.
//!
//! ## Attachment
//!
//! Removed elements stay in the arena (ids are never reused) but are marked
//! detached. Lookups by id or class only see attached elements, so a stale
//! [`NodeId`] held by a controller can never resurface in a query.

use std::collections::BTreeMap;

/// Handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            attached: false,
        }
    }
}

/// An element tree rooted at `<body>`.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    body: NodeId,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut body = Element::new("body");
        body.attached = true;
        Self {
            nodes: vec![body],
            body: NodeId(0),
            focused: None,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element. Attach it with [`Document::append_child`].
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    /// Create an element and append it to `parent` in one step.
    pub fn append(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.create_element(tag);
        self.append_child(parent, node);
        node
    }

    /// Move `child` under `parent` as its last child.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach_from_parent(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        let attached = self.nodes[parent.0].attached;
        self.set_attached(child, attached);
    }

    /// Detach `node` (and its subtree) from the document.
    pub fn remove(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        self.detach_from_parent(node);
        self.set_attached(node, false);
        if self.focused.is_some_and(|f| !self.nodes[f.0].attached) {
            self.focused = None;
        }
    }

    /// Remove every child of `node`.
    pub fn clear_children(&mut self, node: NodeId) {
        for child in self.nodes[node.0].children.clone() {
            self.remove(child);
        }
    }

    fn detach_from_parent(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn set_attached(&mut self, node: NodeId, attached: bool) {
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            self.nodes[n.0].attached = attached;
            stack.extend(self.nodes[n.0].children.iter().copied());
        }
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.nodes[node.0].attached
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Find an attached element by its `id` attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    /// All descendants of `scope` (excluding `scope`) in document order.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[scope.0].children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n.0].children.iter().rev().copied());
        }
        out
    }

    /// Descendants of `scope` carrying `class`, in document order.
    pub fn query_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    /// First descendant of `scope` carrying `class`.
    pub fn first_by_class(&self, scope: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|n| self.has_class(*n, class))
    }

    /// Descendants of `scope` that have attribute `name` set.
    pub fn query_attr(&self, scope: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.attr(*n, name).is_some())
            .collect()
    }

    /// `true` if `node` is `ancestor` or lies inside its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.nodes[n.0].parent;
        }
        false
    }

    /// Nearest element (starting at `node` itself) carrying `class`.
    pub fn closest_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if self.has_class(n, class) {
                return Some(n);
            }
            cur = self.nodes[n.0].parent;
        }
        None
    }

    /// Nearest element (starting at `node` itself) with attribute `name` set.
    pub fn closest_attr(&self, node: NodeId, name: &str) -> Option<NodeId> {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if self.attr(n, name).is_some() {
                return Some(n);
            }
            cur = self.nodes[n.0].parent;
        }
        None
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.nodes[node.0].classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        self.nodes[node.0].classes.retain(|c| c != class);
    }

    /// Add `class` when `on`, remove it otherwise.
    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        &self.nodes[node.0].classes
    }

    // ------------------------------------------------------------------
    // Attributes and text
    // ------------------------------------------------------------------

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        self.nodes[node.0].attrs.insert(name.to_string(), value.into());
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        self.nodes[node.0].attrs.remove(name);
    }

    /// Set an ARIA/boolean-ish attribute to `"true"` or `"false"`.
    pub fn set_flag(&mut self, node: NodeId, name: &str, value: bool) {
        self.set_attr(node, name, if value { "true" } else { "false" });
    }

    /// Read a `data-*` attribute: `data(node, "category")` reads `data-category`.
    pub fn data(&self, node: NodeId, key: &str) -> Option<&str> {
        self.attr(node, &format!("data-{key}"))
    }

    /// Current form value (the `value` attribute), empty when unset.
    pub fn value(&self, node: NodeId) -> &str {
        self.attr(node, "value").unwrap_or("")
    }

    pub fn text(&self, node: NodeId) -> &str {
        &self.nodes[node.0].text
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.nodes[node.0].text = text.into();
    }

    /// Own text followed by all descendant text, space separated.
    pub fn text_content(&self, node: NodeId) -> String {
        std::iter::once(node)
            .chain(self.descendants(node))
            .map(|n| self.nodes[n.0].text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Move focus to `node`. Detached elements cannot take focus.
    pub fn focus(&mut self, node: NodeId) {
        if self.is_attached(node) {
            self.focused = Some(node);
        }
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }
}

/// Fluent helper for building markup-shaped subtrees.
///
/// ```
/// use clinic_widgets::dom::{Document, ElementBuilder};
///
/// let mut doc = Document::new();
/// let body = doc.body();
/// let button = ElementBuilder::new(&mut doc, body, "button")
///     .id("next")
///     .class("carousel-next")
///     .attr("aria-label", "Next slide")
///     .finish();
/// assert_eq!(doc.get_element_by_id("next"), Some(button));
/// ```
pub struct ElementBuilder<'a> {
    doc: &'a mut Document,
    node: NodeId,
}

impl<'a> ElementBuilder<'a> {
    pub fn new(doc: &'a mut Document, parent: NodeId, tag: &str) -> Self {
        let node = doc.append(parent, tag);
        Self { doc, node }
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.doc.add_class(self.node, class);
        self
    }

    pub fn attr(self, name: &str, value: impl Into<String>) -> Self {
        self.doc.set_attr(self.node, name, value);
        self
    }

    pub fn data(self, key: &str, value: impl Into<String>) -> Self {
        self.attr(&format!("data-{key}"), value)
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.doc.set_text(self.node, text);
        self
    }

    pub fn finish(self) -> NodeId {
        self.node
    }
}
