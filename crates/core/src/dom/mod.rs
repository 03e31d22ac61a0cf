// ABOUTME: Arena-backed document tree that the cleanup passes mutate in place.
// ABOUTME: Wraps ego_tree with Element/Text/Comment nodes and the significance rule.

//! Document tree for markup cleanup.
//!
//! Nodes live in an [`ego_tree::Tree`] arena and are addressed by [`NodeId`].
//! Every slot records its parent and siblings, so unwrapping a wrapper or
//! cascading an emptiness check upward never needs shared ownership. Detached
//! subtrees stay in the arena as orphans; every traversal starts from the root.

pub mod cleaners;
pub mod parse;
pub mod serialize;

pub use ego_tree::NodeId;
use ego_tree::{NodeMut, NodeRef, Tree};

/// A single node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The root. Never removed, unwrapped or filtered.
    Document,
    Doctype(String),
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Node::Comment(_))
    }

    /// Whitespace-only text is the one kind of content that does not count.
    pub fn is_significant(&self) -> bool {
        match self {
            Node::Text(text) => !text.trim().is_empty(),
            _ => true,
        }
    }
}

/// A tagged node: name plus ordered attributes with unique keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    /// Build an element from attribute pairs. When a key repeats, the first value wins.
    pub fn with_attrs<I, K, V>(name: impl Into<String>, attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut el = Self::new(name);
        for (key, value) in attrs {
            let key = key.into();
            if el.attr(&key).is_none() {
                el.attrs.push((key, value.into()));
            }
        }
        el
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-sensitive attribute lookup.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn has_attrs(&self) -> bool {
        !self.attrs.is_empty()
    }

    /// Keep only the attributes whose key passes `keep`, preserving order.
    /// Returns how many were dropped.
    pub fn retain_attrs<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.attrs.len();
        self.attrs.retain(|(k, _)| keep(k));
        before - self.attrs.len()
    }
}

/// A rooted, ordered document tree.
#[derive(Debug, Clone)]
pub struct Document {
    tree: Tree<Node>,
}

impl Document {
    /// An empty document: a lone root.
    pub fn new() -> Self {
        Self {
            tree: Tree::new(Node::Document),
        }
    }

    pub fn root(&self) -> NodeRef<'_, Node> {
        self.tree.root()
    }

    pub fn root_id(&self) -> NodeId {
        self.tree.root().id()
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.tree.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<NodeMut<'_, Node>> {
        self.tree.get_mut(id)
    }

    /// Append `node` as the last child of `parent` and return its id.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this document.
    pub fn append(&mut self, parent: NodeId, node: Node) -> NodeId {
        let mut parent = self
            .tree
            .get_mut(parent)
            .expect("parent id belongs to this document");
        parent.append(node).id()
    }

    pub fn append_element(&mut self, parent: NodeId, element: Element) -> NodeId {
        self.append(parent, Node::Element(element))
    }

    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.append(parent, Node::Text(text.into()))
    }

    pub fn append_comment(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.append(parent, Node::Comment(text.into()))
    }

    /// Whether `id` is still reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let root = self.root_id();
        match self.tree.get(id) {
            Some(node) if node.id() == root => true,
            Some(node) => node.ancestors().any(|a| a.id() == root),
            None => false,
        }
    }

    /// Ids of all attached elements in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.root()
            .descendants()
            .filter(|n| n.value().is_element())
            .map(|n| n.id())
            .collect()
    }

    /// Number of nodes reachable from the root, root included.
    pub fn node_count(&self) -> usize {
        self.root().descendants().count()
    }

    /// Children of `id` that carry content, in order.
    pub fn significant_children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .get(id)
            .map(|node| {
                node.children()
                    .filter(|c| c.value().is_significant())
                    .map(|c| c.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Concatenated text of every Text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.tree.get(id) {
            for n in node.descendants() {
                if let Node::Text(text) = n.value() {
                    out.push_str(text);
                }
            }
        }
        out
    }

    /// Detach `id` and its subtree from the tree. The root is never detached.
    pub(crate) fn detach(&mut self, id: NodeId) -> bool {
        if id == self.root_id() {
            return false;
        }
        match self.tree.get_mut(id) {
            Some(mut node) => {
                node.detach();
                true
            }
            None => false,
        }
    }

    /// Move `child` into `id`'s position and detach `id` with whatever is left in it.
    pub(crate) fn hoist(&mut self, id: NodeId, child: NodeId) {
        if id == self.root_id() {
            return;
        }
        if let Some(mut node) = self.tree.get_mut(id) {
            node.insert_id_before(child);
            node.detach();
        }
    }

    /// Compact HTML rendering, mostly for tests and debugging.
    pub fn to_html(&self) -> String {
        serialize::serialize(self, &serialize::SerializeOptions::compact())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_text_is_insignificant() {
        assert!(!Node::Text(String::new()).is_significant());
        assert!(!Node::Text(" \n\t\u{a0}".to_string()).is_significant());
        assert!(Node::Text(" x ".to_string()).is_significant());
        assert!(Node::Comment(String::new()).is_significant());
        assert!(Node::Element(Element::new("div")).is_significant());
    }

    #[test]
    fn element_attrs_keep_first_duplicate_and_case() {
        let el = Element::with_attrs("a", [("href", "1"), ("Href", "2"), ("href", "3")]);
        let attrs: Vec<_> = el.attrs().collect();
        assert_eq!(attrs, vec![("href", "1"), ("Href", "2")]);
        assert_eq!(el.attr("HREF"), None);
    }

    #[test]
    fn retain_attrs_preserves_order() {
        let mut el = Element::with_attrs("img", [("class", "x"), ("src", "a.png"), ("alt", "A")]);
        let dropped = el.retain_attrs(|k| k != "class");
        assert_eq!(dropped, 1);
        let attrs: Vec<_> = el.attrs().collect();
        assert_eq!(attrs, vec![("src", "a.png"), ("alt", "A")]);
    }

    #[test]
    fn detach_and_attachment() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let div = doc.append_element(root, Element::new("div"));
        let p = doc.append_element(div, Element::new("p"));
        let text = doc.append_text(p, "hi");
        assert_eq!(doc.node_count(), 4);
        assert!(doc.is_attached(text));

        assert!(doc.detach(div));
        assert!(!doc.is_attached(div));
        assert!(!doc.is_attached(text));
        assert_eq!(doc.node_count(), 1);
        assert!(!doc.detach(root));
        assert!(doc.is_attached(root));
    }

    #[test]
    fn hoist_splices_child_in_place() {
        let mut doc = Document::new();
        let root = doc.root_id();
        doc.append_text(root, "a");
        let outer = doc.append_element(root, Element::new("div"));
        doc.append_text(outer, "  ");
        let inner = doc.append_element(outer, Element::new("div"));
        doc.append_text(inner, "x");
        doc.append_text(root, "b");

        doc.hoist(outer, inner);
        assert_eq!(doc.to_html(), "a<div>x</div>b");
        assert!(!doc.is_attached(outer));
    }

    #[test]
    fn significant_children_skip_whitespace() {
        let mut doc = Document::new();
        let root = doc.root_id();
        let div = doc.append_element(root, Element::new("div"));
        doc.append_text(div, "\n  ");
        let p = doc.append_element(div, Element::new("p"));
        doc.append_text(div, "\n");
        assert_eq!(doc.significant_children(div), vec![p]);
        assert_eq!(doc.elements(), vec![div, p]);
    }
}
