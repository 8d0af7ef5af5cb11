//! Owned markup tree and the surgery primitives used by the extractors.
//!
//! The tree is a closed variant: a node is either an element or a run of text.
//! Adjacent text nodes are always merged, which gives every element a
//! well-defined *leading text* (a text node before its first element child)
//! and every element child a *trailing text* (the text node right after it).

use std::fmt::Write;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// A node in the markup tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Element(DomElement),
    Text(String),
}

impl DomNode {
    /// Returns the element if this node is one
    pub fn as_element(&self) -> Option<&DomElement> {
        match self {
            DomNode::Element(el) => Some(el),
            DomNode::Text(_) => None,
        }
    }

    fn write_text_content(&self, out: &mut String) {
        match self {
            DomNode::Element(el) => el.write_text_content(out),
            DomNode::Text(text) => out.push_str(text),
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            DomNode::Element(el) => el.write_outer_html(out),
            DomNode::Text(text) => escape_text(text, out),
        }
    }
}

/// An element with its attributes and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomElement {
    /// Lowercase tag name
    pub name: String,
    /// Attributes in source order
    pub attrs: Vec<(String, String)>,
    children: Vec<DomNode>,
}

impl DomElement {
    /// Create an element with no children
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into().to_lowercase(), attrs: Vec::new(), children: Vec::new() }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Builder-style text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Builder-style element child
    pub fn with_child(mut self, child: DomElement) -> Self {
        self.push_element(child);
        self
    }

    /// Append text, merging it into a trailing text node
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.children.last_mut() {
            Some(DomNode::Text(last)) => last.push_str(&text),
            _ => self.children.push(DomNode::Text(text)),
        }
    }

    /// Append an element child
    pub fn push_element(&mut self, child: DomElement) {
        self.children.push(DomNode::Element(child));
    }

    /// All child nodes in document order
    pub fn children(&self) -> &[DomNode] {
        &self.children
    }

    /// Get an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Whether the element has the given tag name
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Text before the first element child, if any
    pub fn leading_text(&self) -> Option<&str> {
        match self.children.first() {
            Some(DomNode::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Replace (or clear, with an empty string) the leading text
    pub fn set_leading_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        match self.children.first_mut() {
            Some(DomNode::Text(_)) if text.is_empty() => {
                self.children.remove(0);
            }
            Some(DomNode::Text(existing)) => *existing = text,
            _ if text.is_empty() => {}
            _ => self.children.insert(0, DomNode::Text(text)),
        }
    }

    /// Number of element children
    pub fn element_count(&self) -> usize {
        self.children.iter().filter(|c| matches!(c, DomNode::Element(_))).count()
    }

    /// Element children in document order
    pub fn element_children(&self) -> impl Iterator<Item = &DomElement> {
        self.children.iter().filter_map(DomNode::as_element)
    }

    /// The `index`-th element child
    pub fn element_child(&self, index: usize) -> Option<&DomElement> {
        self.element_children().nth(index)
    }

    /// Position in `children` of the `index`-th element child
    fn node_position(&self, index: usize) -> Option<usize> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, DomNode::Element(_)))
            .nth(index)
            .map(|(pos, _)| pos)
    }

    /// Text following the `index`-th element child
    pub fn trailing_text(&self, index: usize) -> Option<&str> {
        let pos = self.node_position(index)?;
        match self.children.get(pos + 1) {
            Some(DomNode::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Replace (or clear, with an empty string) the text following the `index`-th element child
    pub fn set_trailing_text(&mut self, index: usize, text: impl Into<String>) {
        let Some(pos) = self.node_position(index) else {
            return;
        };
        let text = text.into();
        match self.children.get_mut(pos + 1) {
            Some(DomNode::Text(_)) if text.is_empty() => {
                self.children.remove(pos + 1);
            }
            Some(DomNode::Text(existing)) => *existing = text,
            _ if text.is_empty() => {}
            _ => self.children.insert(pos + 1, DomNode::Text(text)),
        }
    }

    /// Detach the `index`-th element child and return it.
    ///
    /// The text that followed the child is kept: it joins the preceding
    /// sibling's trailing text, or the parent's leading text when the child
    /// was the first element.
    pub fn remove_child(&mut self, index: usize) -> Option<DomElement> {
        let pos = self.node_position(index)?;
        let DomNode::Element(removed) = self.children.remove(pos) else {
            return None;
        };

        if pos > 0
            && pos < self.children.len()
            && matches!(self.children[pos - 1], DomNode::Text(_))
            && matches!(self.children[pos], DomNode::Text(_))
            && let DomNode::Text(tail) = self.children.remove(pos)
            && let DomNode::Text(before) = &mut self.children[pos - 1]
        {
            before.push_str(&tail);
        }

        Some(removed)
    }

    /// Replace the `index`-th element child with its own children
    pub fn unwrap_child(&mut self, index: usize) {
        let Some(pos) = self.node_position(index) else {
            return;
        };
        let DomNode::Element(inner) = self.children.remove(pos) else {
            return;
        };
        let tail = self.children.split_off(pos);
        for node in inner.children {
            self.push_node(node);
        }
        for node in tail {
            self.push_node(node);
        }
    }

    fn push_node(&mut self, node: DomNode) {
        match node {
            DomNode::Text(text) => self.push_text(text),
            DomNode::Element(el) => self.push_element(el),
        }
    }

    /// Concatenation of every text node in the subtree
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.write_text_content(&mut out);
        out
    }

    fn write_text_content(&self, out: &mut String) {
        for child in &self.children {
            child.write_text_content(out);
        }
    }

    /// Inner markup: leading text, then each child's markup and trailing text
    pub fn stringify_children(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_html(&mut out);
        }
        out
    }

    /// Markup of the element including its own tags
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_outer_html(&mut out);
        out
    }

    fn write_outer_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"", name);
            escape_attr(value, out);
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&self.name.as_str()) {
            return;
        }

        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.name);
    }

    /// First descendant with the given tag name, depth-first in document order
    pub fn find_first(&self, name: &str) -> Option<&DomElement> {
        for child in self.element_children() {
            if child.is(name) {
                return Some(child);
            }
            if let Some(found) = child.find_first(name) {
                return Some(found);
            }
        }
        None
    }

    /// Mutable variant of [`DomElement::find_first`]
    pub fn find_first_mut(&mut self, name: &str) -> Option<&mut DomElement> {
        for child in self.children.iter_mut() {
            if let DomNode::Element(el) = child {
                if el.is(name) {
                    return Some(el);
                }
                if let Some(found) = el.find_first_mut(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Every descendant with the given tag name in document order
    pub fn find_all(&self, name: &str) -> Vec<&DomElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a DomElement>) {
        for child in self.element_children() {
            if child.is(name) {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }

    /// Mutable access to the raw child list, for passes that rewrite whole subtrees
    pub(crate) fn children_mut(&mut self) -> &mut Vec<DomNode> {
        &mut self.children
    }

    /// Merge any adjacent text nodes and drop empty ones
    pub(crate) fn normalize(&mut self) {
        let nodes = std::mem::take(&mut self.children);
        for node in nodes {
            self.push_node(node);
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
