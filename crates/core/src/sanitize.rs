//! Allow-list markup filter for title lines and bylines.
//!
//! Only inline formatting survives; every other element is unwrapped so its
//! text stays where it was. Unexpected direct children are logged first, since
//! they usually point at a hand-edited page worth looking at.

use std::path::Path;

use tracing::warn;

use crate::dom_tree::{DomElement, DomNode};

/// Tags kept by [`sanitize`].
pub const SAFE_HTML_TAGS: &[&str] = &[
    "b", "em", "del", "font", "i", "s", "small", "span", "strike", "strong", "sup", "sub", "u",
];

/// Attributes kept on allowed tags; everything else, `style` and `on*`
/// handlers included, is dropped.
pub const SAFE_HTML_ATTRS: &[&str] = &["class", "color", "dir", "face", "id", "lang", "size", "title"];

/// Elements removed together with their content.
const KILL_TAGS: &[&str] = &["script", "style"];

/// Options for [`sanitize`]
#[derive(Clone, Copy)]
pub struct SanitizeOptions<'a> {
    /// Replace each direct `<br>` with a single space
    pub replace_line_breaks: bool,
    /// Children for which the unexpected-tag warning is suppressed
    pub shady_exemption: &'a dyn Fn(&DomElement) -> bool,
}

impl Default for SanitizeOptions<'_> {
    fn default() -> Self {
        Self { replace_line_breaks: true, shady_exemption: &no_exemption }
    }
}

fn no_exemption(_: &DomElement) -> bool {
    false
}

/// Whether `name` is on the allow list
pub fn is_safe_tag(name: &str) -> bool {
    SAFE_HTML_TAGS.contains(&name)
}

/// Restrict `node`'s descendants to [`SAFE_HTML_TAGS`].
///
/// `source` only labels the warning for unexpected tags. Never fails.
pub fn sanitize(node: &mut DomElement, options: SanitizeOptions<'_>, source: &Path) {
    if options.replace_line_breaks {
        replace_line_breaks(node);
    }

    let shady: Vec<&str> = node
        .element_children()
        .filter(|el| !(is_safe_tag(&el.name) || (options.shady_exemption)(el)))
        .map(|el| el.name.as_str())
        .collect();
    if !shady.is_empty() {
        warn!(path = %source.display(), "Shady tags in {}: {:?}", source.display(), shady);
    }

    strip_unsafe(node);
}

/// Remove each direct `<br>`, leaving one space in its place
fn replace_line_breaks(node: &mut DomElement) {
    let mut index = 0;
    while let Some(child) = node.element_child(index) {
        if !child.is("br") {
            index += 1;
            continue;
        }
        let tail = node.trailing_text(index).unwrap_or_default();
        let spaced = format!(" {}", tail);
        node.set_trailing_text(index, spaced);
        node.remove_child(index);
    }
}

fn strip_unsafe(node: &mut DomElement) {
    let children = std::mem::take(node.children_mut());
    for child in children {
        match child {
            DomNode::Text(text) => node.push_text(text),
            DomNode::Element(el) if KILL_TAGS.contains(&el.name.as_str()) => {}
            DomNode::Element(mut el) => {
                strip_unsafe(&mut el);
                if is_safe_tag(&el.name) {
                    el.attrs.retain(|(name, _)| SAFE_HTML_ATTRS.contains(&name.to_ascii_lowercase().as_str()));
                    node.push_element(el);
                } else {
                    node.push_element(el);
                    let last = node.element_count() - 1;
                    node.unwrap_child(last);
                }
            }
        }
    }
    node.normalize();
}
