//! HTML loading and the filename convention for episode IDs.
//!
//! This module provides the [`Document`] type, which parses HTML with
//! `scraper` and converts the result into an owned, mutable [`DomElement`]
//! tree the extractors can perform surgery on.
//!
//! # Example
//!
//! ```rust
//! use addventure_core::parse::Document;
//!
//! let html = r#"<html><body><h1>Title [Episode 3]</h1><h3>by Someone</h3></body></html>"#;
//! let doc = Document::parse(html);
//! assert_eq!(doc.root().find_first("h1").unwrap().text_content(), "Title [Episode 3]");
//! ```

use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use encoding_rs::{Encoding, WINDOWS_1252};
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use tracing::{debug, warn};

use crate::dom_tree::DomElement;
use crate::{AddventureError, Result};

/// Bytes searched for a `<meta>` charset declaration
const CHARSET_SNIFF_LIMIT: usize = 1024;

static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*charset\s*=\s*["']?\s*([A-Za-z0-9_:.\-]+)"#).expect("charset pattern is valid")
});

/// A parsed HTML document.
///
/// The document owns its markup tree. Extraction mutates it in place, so a
/// `Document` is meant to be read by one extraction pass and then dropped.
#[derive(Debug, Clone)]
pub struct Document {
    root: DomElement,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// The parser is html5ever via `scraper`, so missing `<html>`/`<body>`
    /// wrappers are synthesized. Comments, doctypes and processing
    /// instructions are dropped; entities are decoded.
    pub fn parse(html: &str) -> Self {
        let html = Html::parse_document(html);
        Self { root: convert_element(html.root_element()) }
    }

    /// Parses raw bytes.
    ///
    /// A byte-order mark or `<meta>` charset declaration picks the encoding.
    /// Undeclared pages are read as UTF-8 when valid and as windows-1252
    /// (the usual superset of Latin-1) otherwise.
    pub fn parse_bytes(bytes: &[u8]) -> Self {
        Self::parse(&decode_html(bytes))
    }

    /// Reads and parses a document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`AddventureError::Read`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| AddventureError::Read { path: path.to_path_buf(), source })?;
        Ok(Self::parse_bytes(&bytes))
    }

    /// The `<html>` element.
    pub fn root(&self) -> &DomElement {
        &self.root
    }

    /// Mutable access to the `<html>` element.
    pub fn root_mut(&mut self) -> &mut DomElement {
        &mut self.root
    }
}

fn decode_html(bytes: &[u8]) -> Cow<'_, str> {
    let declared = Encoding::for_bom(bytes).map(|(encoding, _)| encoding).or_else(|| sniff_charset(bytes));

    let encoding = match declared {
        Some(encoding) => encoding,
        None => match std::str::from_utf8(bytes) {
            Ok(text) => return Cow::Borrowed(text),
            Err(_) => {
                debug!("No charset declared and not UTF-8, decoding as windows-1252");
                WINDOWS_1252
            }
        },
    };

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!("Malformed {} sequences replaced while decoding page", used.name());
    }
    text
}

/// Encoding named by a `<meta charset>` or `http-equiv` declaration near the top of the page
fn sniff_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(CHARSET_SNIFF_LIMIT)]);
    let label = META_CHARSET_RE.captures(&head)?.get(1)?.as_str().to_string();

    let encoding = Encoding::for_label(label.as_bytes());
    if encoding.is_none() {
        warn!("Unknown charset declared: {:?}", label);
    }
    encoding
}

fn convert_element(element: ElementRef<'_>) -> DomElement {
    let value = element.value();
    let mut out = DomElement::new(value.name());
    out.attrs = value.attrs().map(|(k, v)| (k.to_string(), v.to_string())).collect();

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_text(&**text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    out.push_element(convert_element(child_el));
                }
            }
            _ => {}
        }
    }

    out
}

/// Extracts an episode ID from a file path or link target.
///
/// The basename with its last extension removed must be a base-10 integer
/// (`"42.html"` → `Some(42)`). `index` is the archive's landing page and
/// yields `None` quietly; any other non-numeric name logs a warning.
///
/// # Example
///
/// ```rust
/// use addventure_core::id_from_path;
///
/// assert_eq!(id_from_path("dump/0/42.html"), Some(42));
/// assert_eq!(id_from_path("../index.html"), None);
/// ```
pub fn id_from_path(path: impl AsRef<Path>) -> Option<u64> {
    let path = path.as_ref();
    let name = path.file_stem()?.to_string_lossy();

    match name.parse::<u64>() {
        Ok(id) => Some(id),
        Err(_) => {
            if name != "index" {
                warn!(path = %path.display(), "Type conversion failed: int({:?})", name);
            }
            None
        }
    }
}
