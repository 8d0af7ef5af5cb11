//! Title-line parsing.
//!
//! The `<h1>` of an episode page reads
//! `[<a>Thread</a>: ][tag images] Title [Episode N]`. Each step below removes
//! what it consumed from the heading, so the steps only work in this order and
//! only once per heading.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::dom_tree::DomElement;
use crate::episode::ExtractConfig;
use crate::metadata::ContentTag;
use crate::parse::id_from_path;
use crate::sanitize::{SanitizeOptions, sanitize};
use crate::{AddventureError, ExtractStep, Result};

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(: )?(?P<title>.*?) \[Episode (?P<id>\d+)\]\n?$").expect("title pattern is valid")
});

/// Separator between the thread link and the rest of the title line
const THREAD_SEPARATOR: &str = ": ";

/// Fields parsed out of the title line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleLine {
    pub thread: Option<String>,
    pub tags: Vec<ContentTag>,
    pub title: String,
    pub id: u64,
}

/// Parse the title line, consuming the thread link and tag images.
///
/// `path` is the page's own path; it labels errors and, when
/// `config.doublecheck_id` is set, must encode the same ID as the heading.
pub fn extract_title_line(heading: &mut DomElement, path: &Path, config: &ExtractConfig) -> Result<TitleLine> {
    let thread = take_thread_link(heading, path)?;
    let tags = take_tag_images(heading, path, &config.image_prefix)?;

    sanitize(heading, SanitizeOptions::default(), path);

    let (title, id) = if heading.element_count() == 0 {
        let raw = heading.text_content();
        let (title, id) = parse_title_str(&raw, path)?;
        (title.to_string(), id)
    } else {
        // Formatting survived sanitizing, so the ID sits in the last child's tail
        let last = heading.element_count() - 1;
        let raw = heading.trailing_text(last).unwrap_or_default().to_string();
        let (fragment, id) = parse_title_str(&raw, path)?;
        heading.set_trailing_text(last, fragment);
        (heading.stringify_children(), id)
    };

    let trimmed = title.trim();
    if title.starts_with(THREAD_SEPARATOR) || trimmed.starts_with(THREAD_SEPARATOR) {
        return Err(AddventureError::missing(path, ExtractStep::TitlePrefix, format!("{:?}", title)));
    }
    if trimmed.is_empty() {
        return Err(AddventureError::missing(path, ExtractStep::TitlePrefix, "empty title"));
    }
    let title = trimmed.to_string();

    if config.doublecheck_id {
        let expected = id_from_path(path);
        if expected != Some(id) {
            return Err(AddventureError::missing(
                path,
                ExtractStep::IdCrossCheck,
                format!("{:?} != {}", expected, id),
            ));
        }
    }

    debug!(path = %path.display(), id, title = %title, "parsed title line");
    Ok(TitleLine { thread, tags, title, id })
}

/// Remove a leading thread link and its `": "` separator, returning the link text
fn take_thread_link(heading: &mut DomElement, path: &Path) -> Result<Option<String>> {
    let Some(link) = heading.element_child(0).filter(|el| el.is("a")) else {
        return Ok(None);
    };

    if let Some(text) = heading.leading_text() {
        return Err(AddventureError::missing(
            path,
            ExtractStep::ThreadSeparator,
            format!("text before thread link: {:?}", text),
        ));
    }

    let Some(tail) = heading.trailing_text(0) else {
        return Err(AddventureError::missing(
            path,
            ExtractStep::ThreadSeparator,
            format!("nothing follows {}", link.outer_html()),
        ));
    };

    let Some(rest) = tail.strip_prefix(THREAD_SEPARATOR) else {
        return Err(AddventureError::missing(path, ExtractStep::ThreadSeparator, format!("{:?}", tail)));
    };

    let rest = rest.to_string();
    heading.set_trailing_text(0, rest);
    Ok(heading.remove_child(0).map(|link| link.text_content()))
}

/// Remove every template tag image, in document order
fn take_tag_images(heading: &mut DomElement, path: &Path, image_prefix: &str) -> Result<Vec<ContentTag>> {
    let mut tags = Vec::new();
    let mut index = 0;

    while let Some(child) = heading.element_child(index) {
        if !child.is("img") {
            index += 1;
            continue;
        }

        let src = child.attr("src").unwrap_or_default();
        if !src.starts_with(image_prefix) {
            warn!(path = %path.display(), "External image in title for {}: {}", path.display(), src);
            index += 1;
            continue;
        }

        let tag = child
            .attr("alt")
            .and_then(ContentTag::from_marker)
            .ok_or_else(|| AddventureError::missing(path, ExtractStep::TagMarker, child.outer_html()))?;

        heading.remove_child(index);
        tags.push(tag);
    }

    Ok(tags)
}

/// Split `"Title [Episode N]"` into the title fragment and `N`
fn parse_title_str<'a>(raw: &'a str, path: &Path) -> Result<(&'a str, u64)> {
    let caps = TITLE_RE
        .captures(raw)
        .ok_or_else(|| AddventureError::missing(path, ExtractStep::TitlePattern, format!("{:?}", raw)))?;

    let id = caps["id"]
        .parse::<u64>()
        .map_err(|e| AddventureError::missing(path, ExtractStep::TitlePattern, format!("{:?}: {}", raw, e)))?;
    let title = caps.name("title").map_or("", |m| m.as_str());

    Ok((title, id))
}
