//! Parent episode lookup through the "Back to episode N" link.

use std::path::Path;

use crate::dom_tree::DomElement;
use crate::parse::id_from_path;
use crate::{AddventureError, ExtractStep, Result};

const BACK_LINK_PREFIX: &str = "Back to episode ";

/// ID of the episode this one continues from.
///
/// The first `<a>` whose text starts with `"Back to episode "` is used and
/// its `href` is read with the same rule as page filenames, so a link back to
/// `index.html` gives `Ok(None)`. A page with no such link fails.
pub fn extract_parent_id(root: &DomElement, path: &Path) -> Result<Option<u64>> {
    let link = root
        .find_all("a")
        .into_iter()
        .find(|a| a.text_content().starts_with(BACK_LINK_PREFIX))
        .ok_or_else(|| AddventureError::missing(path, ExtractStep::BackLink, "no \"Back to episode\" link"))?;

    let href = link
        .attr("href")
        .ok_or_else(|| AddventureError::missing(path, ExtractStep::BackLink, link.outer_html()))?;

    Ok(id_from_path(href))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;

    fn parent(body: &str) -> Result<Option<u64>> {
        let doc = Document::parse(&format!("<html><body>{}</body></html>", body));
        extract_parent_id(doc.root(), Path::new("2.html"))
    }

    #[test]
    fn test_back_link() {
        assert_eq!(parent(r#"<a href="1.html">Back to episode 1</a>"#).unwrap(), Some(1));
    }

    #[test]
    fn test_first_back_link_wins() {
        let body = r#"<a href="3.html">Next</a><p><a href="../0/17.html">Back to episode 17</a></p><a href="5.html">Back to episode 5</a>"#;
        assert_eq!(parent(body).unwrap(), Some(17));
    }

    #[test]
    fn test_back_to_index() {
        assert_eq!(parent(r#"<a href="index.html">Back to episode list</a>"#).unwrap(), None);
    }

    #[test]
    fn test_missing_back_link_fails() {
        let err = parent(r#"<a href="1.html">Episode 1</a>"#).unwrap_err();
        assert_eq!(err.step(), Some(ExtractStep::BackLink));
    }

    #[test]
    fn test_back_link_without_href_fails() {
        let err = parent("<a>Back to episode 1</a>").unwrap_err();
        assert_eq!(err.step(), Some(ExtractStep::BackLink));
    }
}
