//! `(Posted ...)` timestamp parsing.

use std::path::Path;

use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::debug;

use crate::dom_tree::DomElement;
use crate::{AddventureError, ExtractStep, Result};

/// Format of the posting marker, e.g. `(Posted Sat, 05 Mar 2005 14:30)`.
///
/// Day and hour may be written with or without a leading zero. Day and month
/// names are the fixed English abbreviations regardless of the process locale.
pub const POSTED_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "(Posted [weekday repr:short], [day padding:none] [month repr:short] [year] [hour padding:none]:[minute])"
);

const POSTED_MARKER: &str = "(Posted ";

/// Find the first `<i>(Posted ...)</i>` marker and parse it as UTC epoch seconds.
///
/// Pages without a marker yield `Ok(None)`; a marker that does not match
/// `format` is a [`ExtractStep::Timestamp`] failure.
pub fn extract_posted(root: &DomElement, path: &Path, format: &[BorrowedFormatItem<'_>]) -> Result<Option<i64>> {
    let Some(text) = root
        .find_all("i")
        .into_iter()
        .map(DomElement::text_content)
        .find(|text| text.starts_with(POSTED_MARKER))
    else {
        return Ok(None);
    };

    let posted = PrimitiveDateTime::parse(&text, format)
        .map_err(|e| AddventureError::missing(path, ExtractStep::Timestamp, format!("{:?}: {}", text, e)))?
        .assume_utc()
        .unix_timestamp();

    debug!(path = %path.display(), posted, "parsed timestamp");
    Ok(Some(posted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;
    use rstest::rstest;

    fn posted(body: &str) -> Result<Option<i64>> {
        let doc = Document::parse(&format!("<html><body>{}</body></html>", body));
        extract_posted(doc.root(), Path::new("1.html"), POSTED_FORMAT)
    }

    #[rstest]
    #[case("<i>(Posted Sat, 05 Mar 2005 14:30)</i>", 1110033000)]
    #[case("<p>Text</p><i>(Posted Mon, 17 Jan 2000 09:05)</i>", 948099900)]
    #[case("<i>(Posted Sat, 5 Mar 2005 14:30)</i>", 1110033000)]
    #[case("<i>(Posted Mon, 17 Jan 2000 9:05)</i>", 948099900)]
    #[case("<i>(Posted Sun, 6 Mar 2005 8:00)</i>", 1110096000)]
    #[case("<i>Aside</i><i>(Posted Sat, 05 Mar 2005 14:30)</i><i>(Posted Mon, 17 Jan 2000 09:05)</i>", 1110033000)]
    fn test_posted(#[case] body: &str, #[case] expected: i64) {
        assert_eq!(posted(body).unwrap(), Some(expected));
    }

    #[test]
    fn test_no_marker() {
        assert_eq!(posted("<p>(Posted Sat, 05 Mar 2005 14:30)</p><i>Later</i>").unwrap(), None);
    }

    #[test]
    fn test_malformed_marker_fails() {
        let err = posted("<i>(Posted yesterday)</i>").unwrap_err();
        assert_eq!(err.step(), Some(ExtractStep::Timestamp));
        assert!(err.to_string().contains("yesterday"));
    }
}
