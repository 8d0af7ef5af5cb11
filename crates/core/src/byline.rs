//! Byline (`<h3>by ...</h3>`) parsing.

use std::path::Path;

use tracing::debug;
use url::Url;

use crate::dom_tree::DomElement;
use crate::sanitize::{SanitizeOptions, sanitize};
use crate::{AddventureError, ExtractStep, Result};

const BYLINE_PREFIX: &str = "by ";

/// Author name and optional address parsed from the byline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Byline {
    pub author: String,
    pub email: Option<String>,
}

/// Parse the byline, stripping the `"by "` prefix and any e-mail link.
///
/// The templated e-mail link is read before sanitizing, since sanitizing
/// unwraps every `<a>`.
pub fn extract_byline(byline: &mut DomElement, path: &Path) -> Result<Byline> {
    let leading = byline.leading_text().unwrap_or_default();
    let Some(rest) = leading.strip_prefix(BYLINE_PREFIX) else {
        return Err(AddventureError::missing(path, ExtractStep::BylinePrefix, format!("{:?}", leading)));
    };
    let rest = rest.to_string();
    byline.set_leading_text(rest);

    let email = match byline.element_child(0).filter(|el| el.is("a")) {
        Some(link) if byline.leading_text().is_none() => Some(mailto_address(link, path)?),
        Some(link) => link.attr("href").and_then(|href| parse_mailto(href).ok()),
        None => None,
    };

    let exempt = |el: &DomElement| el.is("a") && el.attr("href").is_some_and(|href| href.starts_with("mailto:"));
    let options = SanitizeOptions { shady_exemption: &exempt, ..Default::default() };
    sanitize(byline, options, path);

    let author = byline.stringify_children();
    debug!(path = %path.display(), author = %author, "parsed byline");
    Ok(Byline { author, email })
}

/// The address of a templated author link, which must be a `mailto:` URI
fn mailto_address(link: &DomElement, path: &Path) -> Result<String> {
    let href = link
        .attr("href")
        .ok_or_else(|| AddventureError::missing(path, ExtractStep::EmailScheme, link.outer_html()))?;

    parse_mailto(href).map_err(|detail| AddventureError::missing(path, ExtractStep::EmailScheme, detail))
}

fn parse_mailto(href: &str) -> std::result::Result<String, String> {
    let uri = Url::parse(href).map_err(|e| format!("{:?}: {}", href, e))?;
    if uri.scheme() != "mailto" {
        return Err(format!("{:?} != \"mailto\"", uri.scheme()));
    }
    Ok(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;

    fn extract(markup: &str) -> Result<Byline> {
        let doc = Document::parse(&format!("<html><body><h3>{}</h3></body></html>", markup));
        let mut h3 = doc.root().find_first("h3").unwrap().clone();
        extract_byline(&mut h3, Path::new("1.html"))
    }

    #[test]
    fn test_plain_author() {
        let byline = extract("by Some Author").unwrap();
        assert_eq!(byline.author, "Some Author");
        assert_eq!(byline.email, None);
    }

    #[test]
    fn test_templated_mailto_link() {
        let byline = extract(r#"by <a href="mailto:foo@example.com">Foo</a>"#).unwrap();
        assert_eq!(byline.author, "Foo");
        assert_eq!(byline.email.as_deref(), Some("foo@example.com"));
    }

    #[test]
    fn test_name_before_mailto_link() {
        let byline = extract(r#"by Jane <a href="mailto:jane@example.com">Jane</a>"#).unwrap();
        assert_eq!(byline.author, "Jane Jane");
        assert_eq!(byline.email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_name_before_web_link() {
        let byline = extract(r#"by Jane <a href="http://jane.example.com/">site</a>"#).unwrap();
        assert_eq!(byline.author, "Jane site");
        assert_eq!(byline.email, None);
    }

    #[test]
    fn test_templated_link_wrong_scheme_fails() {
        let err = extract(r#"by <a href="http://example.com/">Foo</a>"#).unwrap_err();
        assert_eq!(err.step(), Some(ExtractStep::EmailScheme));
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_templated_link_relative_fails() {
        let err = extract(r#"by <a href="profile.html">Foo</a>"#).unwrap_err();
        assert_eq!(err.step(), Some(ExtractStep::EmailScheme));
    }

    #[test]
    fn test_templated_link_without_href_fails() {
        let err = extract("by <a>Foo</a>").unwrap_err();
        assert_eq!(err.step(), Some(ExtractStep::EmailScheme));
    }

    #[test]
    fn test_missing_prefix_fails() {
        let err = extract("Anonymous").unwrap_err();
        assert_eq!(err.step(), Some(ExtractStep::BylinePrefix));

        let err = extract(r#"<a href="mailto:a@b.c">A</a>"#).unwrap_err();
        assert_eq!(err.step(), Some(ExtractStep::BylinePrefix));
    }

    #[test]
    fn test_formatting_survives() {
        let byline = extract("by <b>Bold</b> Writer<br>and friend").unwrap();
        assert_eq!(byline.author, "<b>Bold</b> Writer and friend");
        assert_eq!(byline.email, None);
    }
}
