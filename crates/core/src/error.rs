//! Error types for Addventure metadata extraction.
//!
//! This module defines the main error type [`AddventureError`]. Template
//! non-conformance is always reported as [`AddventureError::MissingMetadata`],
//! tagged with the [`ExtractStep`] that rejected the document and the raw
//! fragment that triggered it.
//!
//! # Example
//!
//! ```rust
//! use addventure_core::{AddventureError, ExtractStep, extract_episode};
//!
//! match extract_episode("dump/42.html") {
//!     Ok(record) => println!("{}: {}", record.id, record.title),
//!     Err(AddventureError::MissingMetadata { step: ExtractStep::BackLink, path, .. }) => {
//!         println!("{} has no back-link", path.display());
//!     }
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The extraction step that rejected a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStep {
    /// The document has no `<h1>` title line.
    TitleHeading,
    /// The thread link is not followed by the `": "` separator.
    ThreadSeparator,
    /// A template image carries an unknown tag marker.
    TagMarker,
    /// The title line does not end in `[Episode N]`.
    TitlePattern,
    /// The parsed title is empty or kept the thread separator.
    TitlePrefix,
    /// The in-document ID disagrees with the filename.
    IdCrossCheck,
    /// The document has no `<h3>` byline.
    BylineHeading,
    /// The byline does not start with `"by "`.
    BylinePrefix,
    /// The templated author link is not a `mailto:` URI.
    EmailScheme,
    /// A `(Posted ...)` marker does not match the timestamp format.
    Timestamp,
    /// No usable "Back to episode" link.
    BackLink,
}

impl fmt::Display for ExtractStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TitleHeading => "title heading",
            Self::ThreadSeparator => "thread separator",
            Self::TagMarker => "tag marker",
            Self::TitlePattern => "title pattern",
            Self::TitlePrefix => "title prefix",
            Self::IdCrossCheck => "id cross-check",
            Self::BylineHeading => "byline heading",
            Self::BylinePrefix => "byline prefix",
            Self::EmailScheme => "e-mail scheme",
            Self::Timestamp => "timestamp",
            Self::BackLink => "back-link",
        };
        f.write_str(name)
    }
}

/// Main error type for extraction, batching and reshaping.
#[derive(Error, Debug)]
pub enum AddventureError {
    /// The document does not conform to the episode template.
    ///
    /// `detail` carries the offending raw fragment so the failure can be
    /// diagnosed without re-parsing the page.
    #[error("Cannot extract {step} for {}: {detail}", path.display())]
    MissingMetadata { path: PathBuf, step: ExtractStep, detail: String },

    /// The document could not be read from disk.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A reshape request is incompatible with the records it was given.
    #[error("Bad input: {0}")]
    BadInput(String),

    /// JSON or YAML encoding and decoding errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AddventureError {
    /// Builds a [`AddventureError::MissingMetadata`] for `path`.
    pub fn missing(path: impl Into<PathBuf>, step: ExtractStep, detail: impl Into<String>) -> Self {
        Self::MissingMetadata { path: path.into(), step, detail: detail.into() }
    }

    /// The failing step, if this is a template failure.
    pub fn step(&self) -> Option<ExtractStep> {
        match self {
            Self::MissingMetadata { step, .. } => Some(*step),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AddventureError {
    fn from(err: serde_json::Error) -> Self {
        AddventureError::Serialization(err.to_string())
    }
}

#[cfg(feature = "yaml")]
impl From<serde_yaml::Error> for AddventureError {
    fn from(err: serde_yaml::Error) -> Self {
        AddventureError::Serialization(err.to_string())
    }
}

/// Result type alias for AddventureError.
pub type Result<T> = std::result::Result<T, AddventureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_metadata_display() {
        let err = AddventureError::missing("dump/42.html", ExtractStep::TitlePattern, "'[Episode 7]'");
        let msg = err.to_string();
        assert!(msg.contains("title pattern"));
        assert!(msg.contains("dump/42.html"));
        assert!(msg.contains("[Episode 7]"));
    }

    #[test]
    fn test_step_accessor() {
        let err = AddventureError::missing("1.html", ExtractStep::BackLink, "");
        assert_eq!(err.step(), Some(ExtractStep::BackLink));
        assert_eq!(AddventureError::BadInput("x".to_string()).step(), None);
    }

    #[test]
    fn test_read_error_display() {
        let err = AddventureError::Read {
            path: PathBuf::from("/nonexistent/7.html"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("/nonexistent/7.html"));
    }
}
