//! Episode extraction API.
//!
//! The main entry point is [`extract_episode`], which loads one page and
//! returns its validated [`EpisodeRecord`]. [`EpisodeDocument`] exposes the
//! same pipeline for callers that already hold the markup.
//!
//! # Example
//!
//! ```rust
//! use addventure_core::{EpisodeDocument, ExtractConfig};
//!
//! let html = r#"<html><body>
//!     <h1><a href="t.html">Thread</a>: The Title [Episode 42]</h1>
//!     <h3>by Someone</h3>
//!     <a href="41.html">Back to episode 41</a>
//! </body></html>"#;
//!
//! let doc = EpisodeDocument::from_html(html, "42.html", ExtractConfig::default());
//! let record = doc.into_record().unwrap();
//! assert_eq!(record.id, 42);
//! assert_eq!(record.thread.as_deref(), Some("Thread"));
//! assert_eq!(record.parent_id, Some(41));
//! ```

use std::path::{Path, PathBuf};

use time::format_description::BorrowedFormatItem;
use tracing::debug;

use crate::backlink::extract_parent_id;
use crate::byline::{Byline, extract_byline};
use crate::metadata::EpisodeRecord;
use crate::parse::Document;
use crate::posted::{POSTED_FORMAT, extract_posted};
use crate::title::{TitleLine, extract_title_line};
use crate::{AddventureError, ExtractStep, Result};

/// Configuration for episode extraction.
///
/// # Example
///
/// ```rust
/// use addventure_core::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .doublecheck_id(false)
///     .image_prefix("img/")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Require the title-line ID to match the filename (default: true).
    pub doublecheck_id: bool,

    /// `src` prefix of the template's own tag images (default: `"images/"`).
    pub image_prefix: String,

    /// Format of the `(Posted ...)` marker (default: [`POSTED_FORMAT`]).
    pub posted_format: &'static [BorrowedFormatItem<'static>],
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { doublecheck_id: true, image_prefix: "images/".to_string(), posted_format: POSTED_FORMAT }
    }
}

impl ExtractConfig {
    /// Creates a new builder for ExtractConfig.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::new()
    }
}

/// Builder for ExtractConfig.
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ExtractConfig::default() }
    }

    /// Sets whether the in-page ID must match the filename.
    pub fn doublecheck_id(mut self, value: bool) -> Self {
        self.config.doublecheck_id = value;
        self
    }

    /// Sets the `src` prefix that marks template tag images.
    pub fn image_prefix(mut self, value: impl Into<String>) -> Self {
        self.config.image_prefix = value.into();
        self
    }

    /// Sets the `(Posted ...)` timestamp format.
    pub fn posted_format(mut self, value: &'static [BorrowedFormatItem<'static>]) -> Self {
        self.config.posted_format = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ExtractConfig {
        self.config
    }
}

impl Default for ExtractConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One episode page, ready for a single extraction pass.
///
/// Extraction removes the thread link, tag images and e-mail link from the
/// page as it reads them, so [`EpisodeDocument::into_record`] takes the
/// document by value.
#[derive(Debug)]
pub struct EpisodeDocument {
    path: PathBuf,
    doc: Document,
    config: ExtractConfig,
}

impl EpisodeDocument {
    /// Loads a page from disk.
    ///
    /// # Errors
    ///
    /// Returns [`AddventureError::Read`] if the file cannot be read.
    pub fn load(path: impl AsRef<Path>, config: ExtractConfig) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load(path)?;
        Ok(Self { path: path.to_path_buf(), doc, config })
    }

    /// Wraps markup that was read elsewhere; `path` names the page for
    /// ID cross-checks and error messages.
    pub fn from_html(html: &str, path: impl Into<PathBuf>, config: ExtractConfig) -> Self {
        Self { path: path.into(), doc: Document::parse(html), config }
    }

    /// The page's source path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs every extractor and assembles the record.
    ///
    /// The title line is parsed first, then the byline, then the timestamp
    /// and the back-link. The first failure aborts the whole record.
    pub fn into_record(mut self) -> Result<EpisodeRecord> {
        let TitleLine { thread, tags, title, id } = self.title_line()?;
        let Byline { author, email } = self.byline()?;

        let root = self.doc.root();
        let posted = extract_posted(root, &self.path, self.config.posted_format)?;
        let parent_id = extract_parent_id(root, &self.path)?;

        debug!(path = %self.path.display(), id, "assembled record");
        Ok(EpisodeRecord { author, author_email: email, id, parent_id, posted, tags, thread, title })
    }

    fn title_line(&mut self) -> Result<TitleLine> {
        let heading = self
            .doc
            .root_mut()
            .find_first_mut("h1")
            .ok_or_else(|| AddventureError::missing(&self.path, ExtractStep::TitleHeading, "no <h1> in page"))?;
        extract_title_line(heading, &self.path, &self.config)
    }

    fn byline(&mut self) -> Result<Byline> {
        let byline = self
            .doc
            .root_mut()
            .find_first_mut("h3")
            .ok_or_else(|| AddventureError::missing(&self.path, ExtractStep::BylineHeading, "no <h3> in page"))?;
        extract_byline(byline, &self.path)
    }
}

/// Extracts the record for the page at `path` with the default config.
pub fn extract_episode(path: impl AsRef<Path>) -> Result<EpisodeRecord> {
    extract_episode_with_config(path, ExtractConfig::default())
}

/// Extracts the record for the page at `path`.
pub fn extract_episode_with_config(path: impl AsRef<Path>, config: ExtractConfig) -> Result<EpisodeRecord> {
    EpisodeDocument::load(path, config)?.into_record()
}
