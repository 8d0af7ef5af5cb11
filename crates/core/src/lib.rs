pub mod backlink;
pub mod batch;
pub mod byline;
pub mod dom_tree;
pub mod episode;
pub mod error;
pub mod formatters;
pub mod metadata;
pub mod parse;
pub mod posted;
pub mod reshape;
pub mod sanitize;
pub mod title;

pub use batch::{BatchFailure, BatchReport, collect_episode_paths, extract_batch, is_episode_file};
#[doc(hidden)]
pub use dom_tree::{DomElement, DomNode};
pub use episode::{EpisodeDocument, ExtractConfig, ExtractConfigBuilder, extract_episode, extract_episode_with_config};
pub use error::{AddventureError, ExtractStep, Result};
#[cfg(feature = "yaml")]
pub use formatters::to_yaml;
pub use formatters::{OutputFormat, records_from_json, records_to_json, render, to_json};
pub use metadata::{ContentTag, EpisodeRecord};
pub use parse::{Document, id_from_path};
pub use posted::POSTED_FORMAT;
pub use reshape::{RecordMap, flatten, index_by, key_by};
pub use sanitize::{SAFE_HTML_ATTRS, SAFE_HTML_TAGS, is_safe_tag};
