use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Content-advisory tag carried by a marker image in the title line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTag {
    Dark,
    Lemon,
    Lime,
    Waff,
}

impl ContentTag {
    /// Every tag in vocabulary order
    pub const ALL: [ContentTag; 4] = [ContentTag::Dark, ContentTag::Lemon, ContentTag::Lime, ContentTag::Waff];

    /// Map a marker image's `alt` text (`"(DARK)"`, ...) to its tag
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "(DARK)" => Some(ContentTag::Dark),
            "(LEMON)" => Some(ContentTag::Lemon),
            "(LIME)" => Some(ContentTag::Lime),
            "(WAFF)" => Some(ContentTag::Waff),
            _ => None,
        }
    }

    /// The `alt` text the template uses for this tag
    pub fn marker(self) -> &'static str {
        match self {
            ContentTag::Dark => "(DARK)",
            ContentTag::Lemon => "(LEMON)",
            ContentTag::Lime => "(LIME)",
            ContentTag::Waff => "(WAFF)",
        }
    }

    /// Canonical lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            ContentTag::Dark => "dark",
            ContentTag::Lemon => "lemon",
            ContentTag::Lime => "lime",
            ContentTag::Waff => "waff",
        }
    }
}

impl fmt::Display for ContentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| format!("Invalid tag: {}. Valid options: dark, lemon, lime, waff", s))
    }
}

/// Validated metadata for one episode page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub author: String,
    pub author_email: Option<String>,
    pub id: u64,
    pub parent_id: Option<u64>,
    /// Posting time in seconds since the Unix epoch
    pub posted: Option<i64>,
    pub tags: Vec<ContentTag>,
    pub thread: Option<String>,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_round_trip() {
        for tag in ContentTag::ALL {
            assert_eq!(ContentTag::from_marker(tag.marker()), Some(tag));
        }
        assert_eq!(ContentTag::from_marker("(FLUFF)"), None);
        assert_eq!(ContentTag::from_marker("DARK"), None);
    }

    #[test]
    fn test_tag_from_str() {
        assert_eq!("lime".parse::<ContentTag>(), Ok(ContentTag::Lime));
        assert!("Lime".parse::<ContentTag>().is_err());
    }

    #[test]
    fn test_record_serialization() {
        let record = EpisodeRecord {
            author: "Jane".to_string(),
            author_email: None,
            id: 2,
            parent_id: Some(1),
            posted: Some(1110033000),
            tags: vec![ContentTag::Waff, ContentTag::Lime],
            thread: None,
            title: "Test title 2".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["tags"], serde_json::json!(["waff", "lime"]));
        assert!(value["author_email"].is_null());
        assert!(value["thread"].is_null());
        assert_eq!(value["parent_id"], 1);

        let back: EpisodeRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
