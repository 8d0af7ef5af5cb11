pub mod json;
#[cfg(feature = "yaml")]
pub mod yaml;

pub use json::{records_from_json, records_to_json, to_json};
#[cfg(feature = "yaml")]
pub use yaml::to_yaml;

use std::str::FromStr;

use serde::Serialize;

use crate::{AddventureError, Result};

/// Serialization format for record sets and reshaped indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            #[cfg(feature = "yaml")]
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(format!("Invalid format: {}. Valid options: json, yaml", s)),
        }
    }
}

/// Render any serializable value in the requested format
pub fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => to_json(value, true),
        #[cfg(feature = "yaml")]
        OutputFormat::Yaml => to_yaml(value),
    };
    rendered.map_err(|e| match e {
        AddventureError::Serialization(msg) => {
            AddventureError::BadInput(format!("Output cannot be represented as {}: {}", format.extension(), msg))
        }
        other => other,
    })
}
