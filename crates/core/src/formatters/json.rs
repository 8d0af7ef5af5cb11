use crate::Result;
use crate::metadata::EpisodeRecord;
use serde::Serialize;

/// Serialize any value as JSON, pretty-printed with two-space indents when `pretty` is set
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    if pretty { Ok(serde_json::to_string_pretty(value)?) } else { Ok(serde_json::to_string(value)?) }
}

/// Convert a record set to the JSON dump consumed by the reshape tools
pub fn records_to_json(records: &[EpisodeRecord], pretty: bool) -> Result<String> {
    to_json(records, pretty)
}

/// Read a JSON dump back into records
pub fn records_from_json(json: &str) -> Result<Vec<EpisodeRecord>> {
    Ok(serde_json::from_str(json)?)
}
