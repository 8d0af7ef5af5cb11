use crate::Result;
use serde::Serialize;

/// Serialize any value as YAML
pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}
