//! Serde helpers that trim request text before it is validated.
//!
//! Length rules are checked against what will be stored, so
//! `"   ab   "` fails a five character minimum.

use serde::{Deserialize, Deserializer};

/// Deserialize a string with surrounding whitespace removed.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(trim_owned(value))
}

/// Like [`trimmed`] for optional fields; pair with `#[serde(default)]`.
pub fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(trim_owned))
}

fn trim_owned(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}
