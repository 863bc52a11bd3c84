//! Deserializers for select inputs, which hand back either numbers or
//! their string form

use serde::Deserialize;
use serde::de::{self, Deserializer};
use serde_json::Number;

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectValue {
    Text(String),
    Number(Number),
}

/// A string field whose options may arrive as numbers
pub(super) fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match SelectValue::deserialize(deserializer)? {
        SelectValue::Text(text) => Ok(text),
        SelectValue::Number(number) => Ok(number.to_string()),
    }
}

/// An optional record identifier given as a number, a numeric string, or
/// an empty selection
pub(super) fn optional_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<SelectValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(SelectValue::Number(number)) => number
            .as_u64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid identifier {number}"))),
        Some(SelectValue::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(SelectValue::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid identifier '{text}'"))),
    }
}
