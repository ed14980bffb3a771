//! Topic datasets: an array of `{topic, content}` entries, taken as-is.
//!
//! JSON mode only lets the model answer with an object, so the prompt asks
//! for the entries under [`TOPICS_FIELD`]. A bare array is accepted too.

use super::{into_typed, parse};
use crate::error::ValidationError;
use crate::output::TopicDataset;
use serde_json::Value;

/// Object field the prompt asks the model to put the entries under.
pub const TOPICS_FIELD: &str = "topics";

/// Parse and type-check a topic-dataset response.
///
/// Entries are never rewritten. Only the [`TOPICS_FIELD`] wrapper is
/// unwrapped; any other object is a structural error rather than a guess at
/// which field holds the entries.
pub fn topic_dataset(raw: &str) -> Result<TopicDataset, ValidationError> {
    match parse(raw)? {
        value @ Value::Array(_) => into_typed(value, "topic dataset"),
        Value::Object(mut map) => match map.remove(TOPICS_FIELD) {
            Some(value @ Value::Array(_)) => into_typed(value, "topic dataset"),
            Some(_) => Err(ValidationError::structural(format!(
                "\"{TOPICS_FIELD}\" must be an array of {{topic, content}} entries"
            ))),
            None => Err(ValidationError::structural(format!(
                "expected a \"{TOPICS_FIELD}\" array of {{topic, content}} entries"
            ))),
        },
        _ => Err(ValidationError::structural(
            "expected a JSON array of {topic, content} entries",
        )),
    }
}
