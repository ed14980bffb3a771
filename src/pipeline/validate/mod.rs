//! Response validation and structural repair.
//!
//! Raw model text goes through two phases:
//!
//! 1. **Parse**: exactly one attempt with `serde_json`. Prose around the
//!    JSON, code fences, truncation: all of these are a
//!    [`ValidationError::Parse`]. There is no heuristic second pass; the
//!    prompt's output rules are the only guard.
//! 2. **Structural repair**: task-specific, cosmetic only. Missing
//!    wrappers, keys, colours and emoji are filled in; dangling links are
//!    dropped. Semantic content (questions, node text, topic content) is
//!    never invented. Shapes that cannot be fixed without inventing content
//!    are a [`ValidationError::Structural`].
//!
//! Each task has a `&str -> Result<T, ValidationError>` entry point. The
//! flashcard and mind-map repairs are also exposed over `serde_json::Value`,
//! so the repair policy can be tested without a gateway.

mod dataset;
mod flashcards;
mod mindmap;

pub use dataset::{topic_dataset, TOPICS_FIELD};
pub use flashcards::{flashcards, normalize_flashcards};
pub use mindmap::{mindmap, repair_mindmap};

use crate::error::ValidationError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Phase 1: parse the whole text as a single JSON value.
pub fn parse(raw: &str) -> Result<Value, ValidationError> {
    serde_json::from_str(raw).map_err(|e| {
        debug!("Unparseable model output ({} chars): {}", raw.len(), raw);
        ValidationError::Parse {
            raw: raw.to_string(),
            diagnostic: e.to_string(),
        }
    })
}

/// Read a repaired value into its typed form.
fn into_typed<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, ValidationError> {
    serde_json::from_value(value).map_err(|e| ValidationError::structural(format!("{what}: {e}")))
}
