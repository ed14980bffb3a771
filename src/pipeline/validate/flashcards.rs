//! Flashcard envelope normalisation.
//!
//! Models asked for `{"flashcards": [...]}` sometimes answer with the bare
//! array, or with a single card object. Both are wrapped rather than
//! rejected.

use super::{into_typed, parse};
use crate::error::ValidationError;
use crate::output::FlashcardSet;
use serde_json::{Map, Value};
use tracing::warn;

const KEY: &str = "flashcards";

/// Parse, normalise and type-check a flashcard response.
pub fn flashcards(raw: &str) -> Result<FlashcardSet, ValidationError> {
    let value = normalize_flashcards(parse(raw)?);
    into_typed(value, "flashcard set")
}

/// Wrap a bare array or a bare object into `{"flashcards": [...]}`.
///
/// Values that already carry the key, and scalars, are returned unchanged;
/// the typed read that follows decides whether they are usable.
pub fn normalize_flashcards(value: Value) -> Value {
    match value {
        Value::Array(cards) => {
            warn!("Model returned a bare flashcard array; wrapping");
            wrap(Value::Array(cards))
        }
        Value::Object(card) if !card.contains_key(KEY) => {
            warn!("Model returned a single flashcard object; wrapping");
            wrap(Value::Array(vec![Value::Object(card)]))
        }
        other => other,
    }
}

fn wrap(cards: Value) -> Value {
    let mut map = Map::new();
    map.insert(KEY.to_string(), cards);
    Value::Object(map)
}
