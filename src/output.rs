//! Domain objects returned by each task, and the response envelope.
//!
//! Everything here is request-scoped: built by the validator, serialized
//! once into a [`ResultEnvelope`], then dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single question/answer card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardSet {
    pub flashcards: Vec<Flashcard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindMapNode {
    /// Unique within the map; links refer to nodes by this key.
    pub key: i64,
    pub text: String,
    /// Hex colour, e.g. `#4ECDC4`.
    pub color: String,
    pub emoji: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindMapLink {
    pub from: i64,
    pub to: i64,
}

/// A node/link graph. Every link references existing node keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindMap {
    pub nodes: Vec<MindMapNode>,
    pub links: Vec<MindMapLink>,
}

/// One sub-topic of a chapter with its verbatim content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    pub topic: String,
    pub content: String,
}

/// Serialized as a bare JSON array of [`TopicEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicDataset {
    pub entries: Vec<TopicEntry>,
}

/// A child-friendly rewrite of the input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedText {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Uniform wrapper for every response, success or failure.
///
/// `data` is present only on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub status: Status,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResultEnvelope {
    pub const DEFAULT_SUCCESS: &'static str = "Success";
    pub const TOPICS_STRUCTURED: &'static str = "Text structured successfully";
    pub const PDF_PROCESSED: &'static str = "PDF processed successfully";
    pub const TEXT_SIMPLIFIED: &'static str = "Text simplified successfully";

    /// Wrap a domain object. Fails only if `data` cannot be represented as
    /// JSON, which none of the types in this module can.
    pub fn success<T: Serialize>(
        data: &T,
        message: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status: Status::Success,
            message: message.into(),
            data: Some(serde_json::to_value(data)?),
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_envelope_has_no_data_field() {
        let v = serde_json::to_value(ResultEnvelope::error("No text provided")).unwrap();
        assert_eq!(v, json!({"status": "error", "message": "No text provided"}));
    }

    #[test]
    fn topic_dataset_serializes_as_array() {
        let ds = TopicDataset {
            entries: vec![TopicEntry {
                topic: "1.1 Matter".into(),
                content: "Anything that occupies space.".into(),
            }],
        };
        let env = ResultEnvelope::success(&ds, "Text structured successfully").unwrap();
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["data"][0]["topic"], "1.1 Matter");
    }

    #[test]
    fn flashcard_without_explanation_omits_field() {
        let card = Flashcard {
            question: "q".into(),
            answer: "a".into(),
            explanation: None,
        };
        assert_eq!(
            serde_json::to_value(&card).unwrap(),
            json!({"question": "q", "answer": "a"})
        );
    }
}
