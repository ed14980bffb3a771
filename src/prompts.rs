//! Prompt templates for every generation task.
//!
//! Centralising the prompts here serves two purposes:
//!
//! 1. **Single source of truth**: a wording change touches exactly one place.
//! 2. **Testability**: tests inspect the messages directly, without a model.
//!
//! The validator can only repair structure, never missing content, so the
//! prompts carry the strict output rules and, for mind maps, the whole visual
//! contract. Builders are pure: the same text always yields the same messages,
//! and nothing is truncated (model context limits are the caller's concern).

use crate::pipeline::gateway::{ChatMessage, ResponseFormat};

/// Colours offered to the model and used to fill in missing node colours,
/// cycled by node position.
pub const MINDMAP_PALETTE: [&str; 9] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#FFD93D", "#A8E6CF", "#C3A6FF",
    "#4299E1",
];

/// Emoji for nodes the model left bare.
pub const DEFAULT_NODE_EMOJI: &str = "📌";

/// Appended to every JSON task.
const JSON_OUTPUT_RULES: &str = r#"**Output Rules:**
1. Return ONLY a single, valid JSON value.
2. No markdown, no code fences, no extra commentary before or after the JSON.
3. No trailing commas.
4. All keys and strings must use double quotes."#;

const FLASHCARD_SYSTEM: &str = "You are a teacher generating simple flashcards for students.";

const MINDMAP_SYSTEM: &str = "You are an expert educational content designer and a precise \
JSON-generating machine. Your sole purpose is to create a valid, parsable JSON object based on \
the user's request.";

const DATASET_SYSTEM: &str = "You are an assistant that extracts structured datasets from textbooks.";

const SIMPLIFY_SYSTEM: &str = "You are a friendly teacher helping children with learning \
disabilities understand NCERT concepts.";

/// The kinds of work the service can ask the model to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Flashcards,
    MindMap,
    TopicDataset,
    Simplify,
}

impl Task {
    /// Response mode to request from the gateway.
    pub fn response_format(self) -> ResponseFormat {
        match self {
            Task::Simplify => ResponseFormat::Text,
            _ => ResponseFormat::JsonObject,
        }
    }

    /// Short name for logs.
    pub fn label(self) -> &'static str {
        match self {
            Task::Flashcards => "flashcards",
            Task::MindMap => "mindmap",
            Task::TopicDataset => "topic-dataset",
            Task::Simplify => "simplify",
        }
    }

    /// Build the system + user messages for `text`.
    pub fn messages(self, text: &str) -> Vec<ChatMessage> {
        match self {
            Task::Flashcards => vec![
                ChatMessage::system(FLASHCARD_SYSTEM),
                ChatMessage::user(flashcard_instructions(text)),
            ],
            Task::MindMap => vec![
                ChatMessage::system(MINDMAP_SYSTEM),
                ChatMessage::user(mindmap_instructions(text)),
            ],
            Task::TopicDataset => vec![
                ChatMessage::system(DATASET_SYSTEM),
                ChatMessage::user(dataset_instructions(text)),
            ],
            Task::Simplify => vec![
                ChatMessage::system(SIMPLIFY_SYSTEM),
                ChatMessage::user(simplify_instructions(text)),
            ],
        }
    }
}

fn flashcard_instructions(text: &str) -> String {
    format!(
        "From the text below, create flashcards in JSON format.\n\
         Return a JSON object with a \"flashcards\" array. Each flashcard must have:\n\
         - \"question\": a clear question (one sentence)\n\
         - \"answer\": a concise answer (one or two sentences)\n\
         - \"explanation\" (optional): additional context if needed\n\n\
         Use simple, student-friendly language.\n\n\
         {JSON_OUTPUT_RULES}\n\n\
         Text:\n\n{text}"
    )
}

fn mindmap_instructions(text: &str) -> String {
    let palette = MINDMAP_PALETTE.join(", ");
    format!(
        r##"Create a beautiful, student-friendly mind map from the text provided below.

**Task:**
1. Analyze the text and deconstruct it into a clear hierarchy: one main topic (root), subtopics, and details.
2. Follow all guidelines to populate the nodes and links.

**Source Text:**
---
{text}
---

**Guidelines:**
1. **Hierarchy:** exactly 1 root node, 4–7 subtopic nodes linked from the root, and at most 3 detail nodes per subtopic.
2. **Concise Text:** keep node text short (3–5 words) and student-friendly.
3. **Visuals:** give every node a colour from this palette: {palette}. Add exactly one relevant emoji to every node.
4. **Descriptions:** give every node a helpful description of 15–25 words.
5. **Keys:** every node key is a unique integer; links refer to node keys as integers.
6. **Connections:** every link connects two existing nodes and reflects a real relationship.

**Layout Rules:**
1. Prefer a wider (not deeper) structure to avoid long node chains.
2. Focus on key ideas, not every minor detail.

{JSON_OUTPUT_RULES}

**JSON Format:**
{{
  "nodes": [
    {{"key": 1, "text": "string", "color": "#RRGGBB", "emoji": "string", "description": "string"}}
  ],
  "links": [
    {{"from": 1, "to": 2}}
  ]
}}"##
    )
}

fn dataset_instructions(text: &str) -> String {
    format!(
        "From the following NCERT textbook chapter, extract every sub-topic (with its number/title) \
         and the content belonging to that sub-topic.\n\
         Return a JSON object with a \"topics\" array. Each element must have the fields \
         \"topic\" (string) and \"content\" (string).\n\
         Do not simplify or summarize the content, keep it exactly as it is.\n\n\
         {JSON_OUTPUT_RULES}\n\n\
         Text:\n{text}"
    )
}

fn simplify_instructions(text: &str) -> String {
    format!(
        "Rewrite the text so that it is:\n\
         - Very simple and clear.\n\
         - Positive, supportive, and encouraging.\n\
         - Built on examples from everyday life.\n\
         - Explained step by step.\n\n\
         Here is the text to simplify:\n{text}\n\n\
         Now rewrite it in this simple, child-friendly way."
    )
}
