//! # studykit
//!
//! Turn textbook text and PDFs into study material with an LLM: flashcards,
//! mind maps, and `{topic, content}` datasets.
//!
//! ## Why a validator?
//!
//! Models asked for JSON mostly return JSON, but not always the JSON that
//! was asked for: a bare array instead of the wrapper object, nodes without
//! colours, links to nodes that do not exist. Every task therefore ends in a
//! validator that parses the answer exactly once and then applies cosmetic,
//! task-specific repairs. Content is never invented; a shape that cannot be
//! fixed without inventing content is an error.
//!
//! ## Pipeline Overview
//!
//! ```text
//! text / PDF
//!  │
//!  ├─ 1. Input     reject empty text, non-PDF uploads
//!  ├─ 2. Extract   PDF → text via pdfium (spawn_blocking)
//!  ├─ 3. Prompt    task-specific system + user messages
//!  ├─ 4. Gateway   one chat-completion call (OpenAI-compatible)
//!  ├─ 5. Validate  parse once, repair structure
//!  └─ 6. Envelope  {status, message, data}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use studykit::{Generator, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::builder()
//!         .api_key(std::env::var("API_KEY")?)
//!         .model("gpt-4.1-nano")
//!         .build()?;
//!     let generator = Generator::from_config(&config)?;
//!     let cards = generator.flashcards("Photosynthesis turns light into sugar.").await?;
//!     for card in cards.flashcards {
//!         println!("Q: {}\nA: {}", card.question, card.answer);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `studykit` binary (clap + anyhow + tracing-subscriber + dotenvy) |
//!
//! The HTTP router in [`server`] is part of the library, so it can be mounted
//! without the binary.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GatewayConfig, LinkPolicy, ServiceConfig, ServiceConfigBuilder};
pub use error::{ExtractionError, GatewayError, ServiceError, ValidationError};
pub use generate::Generator;
pub use output::{
    Flashcard, FlashcardSet, MindMap, MindMapLink, MindMapNode, ResultEnvelope, SimplifiedText,
    Status, TopicDataset, TopicEntry,
};
pub use pipeline::extract::{PdfiumExtractor, TextExtractor};
pub use pipeline::gateway::{ChatGateway, ChatMessage, OpenAiGateway, ResponseFormat, Role};
pub use prompts::Task;
