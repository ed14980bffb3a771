//! Task entry points: one method per generation task.
//!
//! Every method runs the same short pipeline:
//!
//! ```text
//! input check ──▶ prompt ──▶ one gateway call ──▶ validate/repair
//! ```
//!
//! Input checks come first so that an empty request never costs a model call.
//! The [`Generator`] holds no per-request state and is shared behind an `Arc`
//! by the HTTP layer; concurrent requests do not interact.

use crate::config::{LinkPolicy, ServiceConfig};
use crate::error::{ServiceError, ValidationError};
use crate::output::{FlashcardSet, MindMap, SimplifiedText, TopicDataset};
use crate::pipeline::extract::{PdfiumExtractor, TextExtractor};
use crate::pipeline::gateway::{ChatGateway, OpenAiGateway};
use crate::pipeline::input::{self, PdfUpload};
use crate::pipeline::validate;
use crate::prompts::Task;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct Generator {
    gateway: Arc<dyn ChatGateway>,
    extractor: Arc<dyn TextExtractor>,
    link_policy: LinkPolicy,
}

impl Generator {
    pub fn new(gateway: Arc<dyn ChatGateway>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            gateway,
            extractor,
            link_policy: LinkPolicy::default(),
        }
    }

    pub fn with_link_policy(mut self, policy: LinkPolicy) -> Self {
        self.link_policy = policy;
        self
    }

    /// Production wiring: HTTP gateway plus pdfium extractor.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let gateway = OpenAiGateway::new(config.gateway.clone())?;
        let extractor = PdfiumExtractor::new(config.pdfium_lib_path.clone());
        Ok(Self::new(Arc::new(gateway), Arc::new(extractor)).with_link_policy(config.link_policy))
    }

    pub fn link_policy(&self) -> LinkPolicy {
        self.link_policy
    }

    pub async fn flashcards(&self, text: &str) -> Result<FlashcardSet, ServiceError> {
        let text = input::require_text(Some(text))?;
        let raw = self.ask(Task::Flashcards, text).await?;
        let set = validate::flashcards(&raw)?;
        info!("Generated {} flashcards", set.flashcards.len());
        Ok(set)
    }

    pub async fn mindmap(&self, text: &str) -> Result<MindMap, ServiceError> {
        let text = input::require_text(Some(text))?;
        let raw = self.ask(Task::MindMap, text).await?;
        let map = validate::mindmap(&raw, self.link_policy)?;
        info!(
            "Generated mind map: {} nodes, {} links",
            map.nodes.len(),
            map.links.len()
        );
        Ok(map)
    }

    pub async fn topic_dataset(&self, text: &str) -> Result<TopicDataset, ServiceError> {
        let text = input::require_text(Some(text))?;
        let raw = self.ask(Task::TopicDataset, text).await?;
        let dataset = validate::topic_dataset(&raw)?;
        info!("Structured {} topics", dataset.entries.len());
        Ok(dataset)
    }

    /// Extract the upload's text, then run the topic-dataset task on it.
    pub async fn topic_dataset_from_pdf(
        &self,
        upload: PdfUpload,
    ) -> Result<TopicDataset, ServiceError> {
        let start = Instant::now();
        let PdfUpload { file_name, bytes } = upload;
        info!("Extracting text from {} ({} bytes)", file_name, bytes.len());

        let text = self.extractor.extract_text(bytes).await?;
        let text = input::require_extracted(text)?;
        debug!("{}: {} chars extracted in {:?}", file_name, text.len(), start.elapsed());

        self.topic_dataset(&text).await
    }

    pub async fn simplify(&self, text: &str) -> Result<SimplifiedText, ServiceError> {
        let text = input::require_text(Some(text))?;
        let raw = self.ask(Task::Simplify, text).await?;
        let rewritten = raw.trim();
        if rewritten.is_empty() {
            return Err(ValidationError::structural("the rewrite is empty").into());
        }
        Ok(SimplifiedText {
            text: rewritten.to_string(),
        })
    }

    async fn ask(&self, task: Task, text: &str) -> Result<String, ServiceError> {
        let start = Instant::now();
        let messages = task.messages(text);
        info!(
            "Running {} task on {} chars with {}",
            task.label(),
            text.len(),
            self.gateway.model_name()
        );
        let raw = self
            .gateway
            .complete(&messages, task.response_format())
            .await?;
        debug!("{} answered in {:?}", task.label(), start.elapsed());
        Ok(raw)
    }
}
