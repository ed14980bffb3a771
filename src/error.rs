//! Error types for the studykit library.
//!
//! Each stage of a request owns its error type:
//!
//! * [`GatewayError`]: the outbound chat-completion call failed.
//! * [`ValidationError`]: the model answered, but its text could not be
//!   turned into the requested domain object.
//! * [`ExtractionError`]: pdfium could not produce text from an upload.
//!
//! [`ServiceError`] wraps all of them plus boundary input problems. It is the
//! only error the HTTP layer sees, and it decides the status code: `Input` is
//! the client's fault (400), everything else is ours or upstream's (500).

use thiserror::Error;

/// Failure of the single outbound chat-completion call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway was called with an empty message list.
    #[error("Cannot send an empty conversation to the model")]
    EmptyConversation,

    /// HTTP 401/403 from the provider.
    #[error("Authentication with the model provider failed ({status}): {detail}")]
    Auth { status: u16, detail: String },

    /// HTTP 429 from the provider.
    #[error("Model provider quota or rate limit exceeded: {detail}")]
    RateLimited { detail: String },

    /// The transport gave up waiting, or the provider reported a timeout.
    #[error("Model request timed out: {detail}")]
    Timeout { detail: String },

    /// Connection-level failure (DNS, TLS, refused, reset).
    #[error("Could not reach the model provider: {0}")]
    Network(String),

    /// Any other non-success status.
    #[error("Model provider returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// A 2xx body that is not a chat-completion object.
    #[error("Model provider sent an unreadable response: {0}")]
    MalformedResponse(String),

    /// No choices, or a choice without content.
    #[error("Model returned no content")]
    EmptyResponse,
}

/// The model answered but the answer is unusable.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The text is not a single JSON value.
    ///
    /// `raw` is kept for logging; it never reaches the caller.
    #[error("Model response is not valid JSON: {diagnostic}")]
    Parse { raw: String, diagnostic: String },

    /// Valid JSON with a shape that cannot be repaired.
    #[error("Model response has an unexpected shape: {0}")]
    Structural(String),
}

impl ValidationError {
    pub(crate) fn structural(detail: impl Into<String>) -> Self {
        ValidationError::Structural(detail.into())
    }
}

/// PDF text extraction failure.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// pdfium could not be loaded.
    #[error("PDF engine unavailable: {0}\nSet PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide.")]
    EngineUnavailable(String),

    /// pdfium refused the document.
    #[error("PDF could not be read: {0}")]
    CorruptPdf(String),

    /// The blocking extraction task died.
    #[error("PDF extraction task failed: {0}")]
    TaskFailed(String),
}

/// Every failure a request can end with.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or malformed client input. The message is shown verbatim.
    #[error("{0}")]
    Input(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub(crate) fn input(message: impl Into<String>) -> Self {
        ServiceError::Input(message.into())
    }

    /// Whether the caller, not the backend, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::Input(_))
    }
}
