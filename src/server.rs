//! HTTP surface: one POST route per task, all answering with a
//! [`ResultEnvelope`].
//!
//! Handlers are thin. They pull the text or the uploaded file out of the
//! request, hand it to the shared [`Generator`], and wrap the result. Every
//! failure becomes a [`ServiceError`], whose [`IntoResponse`] impl picks the
//! status (400 for client input, 500 for everything else) and writes the
//! error envelope.

use crate::error::ServiceError;
use crate::generate::Generator;
use crate::output::ResultEnvelope;
use crate::pipeline::input;
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

/// Multipart part carrying the PDF.
const FILE_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    generator: Arc<Generator>,
}

/// Body of every text route.
#[derive(Debug, Default, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Build the application router.
///
/// `max_upload_bytes` caps every request body, uploads included.
pub fn router(generator: Arc<Generator>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/generate_flashcards", post(generate_flashcards))
        .route("/generate_mindmap", post(generate_mindmap))
        .route("/extract_text", post(extract_text))
        .route("/simplify_text", post(simplify_text))
        .route("/upload_pdf", post(upload_pdf))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { generator })
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            warn!("Rejected request: {}", self);
            StatusCode::BAD_REQUEST
        } else {
            error!("Request failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ResultEnvelope::error(self.to_string()))).into_response()
    }
}

fn envelope<T: Serialize>(data: &T, message: &str) -> Result<Json<ResultEnvelope>, ServiceError> {
    ResultEnvelope::success(data, message)
        .map(Json)
        .map_err(|e| ServiceError::Internal(format!("Could not serialize response: {e}")))
}

/// Unwrap the JSON body; an unreadable body is the client's fault.
fn body_text(body: Result<Json<TextRequest>, JsonRejection>) -> Result<String, ServiceError> {
    let Json(request) =
        body.map_err(|e| ServiceError::input(format!("Invalid request body: {}", e.body_text())))?;
    Ok(request.text.unwrap_or_default())
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn generate_flashcards(
    State(state): State<AppState>,
    body: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<ResultEnvelope>, ServiceError> {
    let text = body_text(body)?;
    let set = state.generator.flashcards(&text).await?;
    envelope(&set, ResultEnvelope::DEFAULT_SUCCESS)
}

async fn generate_mindmap(
    State(state): State<AppState>,
    body: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<ResultEnvelope>, ServiceError> {
    let text = body_text(body)?;
    let map = state.generator.mindmap(&text).await?;
    envelope(&map, ResultEnvelope::DEFAULT_SUCCESS)
}

async fn extract_text(
    State(state): State<AppState>,
    body: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<ResultEnvelope>, ServiceError> {
    let text = body_text(body)?;
    let dataset = state.generator.topic_dataset(&text).await?;
    envelope(&dataset, ResultEnvelope::TOPICS_STRUCTURED)
}

async fn simplify_text(
    State(state): State<AppState>,
    body: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<ResultEnvelope>, ServiceError> {
    let text = body_text(body)?;
    let simplified = state.generator.simplify(&text).await?;
    envelope(&simplified, ResultEnvelope::TEXT_SIMPLIFIED)
}

async fn upload_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResultEnvelope>, ServiceError> {
    // A request that is not multipart at all carries no file.
    let mut multipart = multipart.map_err(|e| {
        debug!("Not a multipart request: {}", e);
        ServiceError::input(input::NO_FILE)
    })?;

    let mut file_name = None;
    let mut bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::input(format!("Failed to read upload: {}", e.body_text())))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }
        file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ServiceError::input(format!("Failed to read upload: {}", e.body_text())))?;
        bytes = Some(data.to_vec());
        break;
    }

    let upload = input::require_pdf(file_name.as_deref(), bytes)?;
    let dataset = state.generator.topic_dataset_from_pdf(upload).await?;
    envelope(&dataset, ResultEnvelope::PDF_PROCESSED)
}
