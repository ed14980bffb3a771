//! Shared fakes and request helpers for the router tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use studykit::{
    server, ChatGateway, ChatMessage, ExtractionError, GatewayError, Generator, LinkPolicy,
    ResponseFormat, TextExtractor,
};
use tower::ServiceExt;

// ── Fakes ───────────────────────────────────────────────────────────────

/// Gateway that answers from a queue of canned results and records calls.
pub struct MockGateway {
    replies: Mutex<Vec<Result<String, GatewayError>>>,
    calls: Mutex<Vec<(Vec<ChatMessage>, ResponseFormat)>>,
}

impl MockGateway {
    pub fn new(replies: Vec<Result<String, GatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(raw: &str) -> Arc<Self> {
        Self::new(vec![Ok(raw.to_string())])
    }

    pub fn failing(err: GatewayError) -> Arc<Self> {
        Self::new(vec![Err(err)])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(Vec<ChatMessage>, ResponseFormat)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatGateway for MockGateway {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        format: ResponseFormat,
    ) -> Result<String, GatewayError> {
        self.calls.lock().unwrap().push((messages.to_vec(), format));
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Err(GatewayError::EmptyResponse)
        } else {
            replies.remove(0)
        }
    }
}

/// Extractor that returns fixed text and records the sizes it was handed.
pub struct FakeExtractor {
    text: String,
    seen: Mutex<Vec<usize>>,
}

impl FakeExtractor {
    pub fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn seen(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        self.seen.lock().unwrap().push(bytes.len());
        Ok(self.text.clone())
    }
}

// ── App and requests ────────────────────────────────────────────────────

pub const MAX_UPLOAD: usize = 1024 * 1024;

pub fn app(gateway: Arc<MockGateway>, extractor: Arc<FakeExtractor>) -> Router {
    app_with_policy(gateway, extractor, LinkPolicy::Prune)
}

pub fn app_with_policy(
    gateway: Arc<MockGateway>,
    extractor: Arc<FakeExtractor>,
    policy: LinkPolicy,
) -> Router {
    let generator = Generator::new(gateway, extractor).with_link_policy(policy);
    server::router(Arc::new(generator), MAX_UPLOAD)
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("response is not JSON ({e}): {:?}", String::from_utf8_lossy(&bytes)));
    (status, body)
}

pub async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, path, "application/json", body.to_string().into_bytes()).await
}

pub async fn post_raw(
    app: Router,
    path: &str,
    content_type: &str,
    body: Vec<u8>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub const BOUNDARY: &str = "studykit-test-boundary";

/// One-part multipart body. `file_name: None` omits the `filename` attribute.
pub fn multipart_body(field: &str, file_name: Option<&str>, bytes: &[u8]) -> Vec<u8> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn upload(app: Router, body: Vec<u8>) -> (StatusCode, Value) {
    post_raw(
        app,
        "/upload_pdf",
        &format!("multipart/form-data; boundary={BOUNDARY}"),
        body,
    )
    .await
}

pub const SAMPLE_TEXT: &str = "Photosynthesis is the process by which green plants use sunlight, \
water and carbon dioxide to make glucose and release oxygen.";
