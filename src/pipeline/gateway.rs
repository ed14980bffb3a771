//! Chat-completion gateway: the only stage with network I/O.
//!
//! The gateway sends role-tagged messages to an OpenAI-compatible
//! `/chat/completions` endpoint and hands back the first choice's text
//! untouched. It does not parse or validate that text; that is
//! [`crate::pipeline::validate`]'s job.
//!
//! One call per invocation. There is no retry loop: a failed call fails the
//! request, and the client resubmits.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Output mode requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// `response_format: {"type": "json_object"}`.
    JsonObject,
    /// Free text; no `response_format` field is sent.
    Text,
}

/// Anything that can turn a conversation into raw model text.
///
/// The HTTP implementation is [`OpenAiGateway`]; tests substitute an
/// in-process fake.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    fn model_name(&self) -> &str;

    async fn complete(
        &self,
        messages: &[ChatMessage],
        format: ResponseFormat,
    ) -> Result<String, GatewayError>;
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ResponseFormatBody {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

// ── HTTP implementation ──────────────────────────────────────────────────

/// OpenAI-compatible chat-completion client.
pub struct OpenAiGateway {
    config: GatewayConfig,
    http: reqwest::Client,
}

impl OpenAiGateway {
    /// Build the client. Fails only if the TLS backend cannot initialise.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Network(format!("HTTP client setup failed: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[async_trait]
impl ChatGateway for OpenAiGateway {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        format: ResponseFormat,
    ) -> Result<String, GatewayError> {
        if messages.is_empty() {
            return Err(GatewayError::EmptyConversation);
        }

        let url = self.config.completions_url();
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            response_format: match format {
                ResponseFormat::JsonObject => Some(ResponseFormatBody {
                    kind: "json_object",
                }),
                ResponseFormat::Text => None,
            },
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let prompt_chars: usize = messages.iter().map(|m| m.content.len()).sum();
        debug!(
            "LLM request to {}: {} messages, {} chars, format={:?}",
            url,
            messages.len(),
            prompt_chars,
            format
        );

        let start = Instant::now();
        let mut req_builder = self.http.post(&url).json(&request);
        if let Some(api_key) = &self.config.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        let response = req_builder.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM request failed ({}): {}", status, body);
            return Err(status_error(status.as_u16(), body));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                transport_error(e)
            } else {
                GatewayError::MalformedResponse(e.to_string())
            }
        })?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or(GatewayError::EmptyResponse)?;
        let content = choice.message.content.ok_or(GatewayError::EmptyResponse)?;

        match body.usage {
            Some(usage) => info!(
                "LLM response: {} chars, {} input / {} output tokens, finish_reason={:?}, {:?}",
                content.len(),
                usage.prompt_tokens,
                usage.completion_tokens,
                choice.finish_reason,
                start.elapsed()
            ),
            None => info!(
                "LLM response: {} chars, finish_reason={:?}, {:?}",
                content.len(),
                choice.finish_reason,
                start.elapsed()
            ),
        }

        Ok(content)
    }
}

/// Map a non-success HTTP status to the gateway taxonomy.
fn status_error(status: u16, body: String) -> GatewayError {
    match status {
        401 | 403 => GatewayError::Auth {
            status,
            detail: body,
        },
        429 => GatewayError::RateLimited { detail: body },
        408 | 504 => GatewayError::Timeout {
            detail: format!("HTTP {status}: {body}"),
        },
        _ => GatewayError::Upstream { status, body },
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout {
            detail: e.to_string(),
        }
    } else {
        GatewayError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_request_body_shape() {
        let messages = vec![ChatMessage::system("s"), ChatMessage::user("u")];
        let request = ChatRequest {
            model: "gpt-4.1-nano",
            messages: &messages,
            response_format: Some(ResponseFormatBody {
                kind: "json_object",
            }),
            temperature: Some(0.3),
            max_tokens: None,
        };
        let v = serde_json::to_value(&request).unwrap();
        assert_eq!(v["model"], "gpt-4.1-nano");
        assert_eq!(v["response_format"], json!({"type": "json_object"}));
        assert_eq!(v["messages"][0], json!({"role": "system", "content": "s"}));
        assert!(v.get("max_tokens").is_none());
    }

    #[test]
    fn text_request_omits_response_format() {
        let messages = vec![ChatMessage::user("u")];
        let request = ChatRequest {
            model: "m",
            messages: &messages,
            response_format: None,
            temperature: None,
            max_tokens: Some(512),
        };
        let v = serde_json::to_value(&request).unwrap();
        assert!(v.get("response_format").is_none());
        assert_eq!(v["max_tokens"], 512);
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            status_error(401, "bad key".into()),
            GatewayError::Auth { status: 401, .. }
        ));
        assert!(matches!(
            status_error(429, "quota".into()),
            GatewayError::RateLimited { .. }
        ));
        assert!(matches!(
            status_error(504, String::new()),
            GatewayError::Timeout { .. }
        ));
        assert!(matches!(
            status_error(500, "boom".into()),
            GatewayError::Upstream { status: 500, .. }
        ));
    }

    #[test]
    fn response_without_usage_parses() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{}"},"finish_reason":"stop"}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("{}"));
        assert!(parsed.usage.is_none());
    }

    #[tokio::test]
    async fn empty_conversation_is_rejected_before_any_io() {
        let gateway = OpenAiGateway::new(GatewayConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..GatewayConfig::default()
        })
        .unwrap();
        let err = gateway
            .complete(&[], ResponseFormat::JsonObject)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::EmptyConversation));
    }
}
