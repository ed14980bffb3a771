//! Configuration types for the generation service.
//!
//! All process-wide settings live in [`ServiceConfig`], built once at startup
//! via [`ServiceConfigBuilder`] and shared read-only afterwards. The gateway
//! receives its own slice, [`GatewayConfig`], through its constructor; nothing
//! in the library reads the environment on its own.

use crate::error::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Settings for the chat-completion gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Base URL of an OpenAI-compatible API, without the `/chat/completions`
    /// suffix. Default: `https://api.openai.com/v1`.
    pub base_url: String,

    /// Bearer credential. `None` sends no `Authorization` header, which is
    /// what local servers (Ollama, LM Studio) expect.
    pub api_key: Option<String>,

    /// Model identifier. Default: `gpt-4.1-nano`.
    pub model: String,

    /// Sampling temperature. Default: 0.3.
    pub temperature: Option<f32>,

    /// Completion token cap. `None` leaves it to the provider.
    pub max_tokens: Option<u32>,

    /// Transport timeout for one call, in seconds. Default: 120.
    ///
    /// A whole textbook chapter in, a full topic dataset out: these calls
    /// are long. This is the only timeout in the pipeline.
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4.1-nano".to_string(),
            temperature: Some(0.3),
            max_tokens: None,
            request_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl GatewayConfig {
    /// Full URL of the chat-completion endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// What to do with a mind-map link whose endpoint is not a node key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPolicy {
    /// Drop the link silently (default).
    #[default]
    Prune,
    /// Fail the whole request with a structural error.
    Reject,
}

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub gateway: GatewayConfig,

    /// Dangling mind-map link handling. Default: [`LinkPolicy::Prune`].
    pub link_policy: LinkPolicy,

    /// Request body cap for PDF uploads, in bytes. Default: 20 MiB.
    pub max_upload_bytes: usize,

    /// Explicit path to the pdfium shared library. `None` binds the system
    /// library.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            link_policy: LinkPolicy::default(),
            max_upload_bytes: 20 * 1024 * 1024,
            pdfium_lib_path: None,
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gateway.base_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.gateway.api_key = if key.is_empty() { None } else { Some(key) };
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.gateway.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.gateway.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.gateway.max_tokens = Some(n);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.gateway.request_timeout_secs = secs.max(1);
        self
    }

    pub fn link_policy(mut self, policy: LinkPolicy) -> Self {
        self.config.link_policy = policy;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, ServiceError> {
        let c = &self.config;
        let url = c.gateway.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ServiceError::Internal(format!(
                "Invalid configuration: base URL must be http(s), got '{}'",
                c.gateway.base_url
            )));
        }
        if c.gateway.model.trim().is_empty() {
            return Err(ServiceError::Internal(
                "Invalid configuration: model name is empty".into(),
            ));
        }
        if c.max_upload_bytes < 1024 {
            return Err(ServiceError::Internal(format!(
                "Invalid configuration: upload limit must be ≥ 1024 bytes, got {}",
                c.max_upload_bytes
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let config = ServiceConfig::builder().build().unwrap();
        assert_eq!(config.link_policy, LinkPolicy::Prune);
        assert_eq!(config.gateway.request_timeout_secs, 120);
        assert!(config.gateway.api_key.is_none());
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let config = ServiceConfig::builder()
            .base_url("http://localhost:11434/v1/")
            .build()
            .unwrap();
        assert_eq!(
            config.gateway.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn empty_api_key_means_none() {
        let config = ServiceConfig::builder().api_key("").build().unwrap();
        assert!(config.gateway.api_key.is_none());
    }

    #[test]
    fn temperature_is_clamped() {
        let config = ServiceConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(config.gateway.temperature, Some(2.0));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = ServiceConfig::builder().base_url("ftp://x").build().unwrap_err();
        assert!(err.to_string().contains("base URL"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ServiceConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{:?}", config);
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
