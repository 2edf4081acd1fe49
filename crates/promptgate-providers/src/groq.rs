//! Groq provider — a generic REST-backed LLM behind a configurable URL.
//!
//! The endpoint receives `{"model": ..., "prompt": ...}` with bearer auth and
//! answers with JSON whose layout varies; [`crate::extract`] pulls the text
//! out. An optional [`CompletionFastPath`] can be tried first.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, warn};

use promptgate_core::config::GroqConfig;
use promptgate_core::utils::truncate_string;

use crate::error::ProviderError;
use crate::extract::extract_text;
use crate::traits::{LlmProvider, ProviderKind};

const PROVIDER: &str = "Groq";

/// Fixed timeout for the plain HTTP path.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ─────────────────────────────────────────────
// Fast path seam
// ─────────────────────────────────────────────

/// An alternative route to the same model, tried before the HTTP path.
///
/// Failures are logged and swallowed by [`GroqProvider`]; they never reach
/// the caller.
#[async_trait]
pub trait CompletionFastPath: Send + Sync {
    async fn generate(&self, api_key: &str, model: &str, prompt: &str)
        -> Result<String, ProviderError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

// ─────────────────────────────────────────────
// GroqProvider
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// REST provider configured by `GROQ_API_KEY`, `GROQ_MODEL` and `GROQ_API_URL`.
///
/// Missing settings are reported when `invoke` needs them, not at
/// construction, so the provider can always be built.
pub struct GroqProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_url: Option<String>,
    fast_path: Option<Box<dyn CompletionFastPath>>,
}

impl std::fmt::Debug for GroqProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqProvider")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("fast_path", &self.fast_path.as_ref().map(|fp| fp.name()))
            .finish()
    }
}

impl GroqProvider {
    /// Build from configuration.
    ///
    /// With the `chat-fast-path` feature and `GROQ_CHAT_URL` set, the
    /// chat-completions fast path is wired in.
    pub fn new(config: &GroqConfig) -> Self {
        let client = reqwest::Client::new();

        #[cfg(feature = "chat-fast-path")]
        let fast_path = config.chat_url.as_deref().filter(|u| !u.is_empty()).map(|url| {
            Box::new(crate::fast_path::ChatCompletionsFastPath::new(client.clone(), url))
                as Box<dyn CompletionFastPath>
        });
        #[cfg(not(feature = "chat-fast-path"))]
        let fast_path = None;

        Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            model: config.model.clone(),
            api_url: config.api_url.clone().filter(|u| !u.is_empty()),
            fast_path,
        }
    }

    /// Replace the fast path.
    pub fn with_fast_path(mut self, fast_path: Box<dyn CompletionFastPath>) -> Self {
        self.fast_path = Some(fast_path);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn require_api_key(&self) -> Result<&str, ProviderError> {
        self.api_key.as_deref().ok_or_else(|| {
            ProviderError::Config(
                "GROQ_API_KEY is not set. Set it to your Groq API key to use the Groq provider."
                    .to_string(),
            )
        })
    }

    fn require_api_url(&self) -> Result<&str, ProviderError> {
        self.api_url.as_deref().ok_or_else(|| {
            ProviderError::Config(
                "GROQ_API_URL is not set. Set it to your Groq REST endpoint \
                 (for example, https://api.groq.ai/v1/models/<model>/generate)."
                    .to_string(),
            )
        })
    }

    async fn generate_http(&self, api_key: &str, prompt: &str) -> Result<String, ProviderError> {
        let url = self.require_api_url()?;

        debug!(provider = PROVIDER, model = %self.model, url = %url, "Calling LLM");

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
            })
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "HTTP request failed");
                ProviderError::transport(PROVIDER, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                provider = PROVIDER,
                status = %status,
                body = %truncate_string(&body, 500),
                "API error"
            );
            return Err(ProviderError::status(PROVIDER, status, body));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "Failed to parse LLM response");
            ProviderError::invalid_response(PROVIDER, format!("body is not JSON: {e}"))
        })?;

        Ok(extract_text(&body))
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn invoke(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self.require_api_key()?;

        if let Some(fast_path) = &self.fast_path {
            match fast_path.generate(api_key, &self.model, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => warn!(
                    provider = PROVIDER,
                    fast_path = fast_path.name(),
                    error = %e,
                    "Fast path failed, falling back to HTTP"
                ),
            }
        }

        self.generate_http(api_key, prompt).await
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    fn display_name(&self) -> &str {
        PROVIDER
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
