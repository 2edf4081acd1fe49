//! Chat-completions fast path for the Groq provider.
//!
//! Groq also serves an OpenAI-compatible `/chat/completions` endpoint. When
//! `GROQ_CHAT_URL` points at it, [`GroqProvider`](crate::groq::GroqProvider)
//! tries this route before its plain generate endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::groq::{CompletionFastPath, REQUEST_TIMEOUT};

const PROVIDER: &str = "Groq chat";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Single-message call to an OpenAI-compatible chat completions endpoint.
pub struct ChatCompletionsFastPath {
    client: reqwest::Client,
    url: String,
}

impl ChatCompletionsFastPath {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl CompletionFastPath for ChatCompletionsFastPath {
    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        debug!(provider = PROVIDER, model = %model, url = %self.url, "Calling LLM");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&ChatCompletionRequest {
                model,
                messages: [ChatMessage {
                    role: "user",
                    content: prompt,
                }],
            })
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(PROVIDER, status, body));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(PROVIDER, e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::invalid_response(PROVIDER, "no message content"))
    }

    fn name(&self) -> &str {
        "chat-completions"
    }
}
