//! Gemini provider — Google's Generative Language API.
//!
//! The authenticated client is built on the first `invoke`: credentials are
//! resolved (API key, credentials file, or ambient gcloud login) and the
//! resulting client is cached for every later call. If that first
//! initialisation fails the error is returned and the next call tries again.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use promptgate_core::config::GoogleConfig;
use promptgate_core::utils::truncate_string;

use crate::error::ProviderError;
use crate::google_auth::{self, GoogleAuth};
use crate::traits::{LlmProvider, ProviderKind};

const PROVIDER: &str = "Gemini";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, String> {
        let text: Option<String> = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect());

        match (text, self.prompt_feedback.and_then(|f| f.block_reason)) {
            (Some(text), _) if !text.is_empty() => Ok(text),
            (_, Some(reason)) => Err(format!("prompt blocked: {reason}")),
            _ => Err("no candidate text in response".to_string()),
        }
    }
}

// ─────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────

/// Authenticated chat client bound to one model.
#[derive(Debug)]
struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    auth: GoogleAuth,
}

impl GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut request = self.http.post(&self.endpoint).json(&GenerateContentRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        });

        request = match &self.auth {
            GoogleAuth::ApiKey(key) => request.header("x-goog-api-key", key),
            GoogleAuth::OAuth(tokens) => {
                let token = tokens.access_token().await?;
                let request = request.bearer_auth(token);
                match tokens.quota_project() {
                    Some(project) => request.header("x-goog-user-project", project),
                    None => request,
                }
            }
        };

        debug!(provider = PROVIDER, endpoint = %self.endpoint, "Calling LLM");

        let response = request.send().await.map_err(|e| {
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

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "Failed to parse LLM response");
            ProviderError::invalid_response(PROVIDER, e.to_string())
        })?;

        parsed
            .into_text()
            .map_err(|message| ProviderError::invalid_response(PROVIDER, message))
    }
}

// ─────────────────────────────────────────────
// GeminiProvider
// ─────────────────────────────────────────────

/// Primary cloud provider. Construction is free of I/O.
pub struct GeminiProvider {
    config: GoogleConfig,
    model: String,
    http: reqwest::Client,
    client: OnceCell<GeminiClient>,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model", &self.model)
            .field("initialized", &self.client.initialized())
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(config: &GoogleConfig, model: &str) -> Self {
        Self {
            config: config.clone(),
            model: model.to_string(),
            http: reqwest::Client::new(),
            client: OnceCell::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether the network client has been built.
    pub fn is_initialized(&self) -> bool {
        self.client.initialized()
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .api_base
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{base}/v1beta/models/{model}:generateContent")
    }

    async fn init_client(&self) -> Result<GeminiClient, ProviderError> {
        let (auth, source) = google_auth::resolve(&self.config, &self.http).await?;
        info!(provider = PROVIDER, model = %self.model, source = ?source, "Initialized LLM client");
        Ok(GeminiClient {
            http: self.http.clone(),
            endpoint: self.endpoint(),
            auth,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn invoke(&self, prompt: &str) -> Result<String, ProviderError> {
        // A failed init leaves the cell empty, so the next call retries.
        let client = self.client.get_or_try_init(|| self.init_client()).await?;
        // Call errors keep the cached client; only initialisation is retried.
        client.generate(prompt).await
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn display_name(&self) -> &str {
        PROVIDER
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CallError, ErrorKind};
    use std::path::Path;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn isolated_config(dir: &Path, api_base: Option<&str>) -> GoogleConfig {
        GoogleConfig {
            ambient_credentials: Some(dir.join("application_default_credentials.json")),
            api_base: api_base.map(String::from),
            ..Default::default()
        }
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[test]
    fn test_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let provider = GeminiProvider::new(&isolated_config(dir.path(), None), "gemini-2.5-flash");
        assert_eq!(
            provider.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let custom = GeminiProvider::new(
            &isolated_config(dir.path(), Some("http://localhost:9000/")),
            "models/gemini-pro",
        );
        assert_eq!(
            custom.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_construction_is_lazy() {
        let dir = tempfile::tempdir().unwrap();
        let provider = GeminiProvider::new(&isolated_config(dir.path(), None), "gemini-2.5-flash");
        assert!(!provider.is_initialized());
        assert_eq!(provider.kind(), ProviderKind::Gemini);
    }

    #[tokio::test]
    async fn test_no_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("x")))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = GeminiProvider::new(
            &isolated_config(dir.path(), Some(&mock_server.uri())),
            "gemini-2.5-flash",
        );

        let err = provider.invoke("hello").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Credential);
        assert!(!provider.is_initialized());
    }

    #[tokio::test]
    async fn test_api_key_call() {
        let dir = tempfile::tempdir().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "AIza-test"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": "What is Rust?" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("A language.")))
            .mount(&mock_server)
            .await;

        let mut config = isolated_config(dir.path(), Some(&mock_server.uri()));
        config.api_key = Some("AIza-test".into());
        let provider = GeminiProvider::new(&config, "gemini-2.5-flash");

        assert_eq!(provider.invoke("What is Rust?").await.unwrap(), "A language.");
        assert!(provider.is_initialized());
    }

    #[tokio::test]
    async fn test_multi_part_text_is_concatenated() {
        let dir = tempfile::tempdir().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }] } }]
            })))
            .mount(&mock_server)
            .await;

        let mut config = isolated_config(dir.path(), Some(&mock_server.uri()));
        config.api_key = Some("k".into());
        let provider = GeminiProvider::new(&config, "gemini-2.5-flash");

        assert_eq!(provider.invoke("hi").await.unwrap(), "Hello, world");
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&mock_server)
            .await;

        let mut config = isolated_config(dir.path(), Some(&mock_server.uri()));
        config.api_key = Some("k".into());
        let provider = GeminiProvider::new(&config, "gemini-2.5-flash");

        let err = provider.invoke("hi").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Call(CallError::InvalidResponse { .. })
        ));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_api_error_keeps_cached_client() {
        let dir = tempfile::tempdir().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&mock_server)
            .await;

        let mut config = isolated_config(dir.path(), Some(&mock_server.uri()));
        config.api_key = Some("bad".into());
        let provider = GeminiProvider::new(&config, "gemini-2.5-flash");

        let err = provider.invoke("hi").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProviderCall);
        assert!(err.to_string().contains("403"));
        assert!(provider.is_initialized());
    }

    #[tokio::test]
    async fn test_failed_init_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.user",
                "expires_in": 3600
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("Authorization", "Bearer ya29.user"))
            .and(header("x-goog-user-project", "quota-proj"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("ok")))
            .mount(&mock_server)
            .await;

        let creds_path = dir.path().join("creds.json");
        let mut config = isolated_config(dir.path(), Some(&mock_server.uri()));
        config.application_credentials = Some(creds_path.clone());
        let provider = GeminiProvider::new(&config, "gemini-2.5-flash");

        // File doesn't exist yet
        let err = provider.invoke("hi").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Credential);
        assert!(!provider.is_initialized());

        std::fs::write(
            &creds_path,
            serde_json::json!({
                "type": "authorized_user",
                "client_id": "cid",
                "client_secret": "secret",
                "refresh_token": "rt",
                "quota_project_id": "quota-proj",
                "token_uri": format!("{}/token", mock_server.uri())
            })
            .to_string(),
        )
        .unwrap();

        assert_eq!(provider.invoke("hi").await.unwrap(), "ok");
        assert!(provider.is_initialized());
    }

    #[tokio::test]
    async fn test_ambient_access_token() {
        let dir = tempfile::tempdir().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("Authorization", "Bearer ya29.ambient"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("ambient ok")))
            .mount(&mock_server)
            .await;

        let mut config = isolated_config(dir.path(), Some(&mock_server.uri()));
        config.access_token = Some("ya29.ambient".into());
        let provider = GeminiProvider::new(&config, "gemini-2.5-flash");

        assert_eq!(provider.invoke("hi").await.unwrap(), "ambient ok");
    }

    #[tokio::test]
    async fn test_concurrent_first_use_initializes_once() {
        let dir = tempfile::tempdir().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.shared",
                "expires_in": 3600
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("ok")))
            .expect(8)
            .mount(&mock_server)
            .await;

        let adc = dir.path().join("application_default_credentials.json");
        std::fs::write(
            &adc,
            serde_json::json!({
                "type": "authorized_user",
                "client_id": "cid",
                "client_secret": "secret",
                "refresh_token": "rt",
                "token_uri": format!("{}/token", mock_server.uri())
            })
            .to_string(),
        )
        .unwrap();

        let config = isolated_config(dir.path(), Some(&mock_server.uri()));
        let provider = std::sync::Arc::new(GeminiProvider::new(&config, "gemini-2.5-flash"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let provider = provider.clone();
                tokio::spawn(async move { provider.invoke("hi").await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "ok");
        }
        assert!(provider.is_initialized());
    }

    #[tokio::test]
    async fn test_service_account_bearer_call() {
        let dir = tempfile::tempdir().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.sa",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("Authorization", "Bearer ya29.sa"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("signed ok")))
            .expect(2)
            .mount(&mock_server)
            .await;

        let creds_path = dir.path().join("sa.json");
        std::fs::write(
            &creds_path,
            crate::google_auth::tests::service_account_json(&format!(
                "{}/token",
                mock_server.uri()
            )),
        )
        .unwrap();
        let mut config = isolated_config(dir.path(), Some(&mock_server.uri()));
        config.application_credentials = Some(creds_path);
        let provider = GeminiProvider::new(&config, "gemini-2.5-flash");

        assert_eq!(provider.invoke("hi").await.unwrap(), "signed ok");
        assert_eq!(provider.invoke("again").await.unwrap(), "signed ok");
    }
}
