//! Configuration schema.
//!
//! Hierarchy: `Config` → `ModelConfig`, `GoogleConfig`, `GroqConfig`,
//! `GatewayConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.promptgate/config.json` + env vars.
///
/// A loaded `Config` is treated as an immutable snapshot; the binary wraps
/// it in an `Arc` and never mutates it afterwards.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub model: ModelConfig,
    pub google: GoogleConfig,
    pub groq: GroqConfig,
    pub gateway: GatewayConfig,
}

// ─────────────────────────────────────────────
// Model selection
// ─────────────────────────────────────────────

/// Which provider family to use and which model to ask for.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    /// Provider selector string (`MODEL_PROVIDER`).
    pub provider: String,
    /// Model name passed to the primary provider (`MODEL_NAME`).
    pub name: String,
    /// Force the mock provider (`MOCK_LLM=1`).
    pub mock: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "google_genai".to_string(),
            name: "gemini-2.5-flash".to_string(),
            mock: false,
        }
    }
}

// ─────────────────────────────────────────────
// Google (Gemini)
// ─────────────────────────────────────────────

/// Credentials and endpoint for the Google Generative Language API.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleConfig {
    /// API key (`GOOGLE_API_KEY`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Path to a service-account or authorized-user JSON file
    /// (`GOOGLE_APPLICATION_CREDENTIALS`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_credentials: Option<PathBuf>,
    /// Where the gcloud application-default credentials file lives.
    ///
    /// Resolved by the loader from `CLOUDSDK_CONFIG` / the home directory;
    /// never read from the JSON file.
    #[serde(skip)]
    pub ambient_credentials: Option<PathBuf>,
    /// Ready-made OAuth access token (`GOOGLE_OAUTH_ACCESS_TOKEN`).
    #[serde(skip)]
    pub access_token: Option<String>,
    /// Override for the API base URL (`GOOGLE_GENAI_BASE_URL`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl GoogleConfig {
    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

// ─────────────────────────────────────────────
// Groq (generic REST provider)
// ─────────────────────────────────────────────

/// Settings for the REST-backed Groq provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroqConfig {
    /// API key (`GROQ_API_KEY`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model name (`GROQ_MODEL`).
    pub model: String,
    /// Full generate endpoint URL (`GROQ_API_URL`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// OpenAI-compatible chat completions URL for the fast path (`GROQ_CHAT_URL`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_url: Option<String>,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "groq-1".to_string(),
            api_url: None,
            chat_url: None,
        }
    }
}

impl GroqConfig {
    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

// ─────────────────────────────────────────────
// Gateway
// ─────────────────────────────────────────────

/// HTTP gateway bind address.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
