//! Config loader — reads `~/.promptgate/config.json`, a local `.env` file,
//! and merges environment variables.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.promptgate/config.json` (or an explicit path)
//! 3. Environment variables (override JSON); a `.env` file in the working
//!    directory is loaded into the environment first, without replacing
//!    variables that are already set.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;
use crate::utils;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    utils::get_data_path().join("config.json")
}

/// Load configuration from the default path (or `path`) + `.env` + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    load_dotenv();

    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    let config = load_config_from_path(&config_path);
    apply_overrides(config, &|name| std::env::var(name).ok())
}

/// Load a `.env` file from the working directory, if present.
fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Failed to load .env file: {}", e),
    }
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Apply environment overrides on top of a loaded config.
///
/// `lookup` returns the value of a variable; empty values count as unset.
///
/// Supported variables:
/// - `MODEL_PROVIDER`, `MODEL_NAME`, `MOCK_LLM`
/// - `GOOGLE_API_KEY`, `GOOGLE_APPLICATION_CREDENTIALS`, `GOOGLE_GENAI_BASE_URL`,
///   `GOOGLE_OAUTH_ACCESS_TOKEN`
/// - `GROQ_API_KEY`, `GROQ_MODEL`, `GROQ_API_URL`, `GROQ_CHAT_URL`
/// - `PROMPTGATE_GATEWAY__HOST`, `PROMPTGATE_GATEWAY__PORT`
///
/// The gcloud ambient-credentials location is always resolved here.
pub fn apply_overrides(mut config: Config, lookup: &dyn Fn(&str) -> Option<String>) -> Config {
    let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

    // Model selection
    if let Some(val) = var("MODEL_PROVIDER") {
        config.model.provider = val;
    }
    if let Some(val) = var("MODEL_NAME") {
        config.model.name = val;
    }
    if let Some(val) = var("MOCK_LLM") {
        config.model.mock = val == "1";
    }

    // Google
    if let Some(val) = var("GOOGLE_API_KEY") {
        config.google.api_key = Some(val);
    }
    if let Some(val) = var("GOOGLE_APPLICATION_CREDENTIALS") {
        config.google.application_credentials = Some(PathBuf::from(val));
    }
    if let Some(val) = var("GOOGLE_GENAI_BASE_URL") {
        config.google.api_base = Some(val);
    }
    if let Some(val) = var("GOOGLE_OAUTH_ACCESS_TOKEN") {
        config.google.access_token = Some(val);
    }
    config.google.ambient_credentials =
        utils::gcloud_adc_path(var("CLOUDSDK_CONFIG").as_deref(), var("APPDATA").as_deref());

    // Groq
    if let Some(val) = var("GROQ_API_KEY") {
        config.groq.api_key = Some(val);
    }
    if let Some(val) = var("GROQ_MODEL") {
        config.groq.model = val;
    }
    if let Some(val) = var("GROQ_API_URL") {
        config.groq.api_url = Some(val);
    }
    if let Some(val) = var("GROQ_CHAT_URL") {
        config.groq.chat_url = Some(val);
    }

    // Gateway
    if let Some(val) = var("PROMPTGATE_GATEWAY__HOST") {
        config.gateway.host = val;
    }
    if let Some(val) = var("PROMPTGATE_GATEWAY__PORT") {
        match val.parse::<u16>() {
            Ok(p) => config.gateway.port = p,
            Err(_) => warn!("Ignoring invalid PROMPTGATE_GATEWAY__PORT: {}", val),
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
