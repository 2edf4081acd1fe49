//! Google credential resolution and OAuth access tokens.
//!
//! Resolution order:
//! 1) `GOOGLE_API_KEY`
//! 2) the JSON file named by `GOOGLE_APPLICATION_CREDENTIALS`
//! 3) ambient credentials: `GOOGLE_OAUTH_ACCESS_TOKEN`, then the gcloud
//!    application-default credentials file
//!
//! Credential files are either `service_account` keys (JWT-bearer grant) or
//! `authorized_user` refresh tokens. Access tokens are cached in memory and
//! refreshed before they expire.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use promptgate_core::config::GoogleConfig;

use crate::error::ProviderError;

/// Default Google OAuth token endpoint.
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// Scopes requested for service-account tokens.
const SCOPES: &str =
    "https://www.googleapis.com/auth/cloud-platform https://www.googleapis.com/auth/generative-language";
/// Refresh this many seconds before the token expires.
const EXPIRY_SAFETY_WINDOW: i64 = 300;
/// Lifetime assumed for tokens whose expiry is unknown.
const STATIC_TOKEN_LIFETIME: i64 = 600;

const TOKEN_PROVIDER: &str = "Google OAuth";

const MISSING_CREDENTIALS: &str = "Google credentials not found. Set GOOGLE_APPLICATION_CREDENTIALS \
     to a service account JSON or run `gcloud auth application-default login`, \
     or set GOOGLE_API_KEY in environment.";

// ─────────────────────────────────────────────
// Credential files
// ─────────────────────────────────────────────

/// A Google credentials JSON file, discriminated by its `type` field.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
}

/// Fields of a service-account key needed for the JWT flow.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

/// An OAuth refresh token written by `gcloud auth application-default login`.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub quota_project_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl CredentialsFile {
    /// Parse a credentials JSON document.
    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        serde_json::from_str(json)
            .map_err(|e| ProviderError::Credential(format!("Invalid credentials JSON: {e}")))
    }

    /// Read and parse a credentials file.
    pub async fn load(path: &Path) -> Result<Self, ProviderError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ProviderError::Credential(format!(
                "Failed to load credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content).map_err(|e| match e {
            ProviderError::Credential(msg) => {
                ProviderError::Credential(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }
}

// ─────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────

/// Where resolved credentials came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    ApiKey,
    CredentialsFile(PathBuf),
    AccessToken,
    Ambient(PathBuf),
}

/// Authentication material for Gemini calls.
pub enum GoogleAuth {
    /// Sent as `x-goog-api-key`.
    ApiKey(String),
    /// Sent as `Authorization: Bearer`.
    OAuth(TokenSource),
}

impl std::fmt::Debug for GoogleAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoogleAuth::ApiKey(_) => f.write_str("ApiKey(..)"),
            GoogleAuth::OAuth(_) => f.write_str("OAuth(..)"),
        }
    }
}

/// Report which credential source would be used, without reading any file.
///
/// `None` means [`resolve`] will fail with a credential error.
pub fn detect_source(config: &GoogleConfig) -> Option<CredentialSource> {
    if config.has_api_key() {
        return Some(CredentialSource::ApiKey);
    }
    if let Some(path) = &config.application_credentials {
        return Some(CredentialSource::CredentialsFile(path.clone()));
    }
    if config.access_token.as_deref().is_some_and(|t| !t.is_empty()) {
        return Some(CredentialSource::AccessToken);
    }
    config
        .ambient_credentials
        .as_ref()
        .filter(|path| path.is_file())
        .map(|path| CredentialSource::Ambient(path.clone()))
}

/// Resolve credentials in priority order.
///
/// Performs file reads only; no network traffic.
pub async fn resolve(
    config: &GoogleConfig,
    http: &reqwest::Client,
) -> Result<(GoogleAuth, CredentialSource), ProviderError> {
    let source =
        detect_source(config).ok_or_else(|| ProviderError::Credential(MISSING_CREDENTIALS.into()))?;

    let auth = match &source {
        CredentialSource::ApiKey => GoogleAuth::ApiKey(config.api_key.clone().unwrap_or_default()),
        CredentialSource::AccessToken => GoogleAuth::OAuth(TokenSource::fixed(
            config.access_token.clone().unwrap_or_default(),
            http.clone(),
        )),
        CredentialSource::CredentialsFile(path) | CredentialSource::Ambient(path) => {
            let file = CredentialsFile::load(path).await?;
            GoogleAuth::OAuth(TokenSource::from_file(file, http.clone())?)
        }
    };

    debug!(source = ?source, "Resolved Google credentials");
    Ok((auth, source))
}

// ─────────────────────────────────────────────
// Token source
// ─────────────────────────────────────────────

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Clone, Debug)]
struct CachedToken {
    token: String,
    /// Unix timestamp seconds when the token expires.
    exp_unix: i64,
}

enum Grant {
    Fixed(String),
    ServiceAccount {
        key: ServiceAccountKey,
        signing_key: EncodingKey,
    },
    AuthorizedUser(AuthorizedUser),
}

/// Supplies OAuth access tokens, caching them until shortly before expiry.
///
/// The cache lock is only held to read or store a token; the token request
/// itself runs unlocked, so concurrent refreshes may both hit the endpoint.
pub struct TokenSource {
    grant: Grant,
    http: reqwest::Client,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    fn fixed(token: String, http: reqwest::Client) -> Self {
        Self {
            grant: Grant::Fixed(token),
            http,
            cache: Mutex::new(None),
        }
    }

    /// Build from a parsed credentials file.
    ///
    /// A service-account key whose PEM doesn't parse is a credential error.
    pub fn from_file(file: CredentialsFile, http: reqwest::Client) -> Result<Self, ProviderError> {
        let grant = match file {
            CredentialsFile::ServiceAccount(key) => {
                let signing_key =
                    EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
                        ProviderError::Credential(format!("Invalid RSA private key (PEM): {e}"))
                    })?;
                Grant::ServiceAccount { key, signing_key }
            }
            CredentialsFile::AuthorizedUser(user) => Grant::AuthorizedUser(user),
        };
        Ok(Self {
            grant,
            http,
            cache: Mutex::new(None),
        })
    }

    /// Project billed for quota, sent as `x-goog-user-project`.
    pub fn quota_project(&self) -> Option<&str> {
        match &self.grant {
            Grant::AuthorizedUser(user) => user.quota_project_id.as_deref(),
            _ => None,
        }
    }

    /// Return a valid access token, fetching a new one if needed.
    pub async fn access_token(&self) -> Result<String, ProviderError> {
        if let Some(token) = self.cached() {
            return Ok(token);
        }

        let (token, expires_in) = match &self.grant {
            Grant::Fixed(token) => return Ok(token.clone()),
            Grant::ServiceAccount { key, signing_key } => {
                self.fetch_service_account(key, signing_key).await?
            }
            Grant::AuthorizedUser(user) => self.fetch_authorized_user(user).await?,
        };

        self.store(token.clone(), expires_in);
        Ok(token)
    }

    fn cached(&self) -> Option<String> {
        let now = chrono::Utc::now().timestamp();
        let guard = self.cache.lock().ok()?;
        let token = guard
            .as_ref()
            .filter(|ct| ct.exp_unix - EXPIRY_SAFETY_WINDOW > now)
            .map(|ct| ct.token.clone());
        token
    }

    fn store(&self, token: String, expires_in: i64) {
        let exp_unix = chrono::Utc::now().timestamp() + expires_in;
        if let Ok(mut guard) = self.cache.lock() {
            *guard = Some(CachedToken { token, exp_unix });
        }
    }

    async fn fetch_service_account(
        &self,
        key: &ServiceAccountKey,
        signing_key: &EncodingKey,
    ) -> Result<(String, i64), ProviderError> {
        let token_uri = key.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: SCOPES,
            aud: token_uri,
            iat: now,
            exp: now + 3600,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("JWT".to_string());
        let assertion = jsonwebtoken::encode(&header, &claims, signing_key)
            .map_err(|e| ProviderError::Credential(format!("Failed to sign JWT: {e}")))?;

        let form = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];
        self.exchange(token_uri, &form).await
    }

    async fn fetch_authorized_user(
        &self,
        user: &AuthorizedUser,
    ) -> Result<(String, i64), ProviderError> {
        let token_uri = user.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", user.client_id.as_str()),
            ("client_secret", user.client_secret.as_str()),
            ("refresh_token", user.refresh_token.as_str()),
        ];
        self.exchange(token_uri, &form).await
    }

    async fn exchange(
        &self,
        token_uri: &str,
        form: &[(&str, &str)],
    ) -> Result<(String, i64), ProviderError> {
        debug!(token_uri = %token_uri, "Requesting Google access token");

        let response = self
            .http
            .post(token_uri)
            .form(form)
            .send()
            .await
            .map_err(|e| ProviderError::transport(TOKEN_PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(TOKEN_PROVIDER, status, body));
        }

        let tr: TokenResponse = response.json().await.map_err(|e| {
            ProviderError::invalid_response(TOKEN_PROVIDER, format!("token response: {e}"))
        })?;

        Ok((
            tr.access_token,
            tr.expires_in.unwrap_or(STATIC_TOKEN_LIFETIME),
        ))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
