//! Error taxonomy shared by every provider.
//!
//! Three kinds reach the caller:
//! - configuration errors, raised before any I/O
//! - credential errors, when auth material is absent or unreadable
//! - provider call errors, for transport failures, non-success statuses
//!   and unusable response bodies

use thiserror::Error;

/// Error returned by [`LlmProvider::invoke`](crate::traits::LlmProvider::invoke).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("credential error: {0}")]
    Credential(String),

    #[error(transparent)]
    Call(#[from] CallError),
}

/// A failed call to a provider backend.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("{provider} API returned status {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to call {provider} API: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid {provider} response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },
}

/// Coarse classification of a [`ProviderError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Credential,
    ProviderCall,
}

impl ProviderError {
    /// Which of the three error kinds this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::Config(_) => ErrorKind::Config,
            ProviderError::Credential(_) => ErrorKind::Credential,
            ProviderError::Call(_) => ErrorKind::ProviderCall,
        }
    }

    pub(crate) fn status(provider: &'static str, status: reqwest::StatusCode, body: String) -> Self {
        CallError::Status {
            provider,
            status: status.as_u16(),
            body,
        }
        .into()
    }

    pub(crate) fn transport(provider: &'static str, source: reqwest::Error) -> Self {
        CallError::Transport { provider, source }.into()
    }

    pub(crate) fn invalid_response(provider: &'static str, message: impl Into<String>) -> Self {
        CallError::InvalidResponse {
            provider,
            message: message.into(),
        }
        .into()
    }
}
