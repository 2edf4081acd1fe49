//! LLM Provider trait — the single contract every backend satisfies.
//!
//! Mock, Gemini and Groq all implement [`LlmProvider`]; the factory hands
//! out one of them as `Arc<dyn LlmProvider>`.

use std::fmt;

use async_trait::async_trait;

use crate::error::ProviderError;

/// The adapter variants this crate ships.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Mock,
    Gemini,
    Groq,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Mock => "mock",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Groq => "groq",
        };
        f.write_str(name)
    }
}

/// Trait that all LLM providers implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one prompt and return the generated text.
    ///
    /// Implementations may initialise their network client on the first
    /// call; they never retry on their own.
    async fn invoke(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Which adapter this is.
    fn kind(&self) -> ProviderKind;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
