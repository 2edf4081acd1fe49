//! Mock provider — echoes the prompt back without touching the network.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::traits::{LlmProvider, ProviderKind};

/// Deterministic provider for tests and credential-less environments.
#[derive(Clone, Debug, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn invoke(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(format!("[MOCK RESPONSE] You said: {prompt}"))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Mock
    }

    fn display_name(&self) -> &str {
        "Mock"
    }
}
