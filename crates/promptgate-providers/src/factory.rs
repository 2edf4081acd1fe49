//! Provider factory — picks one backend per process and hands out a shared
//! instance.
//!
//! Selection order:
//! 1. `model.mock` (`MOCK_LLM=1`) → [`MockProvider`]
//! 2. `model.provider` matching a selectable registry entry → that backend
//! 3. anything else → Gemini, with a warning
//!
//! The chosen provider is built lazily on the first [`ProviderFactory::get_provider`]
//! call and the same `Arc` is returned to every caller afterwards.

use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use promptgate_core::config::Config;

use crate::gemini::GeminiProvider;
use crate::groq::GroqProvider;
use crate::mock::MockProvider;
use crate::registry;
use crate::traits::{LlmProvider, ProviderKind};

/// Decide which backend the configuration asks for, without building it.
pub fn select(config: &Config) -> ProviderKind {
    if config.model.mock {
        return ProviderKind::Mock;
    }

    match registry::find_by_selector(&config.model.provider) {
        Some(spec) => spec.kind,
        None => {
            warn!(
                selector = %config.model.provider,
                fallback = registry::primary().display_name,
                "Unknown MODEL_PROVIDER, falling back to the primary provider"
            );
            registry::primary().kind
        }
    }
}

/// Build a fresh provider of the given kind. Performs no network I/O.
pub fn build_provider(kind: ProviderKind, config: &Config) -> Arc<dyn LlmProvider> {
    debug!(provider = %kind, model = %config.model.name, "Creating LLM provider");
    match kind {
        ProviderKind::Mock => Arc::new(MockProvider::new()),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(&config.google, &config.model.name)),
        ProviderKind::Groq => Arc::new(GroqProvider::new(&config.groq)),
    }
}

/// Process-wide provider holder.
///
/// Safe to share across tasks and threads; concurrent first calls still
/// produce a single instance.
pub struct ProviderFactory {
    config: Config,
    provider: OnceLock<Arc<dyn LlmProvider>>,
}

impl ProviderFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            provider: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Which backend `get_provider` returns (or will return).
    pub fn selected_kind(&self) -> ProviderKind {
        match self.provider.get() {
            Some(provider) => provider.kind(),
            None => select(&self.config),
        }
    }

    /// The shared provider instance, built on first use.
    pub fn get_provider(&self) -> Arc<dyn LlmProvider> {
        self.provider
            .get_or_init(|| build_provider(select(&self.config), &self.config))
            .clone()
    }
}

impl std::fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("selector", &self.config.model.provider)
            .field("mock", &self.config.model.mock)
            .field("built", &self.provider.get().is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
