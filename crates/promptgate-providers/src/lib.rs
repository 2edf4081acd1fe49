//! LLM provider layer for PromptGate.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`] — trait that all providers implement
//! - [`registry`] — static specs for the known backends + selector matching
//! - [`factory::ProviderFactory`] — picks one backend per process, shared via `Arc`
//! - [`gemini::GeminiProvider`] — primary cloud provider (Google Generative Language API)
//! - [`groq::GroqProvider`] — generic REST provider with JSON text extraction
//! - [`mock::MockProvider`] — offline echo provider

pub mod error;
pub mod extract;
pub mod factory;
#[cfg(feature = "chat-fast-path")]
pub mod fast_path;
pub mod gemini;
pub mod google_auth;
pub mod groq;
pub mod mock;
pub mod registry;
pub mod traits;

// Re-export main types for convenience
pub use error::{CallError, ErrorKind, ProviderError};
pub use factory::{build_provider, select, ProviderFactory};
pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use mock::MockProvider;
pub use registry::{ProviderSpec, PROVIDERS};
pub use traits::{LlmProvider, ProviderKind};
