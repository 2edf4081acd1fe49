//! `promptgate status` — show configuration and provider status.
//!
//! - Shows config path and the provider the factory would select
//! - Shows which Google credential source would be used
//! - Shows Groq settings

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use promptgate_core::config::Config;
use promptgate_providers::google_auth::{detect_source, CredentialSource};
use promptgate_providers::registry::{self, ProviderSpec, PROVIDERS};
use promptgate_providers::{select, ProviderKind};

use crate::helpers::mark;

/// Run the status command.
pub fn run(config: &Config, config_path: &Path) -> Result<()> {
    println!();
    println!("{}", "⚡ PromptGate Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    let kind = select(config);
    let spec = registry::find_by_kind(kind);
    println!(
        "  {:<18} {} {}",
        "Provider:".bold(),
        spec.display_name,
        format!("(MODEL_PROVIDER={})", config.model.provider).dimmed()
    );
    if kind == ProviderKind::Mock {
        println!("  {:<18} {}", "Mock:".bold(), "MOCK_LLM=1".yellow());
    }
    println!("  {:<18} {}", "Model:".bold(), config.model.name);

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let status = match spec.kind {
            ProviderKind::Mock => mark(true, "always available"),
            ProviderKind::Gemini => google_status(config),
            ProviderKind::Groq => groq_status(config),
        };
        println!(
            "    {:<20} {}  {}",
            spec.display_name,
            status,
            env_hint(spec).dimmed()
        );
    }

    println!();
    Ok(())
}

/// Environment variables that configure a provider, for the report.
fn env_hint(spec: &ProviderSpec) -> String {
    format!("[{}]", spec.env_keys.join(", "))
}

fn google_status(config: &Config) -> String {
    match detect_source(&config.google) {
        Some(CredentialSource::ApiKey) => mark(true, "API key set"),
        Some(CredentialSource::CredentialsFile(path)) => {
            mark(path.exists(), &format!("credentials file {}", path.display()))
        }
        Some(CredentialSource::AccessToken) => mark(true, "access token set"),
        Some(CredentialSource::Ambient(path)) => {
            mark(true, &format!("gcloud credentials {}", path.display()))
        }
        None => mark(false, "no credentials found"),
    }
}

fn groq_status(config: &Config) -> String {
    let groq = &config.groq;
    match (groq.is_configured(), groq.api_url.as_deref()) {
        (true, Some(url)) => mark(true, &format!("key set, {} @ {}", groq.model, url)),
        (true, None) => mark(false, "key set, GROQ_API_URL missing"),
        (false, _) => mark(false, "not configured"),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_groq_status() {
        plain();
        let mut config = Config::default();
        assert_eq!(groq_status(&config), "· not configured");

        config.groq.api_key = Some("gsk".into());
        assert_eq!(groq_status(&config), "· key set, GROQ_API_URL missing");

        config.groq.api_url = Some("https://x/generate".into());
        assert_eq!(groq_status(&config), "✓ key set, groq-1 @ https://x/generate");
    }

    #[test]
    fn test_google_status() {
        plain();
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.google.ambient_credentials = Some(dir.path().join("adc.json"));
        assert_eq!(google_status(&config), "· no credentials found");

        config.google.api_key = Some("AIza".into());
        assert_eq!(google_status(&config), "✓ API key set");
    }

    #[test]
    fn test_env_hint_lists_registry_keys() {
        let groq = registry::find_by_kind(ProviderKind::Groq);
        assert_eq!(env_hint(groq), "[GROQ_API_KEY, GROQ_API_URL]");

        let gemini = registry::find_by_kind(ProviderKind::Gemini);
        assert!(env_hint(gemini).starts_with("[GOOGLE_API_KEY,"));
    }
}
