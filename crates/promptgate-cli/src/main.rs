//! PromptGate CLI — entry point.
//!
//! # Commands
//!
//! - `promptgate serve [--host H] [--port P] [--logs]` — run the HTTP gateway
//! - `promptgate ask <PROMPT> [--backend B]` — send one prompt and print the answer
//! - `promptgate status` — show configuration and provider status

mod gateway;
mod helpers;
mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use promptgate_core::config::{get_config_path, load_config, Config};
use promptgate_core::utils::expand_home;
use promptgate_providers::registry::{self, ProviderSpec, PROVIDERS};
use promptgate_providers::{build_provider, LlmProvider, ProviderFactory, ProviderKind};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// ⚡ PromptGate — one HTTP endpoint in front of swappable LLM backends
#[derive(Parser)]
#[command(name = "promptgate", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.promptgate/config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP gateway
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Send a single prompt and print the response
    Ask {
        /// The prompt text
        prompt: String,

        /// Backend name (auto, mock, gemini, groq); `auto` follows MODEL_PROVIDER / MOCK_LLM
        #[arg(short, long, value_parser = parse_backend, default_value = "auto")]
        backend: Backend,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and provider status
    Status,
}

/// `--backend` choice, resolved against the provider registry.
#[derive(Clone, Debug)]
enum Backend {
    Auto,
    Explicit(&'static ProviderSpec),
}

impl Backend {
    fn kind(&self) -> Option<ProviderKind> {
        match self {
            Backend::Auto => None,
            Backend::Explicit(spec) => Some(spec.kind),
        }
    }
}

fn parse_backend(value: &str) -> Result<Backend, String> {
    if value.trim().eq_ignore_ascii_case("auto") {
        return Ok(Backend::Auto);
    }
    registry::find_by_name(value)
        .map(Backend::Explicit)
        .ok_or_else(|| {
            let known: Vec<String> = PROVIDERS.iter().map(|spec| spec.kind.to_string()).collect();
            format!("unknown backend '{value}' (expected auto, {})", known.join(", "))
        })
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .as_deref()
        .map(expand_home)
        .unwrap_or_else(get_config_path);

    match cli.command {
        Commands::Serve { host, port, logs } => {
            init_logging(logs, "info");
            let config = load_config(Some(&config_path));
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            let factory = Arc::new(ProviderFactory::new(config));
            gateway::run(factory, &host, port).await
        }
        Commands::Ask {
            prompt,
            backend,
            logs,
        } => {
            init_logging(logs, "warn");
            let config = load_config(Some(&config_path));
            run_ask(config, &prompt, backend).await
        }
        Commands::Status => {
            init_logging(false, "warn");
            let config = load_config(Some(&config_path));
            status::run(&config, &config_path)
        }
    }
}

// ─────────────────────────────────────────────
// Ask command
// ─────────────────────────────────────────────

async fn run_ask(config: Config, prompt: &str, backend: Backend) -> Result<()> {
    let provider: Arc<dyn LlmProvider> = match backend.kind() {
        Some(kind) => build_provider(kind, &config),
        None => ProviderFactory::new(config).get_provider(),
    };

    info!(provider = provider.display_name(), "Sending prompt");

    match provider.invoke(prompt).await {
        Ok(response) => {
            helpers::print_response(provider.display_name(), &response);
            Ok(())
        }
        Err(e) => {
            helpers::print_error(&e.to_string());
            Err(e).with_context(|| format!("{} request failed", provider.display_name()))
        }
    }
}

/// Initialize tracing/logging.
///
/// `--logs` forces debug output for PromptGate's own crates; otherwise
/// `RUST_LOG` is honoured, falling back to `default_level`.
fn init_logging(verbose: bool, default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("promptgate=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_backend() {
        let cli = Cli::try_parse_from(["promptgate", "ask", "hello", "--backend", "groq"]).unwrap();
        match cli.command {
            Commands::Ask { prompt, backend, .. } => {
                assert_eq!(prompt, "hello");
                assert_eq!(backend.kind(), Some(ProviderKind::Groq));
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_backend_resolved_through_registry() {
        assert!(matches!(parse_backend("auto").unwrap(), Backend::Auto));
        assert_eq!(parse_backend("mock").unwrap().kind(), Some(ProviderKind::Mock));
        assert_eq!(parse_backend("GEMINI-pro").unwrap().kind(), Some(ProviderKind::Gemini));
        assert_eq!(parse_backend("google_genai").unwrap().kind(), Some(ProviderKind::Gemini));

        let err = parse_backend("openai").unwrap_err();
        assert!(err.contains("mock, gemini, groq"));
    }

    #[test]
    fn test_ask_defaults_to_auto() {
        let cli = Cli::try_parse_from(["promptgate", "ask", "hello"]).unwrap();
        match cli.command {
            Commands::Ask { backend, .. } => assert!(backend.kind().is_none()),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "promptgate",
            "--config",
            "/tmp/pg.json",
            "serve",
            "--port",
            "9000",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("/tmp/pg.json"));
        match cli.command {
            Commands::Serve { host, port, logs } => {
                assert!(host.is_none());
                assert_eq!(port, Some(9000));
                assert!(!logs);
            }
            _ => panic!("expected serve"),
        }
    }

    #[tokio::test]
    async fn test_ask_with_mock_backend() {
        run_ask(Config::default(), "ping", parse_backend("mock").unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn test_ask_groq_without_key_fails() {
        let err = run_ask(Config::default(), "ping", parse_backend("groq").unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Groq"));
    }
}
