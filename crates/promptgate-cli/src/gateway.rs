//! `promptgate serve` — HTTP gateway in front of the selected provider.
//!
//! Routes:
//! - `POST /chat` `{"prompt": ...}` → `{"response": ...}`
//! - `GET /health` → `{"status": "ok"}`
//!
//! Provider errors map to `500` (configuration / credentials) or `502`
//! (upstream call failed), always with a `{"error": ...}` body.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use promptgate_providers::{ErrorKind, ProviderError, ProviderFactory};

use crate::helpers;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub factory: Arc<ProviderFactory>,
}

/// Build the gateway router.
pub fn app(factory: Arc<ProviderFactory>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .with_state(AppState { factory })
}

/// Bind and serve until Ctrl+C / SIGTERM.
pub async fn run(factory: Arc<ProviderFactory>, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let kind = factory.selected_kind();
    let model = factory.config().model.name.clone();

    helpers::print_banner();
    println!("  Mode:     Gateway");
    println!("  Provider: {kind}");
    println!("  Model:    {model}");
    println!("  Listen:   http://{addr}");
    println!();
    println!("  Ctrl+C to stop");
    println!();

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(addr = %addr, provider = %kind, model = %model, "Gateway listening");

    axum::serve(listener, app(factory))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Gateway shutting down");
    println!("  Gateway stopped. Goodbye!");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// ─────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let prompt = match body.get("prompt").and_then(Value::as_str) {
        Some(p) if !p.is_empty() => p,
        _ => return Err(ApiError::BadRequest("Prompt is required".to_string())),
    };

    let provider = state.factory.get_provider();
    let response = provider.invoke(prompt).await.map_err(|e| {
        error!(
            provider = provider.display_name(),
            kind = ?e.kind(),
            error = %e,
            "Chat request failed"
        );
        ApiError::Provider(e)
    })?;

    Ok(Json(json!({ "response": response })))
}

// ─────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Provider(ProviderError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => {
                warn!(error = %message, "Rejected chat request");
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::Provider(e) => {
                let status = match e.kind() {
                    ErrorKind::Config | ErrorKind::Credential => StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorKind::ProviderCall => StatusCode::BAD_GATEWAY,
                };
                (status, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
