//! Webhook HTTP server

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::application::errors::{BotError, WebhookError};
use crate::application::services::MessageService;
use crate::domain::entities::WebhookPayload;
use crate::domain::traits::Bot;
use crate::infrastructure::adapters::line::{verify_signature, SIGNATURE_HEADER};
use crate::infrastructure::config::ServerConfig;

/// Shared, read-only handler state
pub struct AppState<B: Bot> {
    pub service: Arc<MessageService<B>>,
    pub channel_secret: String,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match self {
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::Malformed(_) => StatusCode::BAD_REQUEST,
            WebhookError::EventsFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

pub fn router<B: Bot + 'static>(state: Arc<AppState<B>>, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(callback::<B>))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn callback<B: Bot + 'static>(
    State(state): State<Arc<AppState<B>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, WebhookError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingSignature)?;

    if !verify_signature(&body, signature, &state.channel_secret) {
        tracing::warn!("Rejected webhook with invalid signature. Check the channel secret.");
        return Err(WebhookError::InvalidSignature);
    }

    tracing::debug!("Request body: {}", String::from_utf8_lossy(&body));

    let payload: WebhookPayload = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!("Malformed webhook payload: {}", e);
        WebhookError::Malformed(e.to_string())
    })?;

    let total = payload.events.len();
    match MessageService::handle_payload(Arc::clone(&state.service), payload).await {
        Ok(_) => {
            tracing::debug!("Handled {} events", total);
            Ok("OK")
        }
        Err(e) => {
            tracing::error!("Webhook processing failed: {}", e);
            Err(e)
        }
    }
}

/// Bind and serve until Ctrl-C
pub async fn serve(app: Router, config: &ServerConfig) -> Result<(), BotError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| BotError::Internal(format!("Invalid listen address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BotError::Network(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Listening on {} (webhook path {})", addr, config.webhook_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BotError::Internal(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutting down");
}
