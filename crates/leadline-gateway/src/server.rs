// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use leadline_core::{LeadlineError, PluginAdapter};
use leadline_inbox::{AccountService, ConversationService, WebhookIngestor};

use crate::auth::{AuthConfig, auth_middleware};
use crate::{handlers, webhook};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub conversations: Arc<ConversationService>,
    pub accounts: Arc<AccountService>,
    pub ingestor: Arc<WebhookIngestor>,
    /// Backends reported by `GET /health`.
    pub adapters: Vec<Arc<dyn PluginAdapter>>,
    pub auth: AuthConfig,
    /// Shared secret for webhook signatures. `None` accepts unsigned calls.
    pub webhook_secret: Option<String>,
    pub start_time: Instant,
}

/// Listener settings (mirrors the `[server]` config section).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub cors_permissive: bool,
}

/// Build the full application router.
///
/// - `GET /health` and `POST /webhook/messages` are public
/// - everything under `/api` requires the bearer token
pub fn build_router(state: GatewayState, cors_permissive: bool) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/webhook/messages", post(webhook::receive_message));

    let api_routes = Router::new()
        .route(
            "/api/conversations",
            get(handlers::list_conversations).post(handlers::create_conversation),
        )
        .route("/api/conversations/stats", get(handlers::conversation_stats))
        .route(
            "/api/conversations/{id}",
            get(handlers::get_conversation)
                .patch(handlers::update_conversation)
                .delete(handlers::delete_conversation),
        )
        .route("/api/conversations/{id}/score", put(handlers::set_score))
        .route("/api/conversations/{id}/intent", put(handlers::set_intent))
        .route(
            "/api/conversations/{id}/messages",
            get(handlers::list_messages).post(handlers::send_message),
        )
        .route("/api/whatsapp/opt-in", post(handlers::opt_in))
        .route("/api/whatsapp/opt-out", post(handlers::opt_out))
        .route("/api/integrations", get(handlers::list_integrations))
        .route(
            "/api/integrations/{provider}",
            put(handlers::upsert_integration),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    let app = Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Bind and serve until `shutdown` resolves.
pub async fn start_server(
    config: &GatewayConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), LeadlineError> {
    let app = build_router(state, config.cors_permissive);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LeadlineError::Internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| LeadlineError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_config_debug() {
        let config = GatewayConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_permissive: false,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
    }
}
