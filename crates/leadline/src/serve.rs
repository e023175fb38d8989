// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadline serve` command implementation.
//!
//! Wires storage, the optional legacy chat-history source, the outbound
//! sender and the inbox services into the HTTP gateway, then serves until a
//! shutdown signal arrives.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use leadline_config::LeadlineConfig;
use leadline_core::{
    Clock, LeadlineError, LegacyChatSource, PluginAdapter, StorageAdapter, SystemClock,
};
use leadline_gateway::{AuthConfig, GatewayConfig, GatewayState};
use leadline_inbox::{AccountService, ConversationService, Reconciler, WebhookIngestor};
use leadline_storage::{SqliteLegacySource, SqliteStorage};
use leadline_whatsapp::{MockWhatsAppSender, ServiceWindow};

use crate::shutdown::shutdown_signal;

/// Run the `leadline serve` command.
pub async fn run_serve(config: LeadlineConfig) -> Result<(), LeadlineError> {
    init_tracing(&config.logging.level);

    info!("starting leadline serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let legacy = open_legacy(&config).await;
    let state = build_state(&config, storage.clone(), legacy);

    if state.auth.bearer_token.is_none() {
        warn!("server.api_token is not set -- every /api request will be rejected");
    }
    if state.webhook_secret.is_none() {
        warn!("server.webhook_secret is not set -- webhook signatures are not verified");
    }

    let gateway = GatewayConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        cors_permissive: config.server.cors_permissive,
    };
    let served = leadline_gateway::start_server(&gateway, state, shutdown_signal()).await;

    storage.close().await?;
    info!("leadline serve shutdown complete");
    served
}

/// Open the legacy table reader. Failure only disables legacy merging.
async fn open_legacy(config: &LeadlineConfig) -> Option<Arc<SqliteLegacySource>> {
    if !config.legacy.enabled {
        info!("legacy chat-history merging disabled");
        return None;
    }
    match SqliteLegacySource::open(&config.storage.database_path, &config.legacy).await {
        Ok(source) => {
            info!(table = source.table(), "legacy chat-history source opened");
            Some(Arc::new(source))
        }
        Err(e) => {
            warn!(error = %e, "legacy chat-history source unavailable, serving native conversations only");
            None
        }
    }
}

/// Assemble the services the gateway dispatches to.
pub fn build_state(
    config: &LeadlineConfig,
    storage: Arc<SqliteStorage>,
    legacy: Option<Arc<SqliteLegacySource>>,
) -> GatewayState {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sender = Arc::new(MockWhatsAppSender::new(&config.whatsapp));

    let mut adapters: Vec<Arc<dyn PluginAdapter>> = vec![
        storage.clone() as Arc<dyn PluginAdapter>,
        sender.clone() as Arc<dyn PluginAdapter>,
    ];
    if let Some(source) = &legacy {
        adapters.push(source.clone());
    }

    let reconciler = Reconciler::new(
        storage.clone(),
        legacy.map(|source| source as Arc<dyn LegacyChatSource>),
        clock.clone(),
        Duration::from_millis(config.legacy.query_timeout_ms),
    );
    let conversations = ConversationService::new(
        storage.clone(),
        storage.clone(),
        reconciler,
        sender,
        clock.clone(),
        ServiceWindow::from_hours(config.whatsapp.service_window_hours),
        config.whatsapp.default_channel.clone(),
    );
    let ingestor = WebhookIngestor::new(
        storage.clone(),
        storage.clone(),
        clock.clone(),
        config.whatsapp.default_channel.clone(),
    );
    let accounts = AccountService::new(storage.clone(), storage, clock);

    GatewayState {
        conversations: Arc::new(conversations),
        accounts: Arc::new(accounts),
        ingestor: Arc::new(ingestor),
        adapters,
        auth: AuthConfig {
            bearer_token: config.server.api_token.clone(),
        },
        webhook_secret: config.server.webhook_secret.clone(),
        start_time: Instant::now(),
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("leadline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
