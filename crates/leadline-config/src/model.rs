// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Leadline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Leadline configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values. No secret has a
/// default: tokens and credentials must be supplied by the operator.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadlineConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Legacy chat-history table settings.
    #[serde(default)]
    pub legacy: LegacyConfig,

    /// WhatsApp Business settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on `/api/*` routes. `None` rejects every API call.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Shared secret for `X-Hub-Signature-256` verification on the webhook.
    /// `None` accepts unsigned webhook calls.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Allow cross-origin requests from any origin (dashboard served elsewhere).
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("cors_permissive", &self.cors_permissive)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_token: None,
            webhook_secret: None,
            cors_permissive: default_cors_permissive(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_permissive() -> bool {
    true
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("leadline").join("leadline.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("leadline.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Legacy chat-history table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyConfig {
    /// Merge legacy sessions into conversation lists.
    #[serde(default = "default_legacy_enabled")]
    pub enabled: bool,

    /// Name of the table written by the automation tool. Interpolated into
    /// raw SQL, so it must be a plain identifier.
    #[serde(default = "default_legacy_table")]
    pub table_name: String,

    /// Upper bound for one legacy query before the read degrades to empty.
    #[serde(default = "default_legacy_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            enabled: default_legacy_enabled(),
            table_name: default_legacy_table(),
            query_timeout_ms: default_legacy_timeout_ms(),
        }
    }
}

fn default_legacy_enabled() -> bool {
    true
}

fn default_legacy_table() -> String {
    "n8n_chat_histories".to_string()
}

fn default_legacy_timeout_ms() -> u64 {
    2000
}

/// WhatsApp Business configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Business phone number id. Informational while delivery is mocked.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// Graph API access token.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Hours after the last inbound message during which free-form replies are allowed.
    #[serde(default = "default_service_window_hours")]
    pub service_window_hours: u32,

    /// Channel assigned to conversations created by the webhook or without an explicit channel.
    #[serde(default = "default_channel")]
    pub default_channel: String,
}

impl std::fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("phone_number_id", &self.phone_number_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("service_window_hours", &self.service_window_hours)
            .field("default_channel", &self.default_channel)
            .finish()
    }
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            phone_number_id: None,
            access_token: None,
            service_window_hours: default_service_window_hours(),
            default_channel: default_channel(),
        }
    }
}

fn default_service_window_hours() -> u32 {
    24
}

fn default_channel() -> String {
    "whatsapp".to_string()
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_secrets() {
        let config = LeadlineConfig::default();
        assert!(config.server.api_token.is_none());
        assert!(config.server.webhook_secret.is_none());
        assert!(config.whatsapp.access_token.is_none());
        assert_eq!(config.legacy.table_name, "n8n_chat_histories");
        assert_eq!(config.whatsapp.service_window_hours, 24);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = LeadlineConfig::default();
        config.server.api_token = Some("tok-123456".into());
        config.whatsapp.access_token = Some("EAAG-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("tok-123456"));
        assert!(!debug.contains("EAAG-secret"));
        assert!(debug.contains("[redacted]"));
    }
}
