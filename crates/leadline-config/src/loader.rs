// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./leadline.toml` > `~/.config/leadline/leadline.toml` >
//! `/etc/leadline/leadline.toml` with environment variable overrides via `LEADLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LeadlineConfig;

/// Top-level sections an environment variable may address.
const SECTIONS: &[&str] = &["server", "storage", "legacy", "whatsapp", "logging"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/leadline/leadline.toml` (system-wide)
/// 3. `~/.config/leadline/leadline.toml` (user XDG config)
/// 4. `./leadline.toml` (local directory)
/// 5. `LEADLINE_*` environment variables
pub fn load_config() -> Result<LeadlineConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LeadlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadlineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadlineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LeadlineConfig::default()))
        .merge(Toml::file("/etc/leadline/leadline.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("leadline/leadline.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("leadline.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `LEADLINE_SERVER_API_TOKEN` must map to `server.api_token`,
/// not `server.api.token`.
fn env_provider() -> Env {
    Env::prefixed("LEADLINE_").map(|key| env_key_to_path(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name onto a dotted config path.
pub(crate) fn env_key_to_path(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_only_the_section_separator() {
        assert_eq!(env_key_to_path("server_api_token"), "server.api_token");
        assert_eq!(env_key_to_path("legacy_query_timeout_ms"), "legacy.query_timeout_ms");
        assert_eq!(
            env_key_to_path("whatsapp_service_window_hours"),
            "whatsapp.service_window_hours"
        );
        assert_eq!(env_key_to_path("unknown_key"), "unknown_key");
    }

    #[test]
    fn env_overrides_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("leadline.toml", "[server]\nport = 9000\n")?;
            jail.set_env("LEADLINE_SERVER_PORT", "9100");
            jail.set_env("LEADLINE_LEGACY_TABLE_NAME", "chat_history");
            let config = load_config_from_path(Path::new("leadline.toml"))?;
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.legacy.table_name, "chat_history");
            Ok(())
        });
    }
}
