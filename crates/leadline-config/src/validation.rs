// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, SQL-safe identifiers and bounded windows.

use crate::diagnostic::ConfigError;
use crate::model::LeadlineConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LeadlineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if let Some(token) = &config.server.api_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "server.api_token must not be blank when set".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !is_sql_identifier(&config.legacy.table_name) {
        errors.push(ConfigError::Validation {
            message: format!(
                "legacy.table_name `{}` must match [A-Za-z_][A-Za-z0-9_]*",
                config.legacy.table_name
            ),
        });
    }

    if config.legacy.query_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "legacy.query_timeout_ms must be greater than 0".to_string(),
        });
    }

    let window = config.whatsapp.service_window_hours;
    if !(1..=168).contains(&window) {
        errors.push(ConfigError::Validation {
            message: format!("whatsapp.service_window_hours must be within 1..=168, got {window}"),
        });
    }

    if config.whatsapp.default_channel.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "whatsapp.default_channel must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` must be one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Whether `name` is safe to splice into SQL as a bare table name.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = LeadlineConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = LeadlineConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn injected_table_name_is_rejected() {
        let mut config = LeadlineConfig::default();
        config.legacy.table_name = "chats; DROP TABLE users".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "legacy.table_name"));
    }

    #[test]
    fn sql_identifier_rules() {
        assert!(is_sql_identifier("n8n_chat_histories"));
        assert!(is_sql_identifier("_private"));
        assert!(!is_sql_identifier("8ball"));
        assert!(!is_sql_identifier(""));
        assert!(!is_sql_identifier("a-b"));
        assert!(!is_sql_identifier("\"quoted\""));
    }

    #[test]
    fn service_window_out_of_range_fails() {
        let mut config = LeadlineConfig::default();
        config.whatsapp.service_window_hours = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "service_window_hours"));
    }

    #[test]
    fn collects_all_errors_instead_of_failing_fast() {
        let mut config = LeadlineConfig::default();
        config.server.host = " ".to_string();
        config.logging.level = "loud".to_string();
        config.legacy.query_timeout_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_error(&errors, "server.host"));
        assert!(has_error(&errors, "logging.level"));
        assert!(has_error(&errors, "query_timeout_ms"));
    }

    #[test]
    fn parsed_window_above_a_week_fails() {
        let toml_str = r#"
[whatsapp]
service_window_hours = 200
"#;
        let config: LeadlineConfig = toml::from_str(toml_str).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "service_window_hours"));
    }

    #[test]
    fn blank_api_token_fails() {
        let mut config = LeadlineConfig::default();
        config.server.api_token = Some("  ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "api_token"));
    }
}
