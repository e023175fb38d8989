// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Leadline lead-qualification service.

use thiserror::Error;

/// The primary error type used across all Leadline crates.
#[derive(Debug, Error)]
pub enum LeadlineError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A conversation, message, user or integration is absent or not owned
    /// by the requesting user.
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// The request is well-formed JSON but semantically invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// Outbound messaging errors (send rejected, provider unreachable).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An outbound call did not answer within its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LeadlineError {
    /// Shorthand for a [`LeadlineError::NotFound`] on a conversation.
    pub fn conversation_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: "conversation",
            id: id.into(),
        }
    }
}
