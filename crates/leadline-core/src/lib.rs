// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Leadline lead-qualification service.
//!
//! This crate provides the error taxonomy, the domain types for
//! conversations and messages, and the collaborator traits the inbox
//! services are written against.

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, SystemClock};
pub use error::LeadlineError;
pub use types::{
    AdapterType, Conversation, ConversationStatus, HealthStatus, Message, MessageStatus,
    MessageType, Sender, LEGACY_ID_PREFIX,
};

pub use traits::{
    ConversationStore, IntegrationStore, LegacyChatSource, MessageSender, PluginAdapter,
    StorageAdapter, UserStore,
};
