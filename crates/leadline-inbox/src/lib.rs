// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbox services for Leadline.
//!
//! Merges native conversations with sessions recovered from the legacy
//! chat-history table, ingests inbound webhook messages, and implements the
//! conversation, message and account operations the gateway exposes.

pub mod accounts;
pub mod ingest;
pub mod normalizer;
pub mod reconciler;
pub mod service;
pub mod stats;

pub use accounts::AccountService;
pub use ingest::{InboundEvent, IngestOutcome, WebhookIngestor};
pub use normalizer::normalize_legacy_messages;
pub use reconciler::Reconciler;
pub use service::{ConversationService, SentMessage};
pub use stats::{ConversationStats, compute_stats};
