// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by storage, the inbox services and the gateway.
//!
//! Everything crossing the HTTP boundary serializes as camelCase JSON, which
//! is the shape the dashboard client consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Prefix marking identifiers synthesized from the legacy chat-history table.
///
/// Applied to both conversation ids (`legacy_<sessionId>`) and message ids
/// (`legacy_<recordId>`) so they can never collide with native UUIDs.
pub const LEGACY_ID_PREFIX: &str = "legacy_";

/// Structured free-form metadata. Stored as JSON text, never passed around as a string.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    LegacySource,
    Sender,
}

/// Lifecycle state of a conversation.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    #[default]
    Active,
    Pending,
    Closed,
}

/// Who authored a message: the lead (`user`) or the business side (`bot`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Payload kind of a message.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Audio,
    Image,
    Document,
}

/// Delivery status of a message.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    Sent,
    Delivered,
    Read,
    Failed,
}

/// A conversation as exposed to the dashboard.
///
/// Native conversations are rows of the `conversations` table. Legacy
/// conversations are synthesized on every read and carry an id starting
/// with [`LEGACY_ID_PREFIX`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub status: ConversationStatus,
    pub channel: String,
    /// Stable identifier of the remote party used for find-or-create.
    pub external_id: Option<String>,
    pub participant_phone: Option<String>,
    pub participant_name: Option<String>,
    pub participant_email: Option<String>,
    pub lead_score: i64,
    pub intent: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_message_content: Option<String>,
    pub owner_user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// The timestamp conversation lists are ordered by: the last message
    /// time when known, otherwise the creation time.
    pub fn activity_at(&self) -> DateTime<Utc> {
        self.last_message_at.unwrap_or(self.created_at)
    }

    /// Whether this conversation was synthesized from the legacy table.
    pub fn is_legacy(&self) -> bool {
        is_legacy_id(&self.id)
    }
}

/// Returns true when `id` was derived from the legacy chat-history table.
pub fn is_legacy_id(id: &str) -> bool {
    id.starts_with(LEGACY_ID_PREFIX)
}

/// A single message within a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub content: String,
    pub sender: Sender,
    pub sender_phone: Option<String>,
    pub sender_name: Option<String>,
    pub message_type: MessageType,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub status: MessageStatus,
    pub external_message_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a native conversation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversation {
    pub title: String,
    #[serde(default)]
    pub status: ConversationStatus,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub participant_phone: Option<String>,
    #[serde(default)]
    pub participant_name: Option<String>,
    #[serde(default)]
    pub participant_email: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Partial update of a native conversation. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<ConversationStatus>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl ConversationPatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.status.is_none() && self.tags.is_none() && self.metadata.is_none()
    }
}

/// Fields required to append a message to a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub content: String,
    pub sender: Sender,
    pub sender_phone: Option<String>,
    pub sender_name: Option<String>,
    pub message_type: MessageType,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub status: MessageStatus,
    pub external_message_id: Option<String>,
}

impl NewMessage {
    /// A plain outbound text message authored by the business side.
    pub fn bot_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender: Sender::Bot,
            sender_phone: None,
            sender_name: None,
            message_type: MessageType::Text,
            media_url: None,
            media_type: None,
            status: MessageStatus::Sent,
            external_message_id: None,
        }
    }
}

/// One raw row of the legacy chat-history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyChatRecord {
    pub id: i64,
    pub session_id: String,
    /// JSON blob `{"type": ..., "content": ...}`, possibly malformed.
    pub payload: String,
}

/// One distinct session of the legacy table with its newest record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacySession {
    pub session_id: String,
    pub max_record_id: i64,
}

/// A dashboard user. Credentials live in the out-of-scope auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-user configuration for an external provider (e.g. WhatsApp Business).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: String,
    pub user_id: String,
    pub provider: String,
    pub config: Metadata,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Acknowledgment returned by an outbound message sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    pub external_message_id: String,
    pub recipient: String,
    pub template_id: Option<String>,
    pub accepted: bool,
}
