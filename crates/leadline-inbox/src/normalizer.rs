// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps legacy chat-history rows onto the native [`Message`] shape.
//!
//! Legacy rows carry no timestamp, media type or delivery status, so every
//! normalized message is a delivered text message stamped with the caller's
//! "now".

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use leadline_core::types::LegacyChatRecord;
use leadline_core::{
    LEGACY_ID_PREFIX, LegacyChatSource, Message, MessageStatus, MessageType, Sender,
};

/// The `type` value the automation tool writes for turns authored by the lead.
const HUMAN_TURN: &str = "human";

/// A decoded legacy payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyTurn {
    /// Parsed `{type, content}` object.
    Parsed { kind: String, content: String },
    /// Anything that is not a JSON object; the raw text becomes the content.
    Invalid { raw: String },
}

#[derive(Deserialize)]
struct RawTurn {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    content: Option<Value>,
}

impl LegacyTurn {
    /// Decode a payload. Never fails.
    pub fn parse(payload: &str) -> Self {
        match serde_json::from_str::<RawTurn>(payload) {
            Ok(turn) => LegacyTurn::Parsed {
                kind: turn.kind.unwrap_or_default(),
                content: match turn.content {
                    Some(Value::String(s)) => s,
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                },
            },
            Err(_) => LegacyTurn::Invalid {
                raw: payload.to_string(),
            },
        }
    }

    pub fn sender(&self) -> Sender {
        match self {
            LegacyTurn::Parsed { kind, .. } if kind == HUMAN_TURN => Sender::User,
            _ => Sender::Bot,
        }
    }

    pub fn into_content(self) -> String {
        match self {
            LegacyTurn::Parsed { content, .. } => content,
            LegacyTurn::Invalid { raw } => raw,
        }
    }
}

/// Id of the conversation synthesized for a legacy session.
pub fn legacy_conversation_id(session_id: &str) -> String {
    format!("{LEGACY_ID_PREFIX}{session_id}")
}

/// Id of the message synthesized for a legacy record.
pub fn legacy_message_id(record_id: i64) -> String {
    format!("{LEGACY_ID_PREFIX}{record_id}")
}

/// Convert one legacy record. Malformed payloads are logged and kept as raw text.
pub fn normalize_record(record: &LegacyChatRecord, now: DateTime<Utc>) -> Message {
    let turn = LegacyTurn::parse(&record.payload);
    if matches!(turn, LegacyTurn::Invalid { .. }) {
        warn!(
            session_id = %record.session_id,
            record_id = record.id,
            "legacy payload is not a JSON turn object; using raw text"
        );
    }
    let sender = turn.sender();
    Message {
        id: legacy_message_id(record.id),
        conversation_id: legacy_conversation_id(&record.session_id),
        content: turn.into_content(),
        sender,
        sender_phone: None,
        sender_name: None,
        message_type: MessageType::Text,
        media_url: None,
        media_type: None,
        status: MessageStatus::Delivered,
        external_message_id: None,
        created_at: now,
        updated_at: now,
    }
}

/// All messages of a legacy session in ascending record-id order.
///
/// A failing source yields an empty list; the error is logged, never returned.
pub async fn normalize_legacy_messages(
    source: &dyn LegacyChatSource,
    session_id: &str,
    now: DateTime<Utc>,
) -> Vec<Message> {
    let mut records = match source.session_records(session_id).await {
        Ok(records) => records,
        Err(e) => {
            warn!(session_id, error = %e, "legacy message fetch failed; returning no messages");
            return Vec::new();
        }
    };
    records.sort_by_key(|r| r.id);
    records.iter().map(|r| normalize_record(r, now)).collect()
}
