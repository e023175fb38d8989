// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for domain values used across test suites.

use chrono::{DateTime, TimeZone, Utc};
use leadline_core::types::{LegacyChatRecord, User};
use leadline_core::{Conversation, ConversationStatus, Message, MessageStatus, MessageType, Sender};

/// 2026-01-01 at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        name: None,
        created_at: at(0, 0),
    }
}

/// An active WhatsApp conversation created at 08:00 with no messages.
pub fn conversation(id: &str, owner: &str) -> Conversation {
    Conversation {
        id: id.to_string(),
        title: format!("Lead {id}"),
        status: ConversationStatus::Active,
        channel: "whatsapp".to_string(),
        external_id: None,
        participant_phone: Some("+5215550001".to_string()),
        participant_name: None,
        participant_email: None,
        lead_score: 0,
        intent: None,
        category: None,
        tags: Vec::new(),
        metadata: None,
        last_message_at: None,
        last_message_content: None,
        owner_user_id: owner.to_string(),
        created_at: at(8, 0),
        updated_at: at(8, 0),
        messages: Vec::new(),
    }
}

/// An inbound text message from the lead.
pub fn inbound(id: &str, conversation_id: &str, content: &str, created_at: DateTime<Utc>) -> Message {
    Message {
        id: id.to_string(),
        conversation_id: conversation_id.to_string(),
        content: content.to_string(),
        sender: Sender::User,
        sender_phone: Some("+5215550001".to_string()),
        sender_name: None,
        message_type: MessageType::Text,
        media_url: None,
        media_type: None,
        status: MessageStatus::Sent,
        external_message_id: None,
        created_at,
        updated_at: created_at,
    }
}

/// A legacy row whose payload is `{"type": kind, "content": content}`.
pub fn legacy_turn(id: i64, session_id: &str, kind: &str, content: &str) -> LegacyChatRecord {
    LegacyChatRecord {
        id,
        session_id: session_id.to_string(),
        payload: serde_json::json!({ "type": kind, "content": content }).to_string(),
    }
}

/// A legacy row with a verbatim payload.
pub fn legacy_raw(id: i64, session_id: &str, payload: &str) -> LegacyChatRecord {
    LegacyChatRecord {
        id,
        session_id: session_id.to_string(),
        payload: payload.to_string(),
    }
}
