// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row codecs between SQLite columns and the domain types in `leadline-core`.
//!
//! Timestamps are stored as RFC 3339 text with microsecond precision so that
//! lexical order in SQL matches chronological order. Tags and metadata are
//! JSON text columns; they never leave this module as strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

pub use leadline_core::types::{Conversation, Integration, Message, Metadata, User};

/// Column list shared by every conversation SELECT, in [`conversation_from_row`] order.
pub(crate) const CONVERSATION_COLUMNS: &str = "id, title, status, channel, external_id, \
     participant_phone, participant_name, participant_email, lead_score, intent, category, \
     tags, metadata, last_message_at, last_message_content, owner_user_id, created_at, updated_at";

/// Column list shared by every message SELECT, in [`message_from_row`] order.
pub(crate) const MESSAGE_COLUMNS: &str = "id, conversation_id, content, sender, sender_phone, \
     sender_name, message_type, media_url, media_type, status, external_message_id, \
     created_at, updated_at";

pub(crate) fn ts_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_failure(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn ts_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_failure(idx, e))
}

fn opt_ts_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| {
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| conversion_failure(idx, e))
    })
    .transpose()
}

fn enum_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_failure(idx, e))
}

pub(crate) fn tags_to_sql(tags: &[String]) -> String {
    serde_json::Value::from(tags.to_vec()).to_string()
}

fn tags_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_failure(idx, e))
}

pub(crate) fn metadata_to_sql(metadata: &Metadata) -> String {
    serde_json::Value::Object(metadata.clone()).to_string()
}

fn metadata_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Metadata>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| serde_json::from_str(&raw).map_err(|e| conversion_failure(idx, e)))
        .transpose()
}

/// Decode a row selected with [`CONVERSATION_COLUMNS`]. Messages are left empty.
pub(crate) fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        title: row.get(1)?,
        status: enum_at(row, 2)?,
        channel: row.get(3)?,
        external_id: row.get(4)?,
        participant_phone: row.get(5)?,
        participant_name: row.get(6)?,
        participant_email: row.get(7)?,
        lead_score: row.get(8)?,
        intent: row.get(9)?,
        category: row.get(10)?,
        tags: tags_at(row, 11)?,
        metadata: metadata_at(row, 12)?,
        last_message_at: opt_ts_at(row, 13)?,
        last_message_content: row.get(14)?,
        owner_user_id: row.get(15)?,
        created_at: ts_at(row, 16)?,
        updated_at: ts_at(row, 17)?,
        messages: Vec::new(),
    })
}

/// Decode a row selected with [`MESSAGE_COLUMNS`].
pub(crate) fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        content: row.get(2)?,
        sender: enum_at(row, 3)?,
        sender_phone: row.get(4)?,
        sender_name: row.get(5)?,
        message_type: enum_at(row, 6)?,
        media_url: row.get(7)?,
        media_type: row.get(8)?,
        status: enum_at(row, 9)?,
        external_message_id: row.get(10)?,
        created_at: ts_at(row, 11)?,
        updated_at: ts_at(row, 12)?,
    })
}

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: ts_at(row, 3)?,
    })
}

pub(crate) fn integration_from_row(row: &Row<'_>) -> rusqlite::Result<Integration> {
    let config: String = row.get(3)?;
    Ok(Integration {
        id: row.get(0)?,
        user_id: row.get(1)?,
        provider: row.get(2)?,
        config: serde_json::from_str(&config).map_err(|e| conversion_failure(3, e))?,
        enabled: row.get(4)?,
        created_at: ts_at(row, 5)?,
        updated_at: ts_at(row, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_lexically_in_chronological_order() {
        let a = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let b = a + chrono::Duration::microseconds(1);
        let c = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
        assert!(ts_to_sql(&a) < ts_to_sql(&b));
        assert!(ts_to_sql(&b) < ts_to_sql(&c));
        assert_eq!(ts_to_sql(&a), "2026-01-01T09:00:00.000000Z");
    }

    #[test]
    fn tags_encode_as_json_array() {
        assert_eq!(tags_to_sql(&[]), "[]");
        assert_eq!(
            tags_to_sql(&["hot".to_string(), "vip".to_string()]),
            r#"["hot","vip"]"#
        );
    }
}
