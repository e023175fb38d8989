// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.

use leadline_core::LeadlineError;
use rusqlite::{Connection, params};

use crate::database::Database;
use crate::models::{MESSAGE_COLUMNS, Message, message_from_row, ts_to_sql};

/// Insert one message row. Callers own the surrounding transaction.
pub(crate) fn insert_message_row(conn: &Connection, msg: &Message) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO messages (id, conversation_id, content, sender, sender_phone, sender_name,
                               message_type, media_url, media_type, status, external_message_id,
                               created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            msg.id,
            msg.conversation_id,
            msg.content,
            msg.sender.to_string(),
            msg.sender_phone,
            msg.sender_name,
            msg.message_type.to_string(),
            msg.media_url,
            msg.media_type,
            msg.status.to_string(),
            msg.external_message_id,
            ts_to_sql(&msg.created_at),
            ts_to_sql(&msg.updated_at),
        ],
    )?;
    Ok(())
}

/// Refresh a conversation's denormalized last-message fields.
///
/// `last_message_at` never moves backwards.
pub(crate) fn touch_last_message(conn: &Connection, msg: &Message) -> rusqlite::Result<usize> {
    let at = ts_to_sql(&msg.created_at);
    conn.execute(
        "UPDATE conversations SET
             last_message_content = ?1,
             last_message_at = CASE
                 WHEN last_message_at IS NULL OR last_message_at < ?2 THEN ?2
                 ELSE last_message_at
             END,
             updated_at = ?2
         WHERE id = ?3",
        params![msg.content, at, msg.conversation_id],
    )
}

/// Append a message and update the parent conversation in one transaction.
pub async fn append_message(db: &Database, msg: &Message) -> Result<(), LeadlineError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            insert_message_row(&tx, &msg)?;
            touch_last_message(&tx, &msg)?;
            tx.commit()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Messages of a conversation in chronological order.
///
/// Ties on `created_at` keep insertion order.
pub async fn list_messages(
    db: &Database,
    conversation_id: &str,
) -> Result<Vec<Message>, LeadlineError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            let rows = stmt.query_map(params![conversation_id], message_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
