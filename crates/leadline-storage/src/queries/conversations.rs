// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations, including the transactional find-or-create
//! used by the webhook ingestor.

use std::collections::HashMap;

use leadline_core::LeadlineError;
use rusqlite::{Connection, OptionalExtension, params};

use crate::database::Database;
use crate::models::{
    CONVERSATION_COLUMNS, Conversation, MESSAGE_COLUMNS, Message, conversation_from_row,
    message_from_row, metadata_to_sql, tags_to_sql, ts_to_sql,
};
use crate::queries::messages::{insert_message_row, touch_last_message};

fn insert_conversation_row(
    conn: &Connection,
    conv: &Conversation,
    on_conflict_ignore: bool,
) -> rusqlite::Result<usize> {
    let conflict = if on_conflict_ignore {
        "ON CONFLICT (owner_user_id, external_id) DO NOTHING"
    } else {
        ""
    };
    conn.execute(
        &format!(
            "INSERT INTO conversations ({CONVERSATION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
             {conflict}"
        ),
        params![
            conv.id,
            conv.title,
            conv.status.to_string(),
            conv.channel,
            conv.external_id,
            conv.participant_phone,
            conv.participant_name,
            conv.participant_email,
            conv.lead_score,
            conv.intent,
            conv.category,
            tags_to_sql(&conv.tags),
            conv.metadata.as_ref().map(metadata_to_sql),
            conv.last_message_at.as_ref().map(ts_to_sql),
            conv.last_message_content,
            conv.owner_user_id,
            ts_to_sql(&conv.created_at),
            ts_to_sql(&conv.updated_at),
        ],
    )
}

/// Insert a new conversation.
///
/// A second conversation with the same owner and external id is a
/// `Validation` error, not a storage failure.
pub async fn insert_conversation(db: &Database, conv: &Conversation) -> Result<(), LeadlineError> {
    let conv = conv.clone();
    let external_id = conv.external_id.clone();
    let inserted = db
        .connection()
        .call(move |conn| match insert_conversation_row(conn, &conv, false) {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if inserted {
        Ok(())
    } else {
        Err(LeadlineError::Validation(format!(
            "a conversation with external id {} already exists",
            external_id.as_deref().unwrap_or("(none)")
        )))
    }
}

/// Get one conversation owned by `owner_user_id`. Messages are not loaded.
pub async fn get_conversation(
    db: &Database,
    owner_user_id: &str,
    id: &str,
) -> Result<Option<Conversation>, LeadlineError> {
    let owner = owner_user_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations
                     WHERE id = ?1 AND owner_user_id = ?2"
                ),
                params![id, owner],
                conversation_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All conversations of a user with their messages, most recent activity first.
///
/// Two statements: the conversations, then every message of the owner's
/// conversations grouped in memory.
pub async fn list_conversations(
    db: &Database,
    owner_user_id: &str,
) -> Result<Vec<Conversation>, LeadlineError> {
    let owner = owner_user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE owner_user_id = ?1
                 ORDER BY COALESCE(last_message_at, created_at) DESC, created_at DESC"
            ))?;
            let mut conversations = stmt
                .query_map(params![owner], conversation_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM messages m
                 JOIN conversations c ON c.id = m.conversation_id
                 WHERE c.owner_user_id = ?1
                 ORDER BY m.created_at ASC, m.rowid ASC",
                qualified(MESSAGE_COLUMNS, "m")
            ))?;
            let mut by_conversation: HashMap<String, Vec<Message>> = HashMap::new();
            for msg in stmt.query_map(params![owner], message_from_row)? {
                let msg = msg?;
                by_conversation
                    .entry(msg.conversation_id.clone())
                    .or_default()
                    .push(msg);
            }

            for conv in &mut conversations {
                conv.messages = by_conversation.remove(&conv.id).unwrap_or_default();
            }
            Ok(conversations)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn qualified(columns: &str, alias: &str) -> String {
    columns
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Persist the mutable fields of a conversation.
///
/// Returns the number of rows touched (0 when the id/owner pair is unknown).
pub async fn update_conversation(
    db: &Database,
    conv: &Conversation,
) -> Result<usize, LeadlineError> {
    let conv = conv.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET
                     title = ?1, status = ?2, tags = ?3, metadata = ?4,
                     lead_score = ?5, intent = ?6, category = ?7,
                     participant_name = ?8, participant_email = ?9, updated_at = ?10
                 WHERE id = ?11 AND owner_user_id = ?12",
                params![
                    conv.title,
                    conv.status.to_string(),
                    tags_to_sql(&conv.tags),
                    conv.metadata.as_ref().map(metadata_to_sql),
                    conv.lead_score,
                    conv.intent,
                    conv.category,
                    conv.participant_name,
                    conv.participant_email,
                    ts_to_sql(&conv.updated_at),
                    conv.id,
                    conv.owner_user_id,
                ],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a conversation; its messages go with it by cascade.
pub async fn delete_conversation(
    db: &Database,
    owner_user_id: &str,
    id: &str,
) -> Result<bool, LeadlineError> {
    let owner = owner_user_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM conversations WHERE id = ?1 AND owner_user_id = ?2",
                params![id, owner],
            )?;
            Ok(deleted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find the conversation keyed by `(draft.owner_user_id, draft.external_id)`
/// (creating `draft` if absent) and append `message` to it, all inside one
/// transaction.
///
/// The unique index on that pair makes concurrent callers converge on a
/// single row: the losing insert is a no-op and both read back the winner.
pub async fn find_or_create_with_message(
    db: &Database,
    draft: &Conversation,
    message: &Message,
) -> Result<(Conversation, Message, bool), LeadlineError> {
    let Some(external_id) = draft.external_id.clone() else {
        return Err(LeadlineError::Validation(
            "find-or-create requires an external id".to_string(),
        ));
    };
    let draft = draft.clone();
    let mut message = message.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let created = insert_conversation_row(&tx, &draft, true)? == 1;

            let select = format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE owner_user_id = ?1 AND external_id = ?2"
            );
            let owner = &draft.owner_user_id;
            let existing =
                tx.query_row(&select, params![owner, external_id], conversation_from_row)?;

            message.conversation_id = existing.id.clone();
            insert_message_row(&tx, &message)?;
            touch_last_message(&tx, &message)?;

            let conversation =
                tx.query_row(&select, params![owner, external_id], conversation_from_row)?;
            tx.commit()?;
            Ok((conversation, message, created))
        })
        .await
        .map_err(crate::database::map_tr_err)
}
