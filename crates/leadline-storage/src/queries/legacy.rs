// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only queries against the legacy chat-history table.
//!
//! The table belongs to the external automation tool: `(id INTEGER,
//! session_id TEXT, message TEXT|BLOB)`. Its name comes from configuration
//! and is interpolated into the SQL, so callers must pass an identifier that
//! already passed `leadline_config::validation::is_sql_identifier`.

use leadline_core::LeadlineError;
use leadline_core::types::{LegacyChatRecord, LegacySession};
use rusqlite::params;
use rusqlite::types::ValueRef;

use crate::database::Database;

/// Distinct sessions, newest record id first.
pub async fn list_sessions(db: &Database, table: &str) -> Result<Vec<LegacySession>, LeadlineError> {
    let sql = format!(
        "SELECT session_id, MAX(id) AS max_id FROM \"{table}\"
         WHERE session_id IS NOT NULL
         GROUP BY session_id
         ORDER BY max_id DESC"
    );
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| {
                Ok(LegacySession {
                    session_id: text_at(row, 0)?,
                    max_record_id: row.get(1)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Every record of one session, oldest first.
pub async fn session_records(
    db: &Database,
    table: &str,
    session_id: &str,
) -> Result<Vec<LegacyChatRecord>, LeadlineError> {
    let sql = format!(
        "SELECT id, session_id, message FROM \"{table}\"
         WHERE session_id = ?1
         ORDER BY id ASC"
    );
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![session_id], |row| {
                Ok(LegacyChatRecord {
                    id: row.get(0)?,
                    session_id: text_at(row, 1)?,
                    payload: text_at(row, 2)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Read a column as text whatever affinity the writer used.
///
/// The automation tool may store the payload as TEXT or as a JSON BLOB and
/// session ids as numbers; everything is surfaced as a string.
fn text_at(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    })
}
