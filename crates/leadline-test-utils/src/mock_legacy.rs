// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted legacy chat-history source.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadline_core::types::{LegacyChatRecord, LegacySession};
use leadline_core::{LeadlineError, LegacyChatSource};

/// A legacy source over a fixed set of rows.
///
/// Behaves like the SQL reader (grouping, ordering) and can be told to fail
/// like a missing table or to stall like a slow query.
#[derive(Default)]
pub struct ScriptedLegacySource {
    rows: Mutex<Vec<LegacyChatRecord>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl ScriptedLegacySource {
    pub fn new(rows: Vec<LegacyChatRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// A source whose every query fails with a storage error.
    pub fn failing() -> Self {
        let source = Self::default();
        source.failing.store(true, Ordering::SeqCst);
        source
    }

    /// Delay every query by `delay` before answering.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = Some(delay);
    }

    pub async fn push(&self, row: LegacyChatRecord) {
        self.rows.lock().await.push(row);
    }

    /// Number of queries served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), LeadlineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(LeadlineError::Storage {
                source: "no such table: n8n_chat_histories".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LegacyChatSource for ScriptedLegacySource {
    async fn list_sessions(&self) -> Result<Vec<LegacySession>, LeadlineError> {
        self.enter().await?;
        let rows = self.rows.lock().await;
        let mut max_ids: BTreeMap<&str, i64> = BTreeMap::new();
        for row in rows.iter() {
            let entry = max_ids.entry(row.session_id.as_str()).or_insert(row.id);
            *entry = (*entry).max(row.id);
        }
        let mut sessions: Vec<LegacySession> = max_ids
            .into_iter()
            .map(|(session_id, max_record_id)| LegacySession {
                session_id: session_id.to_string(),
                max_record_id,
            })
            .collect();
        sessions.sort_by(|a, b| b.max_record_id.cmp(&a.max_record_id));
        Ok(sessions)
    }

    async fn session_records(
        &self,
        session_id: &str,
    ) -> Result<Vec<LegacyChatRecord>, LeadlineError> {
        self.enter().await?;
        let rows = self.rows.lock().await;
        let mut records: Vec<LegacyChatRecord> = rows
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::legacy_turn;

    #[tokio::test]
    async fn groups_sessions_by_max_id_descending() {
        let source = ScriptedLegacySource::new(vec![
            legacy_turn(1, "a", "human", "a1"),
            legacy_turn(2, "b", "human", "b1"),
            legacy_turn(3, "a", "ai", "a2"),
        ]);
        let sessions = source.list_sessions().await.unwrap();
        assert_eq!(sessions[0].session_id, "a");
        assert_eq!(sessions[0].max_record_id, 3);
        assert_eq!(sessions[1].session_id, "b");
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn failing_source_errors() {
        let source = ScriptedLegacySource::failing();
        assert!(source.list_sessions().await.is_err());
        assert!(source.session_records("a").await.is_err());
    }
}
