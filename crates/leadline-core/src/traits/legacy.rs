// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only access to the legacy chat-history table written by the
//! external automation tool.

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::types::{LegacyChatRecord, LegacySession};

/// Reader for the session-keyed legacy chat history.
///
/// This system never writes to the legacy table. Implementations return
/// errors as-is; callers decide whether to degrade.
#[async_trait]
pub trait LegacyChatSource: Send + Sync + 'static {
    /// Every distinct session, ordered by its newest record id, descending.
    async fn list_sessions(&self) -> Result<Vec<LegacySession>, LeadlineError>;

    /// All records of one session, ordered by record id, ascending.
    async fn session_records(
        &self,
        session_id: &str,
    ) -> Result<Vec<LegacyChatRecord>, LeadlineError>;
}
