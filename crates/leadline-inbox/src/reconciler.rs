// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merges native conversations with conversations synthesized from the
//! legacy chat-history table into one list ordered by recent activity.
//!
//! Legacy sessions have no timestamps. Each read stamps them with the same
//! "now", so in a mixed list they always sort ahead of native conversations.
//! Callers rely on that ordering; it is kept as is.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use leadline_core::types::LegacySession;
use leadline_core::{
    Clock, Conversation, ConversationStatus, ConversationStore, LEGACY_ID_PREFIX, LeadlineError,
    LegacyChatSource,
};

use crate::normalizer::{legacy_conversation_id, normalize_legacy_messages};

/// Channel assigned to every synthesized conversation.
pub const LEGACY_CHANNEL: &str = "whatsapp";

/// A conversation tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourcedConversation {
    Native(Conversation),
    Synthesized(Conversation),
}

impl SourcedConversation {
    pub fn conversation(&self) -> &Conversation {
        match self {
            SourcedConversation::Native(c) | SourcedConversation::Synthesized(c) => c,
        }
    }

    pub fn into_conversation(self) -> Conversation {
        match self {
            SourcedConversation::Native(c) | SourcedConversation::Synthesized(c) => c,
        }
    }
}

/// Build the conversation shown for a legacy session.
///
/// The requesting user is recorded as owner: legacy sessions have none.
pub fn synthesize_conversation(
    session: &LegacySession,
    owner_user_id: &str,
    now: DateTime<Utc>,
) -> Conversation {
    let mut metadata = leadline_core::types::Metadata::new();
    metadata.insert("source".into(), "legacy".into());
    metadata.insert("maxRecordId".into(), session.max_record_id.into());
    Conversation {
        id: legacy_conversation_id(&session.session_id),
        title: session.session_id.clone(),
        status: ConversationStatus::Active,
        channel: LEGACY_CHANNEL.to_string(),
        external_id: None,
        participant_phone: Some(session.session_id.clone()),
        participant_name: None,
        participant_email: None,
        lead_score: 0,
        intent: None,
        category: None,
        tags: Vec::new(),
        metadata: Some(metadata),
        last_message_at: Some(now),
        last_message_content: None,
        owner_user_id: owner_user_id.to_string(),
        created_at: now,
        updated_at: now,
        messages: Vec::new(),
    }
}

/// Stable sort, most recent activity (`last_message_at`, else `created_at`) first.
pub fn merge_by_activity(
    native: Vec<Conversation>,
    synthesized: Vec<Conversation>,
) -> Vec<Conversation> {
    let mut combined: Vec<SourcedConversation> = native
        .into_iter()
        .map(SourcedConversation::Native)
        .chain(synthesized.into_iter().map(SourcedConversation::Synthesized))
        .collect();
    combined.sort_by(|a, b| {
        b.conversation()
            .activity_at()
            .cmp(&a.conversation().activity_at())
    });
    combined
        .into_iter()
        .map(SourcedConversation::into_conversation)
        .collect()
}

/// Reads both conversation sources for a user and merges them.
pub struct Reconciler {
    store: Arc<dyn ConversationStore>,
    legacy: Option<Arc<dyn LegacyChatSource>>,
    clock: Arc<dyn Clock>,
    legacy_timeout: Duration,
}

impl Reconciler {
    /// `legacy: None` disables legacy merging entirely.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        legacy: Option<Arc<dyn LegacyChatSource>>,
        clock: Arc<dyn Clock>,
        legacy_timeout: Duration,
    ) -> Self {
        Self {
            store,
            legacy,
            clock,
            legacy_timeout,
        }
    }

    /// The unified conversation list of `owner_user_id`.
    ///
    /// Native and legacy queries run concurrently. A failing or slow legacy
    /// query degrades to native-only; a failing native query is an error.
    pub async fn reconcile(&self, owner_user_id: &str) -> Result<Vec<Conversation>, LeadlineError> {
        let now = self.clock.now();
        let (native, sessions) = tokio::join!(
            self.store.list_conversations(owner_user_id),
            self.legacy_sessions(),
        );
        let native = native?;
        let synthesized: Vec<Conversation> = sessions
            .iter()
            .map(|s| synthesize_conversation(s, owner_user_id, now))
            .collect();
        debug!(
            owner = owner_user_id,
            native = native.len(),
            legacy = synthesized.len(),
            "reconciled conversations"
        );
        Ok(merge_by_activity(native, synthesized))
    }

    /// One synthesized conversation with its normalized messages attached.
    ///
    /// Unknown sessions (or an unreachable legacy table) are not-found.
    pub async fn legacy_conversation(
        &self,
        owner_user_id: &str,
        id: &str,
    ) -> Result<Conversation, LeadlineError> {
        let session_id = id
            .strip_prefix(LEGACY_ID_PREFIX)
            .ok_or_else(|| LeadlineError::conversation_not_found(id))?;
        let messages = self.legacy_messages(session_id).await;
        let Some(max_record_id) = messages
            .iter()
            .filter_map(|m| m.id.strip_prefix(LEGACY_ID_PREFIX)?.parse::<i64>().ok())
            .max()
        else {
            return Err(LeadlineError::conversation_not_found(id));
        };

        let session = LegacySession {
            session_id: session_id.to_string(),
            max_record_id,
        };
        let now = self.clock.now();
        let mut conversation = synthesize_conversation(&session, owner_user_id, now);
        conversation.last_message_content = messages.last().map(|m| m.content.clone());
        conversation.messages = messages;
        Ok(conversation)
    }

    /// Normalized messages of a legacy session; empty when disabled or failing.
    pub async fn legacy_messages(&self, session_id: &str) -> Vec<leadline_core::Message> {
        let Some(legacy) = &self.legacy else {
            return Vec::new();
        };
        let now = self.clock.now();
        match tokio::time::timeout(
            self.legacy_timeout,
            normalize_legacy_messages(legacy.as_ref(), session_id, now),
        )
        .await
        {
            Ok(messages) => messages,
            Err(_) => {
                warn!(session_id, timeout = ?self.legacy_timeout, "legacy message fetch timed out");
                Vec::new()
            }
        }
    }

    async fn legacy_sessions(&self) -> Vec<LegacySession> {
        let Some(legacy) = &self.legacy else {
            return Vec::new();
        };
        match tokio::time::timeout(self.legacy_timeout, legacy.list_sessions()).await {
            Ok(Ok(sessions)) => sessions,
            Ok(Err(e)) => {
                warn!(error = %e, "legacy session query failed; listing native conversations only");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    timeout = ?self.legacy_timeout,
                    "legacy session query timed out; listing native conversations only"
                );
                Vec::new()
            }
        }
    }
}
