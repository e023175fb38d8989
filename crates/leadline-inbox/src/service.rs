// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation and message operations behind the dashboard API.
//!
//! Every operation is scoped to the requesting user. Conversations whose id
//! carries the legacy prefix are served from the legacy table and are
//! read-only.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use leadline_core::types::{ConversationPatch, NewConversation, NewMessage, SendReceipt, is_legacy_id};
use leadline_core::{
    Clock, Conversation, ConversationStore, LeadlineError, Message, MessageSender, Sender,
    UserStore,
};
use leadline_whatsapp::ServiceWindow;

use crate::reconciler::Reconciler;
use crate::stats::{ConversationStats, compute_stats};

/// Highest accepted lead score.
pub const MAX_LEAD_SCORE: i64 = 100;

/// Upper bound for one outbound send before the request fails with `Timeout`.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// The service's collaborators.
pub struct ConversationService {
    store: Arc<dyn ConversationStore>,
    users: Arc<dyn UserStore>,
    reconciler: Reconciler,
    sender: Arc<dyn MessageSender>,
    clock: Arc<dyn Clock>,
    window: ServiceWindow,
    default_channel: String,
    send_timeout: Duration,
}

/// A stored outbound message and the sender's acknowledgment.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub message: Message,
    pub receipt: SendReceipt,
}

impl ConversationService {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        users: Arc<dyn UserStore>,
        reconciler: Reconciler,
        sender: Arc<dyn MessageSender>,
        clock: Arc<dyn Clock>,
        window: ServiceWindow,
        default_channel: impl Into<String>,
    ) -> Self {
        Self {
            store,
            users,
            reconciler,
            sender,
            clock,
            window,
            default_channel: default_channel.into(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Native and legacy conversations, most recent activity first.
    pub async fn list(&self, owner: &str) -> Result<Vec<Conversation>, LeadlineError> {
        self.reconciler.reconcile(owner).await
    }

    pub async fn stats(&self, owner: &str) -> Result<ConversationStats, LeadlineError> {
        Ok(compute_stats(&self.reconciler.reconcile(owner).await?))
    }

    /// One conversation with its messages.
    pub async fn get(&self, owner: &str, id: &str) -> Result<Conversation, LeadlineError> {
        if is_legacy_id(id) {
            return self.reconciler.legacy_conversation(owner, id).await;
        }
        let mut conversation = self.owned(owner, id).await?;
        conversation.messages = self.store.list_messages(id).await?;
        Ok(conversation)
    }

    /// Create a native conversation by explicit user action.
    pub async fn create(
        &self,
        owner: &str,
        new: NewConversation,
    ) -> Result<Conversation, LeadlineError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(LeadlineError::Validation("title is required".into()));
        }
        if self.users.get_user(owner).await?.is_none() {
            return Err(LeadlineError::NotFound {
                resource: "user",
                id: owner.to_string(),
            });
        }

        let now = self.clock.now();
        let channel = new
            .channel
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.default_channel)
            .to_string();
        let conversation = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            status: new.status,
            channel,
            external_id: non_blank(new.external_id),
            participant_phone: non_blank(new.participant_phone),
            participant_name: non_blank(new.participant_name),
            participant_email: non_blank(new.participant_email),
            lead_score: 0,
            intent: None,
            category: None,
            tags: new.tags,
            metadata: new.metadata,
            last_message_at: None,
            last_message_content: None,
            owner_user_id: owner.to_string(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        };
        self.store.insert_conversation(&conversation).await?;
        info!(owner, conversation_id = %conversation.id, "conversation created");
        Ok(conversation)
    }

    /// Apply a partial update to title, status, tags or metadata.
    pub async fn update(
        &self,
        owner: &str,
        id: &str,
        patch: ConversationPatch,
    ) -> Result<Conversation, LeadlineError> {
        reject_legacy(id)?;
        let mut conversation = self.owned(owner, id).await?;
        if patch.is_empty() {
            return Ok(conversation);
        }
        if let Some(title) = patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(LeadlineError::Validation("title must not be empty".into()));
            }
            conversation.title = title.to_string();
        }
        if let Some(status) = patch.status {
            conversation.status = status;
        }
        if let Some(tags) = patch.tags {
            conversation.tags = tags;
        }
        if let Some(metadata) = patch.metadata {
            conversation.metadata = Some(metadata);
        }
        self.save(conversation).await
    }

    pub async fn delete(&self, owner: &str, id: &str) -> Result<(), LeadlineError> {
        reject_legacy(id)?;
        if !self.store.delete_conversation(owner, id).await? {
            return Err(LeadlineError::conversation_not_found(id));
        }
        info!(owner, conversation_id = id, "conversation deleted");
        Ok(())
    }

    /// Set the lead score (0..=100).
    pub async fn set_score(
        &self,
        owner: &str,
        id: &str,
        score: i64,
    ) -> Result<Conversation, LeadlineError> {
        reject_legacy(id)?;
        if !(0..=MAX_LEAD_SCORE).contains(&score) {
            return Err(LeadlineError::Validation(format!(
                "leadScore must be between 0 and {MAX_LEAD_SCORE}, got {score}"
            )));
        }
        let mut conversation = self.owned(owner, id).await?;
        conversation.lead_score = score;
        self.save(conversation).await
    }

    /// Set intent and/or category. `None` leaves a field untouched; a blank
    /// string clears it.
    pub async fn set_intent(
        &self,
        owner: &str,
        id: &str,
        intent: Option<String>,
        category: Option<String>,
    ) -> Result<Conversation, LeadlineError> {
        reject_legacy(id)?;
        let mut conversation = self.owned(owner, id).await?;
        if let Some(intent) = intent {
            conversation.intent = non_blank(Some(intent));
        }
        if let Some(category) = category {
            conversation.category = non_blank(Some(category));
        }
        self.save(conversation).await
    }

    /// Messages of a conversation, oldest first.
    pub async fn messages(&self, owner: &str, id: &str) -> Result<Vec<Message>, LeadlineError> {
        if is_legacy_id(id) {
            return Ok(self.reconciler.legacy_conversation(owner, id).await?.messages);
        }
        self.owned(owner, id).await?;
        self.store.list_messages(id).await
    }

    /// Send a reply through the outbound sender and record it.
    ///
    /// Free-form text is only allowed inside the service window opened by the
    /// lead's last inbound message; outside it a template id is required.
    pub async fn send_message(
        &self,
        owner: &str,
        id: &str,
        content: &str,
        template_id: Option<&str>,
    ) -> Result<SentMessage, LeadlineError> {
        reject_legacy(id)?;
        let template_id = template_id.map(str::trim).filter(|t| !t.is_empty());
        let content = content.trim();
        if content.is_empty() && template_id.is_none() {
            return Err(LeadlineError::Validation("content is required".into()));
        }
        let conversation = self.owned(owner, id).await?;
        let Some(recipient) = conversation.participant_phone.as_deref() else {
            return Err(LeadlineError::Validation(
                "conversation has no participant phone".into(),
            ));
        };

        let now = self.clock.now();
        let history = self.store.list_messages(id).await?;
        let last_inbound = history
            .iter()
            .filter(|m| m.sender == Sender::User)
            .map(|m| m.created_at)
            .max();
        self.window.check_send(last_inbound, now, template_id)?;

        let receipt = tokio::time::timeout(
            self.send_timeout,
            self.sender.send(recipient, content, template_id),
        )
        .await
        .map_err(|_| {
            warn!(owner, conversation_id = id, "outbound send timed out");
            LeadlineError::Timeout {
                duration: self.send_timeout,
            }
        })??;
        let body = match (content.is_empty(), template_id) {
            (true, Some(template)) => format!("[template:{template}]"),
            _ => content.to_string(),
        };
        let draft = NewMessage {
            external_message_id: Some(receipt.external_message_id.clone()),
            ..NewMessage::bot_text(body)
        };
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation.id.clone(),
            content: draft.content,
            sender: draft.sender,
            sender_phone: draft.sender_phone,
            sender_name: draft.sender_name,
            message_type: draft.message_type,
            media_url: draft.media_url,
            media_type: draft.media_type,
            status: draft.status,
            external_message_id: draft.external_message_id,
            created_at: now,
            updated_at: now,
        };
        self.store.append_message(&message).await?;
        debug!(
            owner,
            conversation_id = id,
            wamid = %receipt.external_message_id,
            "outbound message recorded"
        );
        Ok(SentMessage { message, receipt })
    }

    async fn owned(&self, owner: &str, id: &str) -> Result<Conversation, LeadlineError> {
        self.store
            .get_conversation(owner, id)
            .await?
            .ok_or_else(|| LeadlineError::conversation_not_found(id))
    }

    async fn save(&self, mut conversation: Conversation) -> Result<Conversation, LeadlineError> {
        conversation.updated_at = self.clock.now();
        self.store.update_conversation(&conversation).await?;
        Ok(conversation)
    }
}

fn reject_legacy(id: &str) -> Result<(), LeadlineError> {
    if is_legacy_id(id) {
        return Err(LeadlineError::Validation(format!(
            "conversation {id} comes from the legacy chat history and is read-only"
        )));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
