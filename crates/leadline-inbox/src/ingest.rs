// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook ingestion: attach an inbound message to the sender's conversation,
//! creating the conversation on first contact.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use leadline_core::{
    Clock, Conversation, ConversationStatus, ConversationStore, LeadlineError, Message,
    MessageStatus, MessageType, Sender, UserStore,
};

/// An inbound message as posted by the automation system.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(default)]
    pub sender_identifier: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub external_message_id: Option<String>,
    #[serde(default)]
    pub owner_user_id: String,
    #[serde(default)]
    pub sender_name: Option<String>,
}

/// The stored pair, plus whether this event opened a new conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub conversation: Conversation,
    pub message: Message,
    pub created: bool,
}

impl InboundEvent {
    fn validate(&self) -> Result<(), LeadlineError> {
        if self.sender_identifier.trim().is_empty() {
            return Err(LeadlineError::Validation("senderIdentifier is required".into()));
        }
        if self.owner_user_id.trim().is_empty() {
            return Err(LeadlineError::Validation("ownerUserId is required".into()));
        }
        if self.message_type == MessageType::Text && self.content.trim().is_empty() {
            return Err(LeadlineError::Validation(
                "content is required for text messages".into(),
            ));
        }
        Ok(())
    }

    /// Text stored for the message; media without a caption gets a placeholder.
    fn display_content(&self) -> String {
        if self.content.trim().is_empty() {
            format!("[{}]", self.message_type)
        } else {
            self.content.clone()
        }
    }
}

/// Find-or-create ingestion over the conversation store.
pub struct WebhookIngestor {
    store: Arc<dyn ConversationStore>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    channel: String,
}

impl WebhookIngestor {
    /// `channel` is assigned to conversations this ingestor creates.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            store,
            users,
            clock,
            channel: channel.into(),
        }
    }

    /// Attach `event` to the conversation keyed by its sender identifier.
    ///
    /// Lookup, creation, message insert and the last-message update happen
    /// in one store transaction, so concurrent events from the same sender
    /// converge on a single conversation.
    pub async fn ingest(&self, event: InboundEvent) -> Result<IngestOutcome, LeadlineError> {
        event.validate()?;
        let owner = event.owner_user_id.trim().to_string();
        if self.users.get_user(&owner).await?.is_none() {
            return Err(LeadlineError::NotFound {
                resource: "user",
                id: owner,
            });
        }

        let now = self.clock.now();
        let sender_identifier = event.sender_identifier.trim().to_string();
        let sender_name = event
            .sender_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let draft = Conversation {
            id: uuid::Uuid::new_v4().to_string(),
            title: sender_name.clone().unwrap_or_else(|| sender_identifier.clone()),
            status: ConversationStatus::Active,
            channel: self.channel.clone(),
            external_id: Some(sender_identifier.clone()),
            participant_phone: Some(sender_identifier.clone()),
            participant_name: sender_name.clone(),
            participant_email: None,
            lead_score: 0,
            intent: None,
            category: None,
            tags: Vec::new(),
            metadata: None,
            last_message_at: None,
            last_message_content: None,
            owner_user_id: owner.clone(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        };
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: draft.id.clone(),
            content: event.display_content(),
            sender: Sender::User,
            sender_phone: Some(sender_identifier.clone()),
            sender_name,
            message_type: event.message_type,
            media_url: event.media_url,
            media_type: event.media_type,
            status: MessageStatus::Delivered,
            external_message_id: event.external_message_id,
            created_at: now,
            updated_at: now,
        };

        let (conversation, message, created) =
            self.store.find_or_create_with_message(&draft, &message).await?;
        info!(
            owner = %owner,
            conversation_id = %conversation.id,
            message_id = %message.id,
            created,
            "webhook message ingested"
        );
        Ok(IngestOutcome {
            conversation,
            message,
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use leadline_test_utils::fixtures::at;
    use leadline_test_utils::{FixedClock, MemoryStore};

    async fn setup() -> (Arc<MemoryStore>, Arc<FixedClock>, WebhookIngestor) {
        let store = Arc::new(MemoryStore::with_users(&["u-1"]).await);
        let clock = Arc::new(FixedClock::new(at(9, 0)));
        let ingestor = WebhookIngestor::new(store.clone(), store.clone(), clock.clone(), "whatsapp");
        (store, clock, ingestor)
    }

    fn event(sender: &str, content: &str) -> InboundEvent {
        InboundEvent {
            sender_identifier: sender.to_string(),
            content: content.to_string(),
            external_message_id: Some("wamid.in-1".to_string()),
            owner_user_id: "u-1".to_string(),
            sender_name: Some("Ana".to_string()),
            ..InboundEvent::default()
        }
    }

    #[tokio::test]
    async fn first_event_creates_conversation_and_message() {
        let (store, _clock, ingestor) = setup().await;
        let outcome = ingestor.ingest(event("2517000111", "Hola, info?")).await.unwrap();

        assert!(outcome.created);
        assert_eq!(store.conversation_count().await, 1);
        assert_eq!(store.message_count().await, 1);
        let conv = &outcome.conversation;
        assert_eq!(conv.title, "Ana");
        assert_eq!(conv.channel, "whatsapp");
        assert_eq!(conv.status, ConversationStatus::Active);
        assert_eq!(conv.external_id.as_deref(), Some("2517000111"));
        assert_eq!(conv.participant_phone.as_deref(), Some("2517000111"));
        assert_eq!(conv.last_message_content.as_deref(), Some("Hola, info?"));
        assert_eq!(outcome.message.sender, Sender::User);
        assert_eq!(outcome.message.conversation_id, conv.id);
    }

    #[tokio::test]
    async fn second_event_reuses_conversation_and_advances_last_message() {
        let (store, clock, ingestor) = setup().await;
        let first = ingestor.ingest(event("2517000111", "hola")).await.unwrap();
        clock.advance(Duration::minutes(5));
        let second = ingestor.ingest(event("2517000111", "precio?")).await.unwrap();

        assert!(!second.created);
        assert_eq!(second.conversation.id, first.conversation.id);
        assert_eq!(store.conversation_count().await, 1);
        assert_eq!(store.message_count().await, 2);
        assert!(second.conversation.last_message_at > first.conversation.last_message_at);
        assert_eq!(second.conversation.last_message_content.as_deref(), Some("precio?"));
    }

    #[tokio::test]
    async fn title_falls_back_to_sender_identifier() {
        let (_store, _clock, ingestor) = setup().await;
        let mut e = event("2517000111", "hola");
        e.sender_name = Some("   ".into());
        let outcome = ingestor.ingest(e).await.unwrap();
        assert_eq!(outcome.conversation.title, "2517000111");
        assert!(outcome.conversation.participant_name.is_none());
    }

    #[tokio::test]
    async fn missing_fields_are_validation_errors() {
        let (_store, _clock, ingestor) = setup().await;
        for e in [
            event("", "hola"),
            event("2517000111", "  "),
            InboundEvent {
                owner_user_id: String::new(),
                ..event("2517000111", "hola")
            },
        ] {
            let err = ingestor.ingest(e).await.unwrap_err();
            assert!(matches!(err, LeadlineError::Validation(_)), "got {err:?}");
        }
    }

    #[tokio::test]
    async fn media_without_caption_is_accepted() {
        let (_store, _clock, ingestor) = setup().await;
        let e = InboundEvent {
            message_type: MessageType::Audio,
            media_url: Some("https://cdn.example.com/a.ogg".into()),
            media_type: Some("audio/ogg".into()),
            ..event("2517000111", "")
        };
        let outcome = ingestor.ingest(e).await.unwrap();
        assert_eq!(outcome.message.content, "[audio]");
        assert_eq!(outcome.message.message_type, MessageType::Audio);
    }

    #[tokio::test]
    async fn unknown_owner_is_not_found() {
        let (_store, _clock, ingestor) = setup().await;
        let e = InboundEvent {
            owner_user_id: "u-ghost".into(),
            ..event("2517000111", "hola")
        };
        let err = ingestor.ingest(e).await.unwrap_err();
        assert!(matches!(err, LeadlineError::NotFound { resource: "user", .. }));
    }

    #[tokio::test]
    async fn concurrent_first_contact_creates_one_conversation() {
        let (store, _clock, ingestor) = setup().await;
        let ingestor = Arc::new(ingestor);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ingestor = ingestor.clone();
                tokio::spawn(async move {
                    ingestor
                        .ingest(event("2517000111", &format!("msg {i}")))
                        .await
                        .unwrap()
                })
            })
            .collect();
        let mut created = 0;
        for h in handles {
            if h.await.unwrap().created {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.conversation_count().await, 1);
        assert_eq!(store.message_count().await, 8);
    }
}
