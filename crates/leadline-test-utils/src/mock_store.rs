// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory store for deterministic testing.
//!
//! `MemoryStore` implements the conversation, user and integration store
//! traits over plain vectors behind one mutex, so every operation is atomic
//! just like a database transaction.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadline_core::types::{Integration, User};
use leadline_core::{
    Conversation, ConversationStore, IntegrationStore, LeadlineError, Message, UserStore,
};

#[derive(Default)]
struct State {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    users: Vec<User>,
    integrations: Vec<Integration>,
}

/// A mock store holding everything in memory.
///
/// Call [`MemoryStore::set_failing`] to make every operation return a
/// storage error, for exercising error paths.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with the given users.
    pub async fn with_users(ids: &[&str]) -> Self {
        let store = Self::new();
        for id in ids {
            store
                .state
                .lock()
                .await
                .users
                .push(crate::fixtures::user(id));
        }
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of conversations stored, across all owners.
    pub async fn conversation_count(&self) -> usize {
        self.state.lock().await.conversations.len()
    }

    /// Number of messages stored, across all conversations.
    pub async fn message_count(&self) -> usize {
        self.state.lock().await.messages.len()
    }

    fn check(&self) -> Result<(), LeadlineError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LeadlineError::Storage {
                source: "memory store set to fail".into(),
            });
        }
        Ok(())
    }
}

fn sorted_messages(state: &State, conversation_id: &str) -> Vec<Message> {
    let mut messages: Vec<Message> = state
        .messages
        .iter()
        .filter(|m| m.conversation_id == conversation_id)
        .cloned()
        .collect();
    messages.sort_by_key(|m| m.created_at);
    messages
}

fn touch(conversation: &mut Conversation, message: &Message) {
    conversation.last_message_content = Some(message.content.clone());
    if conversation
        .last_message_at
        .is_none_or(|at| at < message.created_at)
    {
        conversation.last_message_at = Some(message.created_at);
    }
    conversation.updated_at = message.created_at;
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), LeadlineError> {
        self.check()?;
        let mut state = self.state.lock().await;
        if state.conversations.iter().any(|c| c.id == conversation.id) {
            return Err(LeadlineError::Storage {
                source: format!("duplicate conversation id {}", conversation.id).into(),
            });
        }
        if let Some(external_id) = conversation.external_id.as_deref()
            && state.conversations.iter().any(|c| {
                c.owner_user_id == conversation.owner_user_id
                    && c.external_id.as_deref() == Some(external_id)
            })
        {
            return Err(LeadlineError::Validation(format!(
                "a conversation with external id {external_id} already exists"
            )));
        }
        let mut stored = conversation.clone();
        stored.messages.clear();
        state.conversations.push(stored);
        Ok(())
    }

    async fn get_conversation(
        &self,
        owner_user_id: &str,
        id: &str,
    ) -> Result<Option<Conversation>, LeadlineError> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state
            .conversations
            .iter()
            .find(|c| c.id == id && c.owner_user_id == owner_user_id)
            .cloned())
    }

    async fn list_conversations(
        &self,
        owner_user_id: &str,
    ) -> Result<Vec<Conversation>, LeadlineError> {
        self.check()?;
        let state = self.state.lock().await;
        let mut list: Vec<Conversation> = state
            .conversations
            .iter()
            .filter(|c| c.owner_user_id == owner_user_id)
            .map(|c| {
                let mut c = c.clone();
                c.messages = sorted_messages(&state, &c.id);
                c
            })
            .collect();
        list.sort_by(|a, b| {
            b.activity_at()
                .cmp(&a.activity_at())
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(list)
    }

    async fn update_conversation(&self, conversation: &Conversation) -> Result<(), LeadlineError> {
        self.check()?;
        let mut state = self.state.lock().await;
        let stored = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation.id && c.owner_user_id == conversation.owner_user_id)
            .ok_or_else(|| LeadlineError::conversation_not_found(&conversation.id))?;
        stored.title = conversation.title.clone();
        stored.status = conversation.status;
        stored.tags = conversation.tags.clone();
        stored.metadata = conversation.metadata.clone();
        stored.lead_score = conversation.lead_score;
        stored.intent = conversation.intent.clone();
        stored.category = conversation.category.clone();
        stored.participant_name = conversation.participant_name.clone();
        stored.participant_email = conversation.participant_email.clone();
        stored.updated_at = conversation.updated_at;
        Ok(())
    }

    async fn delete_conversation(
        &self,
        owner_user_id: &str,
        id: &str,
    ) -> Result<bool, LeadlineError> {
        self.check()?;
        let mut state = self.state.lock().await;
        let before = state.conversations.len();
        state
            .conversations
            .retain(|c| !(c.id == id && c.owner_user_id == owner_user_id));
        let deleted = state.conversations.len() < before;
        if deleted {
            state.messages.retain(|m| m.conversation_id != id);
        }
        Ok(deleted)
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, LeadlineError> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(sorted_messages(&state, conversation_id))
    }

    async fn append_message(&self, message: &Message) -> Result<(), LeadlineError> {
        self.check()?;
        let mut state = self.state.lock().await;
        let conversation = state
            .conversations
            .iter_mut()
            .find(|c| c.id == message.conversation_id)
            .ok_or_else(|| LeadlineError::conversation_not_found(&message.conversation_id))?;
        touch(conversation, message);
        state.messages.push(message.clone());
        Ok(())
    }

    async fn find_or_create_with_message(
        &self,
        draft: &Conversation,
        message: &Message,
    ) -> Result<(Conversation, Message, bool), LeadlineError> {
        self.check()?;
        let Some(external_id) = draft.external_id.as_deref() else {
            return Err(LeadlineError::Validation(
                "find-or-create requires an external id".into(),
            ));
        };
        let mut state = self.state.lock().await;
        let existing = state.conversations.iter().position(|c| {
            c.owner_user_id == draft.owner_user_id && c.external_id.as_deref() == Some(external_id)
        });
        let (index, created) = match existing {
            Some(index) => (index, false),
            None => {
                let mut stored = draft.clone();
                stored.messages.clear();
                state.conversations.push(stored);
                (state.conversations.len() - 1, true)
            }
        };

        let mut message = message.clone();
        message.conversation_id = state.conversations[index].id.clone();
        touch(&mut state.conversations[index], &message);
        state.messages.push(message.clone());
        Ok((state.conversations[index].clone(), message, created))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), LeadlineError> {
        self.check()?;
        let mut state = self.state.lock().await;
        if state
            .users
            .iter()
            .any(|u| u.id == user.id || u.email == user.email)
        {
            return Err(LeadlineError::Storage {
                source: format!("duplicate user {}", user.email).into(),
            });
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, LeadlineError> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl IntegrationStore for MemoryStore {
    async fn list_integrations(&self, user_id: &str) -> Result<Vec<Integration>, LeadlineError> {
        self.check()?;
        let state = self.state.lock().await;
        let mut list: Vec<Integration> = state
            .integrations
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.provider.cmp(&b.provider));
        Ok(list)
    }

    async fn upsert_integration(
        &self,
        integration: &Integration,
    ) -> Result<Integration, LeadlineError> {
        self.check()?;
        let mut state = self.state.lock().await;
        match state
            .integrations
            .iter_mut()
            .find(|i| i.user_id == integration.user_id && i.provider == integration.provider)
        {
            Some(stored) => {
                stored.config = integration.config.clone();
                stored.enabled = integration.enabled;
                stored.updated_at = integration.updated_at;
                Ok(stored.clone())
            }
            None => {
                state.integrations.push(integration.clone());
                Ok(integration.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at, conversation, inbound};

    #[tokio::test]
    async fn find_or_create_reuses_by_owner_and_external_id() {
        let store = MemoryStore::with_users(&["u-1"]).await;
        let mut draft = conversation("c-1", "u-1");
        draft.external_id = Some("5215550001".into());

        let (_, _, created) = store
            .find_or_create_with_message(&draft, &inbound("m1", "", "hola", at(9, 0)))
            .await
            .unwrap();
        assert!(created);

        let mut again = conversation("c-2", "u-1");
        again.external_id = Some("5215550001".into());
        let (conv, msg, created) = store
            .find_or_create_with_message(&again, &inbound("m2", "", "info", at(9, 1)))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(conv.id, "c-1");
        assert_eq!(msg.conversation_id, "c-1");
        assert_eq!(store.conversation_count().await, 1);
        assert_eq!(store.message_count().await, 2);
    }

    #[tokio::test]
    async fn failing_store_errors_everywhere() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(store.list_conversations("u-1").await.is_err());
        assert!(store.get_user("u-1").await.is_err());
        store.set_failing(false);
        assert!(store.list_conversations("u-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_messages() {
        let store = MemoryStore::new();
        store
            .insert_conversation(&conversation("c-1", "u-1"))
            .await
            .unwrap();
        store
            .append_message(&inbound("m1", "c-1", "hola", at(9, 0)))
            .await
            .unwrap();
        assert!(store.delete_conversation("u-1", "c-1").await.unwrap());
        assert_eq!(store.message_count().await, 0);
    }
}
