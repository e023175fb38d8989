// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits for the native relational model.

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Conversation, Integration, Message, User};

/// Lifecycle of a persistence backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), LeadlineError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), LeadlineError>;
}

/// Native conversations and their messages.
///
/// Every read and mutation that takes an `owner_user_id` is scoped to it:
/// a conversation owned by someone else behaves exactly like a missing one.
#[async_trait]
pub trait ConversationStore: Send + Sync + 'static {
    /// Insert a fully-formed conversation.
    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), LeadlineError>;

    /// Fetch one conversation (without messages).
    async fn get_conversation(
        &self,
        owner_user_id: &str,
        id: &str,
    ) -> Result<Option<Conversation>, LeadlineError>;

    /// All conversations of a user with their messages attached, most
    /// recent activity first (`last_message_at`, falling back to `created_at`).
    async fn list_conversations(
        &self,
        owner_user_id: &str,
    ) -> Result<Vec<Conversation>, LeadlineError>;

    /// Persist the mutable fields of an existing conversation.
    async fn update_conversation(&self, conversation: &Conversation) -> Result<(), LeadlineError>;

    /// Delete a conversation and, by cascade, its messages.
    /// Returns false when nothing matched.
    async fn delete_conversation(
        &self,
        owner_user_id: &str,
        id: &str,
    ) -> Result<bool, LeadlineError>;

    /// Messages of a conversation, oldest first.
    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, LeadlineError>;

    /// Append a message and refresh the conversation's denormalized
    /// last-message fields in one transaction.
    async fn append_message(&self, message: &Message) -> Result<(), LeadlineError>;

    /// Find the conversation of `draft.owner_user_id` whose `external_id`
    /// equals `draft.external_id`, creating `draft` when none exists, then
    /// append `message` to it.
    ///
    /// Runs as one transaction. `message.conversation_id` is ignored and
    /// replaced by the resolved conversation id. Returns the stored pair and
    /// whether the conversation was created.
    async fn find_or_create_with_message(
        &self,
        draft: &Conversation,
        message: &Message,
    ) -> Result<(Conversation, Message, bool), LeadlineError>;
}

/// Dashboard users.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn insert_user(&self, user: &User) -> Result<(), LeadlineError>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, LeadlineError>;
}

/// Per-user provider integrations.
#[async_trait]
pub trait IntegrationStore: Send + Sync + 'static {
    async fn list_integrations(&self, user_id: &str) -> Result<Vec<Integration>, LeadlineError>;

    /// Insert or replace the integration for `(user_id, provider)`.
    /// Returns the stored row (its id is stable across upserts).
    async fn upsert_integration(
        &self,
        integration: &Integration,
    ) -> Result<Integration, LeadlineError>;
}
