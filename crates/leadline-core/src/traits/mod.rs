// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at the seams between the inbox services and their
//! backends.
//!
//! All traits use `#[async_trait]` so they can be held as `Arc<dyn Trait>`.

pub mod adapter;
pub mod legacy;
pub mod sender;
pub mod storage;

pub use adapter::PluginAdapter;
pub use legacy::LegacyChatSource;
pub use sender::MessageSender;
pub use storage::{ConversationStore, IntegrationStore, StorageAdapter, UserStore};
