// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound message delivery.

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::SendReceipt;

/// Delivers a message to a remote party, optionally through a pre-approved template.
#[async_trait]
pub trait MessageSender: PluginAdapter {
    async fn send(
        &self,
        recipient: &str,
        text: &str,
        template_id: Option<&str>,
    ) -> Result<SendReceipt, LeadlineError>;
}
