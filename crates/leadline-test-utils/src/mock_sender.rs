// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording sender for deterministic testing.
//!
//! `RecordingSender` implements `MessageSender` and captures every send for
//! assertion in tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadline_core::types::{AdapterType, HealthStatus, SendReceipt};
use leadline_core::{LeadlineError, MessageSender, PluginAdapter};

/// One captured call to [`MessageSender::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient: String,
    pub text: String,
    pub template_id: Option<String>,
}

/// A mock sender that records instead of delivering.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<SentMessage>>,
    counter: AtomicUsize,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail with a channel error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Hold every subsequent send for `delay` before answering.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = Some(delay);
    }

    /// Get all messages that were sent through `send()`.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Get the count of sent messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for RecordingSender {
    fn name(&self) -> &str {
        "recording-sender"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sender
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadlineError> {
        Ok(())
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(
        &self,
        recipient: &str,
        text: &str,
        template_id: Option<&str>,
    ) -> Result<SendReceipt, LeadlineError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LeadlineError::Channel {
                message: "recording sender set to fail".into(),
                source: None,
            });
        }
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent.lock().await.push(SentMessage {
            recipient: recipient.to_string(),
            text: text.to_string(),
            template_id: template_id.map(str::to_string),
        });
        Ok(SendReceipt {
            external_message_id: format!("wamid.test-{n}"),
            recipient: recipient.to_string(),
            template_id: template_id.map(str::to_string),
            accepted: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_captures_outbound_messages() {
        let sender = RecordingSender::new();
        let receipt = sender.send("+5215550001", "hola", None).await.unwrap();
        assert_eq!(receipt.external_message_id, "wamid.test-1");

        let sent = sender.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "hola");
        assert!(sent[0].template_id.is_none());
    }

    #[tokio::test]
    async fn failing_sender_records_nothing() {
        let sender = RecordingSender::new();
        sender.set_failing(true);
        assert!(sender.send("+5215550001", "hola", None).await.is_err());
        assert_eq!(sender.sent_count().await, 0);
    }
}
