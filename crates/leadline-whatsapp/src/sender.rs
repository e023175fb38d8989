// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mocked outbound sender.

use async_trait::async_trait;
use tracing::info;

use leadline_config::model::WhatsAppConfig;
use leadline_core::types::SendReceipt;
use leadline_core::{AdapterType, HealthStatus, LeadlineError, MessageSender, PluginAdapter};

/// Accepts sends without contacting the Graph API.
///
/// Receipts carry a `wamid.`-prefixed id shaped like the ones WhatsApp
/// returns, so downstream code stores and displays them the same way.
pub struct MockWhatsAppSender {
    phone_number_id: Option<String>,
}

impl MockWhatsAppSender {
    pub fn new(config: &WhatsAppConfig) -> Self {
        Self {
            phone_number_id: config.phone_number_id.clone(),
        }
    }
}

#[async_trait]
impl PluginAdapter for MockWhatsAppSender {
    fn name(&self) -> &str {
        "whatsapp-mock"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sender
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        Ok(match self.phone_number_id {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Degraded("whatsapp.phone_number_id not configured".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), LeadlineError> {
        Ok(())
    }
}

#[async_trait]
impl MessageSender for MockWhatsAppSender {
    async fn send(
        &self,
        recipient: &str,
        text: &str,
        template_id: Option<&str>,
    ) -> Result<SendReceipt, LeadlineError> {
        let recipient = normalize_recipient(recipient)?;
        if text.trim().is_empty() && template_id.is_none() {
            return Err(LeadlineError::Validation(
                "message text must not be empty".into(),
            ));
        }

        let external_message_id = format!("wamid.{}", uuid::Uuid::new_v4().simple());
        info!(
            recipient = %recipient,
            template = template_id.unwrap_or("-"),
            wamid = %external_message_id,
            "mock whatsapp send accepted"
        );
        Ok(SendReceipt {
            external_message_id,
            recipient,
            template_id: template_id.map(str::to_string),
            accepted: true,
        })
    }
}

/// Strip formatting from a phone number, keeping the leading `+` and digits.
fn normalize_recipient(raw: &str) -> Result<String, LeadlineError> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(LeadlineError::Validation(format!(
            "recipient `{raw}` is not a phone number"
        )));
    }
    Ok(if trimmed.starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> MockWhatsAppSender {
        MockWhatsAppSender::new(&WhatsAppConfig::default())
    }

    #[tokio::test]
    async fn send_returns_wamid_receipt() {
        let receipt = sender()
            .send("+52 1 555 000 1", "hola", None)
            .await
            .unwrap();
        assert!(receipt.external_message_id.starts_with("wamid."));
        assert_eq!(receipt.recipient, "+5215550001");
        assert!(receipt.accepted);
        assert!(receipt.template_id.is_none());
    }

    #[tokio::test]
    async fn each_send_gets_a_distinct_id() {
        let s = sender();
        let a = s.send("5215550001", "a", None).await.unwrap();
        let b = s.send("5215550001", "b", None).await.unwrap();
        assert_ne!(a.external_message_id, b.external_message_id);
    }

    #[tokio::test]
    async fn template_send_may_have_empty_text() {
        let receipt = sender()
            .send("5215550001", "", Some("follow_up_v2"))
            .await
            .unwrap();
        assert_eq!(receipt.template_id.as_deref(), Some("follow_up_v2"));
    }

    #[tokio::test]
    async fn rejects_non_phone_recipient() {
        let err = sender().send("legacy-session", "hola", None).await.unwrap_err();
        assert!(matches!(err, LeadlineError::Validation(_)));
    }

    #[tokio::test]
    async fn health_is_degraded_without_phone_number_id() {
        let status = sender().health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Degraded(_)));
    }
}
