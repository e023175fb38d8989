// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook from the automation system.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde::Serialize;

use leadline_inbox::InboundEvent;
use leadline_whatsapp::{SIGNATURE_HEADER, verify_signature};

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub success: bool,
    pub conversation_id: String,
    pub message_id: String,
    pub created: bool,
}

/// POST /webhook/messages
///
/// The body is read raw so the signature can be checked over the exact bytes
/// that were signed.
pub async fn receive_message(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    if let Some(secret) = state.webhook_secret.as_deref() {
        let header = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());
        if !verify_signature(secret, header, &body) {
            tracing::warn!("webhook rejected: bad or missing signature");
            return Err(ApiError::Unauthorized("invalid webhook signature"));
        }
    }

    let event: InboundEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid webhook payload: {e}")))?;
    let outcome = state.ingestor.ingest(event).await?;

    Ok(Json(WebhookResponse {
        success: true,
        conversation_id: outcome.conversation.id,
        message_id: outcome.message.id,
        created: outcome.created,
    }))
}
