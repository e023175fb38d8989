// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the dashboard REST API.
//!
//! Thin request/response mapping; all behavior lives in the inbox services.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use leadline_core::types::{
    ConversationPatch, Integration, Metadata, NewConversation, SendReceipt,
};
use leadline_core::{Conversation, HealthStatus, Message};
use leadline_inbox::ConversationStats;
use leadline_whatsapp::OptStatus;

use crate::auth::OwnerId;
use crate::error::{ApiError, ApiJson};
use crate::server::GatewayState;

type ApiResult<T> = Result<T, ApiError>;

/// Body of `PUT /api/conversations/{id}/score`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub lead_score: i64,
}

/// Body of `PUT /api/conversations/{id}/intent`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Body of `POST /api/conversations/{id}/messages`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub template_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message: Message,
    pub receipt: SendReceipt,
}

#[derive(Debug, Deserialize)]
pub struct PhoneRequest {
    pub phone: String,
}

/// Body of `PUT /api/integrations/{provider}`.
#[derive(Debug, Deserialize)]
pub struct IntegrationRequest {
    #[serde(default)]
    pub config: Metadata,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub adapters: Vec<AdapterHealth>,
}

#[derive(Debug, Serialize)]
pub struct AdapterHealth {
    pub name: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// GET /health
///
/// 200 while every adapter is at least degraded, 503 once one is unhealthy.
pub async fn health(State(state): State<GatewayState>) -> Response {
    let mut adapters = Vec::with_capacity(state.adapters.len());
    for adapter in &state.adapters {
        let (status, detail) = match adapter.health_check().await {
            Ok(HealthStatus::Healthy) => ("healthy", None),
            Ok(HealthStatus::Degraded(why)) => ("degraded", Some(why)),
            Ok(HealthStatus::Unhealthy(why)) => ("unhealthy", Some(why)),
            Err(e) => ("unhealthy", Some(e.to_string())),
        };
        adapters.push(AdapterHealth {
            name: adapter.name().to_string(),
            status,
            detail,
        });
    }

    let status = if adapters.iter().any(|a| a.status == "unhealthy") {
        "unhealthy"
    } else if adapters.iter().any(|a| a.status == "degraded") {
        "degraded"
    } else {
        "ok"
    };
    let code = if status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
        adapters,
    };
    (code, Json(body)).into_response()
}

/// GET /api/conversations
pub async fn list_conversations(
    State(state): State<GatewayState>,
    OwnerId(owner): OwnerId,
) -> ApiResult<Json<Vec<Conversation>>> {
    Ok(Json(state.conversations.list(&owner).await?))
}

/// POST /api/conversations
pub async fn create_conversation(
    State(state): State<GatewayState>,
    OwnerId(owner): OwnerId,
    ApiJson(body): ApiJson<NewConversation>,
) -> ApiResult<(StatusCode, Json<Conversation>)> {
    let created = state.conversations.create(&owner, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/conversations/stats
pub async fn conversation_stats(
    State(state): State<GatewayState>,
    OwnerId(owner): OwnerId,
) -> ApiResult<Json<ConversationStats>> {
    Ok(Json(state.conversations.stats(&owner).await?))
}

/// GET /api/conversations/{id}
pub async fn get_conversation(
    State(state): State<GatewayState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Json<Conversation>> {
    Ok(Json(state.conversations.get(&owner, &id).await?))
}

/// PATCH /api/conversations/{id}
pub async fn update_conversation(
    State(state): State<GatewayState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ConversationPatch>,
) -> ApiResult<Json<Conversation>> {
    Ok(Json(state.conversations.update(&owner, &id, patch).await?))
}

/// DELETE /api/conversations/{id}
pub async fn delete_conversation(
    State(state): State<GatewayState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    state.conversations.delete(&owner, &id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// PUT /api/conversations/{id}/score
pub async fn set_score(
    State(state): State<GatewayState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ScoreRequest>,
) -> ApiResult<Json<Conversation>> {
    let updated = state
        .conversations
        .set_score(&owner, &id, body.lead_score)
        .await?;
    Ok(Json(updated))
}

/// PUT /api/conversations/{id}/intent
pub async fn set_intent(
    State(state): State<GatewayState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<IntentRequest>,
) -> ApiResult<Json<Conversation>> {
    let updated = state
        .conversations
        .set_intent(&owner, &id, body.intent, body.category)
        .await?;
    Ok(Json(updated))
}

/// GET /api/conversations/{id}/messages
pub async fn list_messages(
    State(state): State<GatewayState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Message>>> {
    Ok(Json(state.conversations.messages(&owner, &id).await?))
}

/// POST /api/conversations/{id}/messages
pub async fn send_message(
    State(state): State<GatewayState>,
    OwnerId(owner): OwnerId,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<SendRequest>,
) -> ApiResult<(StatusCode, Json<SendResponse>)> {
    let sent = state
        .conversations
        .send_message(&owner, &id, &body.content, body.template_id.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SendResponse {
            success: true,
            message: sent.message,
            receipt: sent.receipt,
        }),
    ))
}

/// POST /api/whatsapp/opt-in
pub async fn opt_in(ApiJson(body): ApiJson<PhoneRequest>) -> ApiResult<Json<OptStatus>> {
    Ok(Json(leadline_whatsapp::opt_in(&body.phone)?))
}

/// POST /api/whatsapp/opt-out
pub async fn opt_out(ApiJson(body): ApiJson<PhoneRequest>) -> ApiResult<Json<OptStatus>> {
    Ok(Json(leadline_whatsapp::opt_out(&body.phone)?))
}

/// GET /api/integrations
pub async fn list_integrations(
    State(state): State<GatewayState>,
    OwnerId(owner): OwnerId,
) -> ApiResult<Json<Vec<Integration>>> {
    Ok(Json(state.accounts.integrations(&owner).await?))
}

/// PUT /api/integrations/{provider}
pub async fn upsert_integration(
    State(state): State<GatewayState>,
    OwnerId(owner): OwnerId,
    Path(provider): Path<String>,
    ApiJson(body): ApiJson<IntegrationRequest>,
) -> ApiResult<Json<Integration>> {
    let stored = state
        .accounts
        .upsert_integration(&owner, &provider, body.config, body.enabled)
        .await?;
    Ok(Json(stored))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_request_uses_camel_case() {
        let req: ScoreRequest = serde_json::from_str(r#"{"leadScore": 72}"#).unwrap();
        assert_eq!(req.lead_score, 72);
        assert!(serde_json::from_str::<ScoreRequest>(r#"{"lead_score": 72}"#).is_err());
    }

    #[test]
    fn intent_request_fields_are_optional() {
        let req: IntentRequest = serde_json::from_str(r#"{"category": "sales"}"#).unwrap();
        assert!(req.intent.is_none());
        assert_eq!(req.category.as_deref(), Some("sales"));
    }

    #[test]
    fn integration_request_defaults_to_enabled() {
        let req: IntegrationRequest = serde_json::from_str("{}").unwrap();
        assert!(req.enabled);
        assert!(req.config.is_empty());
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok",
            version: "0.1.0",
            uptime_secs: 42,
            adapters: vec![AdapterHealth {
                name: "sqlite".into(),
                status: "healthy",
                detail: None,
            }],
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptimeSecs\":42"));
        assert!(!json.contains("detail"));
    }
}
