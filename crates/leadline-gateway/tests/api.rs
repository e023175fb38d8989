// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests driving the gateway with in-memory collaborators.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use leadline_core::PluginAdapter;
use leadline_gateway::{AuthConfig, GatewayState, build_router};
use leadline_inbox::{AccountService, ConversationService, Reconciler, WebhookIngestor};
use leadline_test_utils::fixtures::{at, legacy_turn};
use leadline_test_utils::{FixedClock, MemoryStore, RecordingSender, ScriptedLegacySource};
use leadline_whatsapp::{ServiceWindow, sign_payload};

const TOKEN: &str = "test-token";
const SECRET: &str = "hook-secret";

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    sender: Arc<RecordingSender>,
}

async fn app_with(legacy: ScriptedLegacySource, webhook_secret: Option<&str>) -> TestApp {
    let store = Arc::new(MemoryStore::with_users(&["u-1", "u-2"]).await);
    let sender = Arc::new(RecordingSender::new());
    let clock = Arc::new(FixedClock::new(at(12, 0)));
    let reconciler = Reconciler::new(
        store.clone(),
        Some(Arc::new(legacy)),
        clock.clone(),
        Duration::from_millis(500),
    );
    let conversations = ConversationService::new(
        store.clone(),
        store.clone(),
        reconciler,
        sender.clone(),
        clock.clone(),
        ServiceWindow::default(),
        "whatsapp",
    );
    let state = GatewayState {
        conversations: Arc::new(conversations),
        accounts: Arc::new(AccountService::new(store.clone(), store.clone(), clock.clone())),
        ingestor: Arc::new(WebhookIngestor::new(
            store.clone(),
            store.clone(),
            clock,
            "whatsapp",
        )),
        adapters: vec![sender.clone() as Arc<dyn PluginAdapter>],
        auth: AuthConfig {
            bearer_token: Some(TOKEN.to_string()),
        },
        webhook_secret: webhook_secret.map(str::to_string),
        start_time: Instant::now(),
    };
    TestApp {
        router: build_router(state, false),
        store,
        sender,
    }
}

async fn app() -> TestApp {
    app_with(ScriptedLegacySource::new(vec![]), None).await
}

fn api(method: Method, uri: &str, owner: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header("x-user-id", owner)
        .header(header::CONTENT_TYPE, "application/json");
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    builder.body(Body::from(body)).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn webhook(body: &Value, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/webhook/messages")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header("x-hub-signature-256", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn inbound_event(owner: &str) -> Value {
    json!({
        "senderIdentifier": "2517000001",
        "content": "Hola, quiero información",
        "messageType": "text",
        "externalMessageId": "wamid.in-1",
        "ownerUserId": owner,
        "senderName": "Lucía"
    })
}

#[tokio::test]
async fn api_requires_bearer_token() {
    let app = app().await;
    let request = Request::builder()
        .uri("/api/conversations")
        .header("x-user-id", "u-1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn api_requires_user_header() {
    let app = app().await;
    let request = Request::builder()
        .uri("/api/conversations")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["adapters"][0]["name"], "recording-sender");
}

#[tokio::test]
async fn webhook_creates_then_reuses_conversation() {
    let app = app().await;
    let (status, first) = send(&app.router, webhook(&inbound_event("u-1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["created"], true);

    let mut again = inbound_event("u-1");
    again["content"] = json!("¿Siguen disponibles?");
    let (_, second) = send(&app.router, webhook(&again, None)).await;
    assert_eq!(second["conversationId"], first["conversationId"]);
    assert_eq!(second["created"], false);
    assert_eq!(app.store.conversation_count().await, 1);
    assert_eq!(app.store.message_count().await, 2);

    let (_, list) = send(&app.router, api(Method::GET, "/api/conversations", "u-1", None)).await;
    assert_eq!(list[0]["lastMessageContent"], "¿Siguen disponibles?");
    assert_eq!(list[0]["title"], "Lucía");
}

#[tokio::test]
async fn create_with_webhook_external_id_is_bad_request() {
    let app = app().await;
    send(&app.router, webhook(&inbound_event("u-1"), None)).await;

    let body = json!({"title": "Ana", "externalId": "2517000001"});
    let (status, body) = send(
        &app.router,
        api(Method::POST, "/api/conversations", "u-1", Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(app.store.conversation_count().await, 1);
}

#[tokio::test]
async fn webhook_validation_and_unknown_owner() {
    let app = app().await;
    let mut missing = inbound_event("u-1");
    missing["senderIdentifier"] = json!("  ");
    let (status, body) = send(&app.router, webhook(&missing, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app.router, webhook(&inbound_event("u-ghost"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/webhook/messages")
        .body(Body::from("not json"))
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_signature_is_enforced_when_configured() {
    let app = app_with(ScriptedLegacySource::new(vec![]), Some(SECRET)).await;
    let event = inbound_event("u-1");

    let (status, _) = send(&app.router, webhook(&event, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let wrong = sign_payload("other", event.to_string().as_bytes());
    let (status, _) = send(&app.router, webhook(&event, wrong)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let good = sign_payload(SECRET, event.to_string().as_bytes());
    let (status, _) = send(&app.router, webhook(&event, good)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn conversation_lifecycle() {
    let app = app().await;
    let (status, created) = send(
        &app.router,
        api(
            Method::POST,
            "/api/conversations",
            "u-1",
            Some(json!({"title": "Ana", "participantPhone": "+5215550001", "tags": ["new"]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["channel"], "whatsapp");

    let uri = format!("/api/conversations/{id}");
    let (status, patched) = send(
        &app.router,
        api(Method::PATCH, &uri, "u-1", Some(json!({"status": "pending"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["status"], "pending");
    assert_eq!(patched["tags"], json!(["new"]));

    let (status, scored) = send(
        &app.router,
        api(Method::PUT, &format!("{uri}/score"), "u-1", Some(json!({"leadScore": 80}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scored["leadScore"], 80);

    let (status, _) = send(
        &app.router,
        api(Method::PUT, &format!("{uri}/score"), "u-1", Some(json!({"leadScore": 150}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, intent) = send(
        &app.router,
        api(
            Method::PUT,
            &format!("{uri}/intent"),
            "u-1",
            Some(json!({"intent": "buy", "category": "housing"})),
        ),
    )
    .await;
    assert_eq!(intent["intent"], "buy");

    let (status, _) = send(&app.router, api(Method::GET, &uri, "u-2", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, stats) = send(
        &app.router,
        api(Method::GET, "/api/conversations/stats", "u-1", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["pending"], 1);
    assert_eq!(stats["averageScore"], 80.0);

    let (status, deleted) = send(&app.router, api(Method::DELETE, &uri, "u-1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], true);
    let (status, _) = send(&app.router, api(Method::GET, &uri, "u-1", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/conversations")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header("x-user-id", "u-1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn legacy_sessions_are_listed_and_read_only() {
    let legacy = ScriptedLegacySource::new(vec![
        legacy_turn(1, "5215550009", "human", "hola"),
        legacy_turn(2, "5215550009", "ai", "¿en qué te ayudo?"),
    ]);
    let app = app_with(legacy, None).await;

    let (_, list) = send(&app.router, api(Method::GET, "/api/conversations", "u-1", None)).await;
    assert_eq!(list[0]["id"], "legacy_5215550009");
    assert_eq!(list[0]["ownerUserId"], "u-1");

    let (status, messages) = send(
        &app.router,
        api(Method::GET, "/api/conversations/legacy_5215550009/messages", "u-1", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages.as_array().unwrap().len(), 2);
    assert_eq!(messages[0]["sender"], "user");
    assert_eq!(messages[1]["id"], "legacy_2");

    let (status, _) = send(
        &app.router,
        api(Method::DELETE, "/api/conversations/legacy_5215550009", "u-1", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reply_through_sender_after_inbound() {
    let app = app().await;
    let (_, hook) = send(&app.router, webhook(&inbound_event("u-1"), None)).await;
    let id = hook["conversationId"].as_str().unwrap();

    let (status, sent) = send(
        &app.router,
        api(
            Method::POST,
            &format!("/api/conversations/{id}/messages"),
            "u-1",
            Some(json!({"content": "Claro, te comparto opciones"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sent["message"]["sender"], "bot");
    assert_eq!(sent["receipt"]["externalMessageId"], "wamid.test-1");
    assert_eq!(app.sender.sent_messages().await[0].recipient, "2517000001");

    let (_, messages) = send(
        &app.router,
        api(Method::GET, &format!("/api/conversations/{id}/messages"), "u-1", None),
    )
    .await;
    assert_eq!(messages.as_array().unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn stalled_sender_maps_to_gateway_timeout() {
    let app = app().await;
    let (_, hook) = send(&app.router, webhook(&inbound_event("u-1"), None)).await;
    let id = hook["conversationId"].as_str().unwrap();
    app.sender.set_delay(Duration::from_secs(60)).await;

    let (status, body) = send(
        &app.router,
        api(
            Method::POST,
            &format!("/api/conversations/{id}/messages"),
            "u-1",
            Some(json!({"content": "¿Sigues ahí?"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("timed out"));
    assert_eq!(app.store.message_count().await, 1);
}

#[tokio::test]
async fn opt_in_and_integrations() {
    let app = app().await;
    let (status, body) = send(
        &app.router,
        api(Method::POST, "/api/whatsapp/opt-in", "u-1", Some(json!({"phone": "+5215550001"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "phone": "+5215550001", "optedIn": true}));

    let (status, _) = send(
        &app.router,
        api(Method::PUT, "/api/integrations/whatsapp", "u-1", Some(json!({"config": {"phoneNumberId": "1098"}}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = send(&app.router, api(Method::GET, "/api/integrations", "u-1", None)).await;
    assert_eq!(list[0]["provider"], "whatsapp");
    assert_eq!(list[0]["config"]["phoneNumberId"], "1098");
    assert_eq!(list[0]["enabled"], true);

    let (_, other) = send(&app.router, api(Method::GET, "/api/integrations", "u-2", None)).await;
    assert_eq!(other, json!([]));
}
