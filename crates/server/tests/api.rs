use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use server::{AuthSettings, ServerState};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let settings = AuthSettings {
        jwt_secret: "test-secret".to_string(),
        token_ttl_hours: 1,
        bcrypt_cost: 4,
    };
    server::router(ServerState::new(Arc::new(engine), &settings))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"email": email, "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_account(app: &Router, token: &str, initial_balance: i64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/accounts",
        Some(token),
        Some(json!({"name": "Checking", "initial_balance": initial_balance})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["account"]["id"].as_str().unwrap().to_string()
}

async fn account_balance(app: &Router, token: &str, account_id: &str) -> i64 {
    let (status, body) = send(
        app,
        "GET",
        &format!("/api/v1/accounts/{account_id}"),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["account"]["balance"].as_i64().unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn register_login_and_duplicate() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"email": "alice@example.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["token"].is_string());
    assert!(body["expires_at"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"email": "alice@example.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["error"]["message"], "email already registered");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "invalid credentials");
}

#[tokio::test]
async fn register_validates_input() {
    let app = app().await;
    for payload in [
        json!({"email": "not-an-email", "password": "secret1"}),
        json!({"email": "bob@example.com", "password": "123"}),
        json!({"email": "bob@example.com"}),
    ] {
        let (status, body) = send(&app, "POST", "/api/v1/auth/register", None, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
    }
}

#[tokio::test]
async fn protected_routes_require_bearer() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/v1/accounts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "missing bearer token");

    let (status, body) = send(&app, "GET", "/api/v1/accounts", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "invalid token");
}

#[tokio::test]
async fn logout_revokes_token() {
    let app = app().await;
    let token = register(&app, "alice@example.com").await;

    let (status, body) = send(&app, "POST", "/api/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = send(&app, "GET", "/api/v1/accounts", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "token revoked");
}

#[tokio::test]
async fn balance_follows_transaction_lifecycle() {
    let app = app().await;
    let token = register(&app, "alice@example.com").await;
    let account_id = create_account(&app, &token, 1000).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(&token),
        Some(json!({
            "account_id": account_id,
            "amount": 300,
            "type": "expense",
            "occurred_at": "2026-03-01T10:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let tx_id = body["transaction"]["id"].as_str().unwrap().to_string();
    assert_eq!(account_balance(&app, &token, &account_id).await, 700);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/transactions/{tx_id}"),
        Some(&token),
        Some(json!({"amount": 500})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["amount"], 500);
    assert_eq!(account_balance(&app, &token, &account_id).await, 500);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/transactions/{tx_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account_balance(&app, &token, &account_id).await, 1000);
}

#[tokio::test]
async fn oversized_amount_is_a_bad_request() {
    let app = app().await;
    let token = register(&app, "alice@example.com").await;
    let account_id = create_account(&app, &token, 10).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(&token),
        Some(json!({
            "account_id": account_id,
            "amount": i64::MAX,
            "type": "income",
            "occurred_at": "2026-03-01T10:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, _) = send(&app, "GET", "/api/v1/accounts", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account_balance(&app, &token, &account_id).await, 10);
}

#[tokio::test]
async fn imported_transaction_delete_conflicts() {
    let app = app().await;
    let token = register(&app, "alice@example.com").await;
    let account_id = create_account(&app, &token, 0).await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(&token),
        Some(json!({
            "account_id": account_id,
            "amount": 40,
            "type": "income",
            "occurred_at": "2026-03-01T10:00:00Z",
            "is_imported": true,
        })),
    )
    .await;
    let tx_id = body["transaction"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/transactions/{tx_id}"),
        Some(&token),
        Some(json!({"amount": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/v1/transactions/{tx_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "imported transactions cannot be deleted");
    assert_eq!(account_balance(&app, &token, &account_id).await, 40);
}

#[tokio::test]
async fn category_delete_moves_transactions_to_other() {
    let app = app().await;
    let token = register(&app, "alice@example.com").await;
    let account_id = create_account(&app, &token, 0).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/categories",
        Some(&token),
        Some(json!({"name": "Food", "type": "expense"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let food_id = body["category"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        Some(&token),
        Some(json!({
            "account_id": account_id,
            "category_id": food_id,
            "amount": 12,
            "type": "expense",
            "occurred_at": "2026-03-02T09:30:00+01:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tx_id = body["transaction"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/categories/{food_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/api/v1/categories", Some(&token), None).await;
    let categories = body["categories"].as_array().unwrap();
    let other_id = categories
        .iter()
        .find(|c| c["is_system"] == true && c["type"] == "expense")
        .map(|c| c["id"].as_str().unwrap().to_string())
        .unwrap();
    assert!(!categories.iter().any(|c| c["id"] == food_id.as_str()));

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/v1/transactions/{tx_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["transaction"]["category_id"], other_id.as_str());

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/v1/categories/{other_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn list_rejects_malformed_query() {
    let app = app().await;
    let token = register(&app, "alice@example.com").await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/transactions?is_hidden=maybe",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "invalid is_hidden");

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/transactions?type=income&is_hidden=false",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactions"], json!([]));
}

#[tokio::test]
async fn malformed_ids_and_foreign_rows() {
    let app = app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;
    let account_id = create_account(&app, &alice, 0).await;

    let (status, body) = send(&app, "GET", "/api/v1/accounts/not-a-uuid", Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "invalid id");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/accounts/{account_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "account not found");
}
