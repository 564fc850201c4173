use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{CorsConfig, ServerState};

async fn app_with_cors(cors: CorsConfig) -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::router(ServerState::new(engine, cors))
}

async fn app() -> Router {
    app_with_cors(CorsConfig::default()).await
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
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
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_user(app: &Router, name: &str) -> i64 {
    let email = format!("{}@example.com", name.to_lowercase());
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/users",
        Some(json!({"name": name, "email": email})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

fn error_of(body: &Value) -> &str {
    assert_eq!(body["status"], "error");
    body["error"].as_str().unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn user_crud() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(json!({"name": "Alice", "email": "alice@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["data"]["name"], "Alice");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(body.get("message").is_none());

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/users/{id}"),
        Some(json!({"name": "Alicia"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alicia");
    assert_eq!(body["data"]["email"], "alice@example.com");

    let (status, body) = send(&app, Method::GET, "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "success", "message": "User deleted successfully"})
    );

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_of(&body), "user not found");
}

#[tokio::test]
async fn user_validation_and_conflict() {
    let app = app().await;
    create_user(&app, "Alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(json!({"name": "Other", "email": "alice@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_of(&body), "user with this email already exists");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(json!({"name": "Bob", "email": "bob-at-example"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "invalid email format");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(json!({"name": "B", "email": "b@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "name must be at least 2 characters long");
}

#[tokio::test]
async fn malformed_requests_are_400() {
    let app = app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/v1/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_of(&body).starts_with("invalid path"));

    let (status, body) = send(&app, Method::GET, "/api/v1/debts?group_id=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error_of(&body).starts_with("invalid query"));

    let (status, body) = send(&app, Method::GET, "/api/v1/debts?status=paid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "invalid debt status: paid");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = app().await;
    let name = "x".repeat(2 * 1024 * 1024);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(json!({"name": name, "email": "big@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (_, body) = send(&app, Method::GET, "/api/v1/users", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn group_membership_and_debts_flow() {
    let app = app().await;
    let alice = create_user(&app, "Alice").await;
    let bob = create_user(&app, "Bob").await;
    let carol = create_user(&app, "Carol").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/groups",
        Some(json!({"name": "Trip", "description": "Lisbon", "created_by": alice})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["members"][0]["id"], alice);
    let group = body["data"]["id"].as_i64().unwrap();

    let members_uri = format!("/api/v1/groups/{group}/members");
    let (status, body) = send(&app, Method::POST, &members_uri, Some(json!({"user_id": bob}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, Method::POST, &members_uri, Some(json!({"user_id": bob}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_of(&body), "user is already a member of this group");

    // Carol is not a member yet.
    let debt_body = json!({
        "group_id": group,
        "from_user_id": carol,
        "to_user_id": alice,
        "amount": 1200
    });
    let (status, body) = send(&app, Method::POST, "/api/v1/debts", Some(debt_body.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "from user is not a member of the group");

    send(&app, Method::POST, &members_uri, Some(json!({"user_id": carol}))).await;
    let (status, body) = send(&app, Method::POST, "/api/v1/debts", Some(debt_body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["amount"], 1200);
    let carol_debt = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/debts",
        Some(json!({
            "group_id": group,
            "from_user_id": bob,
            "to_user_id": alice,
            "amount": 800,
            "description": "dinner"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let bob_debt = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/debts/{bob_debt}"),
        Some(json!({"status": "settled"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "settled");
    assert!(body["data"]["settled_at"].is_string());

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/debts/{bob_debt}"),
        Some(json!({"status": "paid"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "invalid debt status: paid");

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/debts?group_id={group}&status=active"),
        None,
    )
    .await;
    let active = body["data"].as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], carol_debt);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/users/{alice}/balance?group_id={group}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "user_id": alice,
            "user_name": "Alice",
            "total_owed": 0,
            "total_owed_to": 1200,
            "net_balance": 1200
        })
    );

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/groups/{group}/summary"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_debts"], 1200);
    assert_eq!(body["data"]["active_debts"], 1);
    assert_eq!(body["data"]["settled_debts"], 1);
    assert_eq!(body["data"]["member_count"], 3);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/groups/{group}/members/{alice}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "cannot remove group owner");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/groups/{group}/members/{bob}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/v1/groups", None).await;
    let groups = body["data"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert!(groups[0].get("members").is_none());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/groups/{group}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::GET, &format!("/api/v1/debts/{carol_debt}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_of(&body), "debt not found");
}

#[tokio::test]
async fn equal_split_transactions() {
    let app = app().await;
    let alice = create_user(&app, "Alice").await;
    let bob = create_user(&app, "Bob").await;
    let carol = create_user(&app, "Carol").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/transactions",
        Some(json!({
            "creator_id": alice,
            "amount": 100,
            "participants": [alice, bob, carol],
            "description": "pizza"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Transaction created successfully");
    let tx = &body["data"];
    assert_eq!(tx["amount"], 100);
    assert_eq!(
        tx["participants"],
        json!([
            {"user_id": alice, "amount": 33},
            {"user_id": bob, "amount": 33},
            {"user_id": carol, "amount": 33}
        ])
    );
    let id = tx["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/transactions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "pizza");
    assert_eq!(body["data"]["participants"].as_array().unwrap().len(), 3);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/users/{bob}/transactions"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], id);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/transactions",
        Some(json!({"creator_id": alice, "amount": 0, "participants": [bob]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "amount must be positive");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/transactions",
        Some(json!({"creator_id": alice, "amount": 100, "participants": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "participants required");

    let (status, body) = send(&app, Method::GET, "/api/v1/transactions/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_of(&body), "transaction not found");
}

#[tokio::test]
async fn preflight_is_answered_with_cors_headers() {
    let app = app().await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/users")
        .header(header::ORIGIN, "https://app.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");

    let request = Request::builder()
        .uri("/api/v1/users")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn restricted_cors_omits_unknown_origins() {
    let app = app_with_cors(CorsConfig::with_origins(vec![
        "https://app.example.com".to_string(),
    ]))
    .await;

    let preflight = |origin: &'static str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/groups")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(preflight("https://app.example.com"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );

    let response = app
        .clone()
        .oneshot(preflight("https://evil.test"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}
