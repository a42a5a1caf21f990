//! End-to-end API flow against an in-memory database

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use venue_server::db::models::{RoleRef, User};
use venue_server::{Config, ServerState};

async fn setup() -> (Router, ServerState) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    let state = ServerState::initialize_in_memory(&config)
        .await
        .expect("state");
    (venue_server::api::create_router(state.clone()), state)
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn seed_staff(state: &ServerState) -> String {
    state
        .users()
        .create(User {
            id: None,
            name: "Maria Lopez".to_string(),
            username: "maria".to_string(),
            email: "maria@example.com".to_string(),
            password_hash: User::hash_password("staffpass1").expect("hash"),
            role: RoleRef::staff(),
            phone: None,
            address: None,
            created_at: chrono::Utc::now(),
        })
        .await
        .expect("staff user");

    // token via the login endpoint, exercising it on the way
    "staffpass1".to_string()
}

async fn login(router: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn health_is_public() {
    let (router, _state) = setup().await;
    let (status, body) = send(&router, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let (router, _state) = setup().await;
    let (status, body) = send(&router, "GET", "/api/songs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");
}

#[tokio::test]
async fn registration_always_lands_on_customer() {
    let (router, _state) = setup().await;
    let (status, body) = send(
        &router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Carlos",
            "username": "carlos",
            "email": "carlos@example.com",
            "password": "secret123",
            "role": {"role_id": 1, "role_name": "admin"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["role"]["role_id"], 3);
    assert!(body["data"]["token"].as_str().is_some());
}

#[tokio::test]
async fn me_reflects_the_authenticated_identity() {
    let (router, state) = setup().await;
    let password = seed_staff(&state).await;
    let token = login(&router, "maria", &password).await;

    let (status, body) = send(&router, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "maria");
    assert_eq!(body["data"]["role"]["role_id"], 2);
}

#[tokio::test]
async fn wrong_password_is_rejected_uniformly() {
    let (router, state) = setup().await;
    seed_staff(&state).await;

    let (status, body) = send(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "maria", "password": "nope-nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid username or password");

    // unknown user gets the identical message
    let (_, body2) = send(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "ghost", "password": "nope-nope"})),
    )
    .await;
    assert_eq!(body2["message"], "Invalid username or password");
}

#[tokio::test]
async fn customers_cannot_reach_staff_routes() {
    let (router, _state) = setup().await;
    let (_, registered) = send(
        &router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Carlos",
            "username": "carlos",
            "email": "carlos@example.com",
            "password": "secret123"
        })),
    )
    .await;
    let token = registered["data"]["token"].as_str().expect("token");

    let (status, body) = send(
        &router,
        "POST",
        "/api/tables",
        Some(token),
        Some(json!({"table_number": 1, "capacity": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");
}

#[tokio::test]
async fn table_billing_flow_end_to_end() {
    let (router, state) = setup().await;
    let password = seed_staff(&state).await;
    let token = login(&router, "maria", &password).await;

    // table and product
    let (status, table) = send(
        &router,
        "POST",
        "/api/tables",
        Some(&token),
        Some(json!({"table_number": 7, "capacity": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let table_id = table["data"]["id"].as_str().expect("table id").to_string();
    let credential = table["data"]["credential"]
        .as_str()
        .expect("credential")
        .to_string();

    let (status, product) = send(
        &router,
        "POST",
        "/api/products",
        Some(&token),
        Some(json!({"name": "Agua", "category": "bebidas", "price": "1.50", "stock": 24})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let product_id = product["data"]["id"].as_str().expect("product id").to_string();

    // two order lines move the running bill
    for quantity in [2u32, 1] {
        let (status, _) = send(
            &router,
            "POST",
            &format!("/api/tables/{}/order-lines", table_id),
            Some(&token),
            Some(json!({"product": product_id, "quantity": quantity})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // the guest credential path sees the bill without a token
    let (status, seen) = send(
        &router,
        "GET",
        &format!("/api/tables/by-credential/{}", credential),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seen["data"]["accumulated_total"]["total"], "4.50");
    assert_eq!(seen["data"]["state"]["state_name"], "occupied");

    // close the account and find the closing record
    let (status, closed) = send(
        &router,
        "POST",
        &format!("/api/tables/{}/close", table_id),
        Some(&token),
        Some(json!({"method": "cash"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["data"]["closing"]["total_amount"], "4.50");

    let (status, closings) = send(&router, "GET", "/api/closings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let records = closings["data"].as_array().expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["grand_total"], "4.50");
    assert_eq!(records[0]["user"]["user_name"], "maria");

    // reset returns the table to service
    let (status, reset) = send(
        &router,
        "POST",
        &format!("/api/tables/{}/reset", table_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["data"]["accumulated_total"]["total"], "0");
    assert_eq!(reset["data"]["state"]["state_name"], "available");
}

#[tokio::test]
async fn song_search_and_filter_pagination() {
    let (router, state) = setup().await;
    let password = seed_staff(&state).await;
    let token = login(&router, "maria", &password).await;

    for (code, title, genre, language, popularity) in [
        (1, "Bohemian Rhapsody", "rock", "en", 95),
        (2, "Bésame Mucho", "bolero", "es", 80),
        (3, "La Vida Loca", "pop", "es", 70),
    ] {
        let (status, _) = send(
            &router,
            "POST",
            "/api/songs",
            Some(&token),
            Some(json!({
                "title": title,
                "artist": "Various",
                "code": code,
                "genres": [genre],
                "language": language,
                "popularity": popularity
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // one-edit typo still hits
    let (status, found) = send(
        &router,
        "GET",
        "/api/songs/search?q=bohemain",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["data"]["total"], 1);
    assert_eq!(found["data"]["items"][0]["code"], 1);

    // faceted filter with the pagination envelope
    let (status, filtered) = send(
        &router,
        "GET",
        "/api/songs/filter?languages=es&page=1&limit=1",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered["data"]["total"], 2);
    assert_eq!(filtered["data"]["pages"], 2);
    // popularity descending puts Bésame Mucho first
    assert_eq!(filtered["data"]["items"][0]["code"], 2);
}
