//! HTTP integration tests.
//!
//! Starts the full router over the in-memory store and exercises it with reqwest.

use book_service::{app, AppState, MemoryBookStore};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

async fn start_server() -> String {
    start_server_with_limit(1024 * 1024).await
}

/// Bind to port 0 and return the base URL.
async fn start_server_with_limit(body_limit_bytes: usize) -> String {
    let state = AppState::new(Arc::new(MemoryBookStore::new()));
    let router = app(state, body_limit_bytes);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn create_book(client: &Client, base: &str, body: Value) -> Value {
    let resp = client
        .post(format!("{base}/api/books"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json::<Value>().await.unwrap()["data"].clone()
}

fn book(title: &str, genre: &str) -> Value {
    json!({
        "title": title,
        "author": "Ursula K. Le Guin",
        "description": format!("{title}, a novel"),
        "genre": genre
    })
}

fn assert_failure(body: &Value, error: &str, message: &str) {
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], error);
    assert_eq!(body["message"], message);
    assert!(body["timestamp"].is_string());
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn full_lifecycle() {
    let base = start_server().await;
    let client = Client::new();

    let resp = client
        .post(format!("{base}/api/books"))
        .json(&json!({ "title": "A", "author": "B", "description": "C", "genre": "D" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Book created successfully");
    let created = body["data"].clone();
    assert_eq!(created["status"], "available");
    let id = created["id"].as_i64().unwrap();

    let resp = client.get(format!("{base}/api/books/{id}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], created);

    tokio::time::sleep(Duration::from_millis(5)).await;
    let resp = client
        .put(format!("{base}/api/books/{id}"))
        .json(&json!({ "status": "borrowed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = resp.json::<Value>().await.unwrap()["data"].clone();
    assert_eq!(updated["status"], "borrowed");
    assert_eq!(updated["title"], "A");
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_ne!(updated["updatedAt"], created["updatedAt"]);

    let resp = client.delete(format!("{base}/api/books/{id}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Book deleted successfully");
    assert!(body.get("data").is_none());

    let resp = client.get(format!("{base}/api/books/{id}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_failure(&resp.json().await.unwrap(), "Not Found", "Book not found");
}

#[tokio::test]
async fn create_echoes_explicit_status() {
    let base = start_server().await;
    let client = Client::new();
    let mut payload = book("The Dispossessed", "Science Fiction");
    payload["status"] = json!("reserved");
    let created = create_book(&client, &base, payload).await;
    assert_eq!(created["status"], "reserved");
    assert_eq!(created["title"], "The Dispossessed");
}

#[tokio::test]
async fn create_reports_first_violation() {
    let base = start_server().await;
    let client = Client::new();
    let resp = client
        .post(format!("{base}/api/books"))
        .json(&json!({ "author": "x", "description": "y", "genre": "z", "status": "lost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_failure(&resp.json().await.unwrap(), "Validation Error", "Title is required");
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let base = start_server().await;
    let client = Client::new();
    let resp = client
        .post(format!("{base}/api/books"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_failure(
        &resp.json().await.unwrap(),
        "Validation Error",
        "Request body must be valid JSON",
    );
}

#[tokio::test]
async fn update_rules() {
    let base = start_server().await;
    let client = Client::new();
    let created = create_book(&client, &base, book("Lathe of Heaven", "Fantasy")).await;
    let id = created["id"].as_i64().unwrap();

    let resp = client
        .put(format!("{base}/api/books/{id}"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_failure(
        &resp.json().await.unwrap(),
        "Validation Error",
        "At least one field must be provided for update",
    );

    let resp = client
        .put(format!("{base}/api/books/{id}"))
        .json(&json!({ "genre": "  Science Fiction  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = resp.json::<Value>().await.unwrap()["data"].clone();
    assert_eq!(updated["genre"], "Science Fiction");
    for field in ["title", "author", "description", "status", "createdAt", "id"] {
        assert_eq!(updated[field], created[field], "{field} changed");
    }

    let resp = client
        .put(format!("{base}/api/books/9999"))
        .json(&json!({ "title": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .put(format!("{base}/api/books/abc"))
        .json(&json!({ "title": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_failure(&resp.json().await.unwrap(), "Invalid ID", "Book ID must be a valid number");
}

#[tokio::test]
async fn non_numeric_id_is_rejected() {
    let base = start_server().await;
    let client = Client::new();
    for method in [reqwest::Method::GET, reqwest::Method::DELETE] {
        let resp = client
            .request(method, format!("{base}/api/books/abc"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_failure(&resp.json().await.unwrap(), "Invalid ID", "Book ID must be a valid number");
    }
}

#[tokio::test]
async fn delete_missing_is_not_found_every_time() {
    let base = start_server().await;
    let client = Client::new();
    for _ in 0..2 {
        let resp = client.delete(format!("{base}/api/books/404")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_failure(&resp.json().await.unwrap(), "Not Found", "Book not found");
    }
}

#[tokio::test]
async fn list_paginates_over_filtered_total() {
    let base = start_server().await;
    let client = Client::new();
    for i in 0..25 {
        create_book(&client, &base, book(&format!("Earthsea {i}"), "Fantasy")).await;
    }
    create_book(&client, &base, book("Always Coming Home", "Literary")).await;

    let resp = client
        .get(format!("{base}/api/books?genre=Fantasy&limit=10&page_num=3"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Books retrieved successfully");
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(
        body["pagination"],
        json!({ "total": 25, "limit": 10, "page_num": 3, "hasNext": false, "hasPrev": true })
    );

    let body: Value = client
        .get(format!("{base}/api/books"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 10);
    assert_eq!(data[0]["title"], "Always Coming Home");
    assert_eq!(
        body["pagination"],
        json!({ "total": 26, "limit": 10, "page_num": 1, "hasNext": true, "hasPrev": false })
    );
}

#[tokio::test]
async fn list_filters_by_status_and_search() {
    let base = start_server().await;
    let client = Client::new();
    let mut borrowed = book("The Word for World Is Forest", "Science Fiction");
    borrowed["status"] = json!("borrowed");
    create_book(&client, &base, borrowed).await;
    create_book(&client, &base, book("Tehanu", "Fantasy")).await;

    let body: Value = client
        .get(format!("{base}/api/books?status=borrowed"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["status"], "borrowed");

    let body: Value = client
        .get(format!("{base}/api/books?search=Tehanu"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["title"], "Tehanu");
}

#[tokio::test]
async fn list_with_no_matches() {
    let base = start_server().await;
    let client = Client::new();
    create_book(&client, &base, book("Tehanu", "Fantasy")).await;

    let resp = client
        .get(format!("{base}/api/books?search=nonexistent-term"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["total"], 0);
    assert_eq!(body["pagination"]["hasNext"], false);
    assert_eq!(body["pagination"]["hasPrev"], false);
}

#[tokio::test]
async fn list_rejects_invalid_filters() {
    let base = start_server().await;
    let client = Client::new();
    let cases = [
        ("limit=0", "Limit must be at least 1"),
        ("limit=500", "Limit cannot exceed 100"),
        ("page_num=abc", "Page number must be a number"),
        ("status=lost", "Status filter must be one of: available, borrowed, reserved"),
    ];
    for (query, message) in cases {
        let resp = client
            .get(format!("{base}/api/books?{query}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{query}");
        assert_failure(&resp.json().await.unwrap(), "Validation Error", message);
    }
}

#[tokio::test]
async fn unknown_route_uses_envelope() {
    let base = start_server().await;
    let resp = reqwest::get(format!("{base}/api/authors")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_failure(&resp.json().await.unwrap(), "Not Found", "Route /api/authors not found");
}

#[tokio::test]
async fn unsupported_method_uses_envelope() {
    let base = start_server().await;
    let client = Client::new();
    let created = create_book(&client, &base, book("Rocannon's World", "Science Fiction")).await;
    let id = created["id"].as_i64().unwrap();

    let resp = client
        .patch(format!("{base}/api/books/{id}"))
        .json(&json!({ "title": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_failure(
        &resp.json().await.unwrap(),
        "Not Found",
        &format!("Route /api/books/{id} not found"),
    );

    let resp = client.delete(format!("{base}/api/books")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_failure(&resp.json().await.unwrap(), "Not Found", "Route /api/books not found");

    let resp = client.get(format!("{base}/api/books/{id}")).send().await.unwrap();
    assert_eq!(resp.json::<Value>().await.unwrap()["data"]["title"], "Rocannon's World");
}

#[tokio::test]
async fn oversized_body_is_rejected_with_envelope() {
    let base = start_server_with_limit(64).await;
    let client = Client::new();
    let mut payload = book("Planet of Exile", "Science Fiction");
    payload["description"] = json!("x".repeat(200));
    let resp = client
        .post(format!("{base}/api/books"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_failure(&resp.json().await.unwrap(), "Payload Too Large", "Request body is too large");

    let resp = client
        .put(format!("{base}/api/books/1"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body: Value = client
        .get(format!("{base}/api/books"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let base = start_server().await;
    for path in ["/health", "/api/books", "/api/nowhere"] {
        let resp = reqwest::get(format!("{base}{path}")).await.unwrap();
        let headers = resp.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff", "{path}");
        assert_eq!(headers["x-frame-options"], "SAMEORIGIN", "{path}");
        assert_eq!(headers["referrer-policy"], "no-referrer", "{path}");
    }
}

#[tokio::test]
async fn health_and_readiness() {
    let base = start_server().await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap()["status"], "ok");

    let resp = reqwest::get(format!("{base}/ready")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["storage"], "ok");

    let body: Value = reqwest::get(format!("{base}/version")).await.unwrap().json().await.unwrap();
    assert_eq!(body["name"], "book-service");
}
