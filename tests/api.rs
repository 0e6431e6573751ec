//! Integration tests for the todo REST API, driving the full router.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use webtodos::server::{AppState, router};
use webtodos::todo::TodoStore;

/// Router over a fresh in-memory store seeded with one todo
/// ("Buy milk", deadline 2099-01-01). Returns its id too.
fn test_app() -> (Router, u64) {
    let mut store = TodoStore::new();
    let todo = store
        .add("Buy milk".to_string(), Some("2099-01-01".to_string()))
        .unwrap();
    (router(AppState::in_memory(store)), todo.id)
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    let request = match body {
        Some(v) => builder.body(Body::from(v.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn send_raw(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ---------------------------------------------------------------------------
// POST /todos
// ---------------------------------------------------------------------------

#[tokio::test]
async fn post_creates_todo() {
    let (app, _) = test_app();
    let (status, body) = send(
        app.clone(),
        "POST",
        "/todos",
        Some(json!({ "text": "Water plants", "deadline": "2099-03-01" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["text"], "Water plants");
    assert_eq!(body["done"], false);
    assert_eq!(body["deadline"], "2099-03-01");
    assert!(body["id"].is_u64());

    let (status, list) = send(app, "GET", "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn post_without_deadline_omits_the_field() {
    let (app, _) = test_app();
    let (status, body) = send(app, "POST", "/todos", Some(json!({ "text": "Call mom" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("deadline").is_none());
}

#[tokio::test]
async fn post_rejects_empty_text_and_malformed_body() {
    let (app, _) = test_app();
    let (status, body) = send(app.clone(), "POST", "/todos", Some(json!({ "text": "  " }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create todo");

    let (status, body) = send_raw(app, "POST", "/todos", "{not json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create todo");
}

// ---------------------------------------------------------------------------
// PATCH /todos/{id}
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_done_leaves_other_fields_alone() {
    let (app, id) = test_app();
    let (status, body) = send(
        app,
        "PATCH",
        &format!("/todos/{id}"),
        Some(json!({ "done": true })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["done"], true);
    assert_eq!(body["text"], "Buy milk");
    assert_eq!(body["deadline"], "2099-01-01");
}

#[tokio::test]
async fn patch_text_and_deadline() {
    let (app, id) = test_app();
    let (status, body) = send(
        app,
        "PATCH",
        &format!("/todos/{id}"),
        Some(json!({ "text": "Buy milk and bread", "deadline": "2099-06-01" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Buy milk and bread");
    assert_eq!(body["deadline"], "2099-06-01");
    assert_eq!(body["done"], false);
}

#[tokio::test]
async fn patch_empty_deadline_clears_it() {
    let (app, id) = test_app();
    let (status, body) = send(
        app,
        "PATCH",
        &format!("/todos/{id}"),
        Some(json!({ "deadline": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("deadline").is_none());
    assert_eq!(body["text"], "Buy milk");
}

#[tokio::test]
async fn patch_unknown_id_is_404_and_mutates_nothing() {
    let (app, id) = test_app();
    let (status, body) = send(
        app.clone(),
        "PATCH",
        "/todos/9999",
        Some(json!({ "done": true })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Todo not found" }));

    let (_, list) = send(app, "GET", "/todos", None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["done"], false);
}

#[tokio::test]
async fn patch_non_numeric_id_is_404() {
    // parseInt("abc") is NaN in the original app, which misses every record
    let (app, _) = test_app();
    let (status, body) = send(app, "PATCH", "/todos/abc", Some(json!({ "done": true }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Todo not found");
}

#[tokio::test]
async fn patch_malformed_body_is_generic_500() {
    let (app, id) = test_app();
    let (status, body) = send_raw(app, "PATCH", &format!("/todos/{id}"), "{{{{").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to update todo" }));
}

#[tokio::test]
async fn patch_empty_text_is_generic_500() {
    let (app, id) = test_app();
    let (status, body) = send(
        app.clone(),
        "PATCH",
        &format!("/todos/{id}"),
        Some(json!({ "text": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to update todo");

    let (_, list) = send(app, "GET", "/todos", None).await;
    assert_eq!(list[0]["text"], "Buy milk");
}

// ---------------------------------------------------------------------------
// DELETE /todos/{id}
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_returns_confirmation_and_record() {
    let (app, id) = test_app();
    let (status, body) = send(app.clone(), "DELETE", &format!("/todos/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Todo deleted successfully");
    assert_eq!(body["deletedTodo"]["id"], id);
    assert_eq!(body["deletedTodo"]["text"], "Buy milk");

    let (_, list) = send(app, "GET", "/todos", None).await;
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn delete_is_permanent() {
    let (app, id) = test_app();
    let (status, _) = send(app.clone(), "DELETE", &format!("/todos/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app.clone(), "DELETE", &format!("/todos/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Todo not found" }));

    let (status, _) = send(
        app,
        "PATCH",
        &format!("/todos/{id}"),
        Some(json!({ "done": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_id_is_404() {
    let (app, _) = test_app();
    let (status, body) = send(app, "DELETE", "/todos/424242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Todo not found" }));
}
