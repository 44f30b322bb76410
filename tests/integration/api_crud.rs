//! Integration tests for the task HTTP API.
//!
//! Runs the server in-process on an ephemeral port and drives it with a
//! plain HTTP client:
//! - create → toggle → delete → list scenario
//! - validation and not-found statuses with JSON error bodies
//! - ordering, partial updates, snapshot persistence across restarts

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use taskosaurus_server::api::{start_server, start_server_with_store};
use taskosaurus_server::store::TaskStore;

/// Start the server in-process and return its base URL.
async fn start() -> (String, tokio::task::JoinHandle<()>) {
    let (addr, handle) = start_server("127.0.0.1:0")
        .await
        .expect("failed to start task server");
    (format!("http://{addr}"), handle)
}

async fn create(client: &reqwest::Client, base: &str, text: &str) -> Value {
    let response = client
        .post(format!("{base}/tasks"))
        .json(&json!({ "text": text }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn list(client: &reqwest::Client, base: &str) -> Vec<Value> {
    let response = client.get(format!("{base}/tasks")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap()
}

// =============================================================================
// End-to-end scenario
// =============================================================================

#[tokio::test]
async fn create_toggle_delete_scenario() {
    let (base, handle) = start().await;
    let client = reqwest::Client::new();

    let created = create(&client, &base, "buy milk").await;
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(created["text"], "buy milk");
    assert_eq!(created["completed"], false);
    assert!(created["createdAt"].is_string());

    let response = client
        .put(format!("{base}/tasks/{id}"))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["text"], created["text"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let response = client
        .delete(format!("{base}/tasks/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ack: Value = response.json().await.unwrap();
    assert_eq!(ack, json!({ "message": "Task deleted successfully" }));

    let tasks = list(&client, &base).await;
    assert!(tasks.iter().all(|t| t["id"] != id.as_str()));

    handle.abort();
}

// =============================================================================
// Validation and not-found
// =============================================================================

#[tokio::test]
async fn blank_or_missing_text_is_bad_request() {
    let (base, handle) = start().await;
    let client = reqwest::Client::new();

    for body in [json!({ "text": "" }), json!({ "text": "   " }), json!({})] {
        let response = client
            .post(format!("{base}/tasks"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["message"], "Text is required");
    }
    assert!(list(&client, &base).await.is_empty());

    handle.abort();
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (base, handle) = start().await;
    let client = reqwest::Client::new();
    create(&client, &base, "keep me").await;

    let response = client
        .put(format!("{base}/tasks/doesnotexist"))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["message"], "Task not found");

    let response = client
        .delete(format!("{base}/tasks/doesnotexist"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(list(&client, &base).await.len(), 1);

    handle.abort();
}

#[tokio::test]
async fn blank_text_update_is_bad_request() {
    let (base, handle) = start().await;
    let client = reqwest::Client::new();
    let created = create(&client, &base, "a").await;
    let id = created["id"].as_str().unwrap();

    let response = client
        .put(format!("{base}/tasks/{id}"))
        .json(&json!({ "text": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(list(&client, &base).await[0]["text"], "a");

    handle.abort();
}

// =============================================================================
// Store semantics over HTTP
// =============================================================================

#[tokio::test]
async fn list_is_newest_first() {
    let (base, handle) = start().await;
    let client = reqwest::Client::new();
    for text in ["first", "second", "third"] {
        create(&client, &base, text).await;
    }

    let texts: Vec<_> = list(&client, &base)
        .await
        .iter()
        .map(|t| t["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, ["third", "second", "first"]);

    handle.abort();
}

#[tokio::test]
async fn client_supplied_id_and_timestamp_are_ignored() {
    let (base, handle) = start().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/tasks"))
        .json(&json!({
            "text": "  trimmed  ",
            "id": "mine",
            "completed": true,
            "createdAt": "2000-01-01T00:00:00Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let task: Value = response.json().await.unwrap();
    assert_ne!(task["id"], "mine");
    assert_ne!(task["createdAt"], "2000-01-01T00:00:00Z");
    assert_eq!(task["completed"], false);
    assert_eq!(task["text"], "trimmed");

    handle.abort();
}

#[tokio::test]
async fn text_update_leaves_completed_alone() {
    let (base, handle) = start().await;
    let client = reqwest::Client::new();
    let created = create(&client, &base, "draft").await;
    let id = created["id"].as_str().unwrap();

    client
        .put(format!("{base}/tasks/{id}"))
        .json(&json!({ "completed": true }))
        .send()
        .await
        .unwrap();
    let response = client
        .put(format!("{base}/tasks/{id}"))
        .json(&json!({ "text": "final" }))
        .send()
        .await
        .unwrap();
    let task: Value = response.json().await.unwrap();
    assert_eq!(task["text"], "final");
    assert_eq!(task["completed"], true);

    handle.abort();
}

#[tokio::test]
async fn snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let client = reqwest::Client::new();

    let store = Arc::new(TaskStore::open(&path).await.unwrap());
    let (addr, handle) = start_server_with_store("127.0.0.1:0", store)
        .await
        .unwrap();
    let base = format!("http://{addr}");
    create(&client, &base, "persisted").await;
    handle.abort();

    let store = Arc::new(TaskStore::open(&path).await.unwrap());
    let (addr, handle) = start_server_with_store("127.0.0.1:0", store)
        .await
        .unwrap();
    let tasks = list(&client, &format!("http://{addr}")).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["text"], "persisted");

    handle.abort();
}
