//! Integration tests for client synchronization with the task server.
//!
//! A [`TaskClient`] over [`RemoteBackend`] talks to an in-process server:
//! - every operation replaces local entries with the server's records
//! - failures leave the local collection untouched
//! - a second client sees the first one's changes after `load`

use std::time::Duration;

use taskosaurus::backend::{BackendError, RemoteBackend, TaskBackend};
use taskosaurus::client::{ClientError, LoadState, TaskClient};
use taskosaurus_proto::filter::FilterMode;
use taskosaurus_proto::task::TaskId;

/// Start the task server in-process and return its base URL.
async fn start_server() -> (String, tokio::task::JoinHandle<()>) {
    let (addr, handle) = taskosaurus_server::api::start_server("127.0.0.1:0")
        .await
        .expect("failed to start task server");
    (format!("http://{addr}"), handle)
}

fn remote_client(base: &str) -> TaskClient<RemoteBackend> {
    let backend = RemoteBackend::new(base, Duration::from_secs(5)).unwrap();
    TaskClient::new(backend)
}

// =============================================================================
// Operations against a live server
// =============================================================================

#[tokio::test]
async fn add_uses_server_assigned_fields() {
    let (base, handle) = start_server().await;
    let mut client = remote_client(&base);
    assert_eq!(client.load().await.unwrap(), 0);

    let task = client.add("  buy milk  ").await.unwrap().unwrap();
    assert_eq!(task.text, "buy milk");
    assert!(!task.completed);
    assert_eq!(client.state().tasks(), std::slice::from_ref(&task));

    let on_server = client.backend().fetch_all().await.unwrap();
    assert_eq!(on_server, vec![task]);

    handle.abort();
}

#[tokio::test]
async fn blank_add_never_reaches_server() {
    let (base, handle) = start_server().await;
    let mut client = remote_client(&base);
    client.load().await.unwrap();

    assert_eq!(client.add("").await.unwrap(), None);
    assert_eq!(client.add("   ").await.unwrap(), None);
    assert!(client.backend().fetch_all().await.unwrap().is_empty());

    handle.abort();
}

#[tokio::test]
async fn toggle_edit_remove_round_trip() {
    let (base, handle) = start_server().await;
    let mut client = remote_client(&base);
    client.load().await.unwrap();
    let original = client.add("walk dog").await.unwrap().unwrap();

    let toggled = client.toggle(&original.id).await.unwrap();
    assert!(toggled.completed);
    assert_eq!(toggled.text, original.text);
    assert_eq!(toggled.created_at, original.created_at);

    let edited = client.edit(&original.id, "walk the dog").await.unwrap().unwrap();
    assert_eq!(edited.text, "walk the dog");
    assert!(edited.completed);

    client.remove(&original.id).await.unwrap();
    assert!(client.state().tasks().is_empty());
    assert!(client.backend().fetch_all().await.unwrap().is_empty());

    handle.abort();
}

#[tokio::test]
async fn remove_of_task_deleted_elsewhere_is_not_found() {
    let (base, handle) = start_server().await;
    let mut first = remote_client(&base);
    let mut second = remote_client(&base);
    first.load().await.unwrap();
    let task = first.add("shared").await.unwrap().unwrap();

    second.load().await.unwrap();
    second.remove(&task.id).await.unwrap();

    let err = first.remove(&task.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Backend(BackendError::NotFound(ref id)) if *id == task.id));
    assert_eq!(first.state().tasks().len(), 1);

    handle.abort();
}

#[tokio::test]
async fn clear_completed_removes_exactly_completed() {
    let (base, handle) = start_server().await;
    let mut client = remote_client(&base);
    client.load().await.unwrap();

    let a = client.add("a").await.unwrap().unwrap();
    let b = client.add("b").await.unwrap().unwrap();
    let c = client.add("c").await.unwrap().unwrap();
    client.toggle(&a.id).await.unwrap();
    client.toggle(&c.id).await.unwrap();

    let report = client.clear_completed().await.unwrap();
    assert_eq!(report.requested, 2);
    assert_eq!(report.removed, 2);
    assert!(report.is_complete());

    let remaining = client.backend().fetch_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, b.id);
    assert_eq!(client.state().tasks(), remaining.as_slice());

    handle.abort();
}

#[tokio::test]
async fn filters_partition_synced_collection() {
    let (base, handle) = start_server().await;
    let mut client = remote_client(&base);
    client.load().await.unwrap();
    for text in ["one", "two", "three", "four"] {
        client.add(text).await.unwrap();
    }
    let ids: Vec<TaskId> = client.state().tasks().iter().map(|t| t.id.clone()).collect();
    client.toggle(&ids[1]).await.unwrap();

    client.set_filter(FilterMode::Active);
    assert!(client.visible_tasks().iter().all(|t| !t.completed));
    assert_eq!(client.visible_tasks().len(), 3);

    client.set_filter(FilterMode::Completed);
    assert_eq!(client.visible_tasks().len(), 1);
    assert_eq!(client.visible_tasks()[0].id, ids[1]);

    client.set_filter(FilterMode::All);
    let texts: Vec<_> = client.visible_tasks().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["four", "three", "two", "one"]);

    handle.abort();
}

#[tokio::test]
async fn second_client_sees_changes_after_load() {
    let (base, handle) = start_server().await;
    let mut writer = remote_client(&base);
    let mut reader = remote_client(&base);
    writer.load().await.unwrap();
    reader.load().await.unwrap();

    writer.add("from writer").await.unwrap();
    assert!(reader.state().tasks().is_empty());

    assert_eq!(reader.load().await.unwrap(), 1);
    assert_eq!(reader.state().tasks()[0].text, "from writer");

    handle.abort();
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn load_failure_leaves_empty_collection() {
    let (base, handle) = start_server().await;
    handle.abort();
    let _ = handle.await;

    let mut client = remote_client(&base);
    let err = client.load().await.unwrap_err();
    assert!(matches!(err, ClientError::Backend(BackendError::Transport(_))));
    assert!(client.state().tasks().is_empty());
    assert!(matches!(client.state().load_state(), LoadState::Failed(_)));
}

#[tokio::test]
async fn failed_update_keeps_local_state() {
    let (base, handle) = start_server().await;
    let mut client = remote_client(&base);
    client.load().await.unwrap();
    let task = client.add("gone soon").await.unwrap().unwrap();
    client.backend().delete(&task.id).await.unwrap();

    let err = client.toggle(&task.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Backend(BackendError::NotFound(_))));
    assert_eq!(client.state().tasks(), std::slice::from_ref(&task));
    assert!(!client.state().is_pending(&task.id));
    assert!(client.state().notice().is_some());

    handle.abort();
}
