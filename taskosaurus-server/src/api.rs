//! HTTP surface of the task store: routes, handlers, and error mapping.
//!
//! Every handler works against a shared [`TaskStore`]. Failures are turned
//! into an [`ApiError`], which renders as a JSON [`ErrorBody`] with the
//! matching status code: validation problems are `400`, unknown ids `404`,
//! and everything else `500`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use taskosaurus_proto::api::{
    CreateTask, DeleteAck, ErrorBody, LIVENESS_TEXT, NOT_FOUND_MESSAGE, TaskPatch,
};
use taskosaurus_proto::task::{Task, TaskId, ValidationError};

use crate::store::{StoreError, TaskStore};

/// Error returned by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was rejected before reaching the store.
    #[error("{0}")]
    Validation(String),

    /// No task has the requested id.
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    /// The store failed; the string is the client-facing message.
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Maps a store failure onto the HTTP taxonomy.
    ///
    /// `context` is the message reported for unexpected failures.
    fn from_store(err: StoreError, context: &'static str) -> Self {
        match err {
            StoreError::Validation(e) => Self::Validation(e.to_string()),
            StoreError::NotFound(_) => Self::NotFound,
            StoreError::Persistence(reason) => {
                tracing::error!(reason = %reason, context, "store failure");
                Self::Internal(context)
            }
        }
    }

    /// Status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "malformed request body");
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

/// Builds the application router over a shared store.
pub fn router(store: Arc<TaskStore>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", axum::routing::put(update_task).delete(delete_task))
        .with_state(store)
}

/// `GET /`
async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

/// `GET /tasks`
async fn list_tasks(State(store): State<Arc<TaskStore>>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = store
        .list()
        .await
        .map_err(|e| ApiError::from_store(e, "Server error while fetching tasks"))?;
    Ok(Json(tasks))
}

/// `POST /tasks`
async fn create_task(
    State(store): State<Arc<TaskStore>>,
    body: Result<Json<CreateTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(request) = body?;
    let Some(text) = request.text else {
        return Err(ApiError::Validation(ValidationError::TextRequired.to_string()));
    };

    let task = store
        .create(&text)
        .await
        .map_err(|e| ApiError::from_store(e, "Server error while creating task"))?;

    tracing::info!(task_id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PUT /tasks/{id}`
async fn update_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<String>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(patch) = body?;
    let id = TaskId::from(id);

    let task = store
        .update(&id, &patch)
        .await
        .map_err(|e| ApiError::from_store(e, "Server error while updating task"))?;

    tracing::info!(
        task_id = %task.id,
        text = patch.text.is_some(),
        completed = ?patch.completed,
        "task updated"
    );
    Ok(Json(task))
}

/// `DELETE /tasks/{id}`
async fn delete_task(
    State(store): State<Arc<TaskStore>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, ApiError> {
    let id = TaskId::from(id);
    store
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_store(e, "Server error while deleting task"))?;

    tracing::info!(task_id = %id, "task deleted");
    Ok(Json(DeleteAck::default()))
}

/// Starts the server on `addr` with an in-memory store.
///
/// Returns the bound address and the join handle of the serving task.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_store(addr, Arc::new(TaskStore::in_memory())).await
}

/// Starts the server on `addr` over a pre-built [`TaskStore`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_store(
    addr: &str,
    store: Arc<TaskStore>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "task server error");
        }
    });

    Ok((bound_addr, handle))
}
