//! HTTP backend talking to the Taskosaurus task server.
//!
//! Status codes are mapped onto [`BackendError`]: `400` becomes
//! [`BackendError::Validation`] carrying the server's message, `404`
//! becomes [`BackendError::NotFound`], and any other failure status becomes
//! [`BackendError::Server`]. Connection failures, timeouts and bodies that
//! do not decode are [`BackendError::Transport`].

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use taskosaurus_proto::api::{CreateTask, DeleteAck, ErrorBody, TASKS_PATH, TaskPatch};
use taskosaurus_proto::task::{Task, TaskId};

use super::{BackendError, TaskBackend};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend that synchronizes with a remote task server.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    base: Url,
}

impl RemoteBackend {
    /// Creates a backend for the server at `base_url` (e.g. `http://127.0.0.1:5000`).
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] if the URL cannot be parsed or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base = Url::parse(base_url)
            .map_err(|e| BackendError::Transport(format!("invalid server url {base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::Transport(format!(
                "invalid server url {base_url}: not a base url"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(format!("http client setup failed: {e}")))?;
        Ok(Self { client, base })
    }

    /// Base URL of the server.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Builds `<base>/tasks` or `<base>/tasks/<id>` with the id percent-encoded.
    fn tasks_url(&self, id: Option<&TaskId>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.push(TASKS_PATH.trim_start_matches('/'));
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }
}

/// Turns a request failure into a transport error.
fn transport(err: &reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Transport("request timed out".to_string())
    } else if err.is_connect() {
        BackendError::Transport(format!("server unreachable: {err}"))
    } else {
        BackendError::Transport(err.to_string())
    }
}

/// Maps a non-success response onto [`BackendError`], passing successes through.
async fn check(response: Response, id: Option<&TaskId>) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    tracing::debug!(status = status.as_u16(), message = %message, "server rejected request");

    Err(status_error(status, message, id))
}

/// Classifies an error status. A 404 only means a missing task when the
/// request named one.
fn status_error(status: StatusCode, message: String, id: Option<&TaskId>) -> BackendError {
    match (status, id) {
        (StatusCode::BAD_REQUEST, _) => BackendError::Validation(message),
        (StatusCode::NOT_FOUND, Some(id)) => BackendError::NotFound(id.clone()),
        _ => BackendError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

/// Decodes a JSON body, reporting malformed bodies as transport errors.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    response
        .json::<T>()
        .await
        .map_err(|e| BackendError::Transport(format!("malformed response: {e}")))
}

impl TaskBackend for RemoteBackend {
    fn describe(&self) -> String {
        format!("remote ({})", self.base)
    }

    async fn fetch_all(&self) -> Result<Vec<Task>, BackendError> {
        let response = self
            .client
            .get(self.tasks_url(None))
            .send()
            .await
            .map_err(|e| transport(&e))?;
        decode(check(response, None).await?).await
    }

    async fn create(&self, text: &str) -> Result<Task, BackendError> {
        let response = self
            .client
            .post(self.tasks_url(None))
            .json(&CreateTask::new(text))
            .send()
            .await
            .map_err(|e| transport(&e))?;
        decode(check(response, None).await?).await
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, BackendError> {
        let response = self
            .client
            .put(self.tasks_url(Some(id)))
            .json(patch)
            .send()
            .await
            .map_err(|e| transport(&e))?;
        decode(check(response, Some(id)).await?).await
    }

    async fn delete(&self, id: &TaskId) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.tasks_url(Some(id)))
            .send()
            .await
            .map_err(|e| transport(&e))?;
        let ack: DeleteAck = decode(check(response, Some(id)).await?).await?;
        tracing::debug!(task_id = %id, message = %ack.message, "delete acknowledged");
        Ok(())
    }
}
