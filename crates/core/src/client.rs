//! HTTP client for the remote task service.
//!
//! The client classifies failures into [`TaskError`] and hands them back; it
//! never retries and never recovers.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::{TaskError, TaskResult};
use crate::model::{NewTask, Task, TaskPatch};

/// One operation per CRUD verb plus a liveness probe.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn list_all(&self) -> TaskResult<Vec<Task>>;
    async fn create(&self, input: &NewTask) -> TaskResult<Task>;
    async fn get(&self, id: &str) -> TaskResult<Task>;
    async fn update(&self, id: &str, patch: &TaskPatch) -> TaskResult<Task>;
    async fn remove(&self, id: &str) -> TaskResult<()>;
    /// Any failure reads as offline.
    async fn probe(&self) -> bool;
}

#[derive(Debug, Deserialize)]
struct TaskListEnvelope {
    #[serde(default)]
    todos: Vec<Task>,
}

#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    todo: Task,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

pub struct HttpTaskClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskClient {
    pub fn new(config: &ClientConfig) -> TaskResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("todomaster/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| TaskError::transport(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(method = %method, path, "task service request");
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    /// Request against `/todos/{id}`, with the id percent-encoded as a single
    /// path segment.
    fn record_request(&self, method: Method, id: &str) -> TaskResult<RequestBuilder> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| TaskError::transport(format!("invalid base url: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| TaskError::transport("base url cannot carry a path"))?
            .pop_if_empty()
            .push("todos")
            .push(id);
        tracing::debug!(method = %method, path = url.path(), "task service request");
        Ok(self.client.request(method, url))
    }

    async fn send(&self, builder: RequestBuilder, id: Option<&str>) -> TaskResult<String> {
        let response = builder.send().await.map_err(|err| {
            let error = classify_transport(&err);
            tracing::warn!(error = %error, "task service unreachable");
            error
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            TaskError::transport(format!("failed to read response body: {err}"))
        })?;

        if status.is_success() {
            return Ok(body);
        }

        let error = classify_status(status, &body, id);
        tracing::warn!(status = status.as_u16(), error = %error, "task service rejected request");
        Err(error)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        id: Option<&str>,
    ) -> TaskResult<T> {
        let body = self.send(builder, id).await?;
        serde_json::from_str(&body).map_err(|err| {
            TaskError::service(
                StatusCode::OK.as_u16(),
                format!("unexpected response body: {err}"),
            )
        })
    }
}

#[async_trait]
impl TaskService for HttpTaskClient {
    async fn list_all(&self) -> TaskResult<Vec<Task>> {
        let envelope: TaskListEnvelope = self
            .send_json(self.request(Method::GET, "/todos"), None)
            .await?;
        Ok(envelope.todos)
    }

    async fn create(&self, input: &NewTask) -> TaskResult<Task> {
        let builder = self.request(Method::POST, "/todos").json(input);
        let envelope: TaskEnvelope = self.send_json(builder, None).await?;
        Ok(envelope.todo)
    }

    async fn get(&self, id: &str) -> TaskResult<Task> {
        let builder = self.record_request(Method::GET, id)?;
        let envelope: TaskEnvelope = self.send_json(builder, Some(id)).await?;
        Ok(envelope.todo)
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> TaskResult<Task> {
        let builder = self.record_request(Method::PUT, id)?.json(patch);
        let envelope: TaskEnvelope = self.send_json(builder, Some(id)).await?;
        Ok(envelope.todo)
    }

    async fn remove(&self, id: &str) -> TaskResult<()> {
        let builder = self.record_request(Method::DELETE, id)?;
        self.send(builder, Some(id)).await.map(|_| ())
    }

    async fn probe(&self) -> bool {
        match self.send(self.request(Method::GET, "/health"), None).await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(error = %err, "health probe failed");
                false
            }
        }
    }
}

fn classify_transport(err: &reqwest::Error) -> TaskError {
    if err.is_timeout() {
        TaskError::transport("request timed out")
    } else if err.is_connect() {
        TaskError::transport(format!("connection failed: {err}"))
    } else {
        TaskError::transport(err.to_string())
    }
}

fn classify_status(status: StatusCode, body: &str, id: Option<&str>) -> TaskError {
    let message = error_message(status, body);
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => TaskError::not_found(id),
        (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _) => {
            TaskError::validation(message)
        }
        _ => TaskError::service(status.as_u16(), message),
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error.or(parsed.message))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            } else {
                trimmed.to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn task_json(id: &str, title: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "description": "",
            "completed": false,
            "created_at": "2024-05-01T10:00:00.000000",
            "updated_at": "2024-05-01T10:00:00.000000"
        })
    }

    fn client_for(server: &MockServer) -> HttpTaskClient {
        let config = ClientConfig::new(format!("{}/api", server.uri()));
        HttpTaskClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn list_all_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "todos": [task_json("b", "Second"), task_json("a", "First")],
                "count": 2
            })))
            .mount(&server)
            .await;

        let tasks = client_for(&server).list_all().await.unwrap();
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn create_posts_payload_and_returns_stored_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/todos"))
            .and(body_json(json!({
                "title": "Write report",
                "description": "",
                "completed": false
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "todo": task_json("srv-1", "Write report") })),
            )
            .mount(&server)
            .await;

        let created = client_for(&server)
            .create(&NewTask::new("Write report", ""))
            .await
            .unwrap();
        assert_eq!(created.id, "srv-1");
    }

    #[tokio::test]
    async fn update_sends_partial_fields() {
        let server = MockServer::start().await;
        let mut done = task_json("srv-1", "Write report");
        done["completed"] = json!(true);
        Mock::given(method("PUT"))
            .and(path("/api/todos/srv-1"))
            .and(body_json(json!({ "completed": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "todo": done })))
            .mount(&server)
            .await;

        let updated = client_for(&server)
            .update("srv-1", &TaskPatch::completed(true))
            .await
            .unwrap();
        assert!(updated.completed);
    }

    #[tokio::test]
    async fn unknown_id_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/todos/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "error": "Todo not found" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).remove("missing").await.unwrap_err();
        assert_eq!(err, TaskError::not_found("missing"));
    }

    #[tokio::test]
    async fn ids_are_encoded_as_a_single_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todos/%3Fx"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "todo": task_json("?x", "Odd") })),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/todos/a%2Fb"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Todo not found" })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.get("?x").await.unwrap().title, "Odd");
        assert_eq!(
            client.remove("a/b").await.unwrap_err(),
            TaskError::not_found("a/b")
        );
    }

    #[tokio::test]
    async fn bad_request_maps_to_validation_with_service_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/todos"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": "Title cannot be empty" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create(&NewTask::new("x", ""))
            .await
            .unwrap_err();
        assert_eq!(err, TaskError::validation("Title cannot be empty"));
    }

    #[tokio::test]
    async fn server_error_maps_to_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todos"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "error": "Failed to fetch todos" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).list_all().await.unwrap_err();
        assert_eq!(err, TaskError::service(500, "Failed to fetch todos"));
    }

    #[tokio::test]
    async fn slow_response_is_a_transport_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todos"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "todos": [] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = ClientConfig::new(format!("{}/api", server.uri()))
            .with_timeout(Duration::from_millis(50));
        let client = HttpTaskClient::new(&config).unwrap();
        let err = client.list_all().await.unwrap_err();
        assert!(err.is_transport(), "expected transport error, got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error_and_probe_is_offline() {
        // Nothing listens on the discard port.
        let config = ClientConfig::new("http://127.0.0.1:9/api")
            .with_timeout(Duration::from_millis(500));
        let client = HttpTaskClient::new(&config).unwrap();

        assert!(client.list_all().await.unwrap_err().is_transport());
        assert!(!client.probe().await);
    }

    #[tokio::test]
    async fn probe_reports_online_for_any_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        assert!(client_for(&server).probe().await);
    }

    #[test]
    fn error_message_falls_back_to_reason() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, ""),
            "Bad Gateway".to_string()
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down".to_string()
        );
    }
}
