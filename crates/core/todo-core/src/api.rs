//! The remote to-do API and its HTTP adapter.
//!
//! `HttpTodoApi` is the only place that looks at response shapes. Everything
//! above it works with [`ApiResult`].

use crate::error::{ApiError, ApiResult};
use crate::session::{BearerToken, LoginRequest, LoginResponse};
use crate::task::{Task, TaskDraft, TaskId};
use crate::transport::{Transport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use http::Method;
use serde_json::Value;
use tracing::{debug, instrument, warn};

#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn login(&self, identity: &str) -> ApiResult<LoginResponse>;

    async fn list(&self, token: &BearerToken) -> ApiResult<Vec<Task>>;

    async fn create(&self, token: &BearerToken, draft: &TaskDraft) -> ApiResult<Task>;

    async fn delete(&self, token: &BearerToken, id: &TaskId) -> ApiResult<()>;

    async fn update(&self, token: &BearerToken, id: &TaskId, draft: &TaskDraft)
    -> ApiResult<Task>;

    async fn toggle(&self, token: &BearerToken, id: &TaskId) -> ApiResult<Task>;
}

/// `TodoApi` over any [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTodoApi<T> {
    transport: T,
}

impl<T: Transport> HttpTodoApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn send(&self, request: TransportRequest) -> ApiResult<TransportResponse> {
        let method = request.method.clone();
        let path = request.path.clone();
        let response = self.transport.request(request).await.inspect_err(|e| {
            warn!(%method, %path, error = %e, "Request failed");
        })?;
        debug!(%method, %path, status = %response.status, "Received response");
        check_status(response)
    }

    fn authorized(
        method: Method,
        path: impl Into<String>,
        token: &BearerToken,
    ) -> ApiResult<TransportRequest> {
        Ok(TransportRequest::new(method, path).authorization(token.header_value())?)
    }
}

fn task_path(id: &TaskId) -> String {
    format!("/todo/{id}")
}

/// Map non-2xx statuses onto the error taxonomy.
fn check_status(response: TransportResponse) -> ApiResult<TransportResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let status = response.status;
    let message = response.message().unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    Err(match status.as_u16() {
        401 | 403 => ApiError::Unauthorized,
        404 => ApiError::NotFound,
        400 | 422 => ApiError::Validation(message),
        code => ApiError::Server {
            status: code,
            message,
        },
    })
}

/// A task body must carry an id; anything else is not a task.
fn parse_task(body: Value) -> ApiResult<Task> {
    let has_id = body
        .get("id")
        .or_else(|| body.get("_id"))
        .is_some_and(|id| !id.is_null());
    if !has_id {
        return Err(ApiError::MalformedResponse(
            "response has no task id".to_string(),
        ));
    }
    serde_json::from_value(body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

#[async_trait]
impl<T: Transport> TodoApi for HttpTodoApi<T> {
    #[instrument(skip(self))]
    async fn login(&self, identity: &str) -> ApiResult<LoginResponse> {
        let body = serde_json::to_value(LoginRequest {
            value: identity.to_string(),
        })
        .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        let response = self
            .send(TransportRequest::new(Method::POST, "/auth/login").json(body))
            .await?;

        let has_token = response
            .body
            .get("access_token")
            .and_then(Value::as_str)
            .is_some_and(|token| !token.trim().is_empty());
        if !has_token {
            return Err(ApiError::MalformedResponse(
                "response has no access_token".to_string(),
            ));
        }
        serde_json::from_value(response.body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    #[instrument(skip(self, token))]
    async fn list(&self, token: &BearerToken) -> ApiResult<Vec<Task>> {
        let response = self
            .send(Self::authorized(Method::GET, "/todo", token)?)
            .await?;
        let Value::Array(items) = response.body else {
            return Err(ApiError::MalformedResponse(
                "expected an array of tasks".to_string(),
            ));
        };

        // One unreadable row must not hide the rest of the list
        let total = items.len();
        let tasks: Vec<Task> = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match parse_task(item) {
                Ok(task) => Some(task),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed task in list");
                    None
                }
            })
            .collect();
        if tasks.len() < total {
            warn!(skipped = total - tasks.len(), total, "List contained malformed tasks");
        }
        Ok(tasks)
    }

    #[instrument(skip(self, token), fields(value = %draft.value, priority = %draft.priority))]
    async fn create(&self, token: &BearerToken, draft: &TaskDraft) -> ApiResult<Task> {
        let body =
            serde_json::to_value(draft).map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        let response = self
            .send(Self::authorized(Method::POST, "/todo", token)?.json(body))
            .await?;
        parse_task(response.body)
    }

    #[instrument(skip(self, token), fields(id = %id))]
    async fn delete(&self, token: &BearerToken, id: &TaskId) -> ApiResult<()> {
        let response = self
            .send(Self::authorized(Method::DELETE, task_path(id), token)?)
            .await?;
        match response.message() {
            Some(message) => Err(ApiError::Rejected(message)),
            None => Ok(()),
        }
    }

    #[instrument(skip(self, token), fields(id = %id, value = %draft.value, priority = %draft.priority))]
    async fn update(
        &self,
        token: &BearerToken,
        id: &TaskId,
        draft: &TaskDraft,
    ) -> ApiResult<Task> {
        let body =
            serde_json::to_value(draft).map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        let response = self
            .send(Self::authorized(Method::PUT, task_path(id), token)?.json(body))
            .await?;
        parse_task(response.body)
    }

    #[instrument(skip(self, token), fields(id = %id))]
    async fn toggle(&self, token: &BearerToken, id: &TaskId) -> ApiResult<Task> {
        let path = format!("{}/toggle", task_path(id));
        let response = self
            .send(Self::authorized(Method::PUT, path, token)?)
            .await?;
        parse_task(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::testing::StubTransport;
    use http::StatusCode;
    use http::header::AUTHORIZATION;
    use serde_json::json;

    fn token() -> BearerToken {
        BearerToken::from_access_token("t1").unwrap()
    }

    #[tokio::test]
    async fn test_login_sends_identity_without_authorization() {
        let stub = StubTransport::new();
        stub.push_ok(json!({"access_token": "t1"}));
        let api = HttpTodoApi::new(stub.clone());

        let response = api.login("alice").await.unwrap();
        assert_eq!(response.access_token, "t1");

        let request = stub.last_request().unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/auth/login");
        assert_eq!(request.body, Some(json!({"value": "alice"})));
        assert!(request.headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_login_without_token_is_malformed() {
        let stub = StubTransport::new();
        stub.push_ok(json!({"message": "who are you"}));
        stub.push_ok(json!({"access_token": ""}));
        let api = HttpTodoApi::new(stub);

        assert!(matches!(
            api.login("alice").await,
            Err(ApiError::MalformedResponse(_))
        ));
        assert!(matches!(
            api.login("alice").await,
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_authorized_requests_carry_bearer_header() {
        let stub = StubTransport::new();
        stub.push_ok(json!([]));
        let api = HttpTodoApi::new(stub.clone());

        api.list(&token()).await.unwrap();

        let request = stub.last_request().unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/todo");
        assert_eq!(request.headers[AUTHORIZATION], "Bearer t1");
    }

    #[tokio::test]
    async fn test_list_rejects_non_array_body() {
        let stub = StubTransport::new();
        stub.push_ok(json!({"items": []}));
        let api = HttpTodoApi::new(stub);

        assert!(matches!(
            api.list(&token()).await,
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_list_skips_malformed_elements() {
        let stub = StubTransport::new();
        stub.push_ok(json!([
            {"_id": 1, "value": "x", "priority": 2, "checked": false},
            {"value": "no id"},
            {"_id": 2, "value": "fractional", "priority": 3.5},
            {"_id": 3, "value": "out of range", "priority": 0},
            {"_id": 4, "user": null, "value": "nulls", "checked": null},
            "not an object"
        ]));
        let api = HttpTodoApi::new(stub);

        let tasks = api.list(&token()).await.unwrap();

        let ids: Vec<_> = tasks.iter().map(|t| t.id.to_string()).collect();
        assert_eq!(ids, ["1", "4"]);
        assert_eq!(tasks[1].owner, "");
        assert!(!tasks[1].checked);
    }

    #[tokio::test]
    async fn test_create_and_update_paths_and_bodies() {
        let stub = StubTransport::new();
        stub.push_ok(json!({"id": 2, "value": "y", "priority": 3, "checked": false}));
        stub.push_ok(json!({"id": 2, "value": "z", "priority": 4, "checked": false}));
        stub.push_ok(json!({"id": 2, "value": "z", "priority": 4, "checked": true}));
        let api = HttpTodoApi::new(stub.clone());

        let draft = TaskDraft::parse("y", "3").unwrap();
        api.create(&token(), &draft).await.unwrap();
        let request = stub.last_request().unwrap();
        assert_eq!((request.method, request.path.as_str()), (Method::POST, "/todo"));
        assert_eq!(request.body, Some(json!({"value": "y", "priority": 3})));

        let id = TaskId::from(2);
        let draft = TaskDraft::parse("z", "4").unwrap();
        api.update(&token(), &id, &draft).await.unwrap();
        let request = stub.last_request().unwrap();
        assert_eq!((request.method, request.path.as_str()), (Method::PUT, "/todo/2"));

        let toggled = api.toggle(&token(), &id).await.unwrap();
        assert!(toggled.checked);
        let request = stub.last_request().unwrap();
        assert_eq!(
            (request.method, request.path.as_str()),
            (Method::PUT, "/todo/2/toggle")
        );
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_task_response_without_id_is_malformed() {
        let stub = StubTransport::new();
        stub.push_ok(json!({"value": "y"}));
        stub.push_ok(json!({"id": null, "value": "y"}));
        let api = HttpTodoApi::new(stub);
        let draft = TaskDraft::new("y");

        for _ in 0..2 {
            assert!(matches!(
                api.create(&token(), &draft).await,
                Err(ApiError::MalformedResponse(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_delete_classification() {
        let stub = StubTransport::new();
        stub.push_ok(json!({}));
        stub.push_ok(Value::Null);
        stub.push_ok(json!({"message": "not found"}));
        stub.push(StatusCode::NOT_FOUND, json!({"statusCode": 404}));
        let api = HttpTodoApi::new(stub.clone());
        let id = TaskId::from(2);

        assert!(api.delete(&token(), &id).await.is_ok());
        assert!(api.delete(&token(), &id).await.is_ok());
        assert!(matches!(
            api.delete(&token(), &id).await,
            Err(ApiError::Rejected(message)) if message == "not found"
        ));
        assert!(matches!(
            api.delete(&token(), &id).await,
            Err(ApiError::NotFound)
        ));
        assert_eq!(stub.last_request().unwrap().path, "/todo/2");
    }

    #[tokio::test]
    async fn test_status_classification() {
        let stub = StubTransport::new();
        stub.push(StatusCode::UNAUTHORIZED, json!({"message": "Unauthorized"}));
        stub.push(StatusCode::FORBIDDEN, Value::Null);
        stub.push(
            StatusCode::BAD_REQUEST,
            json!({"message": ["value should not be empty"]}),
        );
        stub.push(StatusCode::UNPROCESSABLE_ENTITY, json!({"error": "bad priority"}));
        stub.push(StatusCode::INTERNAL_SERVER_ERROR, Value::Null);
        let api = HttpTodoApi::new(stub);
        let draft = TaskDraft::new("y");

        assert!(matches!(
            api.create(&token(), &draft).await,
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            api.create(&token(), &draft).await,
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            api.create(&token(), &draft).await,
            Err(ApiError::Validation(message)) if message == "value should not be empty"
        ));
        assert!(matches!(
            api.create(&token(), &draft).await,
            Err(ApiError::Validation(message)) if message == "bad priority"
        ));
        assert!(matches!(
            api.create(&token(), &draft).await,
            Err(ApiError::Server { status: 500, message }) if message == "Internal Server Error"
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_distinct() {
        let stub = StubTransport::new();
        stub.push_err(TransportError::Request("connection refused".to_string()));
        let api = HttpTodoApi::new(stub);

        let err = api.list(&token()).await.unwrap_err();
        assert!(err.is_transport());
    }
}
