//! HTTP request server exposing `execute` and `export` over a workflow registry.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{FlowError, Result, store::Storage};

/// Body of an execute request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub param: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub result: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportResponse {
    pub dot: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Error returned by the handlers, mapped onto a status code.
pub struct ApiError(StatusCode, String);

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        let status = if err.is_not_found() { StatusCode::NOT_FOUND } else { StatusCode::INTERNAL_SERVER_ERROR };
        Self(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.0,
            Json(ErrorResponse {
                message: self.1,
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

pub struct Server {
    store: Arc<dyn Storage>,
}

impl Server {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self {
            store,
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/execute/{workflow}", post(execute))
            .route("/export/{workflow}", get(export))
            .layer(TraceLayer::new_for_http())
            .with_state(self.store.clone())
    }

    /// Binds `addr` and serves until the listener fails.
    pub async fn serve(
        &self,
        addr: &str,
    ) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("request server listening on {}", addr);

        axum::serve(listener, self.router()).await.map_err(|e| FlowError::Server(e.to_string()))
    }
}

async fn execute(
    State(store): State<Arc<dyn Storage>>,
    Path(workflow): Path<String>,
    body: std::result::Result<Json<ExecuteRequest>, JsonRejection>,
) -> ApiResult<Json<ExecuteResponse>> {
    let Ok(Json(request)) = body else {
        return Err(ApiError(StatusCode::BAD_REQUEST, "invalid request.".to_string()));
    };

    let workflow = store.get(&workflow)?;
    let result = workflow.execute(request.param.into_bytes()).await?;

    Ok(Json(ExecuteResponse {
        result: String::from_utf8_lossy(&result).into_owned(),
    }))
}

async fn export(
    State(store): State<Arc<dyn Storage>>,
    Path(workflow): Path<String>,
) -> ApiResult<Json<ExportResponse>> {
    let dot = store.get(&workflow)?.export()?;

    Ok(Json(ExportResponse {
        dot: String::from_utf8_lossy(&dot).into_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        store::MemStore,
        workflow::{
            Workflow,
            node::{DATA_KEY, Node, Params},
        },
    };

    fn server() -> Router {
        let store = MemStore::new();

        let wf = Workflow::new("greet");
        wf.add_nodes([
            Node::new("hello", |p: &Params| Ok(format!("hello {}", String::from_utf8_lossy(&p[DATA_KEY])).into_bytes())),
            Node::new("shout", |p: &Params| Ok(p[DATA_KEY].to_ascii_uppercase())),
        ]);
        wf.add_edge("hello", "shout").unwrap();
        store.save(Arc::new(wf)).unwrap();

        let broken = Workflow::new("broken");
        broken.add_nodes([Node::new("a", |p: &Params| Ok(p[DATA_KEY].clone())), Node::new("b", |_: &Params| Err("b is down".into()))]);
        broken.add_edge("a", "b").unwrap();
        store.save(Arc::new(broken)).unwrap();

        Server::new(Arc::new(store)).router()
    }

    async fn call(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = server().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn execute_request(
        workflow: &str,
        body: &str,
    ) -> Request<Body> {
        Request::post(format!("/execute/{}", workflow)).header(header::CONTENT_TYPE, "application/json").body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_execute_ok() {
        let (status, body) = call(execute_request("greet", r#"{"param": "world"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "HELLO WORLD");
    }

    #[tokio::test]
    async fn test_execute_unknown_workflow() {
        let (status, body) = call(execute_request("nope", r#"{"param": "x"}"#)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "workflow 'nope' not found");
    }

    #[tokio::test]
    async fn test_execute_failure_is_internal_error() {
        let (status, body) = call(execute_request("broken", r#"{"param": "x"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "node 'b' failed: b is down");
    }

    #[tokio::test]
    async fn test_execute_bad_body() {
        let (status, body) = call(execute_request("greet", "not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid request.");
    }

    #[tokio::test]
    async fn test_export() {
        let (status, body) = call(Request::get("/export/greet").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        let dot = body["dot"].as_str().unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("label = \"Greet\""));
    }

    #[tokio::test]
    async fn test_export_unknown_workflow() {
        let (status, _) = call(Request::get("/export/nope").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
