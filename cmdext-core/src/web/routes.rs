// cmdext-core/src/web/routes.rs

use std::any::Any;
use std::sync::Arc;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get},
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use crate::Error;
use crate::api::{decode_json, CommandView, CreateCommandRequest, CreateTaskRequest, ManagementApi, TaskView};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Turns a crate `Error` into `{"error": "..."}` with a matching status.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Constraint(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn router(api: Arc<ManagementApi>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/commands", get(list_commands).post(create_command))
        .route("/api/commands/{id}", delete(delete_command))
        .route("/api/commands/", delete(delete_command_without_id))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", delete(delete_task))
        .route("/api/tasks/", delete(delete_task_without_id))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .with_state(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let msg = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "internal error".to_string()
    };
    error!("Handler panicked: {}", msg);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": msg }))).into_response()
}

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

async fn list_commands(State(api): State<Arc<ManagementApi>>) -> Result<Json<Vec<CommandView>>, ApiError> {
    Ok(Json(api.list_commands().await?))
}

async fn create_command(
    State(api): State<Arc<ManagementApi>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let req: CreateCommandRequest = decode_json(&body)?;
    api.create_command(req).await?;
    Ok(success())
}

async fn delete_command(
    State(api): State<Arc<ManagementApi>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    api.delete_command(&id).await?;
    Ok(success())
}

// An empty id segment is a malformed id, not an unknown route.
async fn delete_command_without_id(State(api): State<Arc<ManagementApi>>) -> Result<Json<Value>, ApiError> {
    api.delete_command("").await?;
    Ok(success())
}

async fn list_tasks(State(api): State<Arc<ManagementApi>>) -> Result<Json<Vec<TaskView>>, ApiError> {
    Ok(Json(api.list_tasks().await?))
}

async fn create_task(
    State(api): State<Arc<ManagementApi>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let req: CreateTaskRequest = decode_json(&body)?;
    api.create_task(req).await?;
    Ok(success())
}

async fn delete_task(
    State(api): State<Arc<ManagementApi>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    api.delete_task(&id).await?;
    Ok(success())
}

async fn delete_task_without_id(State(api): State<Arc<ManagementApi>>) -> Result<Json<Value>, ApiError> {
    api.delete_task("").await?;
    Ok(success())
}
