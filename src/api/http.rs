//! HTTP 传输层（axum）
//!
//! 路由与边界操作一一对应；错误种类映射为状态码，响应体为 {"error", "kind"}。

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::api::{dispatch, ApiError, Operation};
use crate::core::Orchestrator;

type AppState = Arc<Orchestrator>;

/// 错误种类 -> HTTP 状态码
pub fn status_for(kind: &str) -> StatusCode {
    match kind {
        "ValidationError" => StatusCode::BAD_REQUEST,
        "NotFoundError" | "NotAssignedError" => StatusCode::NOT_FOUND,
        "AlreadyExistsError" => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(op: Operation, e: ApiError) -> Response {
    tracing::warn!(op = op.name(), kind = %e.kind, message = %e.message, "request failed");
    let mut body = json!({ "error": e.message, "kind": e.kind });
    if let (Some(t), Some(obj)) = (e.transcript, body.as_object_mut()) {
        obj.insert("transcript".to_string(), Value::String(t));
    }
    (status_for(body["kind"].as_str().unwrap_or_default()), Json(body)).into_response()
}

async fn respond(orch: &Orchestrator, op: Operation, payload: Value) -> Response {
    match dispatch(orch, op, &payload).await {
        Ok(body) => {
            let status = if op.creates() {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(body)).into_response()
        }
        Err(e) => error_response(op, e),
    }
}

async fn define_task_type(State(o): State<AppState>, Json(p): Json<Value>) -> Response {
    respond(&o, Operation::DefineTaskType, p).await
}

async fn define_agent_type(State(o): State<AppState>, Json(p): Json<Value>) -> Response {
    respond(&o, Operation::DefineAgentType, p).await
}

async fn add_task(State(o): State<AppState>, Json(p): Json<Value>) -> Response {
    respond(&o, Operation::AddTask, p).await
}

async fn add_agent(State(o): State<AppState>, Json(p): Json<Value>) -> Response {
    respond(&o, Operation::AddAgent, p).await
}

async fn assign_task(State(o): State<AppState>, Json(p): Json<Value>) -> Response {
    respond(&o, Operation::AssignTask, p).await
}

async fn execute_task(State(o): State<AppState>, Json(p): Json<Value>) -> Response {
    respond(&o, Operation::ExecuteTask, p).await
}

async fn get_agents(State(o): State<AppState>) -> Response {
    respond(&o, Operation::ListAgents, Value::Null).await
}

async fn get_tasks(State(o): State<AppState>) -> Response {
    respond(&o, Operation::ListTasks, Value::Null).await
}

async fn get_task_types(State(o): State<AppState>) -> Response {
    respond(&o, Operation::ListTaskTypes, Value::Null).await
}

async fn get_agent_types(State(o): State<AppState>) -> Response {
    respond(&o, Operation::ListAgentTypes, Value::Null).await
}

async fn get_assignments(State(o): State<AppState>) -> Response {
    respond(&o, Operation::ListAssignments, Value::Null).await
}

async fn get_task(State(o): State<AppState>, Path(id): Path<String>) -> Response {
    respond(&o, Operation::GetTask, json!({ "task_id": id })).await
}

async fn get_agent(State(o): State<AppState>, Path(name): Path<String>) -> Response {
    respond(&o, Operation::GetAgent, json!({ "name": name })).await
}

/// 创建路由
pub fn create_router(orch: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/define_task_type", post(define_task_type))
        .route("/define_agent_type", post(define_agent_type))
        .route("/add_task", post(add_task))
        .route("/add_agent", post(add_agent))
        .route("/assign_task", post(assign_task))
        .route("/execute_task", post(execute_task))
        .route("/get_agents", get(get_agents))
        .route("/get_tasks", get(get_tasks))
        .route("/get_task_types", get(get_task_types))
        .route("/get_agent_types", get(get_agent_types))
        .route("/get_assignments", get(get_assignments))
        .route("/get_task/:id", get(get_task))
        .route("/get_agent/:name", get(get_agent))
        .with_state(orch)
}
