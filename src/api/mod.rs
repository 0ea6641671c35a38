//! 边界 API：键值载荷 -> 编排服务操作 -> 键值结果或 (kind, message) 错误对
//!
//! 与传输协议无关；HTTP 路由（api::http）、CLI 等按 1:1 映射到 Operation。状态码/退出码由传输层决定。

#[cfg(feature = "web")]
pub mod http;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::core::{Orchestrator, ServiceError, TaskParams};

/// 边界操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    DefineTaskType,
    DefineAgentType,
    AddTask,
    AddAgent,
    AssignTask,
    ExecuteTask,
    ListAgents,
    ListTasks,
    ListTaskTypes,
    ListAgentTypes,
    ListAssignments,
    GetTask,
    GetAgent,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::DefineTaskType,
        Operation::DefineAgentType,
        Operation::AddTask,
        Operation::AddAgent,
        Operation::AssignTask,
        Operation::ExecuteTask,
        Operation::ListAgents,
        Operation::ListTasks,
        Operation::ListTaskTypes,
        Operation::ListAgentTypes,
        Operation::ListAssignments,
        Operation::GetTask,
        Operation::GetAgent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::DefineTaskType => "define_task_type",
            Operation::DefineAgentType => "define_agent_type",
            Operation::AddTask => "add_task",
            Operation::AddAgent => "add_agent",
            Operation::AssignTask => "assign_task",
            Operation::ExecuteTask => "execute_task",
            Operation::ListAgents => "get_agents",
            Operation::ListTasks => "get_tasks",
            Operation::ListTaskTypes => "get_task_types",
            Operation::ListAgentTypes => "get_agent_types",
            Operation::ListAssignments => "get_assignments",
            Operation::GetTask => "get_task",
            Operation::GetAgent => "get_agent",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// 是否创建了新实体（传输层可据此选择 201）
    pub fn creates(&self) -> bool {
        matches!(
            self,
            Operation::DefineTaskType
                | Operation::DefineAgentType
                | Operation::AddTask
                | Operation::AddAgent
        )
    }
}

/// (kind, message) 错误对
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub kind: String,
    pub message: String,
    /// 步数超限时的诊断 transcript
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: "ValidationError".to_string(),
            message: message.into(),
            transcript: None,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self {
            kind: e.kind().to_string(),
            message: e.to_string(),
            transcript: e.diagnostic_transcript().map(str::to_string),
        }
    }
}

fn str_field<'a>(payload: &'a Map<String, Value>, key: &str) -> Result<&'a str, ApiError> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(""),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ApiError::validation(format!("'{}' must be a string", key))),
    }
}

fn opt_str_field<'a>(
    payload: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a str>, ApiError> {
    str_field(payload, key).map(|s| (!s.is_empty()).then_some(s))
}

/// tools 字段：缺省为空列表，元素必须是字符串
fn tools_field(payload: &Map<String, Value>) -> Result<Vec<String>, ApiError> {
    match payload.get("tools") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::validation("'tools' must be a list of strings"))
            })
            .collect(),
        Some(_) => Err(ApiError::validation("'tools' must be a list of strings")),
    }
}

/// additional_data 字段：对象，保持键顺序；非字符串值按 JSON 文本渲染
pub fn params_field(payload: &Map<String, Value>) -> Result<TaskParams, ApiError> {
    match payload.get("additional_data") {
        None | Some(Value::Null) => Ok(TaskParams::new()),
        Some(Value::Object(map)) => Ok(map
            .iter()
            .map(|(k, v)| {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), rendered)
            })
            .collect()),
        Some(_) => Err(ApiError::validation("'additional_data' must be an object")),
    }
}

fn to_value<T: Serialize>(v: T) -> Result<Value, ApiError> {
    serde_json::to_value(v).map_err(|e| ApiError {
        kind: "ExecutionError".to_string(),
        message: e.to_string(),
        transcript: None,
    })
}

/// 执行一次边界操作
pub async fn dispatch(
    orch: &Orchestrator,
    op: Operation,
    payload: &Value,
) -> Result<Value, ApiError> {
    let empty = Map::new();
    let payload = match payload {
        Value::Object(m) => m,
        Value::Null => &empty,
        _ => return Err(ApiError::validation("payload must be an object")),
    };

    match op {
        Operation::DefineTaskType => {
            let name = str_field(payload, "task_type")?;
            orch.define_task_type(name, opt_str_field(payload, "description")?)
                .await?;
            Ok(json!({ "message": format!("Task type '{}' defined.", name.trim()) }))
        }
        Operation::DefineAgentType => {
            let name = str_field(payload, "agent_type")?;
            orch.define_agent_type(name, tools_field(payload)?).await?;
            Ok(json!({ "message": format!("Agent type '{}' defined.", name.trim()) }))
        }
        Operation::AddTask => {
            let task_id = orch
                .add_task(
                    str_field(payload, "name")?,
                    str_field(payload, "description")?,
                    str_field(payload, "task_type")?,
                )
                .await?;
            Ok(json!({ "task_id": task_id }))
        }
        Operation::AddAgent => {
            let agent_name = orch
                .add_agent(str_field(payload, "name")?, str_field(payload, "agent_type")?)
                .await?;
            Ok(json!({ "agent_name": agent_name }))
        }
        Operation::AssignTask => {
            let agent_name = str_field(payload, "agent_name")?;
            let task_id = str_field(payload, "task_id")?;
            orch.assign_task(agent_name, task_id).await?;
            Ok(json!({
                "message": format!("Task '{}' assigned to agent '{}'.", task_id, agent_name)
            }))
        }
        Operation::ExecuteTask => {
            let task_id = str_field(payload, "task_id")?;
            let params = params_field(payload)?;
            let result = orch.execute_task(task_id, params).await?;
            Ok(json!({ "result": result }))
        }
        Operation::ListAgents => Ok(json!({ "agents": orch.list_agents().await })),
        Operation::ListTasks => Ok(json!({ "tasks": orch.list_tasks().await })),
        Operation::ListTaskTypes => {
            Ok(json!({ "task_types": to_value(orch.list_task_types().await)? }))
        }
        Operation::ListAgentTypes => {
            Ok(json!({ "agent_types": to_value(orch.list_agent_types().await)? }))
        }
        Operation::ListAssignments => {
            Ok(json!({ "assignments": to_value(orch.list_assignments().await)? }))
        }
        Operation::GetTask => {
            let task = orch.get_task(str_field(payload, "task_id")?).await?;
            to_value(task)
        }
        Operation::GetAgent => {
            let name = str_field(payload, "name")?;
            let summary = orch.get_agent(name).await?;
            let memory = orch.agent_memory(name).await?;
            Ok(json!({ "agent": to_value(summary)?, "memory": to_value(memory)? }))
        }
    }
}
