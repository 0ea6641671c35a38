//! 任务：不可变的名称/描述 + 只追加的结果历史
//!
//! 任务是可复用的模板：每次执行用不同参数渲染 prompt，结果追加到历史，从不覆盖。

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::core::AgentError;

/// 执行参数：按插入顺序渲染
pub type TaskParams = IndexMap<String, String>;

/// 一次成功执行的结果
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskResult {
    pub output: String,
    pub params: TaskParams,
    pub completed_at: DateTime<Utc>,
}

/// 任务快照（读接口返回的副本）
#[derive(Clone, Debug, Serialize)]
pub struct TaskSnapshot {
    pub id: String,
    pub name: String,
    pub description: String,
    pub task_type: String,
    /// 最近一次结果
    pub result: Option<String>,
    pub result_history: Vec<TaskResult>,
}

#[derive(Debug)]
pub struct Task {
    id: String,
    name: String,
    description: String,
    task_type: String,
    history: Mutex<Vec<TaskResult>>,
}

/// 参数段：每项一行 "key: value"
pub fn render_params(params: &TaskParams) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}: {}\n", k, v))
        .collect()
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            task_type: task_type.into(),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    /// 渲染任务 prompt：名称、描述、参数段、输出格式要求
    pub fn build_prompt(&self, params: &TaskParams) -> String {
        format!(
            "Complete the following task: {}\n{}\n\nUse the following information:\n{}\n\
Please provide your response in a clear and concise format, indicating any tools used and the final output.\n",
            self.name,
            self.description,
            render_params(params)
        )
    }

    /// 用指定 Agent 执行一次；成功时结果追加到历史并返回
    pub async fn execute(&self, agent: &Agent, params: TaskParams) -> Result<String, AgentError> {
        let prompt = self.build_prompt(&params);
        let output = agent.run(&prompt).await?;
        self.record(TaskResult {
            output: output.clone(),
            params,
            completed_at: Utc::now(),
        });
        Ok(output)
    }

    fn record(&self, result: TaskResult) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push(result);
    }

    pub fn history(&self) -> Vec<TaskResult> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn latest_result(&self) -> Option<String> {
        self.history().last().map(|r| r.output.clone())
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        let result_history = self.history();
        TaskSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            task_type: self.task_type.clone(),
            result: result_history.last().map(|r| r.output.clone()),
            result_history,
        }
    }
}
