//! 错误类型
//!
//! AgentError 为 ReAct 循环内部错误（推理格式、步数超限、工具失败等）；
//! ServiceError 为编排服务对外暴露的错误，kind() 给出稳定的错误种类字符串，供传输层映射。

use thiserror::Error;

/// Agent 运行过程中可能出现的错误（推理引擎、解析、工具、步数预算）
#[derive(Error, Debug)]
pub enum AgentError {
    /// 推理引擎输出在一次纠正重试后仍无法解析
    #[error("Reasoning format error: {0}")]
    ReasoningFormat(String),

    /// 超出步数预算；transcript 仅用于诊断，不是可用答案
    #[error("Step budget exceeded after {steps} steps")]
    StepBudgetExceeded { steps: usize, transcript: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("LLM error: {0}")]
    LlmError(String),
}

/// 编排服务边界错误：每个操作独立失败，不影响进程与其它实体
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NotAssigned(String),

    /// 仅在 strict_agent_names 开启时出现
    #[error("{0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Execution(#[from] AgentError),
}

impl ServiceError {
    /// 对外的错误种类（与 message 组成 (kind, message) 错误对）
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "ValidationError",
            ServiceError::NotFound(_) => "NotFoundError",
            ServiceError::NotAssigned(_) => "NotAssignedError",
            ServiceError::AlreadyExists(_) => "AlreadyExistsError",
            ServiceError::Execution(AgentError::ReasoningFormat(_)) => "ReasoningFormatError",
            ServiceError::Execution(AgentError::StepBudgetExceeded { .. }) => {
                "StepBudgetExceededError"
            }
            ServiceError::Execution(AgentError::UnknownTool(_)) => "UnknownToolError",
            ServiceError::Execution(_) => "ExecutionError",
        }
    }

    /// 步数超限时附带的诊断 transcript
    pub fn diagnostic_transcript(&self) -> Option<&str> {
        match self {
            ServiceError::Execution(AgentError::StepBudgetExceeded { transcript, .. }) => {
                Some(transcript.as_str())
            }
            _ => None,
        }
    }
}
