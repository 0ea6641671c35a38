//! 核心层：错误类型、任务、分配账本、编排服务

pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod task;

pub use error::{AgentError, ServiceError};
pub use ledger::{Assignment, AssignmentLedger};
pub use orchestrator::{create_llm_from_config, Orchestrator};
pub use task::{render_params, Task, TaskParams, TaskResult, TaskSnapshot};
