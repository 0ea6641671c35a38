//! Hive - 任务编排智能体服务
//!
//! 模块划分：
//! - **agent**: Agent 运行时（固定工具集 + 私有记忆 + ReAct）
//! - **api**: 边界操作分发与 HTTP 传输层（feature = "web"）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、任务、分配账本、编排服务
//! - **llm**: 推理引擎抽象与实现（OpenAI 兼容 / Mock / 脚本）
//! - **memory**: 消息类型与 Agent 记忆轮次
//! - **react**: Prompt、输出解析、ReAct 主循环
//! - **tools**: 工具注册表（Web Search、Echo）与执行器

pub mod agent;
pub mod api;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod react;
pub mod tools;
