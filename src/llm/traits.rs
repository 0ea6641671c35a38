//! 推理引擎抽象
//!
//! 所有后端（OpenAI 兼容 / Mock / Scripted）实现 LlmClient：complete 为单次请求/响应，
//! 核心需容忍任意延迟与偶发的格式错误输出（由 ReAct 循环的单次纠正重试处理）。

use async_trait::async_trait;

use crate::memory::Message;

/// LLM 客户端 trait：给定结构化 prompt（消息序列），返回原始文本
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
