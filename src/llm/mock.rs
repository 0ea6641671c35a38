//! Mock / Scripted LLM 客户端（用于离线运行与测试，无需 API）
//!
//! MockLlmClient 直接给出 Final Answer，便于本地跑通整个任务流程；
//! ScriptedLlmClient 按顺序回放预置回复，并记录每次收到的 prompt，供测试断言。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

/// Mock 客户端：对最后一条 User 消息的首行给出最终答案
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");
        let headline = last_user
            .lines()
            .find(|l| l.contains("Complete the following task:"))
            .or_else(|| last_user.lines().find(|l| !l.trim().is_empty()))
            .unwrap_or("(no input)");

        Ok(format!(
            "Thought: I can answer without tools.\nFinal Answer: Mock result for '{}'",
            headline.trim().trim_start_matches("Question: ")
        ))
    }
}

/// 回放客户端：依次返回预置回复；回复耗尽时返回 Err
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedLlmClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 追加一次传输失败（模拟网络错误）
    pub fn push_failure(&self, err: impl Into<String>) {
        if let Ok(mut q) = self.replies.lock() {
            q.push_back(Err(err.into()));
        }
    }

    /// 已收到的全部请求（每次 complete 一份消息序列）
    pub fn prompts(&self) -> Vec<Vec<Message>> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        if let Ok(mut p) = self.prompts.lock() {
            p.push(messages.to_vec());
        }
        let next = self
            .replies
            .lock()
            .map_err(|e| e.to_string())?
            .pop_front();
        next.unwrap_or_else(|| Err("script exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_answers_task_headline() {
        let out = MockLlmClient
            .complete(&[Message::user(
                "Complete the following task: T1\nResearch trends\n",
            )])
            .await
            .unwrap();
        assert!(out.contains("Final Answer:"));
        assert!(out.contains("T1"));
    }

    #[tokio::test]
    async fn test_scripted_replays_in_order() {
        let llm = ScriptedLlmClient::new(["first", "second"]);
        llm.push_failure("boom");
        assert_eq!(llm.complete(&[]).await.unwrap(), "first");
        assert_eq!(llm.complete(&[]).await.unwrap(), "second");
        assert_eq!(llm.complete(&[]).await.unwrap_err(), "boom");
        assert!(llm.complete(&[]).await.is_err());
        assert_eq!(llm.calls(), 4);
    }
}
