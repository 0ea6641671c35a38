//! Planner：调用推理引擎并解析 ReAct 输出
//!
//! 推理引擎回复两种形态之一：`Action` + `Action Input`（调用工具）或 `Final Answer`（结束）。
//! parse_llm_output 将文本解析为 PlannerOutput；两者都不匹配（或同时出现）视为格式错误。

use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::Message;

const FINAL_ANSWER: &str = "Final Answer:";

/// Planner 输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerOutput {
    /// 需要执行工具
    Action {
        thought: String,
        tool: String,
        input: String,
    },
    /// 最终答案
    FinalAnswer { thought: String, text: String },
}

fn action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
            .unwrap_or_else(|e| panic!("invalid action regex: {e}"))
    })
}

/// 取 `Action`/`Final Answer` 之前的思考文本（去掉 `Thought:` 前缀）
fn extract_thought(text: &str, end: usize) -> String {
    let head = text[..end].trim();
    head.strip_prefix("Thought:").unwrap_or(head).trim().to_string()
}

/// 解析推理引擎输出
pub fn parse_llm_output(output: &str) -> Result<PlannerOutput, AgentError> {
    let text = output.trim();
    let action = action_regex().captures(text);
    let final_idx = text.find(FINAL_ANSWER);

    match (action, final_idx) {
        (Some(caps), None) => {
            let tool = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            if tool.is_empty() {
                return Err(AgentError::ReasoningFormat(format!(
                    "missing tool name: {text}"
                )));
            }
            let input = caps
                .get(2)
                .map(|m| m.as_str())
                .unwrap_or_default()
                // 模型常把下一轮的 Observation 一并编造出来，截掉
                .split("\nObservation")
                .next()
                .unwrap_or_default()
                .trim()
                .trim_matches('"')
                .to_string();
            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            Ok(PlannerOutput::Action {
                thought: extract_thought(text, start),
                tool: tool.to_string(),
                input,
            })
        }
        (None, Some(idx)) => Ok(PlannerOutput::FinalAnswer {
            thought: extract_thought(text, idx),
            text: text[idx + FINAL_ANSWER.len()..].trim().to_string(),
        }),
        (Some(_), Some(_)) => Err(AgentError::ReasoningFormat(format!(
            "both a final answer and an action: {text}"
        ))),
        (None, None) => Err(AgentError::ReasoningFormat(format!(
            "could not parse output: {text}"
        ))),
    }
}

/// Planner：持有推理引擎，负责把 system + user 拼成消息序列并调用
pub struct Planner {
    llm: Arc<dyn LlmClient>,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 获取 LLM 累计 token 使用统计
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.llm.token_usage()
    }

    pub async fn plan(&self, system: &str, user: &str) -> Result<String, AgentError> {
        let messages = vec![Message::system(system), Message::user(user)];
        self.llm.complete(&messages).await.map_err(AgentError::LlmError)
    }
}
