//! Agent 记忆：按 Agent 作用域累积的对话轮次
//!
//! 记忆不按任务隔离：同一 Agent 执行的所有任务共享同一份记忆，后续任务可见先前任务的上下文。
//! 只追加，不清空；一次 run 成功后其全部轮次一次性提交（commit），失败时不留下半截记录。

use serde::{Deserialize, Serialize};

/// 单个记忆轮次
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemoryTurn {
    /// 一次工具调用：思考、动作、动作输入、观察结果
    Step {
        thought: String,
        action: String,
        action_input: String,
        observation: String,
    },
    /// 一次完整问答：任务 prompt 与最终答案
    Answer { question: String, answer: String },
}

impl MemoryTurn {
    pub fn is_answer(&self) -> bool {
        matches!(self, MemoryTurn::Answer { .. })
    }

    /// 渲染为 ReAct 文本格式（写入 prompt 的历史段）
    pub fn render(&self) -> String {
        match self {
            MemoryTurn::Step {
                thought,
                action,
                action_input,
                observation,
            } => format!(
                "Thought: {}\nAction: {}\nAction Input: {}\nObservation: {}",
                thought, action, action_input, observation
            ),
            MemoryTurn::Answer { question, answer } => {
                format!("Question: {}\nFinal Answer: {}", question.trim_end(), answer)
            }
        }
    }
}

/// Agent 私有记忆：有序、单调增长
#[derive(Clone, Debug, Default)]
pub struct AgentMemory {
    turns: Vec<MemoryTurn>,
}

impl AgentMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: MemoryTurn) {
        self.turns.push(turn);
    }

    /// 一次性追加一次 run 的全部轮次
    pub fn commit(&mut self, turns: impl IntoIterator<Item = MemoryTurn>) {
        self.turns.extend(turns);
    }

    pub fn turns(&self) -> &[MemoryTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// 历史段文本；无记忆时为空串
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(MemoryTurn::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
