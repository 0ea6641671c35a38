//! Agent 运行时
//!
//! 每个 Agent 持有固定工具集、私有记忆与 Planner；run 对单个任务 prompt 跑 ReAct 并返回最终答案。
//! 两把锁：run 锁在整个 run 期间持有（所有退出路径都会释放），同一 Agent 的并发执行因此串行化；
//! 已提交的记忆放在读写锁后，只在 run 成功结束时写一次，读接口不等待进行中的推理与工具调用。

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::{AgentMemory, MemoryTurn};
use crate::react::{react_loop, Planner};
use crate::tools::ToolExecutor;

pub struct Agent {
    name: String,
    agent_type: String,
    planner: Planner,
    executor: ToolExecutor,
    max_steps: usize,
    run_lock: Mutex<()>,
    memory: RwLock<AgentMemory>,
}

/// Agent 摘要（读接口返回的副本）
#[derive(Clone, Debug, serde::Serialize)]
pub struct AgentSummary {
    pub name: String,
    pub agent_type: String,
    pub tools: Vec<String>,
    pub memory_turns: usize,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        agent_type: impl Into<String>,
        llm: Arc<dyn LlmClient>,
        executor: ToolExecutor,
        max_steps: usize,
    ) -> Self {
        Self {
            name: name.into(),
            agent_type: agent_type.into(),
            planner: Planner::new(llm),
            executor,
            max_steps,
            run_lock: Mutex::new(()),
            memory: RwLock::new(AgentMemory::new()),
        }
    }

    pub fn agent_type(&self) -> &str {
        &self.agent_type
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.executor.tool_names()
    }

    /// 跑一次 ReAct；成功时本次的全部轮次提交到记忆，失败时记忆保持不变
    pub async fn run(&self, prompt: &str) -> Result<String, AgentError> {
        let _running = self.run_lock.lock().await;
        // run 锁保证期间没有其它提交，读一份历史即可
        let history = self.memory.read().await.clone();
        let result = react_loop(&self.planner, &self.executor, &history, prompt, self.max_steps)
            .await
            .inspect_err(|e| tracing::warn!(agent = %self.name, error = %e, "agent run failed"))?;

        let added = result.turns.len();
        let memory_turns = {
            let mut memory = self.memory.write().await;
            memory.commit(result.turns);
            memory.len()
        };
        let (prompt_tokens, completion_tokens, total_tokens) = self.planner.token_usage();
        tracing::info!(
            agent = %self.name,
            steps = result.steps,
            memory_turns,
            added,
            prompt_tokens,
            completion_tokens,
            total_tokens,
            "agent run finished"
        );
        Ok(result.response)
    }

    /// 已提交记忆的副本；不等待进行中的 run
    pub async fn memory_snapshot(&self) -> Vec<MemoryTurn> {
        self.memory.read().await.turns().to_vec()
    }

    pub async fn summary(&self) -> AgentSummary {
        AgentSummary {
            name: self.name.clone(),
            agent_type: self.agent_type.clone(),
            tools: self.tool_names(),
            memory_turns: self.memory.read().await.len(),
        }
    }
}
