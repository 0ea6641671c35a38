//! 编排服务：对外门面
//!
//! 独占持有全部状态表（任务类型、智能体类型、任务、智能体、分配账本），实体之间只按 id / 名称查找，不互相持有。
//! 每张表一把读写锁：读操作可并发，写操作只在单次插入/覆盖期间独占；
//! 推理引擎与工具调用（慢 I/O）在所有表锁之外进行，只持有对应 Agent 的记忆锁。
//! 固定加锁顺序：task_types -> agent_types -> tasks -> agents -> assignments。

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::agent::{Agent, AgentSummary};
use crate::config::{AgentSection, AppConfig};
use crate::core::ledger::{Assignment, AssignmentLedger};
use crate::core::task::{Task, TaskParams, TaskSnapshot};
use crate::core::ServiceError;
use crate::llm::{LlmClient, MockLlmClient, OpenAiClient};
use crate::memory::MemoryTurn;
use crate::tools::{ToolExecutor, ToolRegistry};

/// 未提供描述时的任务类型描述
pub const DEFAULT_TASK_TYPE_DESCRIPTION: &str = "No description provided.";

/// 根据配置与环境变量选择推理引擎（OpenAI 兼容 / Mock）
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let api_key = std::env::var("OPENAI_API_KEY").ok();

    match (provider.as_str(), api_key) {
        ("openai", Some(key)) => {
            tracing::info!("Using OpenAI LLM ({})", cfg.llm.model);
            Arc::new(OpenAiClient::new(
                cfg.llm.base_url.as_deref(),
                &cfg.llm.model,
                Some(&key),
                cfg.llm.temperature,
            ))
        }
        ("mock", _) => {
            tracing::info!("Using Mock LLM");
            Arc::new(MockLlmClient)
        }
        _ => {
            tracing::warn!("No API key set or provider unknown, using Mock LLM");
            Arc::new(MockLlmClient)
        }
    }
}

pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    settings: AgentSection,
    tool_timeout_secs: u64,
    task_types: RwLock<IndexMap<String, String>>,
    agent_types: RwLock<IndexMap<String, Vec<String>>>,
    tasks: RwLock<IndexMap<String, Arc<Task>>>,
    agents: RwLock<IndexMap<String, Arc<Agent>>>,
    assignments: RwLock<AssignmentLedger>,
}

fn require(value: &str) -> Option<&str> {
    let v = value.trim();
    (!v.is_empty()).then_some(v)
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry, cfg: &AppConfig) -> Self {
        Self {
            llm,
            tools,
            settings: cfg.agent.clone(),
            tool_timeout_secs: cfg.tools.tool_timeout_secs,
            task_types: RwLock::new(IndexMap::new()),
            agent_types: RwLock::new(IndexMap::new()),
            tasks: RwLock::new(IndexMap::new()),
            agents: RwLock::new(IndexMap::new()),
            assignments: RwLock::new(AssignmentLedger::new()),
        }
    }

    /// 按配置构建推理引擎与工具注册表
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(create_llm_from_config(cfg), ToolRegistry::from_config(cfg), cfg)
    }

    /// 预置示例类型："Market Research" 任务类型与 "Research Agent" 智能体类型
    pub async fn seed_examples(&self) -> Result<(), ServiceError> {
        self.define_task_type(
            "Market Research",
            Some("Research market trends and analyze competitor data."),
        )
        .await?;
        self.define_agent_type(
            "Research Agent",
            vec!["Web Search".to_string(), "Data Analysis".to_string()],
        )
        .await
    }

    /// 定义（或覆盖）任务类型
    pub async fn define_task_type(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<(), ServiceError> {
        let name = require(name)
            .ok_or_else(|| ServiceError::Validation("Task type is required".to_string()))?;
        let description = description
            .and_then(require)
            .unwrap_or(DEFAULT_TASK_TYPE_DESCRIPTION);
        self.task_types
            .write()
            .await
            .insert(name.to_string(), description.to_string());
        tracing::info!(task_type = %name, "task type defined");
        Ok(())
    }

    /// 定义（或覆盖）智能体类型及其声明的工具名
    pub async fn define_agent_type(
        &self,
        name: &str,
        tools: Vec<String>,
    ) -> Result<(), ServiceError> {
        let name = require(name)
            .ok_or_else(|| ServiceError::Validation("Agent type is required".to_string()))?;
        tracing::info!(agent_type = %name, tools = ?tools, "agent type defined");
        self.agent_types.write().await.insert(name.to_string(), tools);
        Ok(())
    }

    /// 创建任务，返回任务 id
    pub async fn add_task(
        &self,
        name: &str,
        description: &str,
        task_type: &str,
    ) -> Result<String, ServiceError> {
        let (Some(name), Some(description), Some(task_type)) =
            (require(name), require(description), require(task_type))
        else {
            return Err(ServiceError::Validation(
                "Task name, description, and type are required".to_string(),
            ));
        };
        if !self.task_types.read().await.contains_key(task_type) {
            return Err(ServiceError::Validation("Task type not defined".to_string()));
        }
        let task = Arc::new(Task::new(name, description, task_type));
        let id = task.id().to_string();
        self.tasks.write().await.insert(id.clone(), task);
        tracing::info!(task_id = %id, name = %name, "task added");
        Ok(id)
    }

    /// 创建智能体：按类型声明解析工具，记忆为空；重名时按配置覆盖或报错
    pub async fn add_agent(&self, name: &str, agent_type: &str) -> Result<String, ServiceError> {
        let (Some(name), Some(agent_type)) = (require(name), require(agent_type)) else {
            return Err(ServiceError::Validation(
                "Agent name and type are required".to_string(),
            ));
        };
        let declared = self
            .agent_types
            .read()
            .await
            .get(agent_type)
            .cloned()
            .ok_or_else(|| ServiceError::Validation("Agent type not defined".to_string()))?;

        let selection = self.tools.select(&declared);
        if !selection.skipped.is_empty() {
            if !self.settings.lenient_tools {
                return Err(ServiceError::Validation(format!(
                    "Unknown tools for agent type '{}': {}",
                    agent_type,
                    selection.skipped.join(", ")
                )));
            }
            tracing::warn!(agent = %name, skipped = ?selection.skipped, "unresolvable tools skipped");
        }

        let agent = Arc::new(Agent::new(
            name,
            agent_type,
            self.llm.clone(),
            ToolExecutor::new(selection.tools, self.tool_timeout_secs),
            self.settings.max_steps,
        ));

        let mut agents = self.agents.write().await;
        if agents.contains_key(name) {
            if self.settings.strict_agent_names {
                return Err(ServiceError::AlreadyExists(format!(
                    "Agent '{}' already exists",
                    name
                )));
            }
            tracing::warn!(agent = %name, "agent replaced, previous memory discarded");
        }
        agents.insert(name.to_string(), agent);
        tracing::info!(agent = %name, agent_type = %agent_type, "agent added");
        Ok(name.to_string())
    }

    /// 将任务分配给智能体（覆盖旧分配）
    pub async fn assign_task(
        &self,
        agent_name: &str,
        task_id: &str,
    ) -> Result<Assignment, ServiceError> {
        let task_known = self.tasks.read().await.contains_key(task_id);
        let agent_known = self.agents.read().await.contains_key(agent_name);
        let assignment =
            self.assignments
                .write()
                .await
                .assign(task_id, agent_name, task_known, agent_known)?;
        tracing::info!(task_id = %task_id, agent = %agent_name, "task assigned");
        Ok(assignment)
    }

    /// 执行已分配的任务；结果追加到任务历史并返回
    pub async fn execute_task(
        &self,
        task_id: &str,
        params: TaskParams,
    ) -> Result<String, ServiceError> {
        let agent_name = self.assignments.read().await.resolve(task_id)?;
        let task = self
            .tasks
            .read()
            .await
            .get(task_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Task '{}' not found", task_id)))?;
        let agent = self
            .agents
            .read()
            .await
            .get(&agent_name)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Agent '{}' not found", agent_name)))?;

        tracing::info!(task_id = %task_id, agent = %agent_name, "executing task");
        let output = task.execute(&agent, params).await?;
        Ok(output)
    }

    pub async fn list_agents(&self) -> Vec<String> {
        self.agents.read().await.keys().cloned().collect()
    }

    pub async fn list_tasks(&self) -> Vec<String> {
        self.tasks.read().await.keys().cloned().collect()
    }

    pub async fn list_task_types(&self) -> IndexMap<String, String> {
        self.task_types.read().await.clone()
    }

    pub async fn list_agent_types(&self) -> IndexMap<String, Vec<String>> {
        self.agent_types.read().await.clone()
    }

    pub async fn list_assignments(&self) -> IndexMap<String, Assignment> {
        self.assignments.read().await.snapshot()
    }

    pub async fn is_executable(&self, task_id: &str) -> bool {
        self.assignments.read().await.is_executable(task_id)
    }

    pub async fn get_task(&self, task_id: &str) -> Result<TaskSnapshot, ServiceError> {
        self.tasks
            .read()
            .await
            .get(task_id)
            .map(|t| t.snapshot())
            .ok_or_else(|| ServiceError::NotFound(format!("Task '{}' not found", task_id)))
    }

    fn find_agent(agents: &IndexMap<String, Arc<Agent>>, name: &str) -> Result<Arc<Agent>, ServiceError> {
        agents
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Agent '{}' not found", name)))
    }

    /// 智能体摘要（含工具与记忆轮数）
    pub async fn get_agent(&self, name: &str) -> Result<AgentSummary, ServiceError> {
        let agent = Self::find_agent(&*self.agents.read().await, name)?;
        Ok(agent.summary().await)
    }

    /// 智能体记忆副本
    pub async fn agent_memory(&self, name: &str) -> Result<Vec<MemoryTurn>, ServiceError> {
        let agent = Self::find_agent(&*self.agents.read().await, name)?;
        Ok(agent.memory_snapshot().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlmClient;
    use crate::tools::{EchoTool, ToolKind};

    fn orchestrator(llm: Arc<ScriptedLlmClient>, cfg: AppConfig) -> Orchestrator {
        let mut tools = ToolRegistry::new();
        tools.register(ToolKind::Echo, EchoTool);
        Orchestrator::new(llm, tools, &cfg)
    }

    #[tokio::test]
    async fn test_task_type_upsert() {
        let orch = orchestrator(Arc::default(), AppConfig::default());
        orch.define_task_type("Research", Some("v1")).await.unwrap();
        orch.define_task_type("Research", Some("v2")).await.unwrap();
        orch.define_task_type("Other", None).await.unwrap();
        let types = orch.list_task_types().await;
        assert_eq!(types.len(), 2);
        assert_eq!(types["Research"], "v2");
        assert_eq!(types["Other"], DEFAULT_TASK_TYPE_DESCRIPTION);
    }

    #[tokio::test]
    async fn test_agent_type_upsert() {
        let orch = orchestrator(Arc::default(), AppConfig::default());
        orch.define_agent_type("Helper", vec!["Echo".into()]).await.unwrap();
        orch.define_agent_type("Helper", vec!["Web Search".into(), "Echo".into()])
            .await
            .unwrap();
        let types = orch.list_agent_types().await;
        assert_eq!(types.len(), 1);
        assert_eq!(
            types["Helper"],
            vec!["Web Search".to_string(), "Echo".to_string()]
        );
        let err = orch.define_agent_type("  ", vec![]).await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert_eq!(orch.list_agent_types().await.len(), 1);
    }

    #[tokio::test]
    async fn test_add_task_validation() {
        let orch = orchestrator(Arc::default(), AppConfig::default());
        let err = orch.add_task("T1", "desc", "Nope").await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        let err = orch.add_task("", "desc", "Nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Task name, description, and type are required");
        assert!(orch.list_tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_agent_lenient_and_strict_tools() {
        let orch = orchestrator(Arc::default(), AppConfig::default());
        orch.define_agent_type("Helper", vec!["Echo".into(), "Data Analysis".into()])
            .await
            .unwrap();
        orch.add_agent("A1", "Helper").await.unwrap();
        assert_eq!(orch.get_agent("A1").await.unwrap().tools, vec!["Echo".to_string()]);

        let mut cfg = AppConfig::default();
        cfg.agent.lenient_tools = false;
        let strict = orchestrator(Arc::default(), cfg);
        strict
            .define_agent_type("Helper", vec!["Echo".into(), "Data Analysis".into()])
            .await
            .unwrap();
        let err = strict.add_agent("A1", "Helper").await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert!(err.to_string().contains("Data Analysis"));
    }

    #[tokio::test]
    async fn test_add_agent_unknown_type() {
        let orch = orchestrator(Arc::default(), AppConfig::default());
        let err = orch.add_agent("A1", "Ghost").await.unwrap_err();
        assert_eq!(err.to_string(), "Agent type not defined");
    }

    #[tokio::test]
    async fn test_duplicate_agent_resets_memory() {
        let llm = Arc::new(ScriptedLlmClient::new(["Final Answer: done"]));
        let orch = orchestrator(llm, AppConfig::default());
        orch.define_task_type("R", None).await.unwrap();
        orch.define_agent_type("Helper", vec![]).await.unwrap();
        let task_id = orch.add_task("T1", "d", "R").await.unwrap();
        orch.add_agent("A1", "Helper").await.unwrap();
        orch.assign_task("A1", &task_id).await.unwrap();
        orch.execute_task(&task_id, TaskParams::new()).await.unwrap();
        assert_eq!(orch.agent_memory("A1").await.unwrap().len(), 1);

        orch.add_agent("A1", "Helper").await.unwrap();
        assert!(orch.agent_memory("A1").await.unwrap().is_empty());
        assert_eq!(orch.list_agents().await, vec!["A1".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_agent_strict_names() {
        let mut cfg = AppConfig::default();
        cfg.agent.strict_agent_names = true;
        let orch = orchestrator(Arc::default(), cfg);
        orch.define_agent_type("Helper", vec![]).await.unwrap();
        orch.add_agent("A1", "Helper").await.unwrap();
        let err = orch.add_agent("A1", "Helper").await.unwrap_err();
        assert_eq!(err.kind(), "AlreadyExistsError");
    }

    #[tokio::test]
    async fn test_assign_unknown_entities() {
        let orch = orchestrator(Arc::default(), AppConfig::default());
        let err = orch.assign_task("A1", "missing").await.unwrap_err();
        assert_eq!(err.kind(), "NotFoundError");
        assert!(orch.list_assignments().await.is_empty());
    }

    #[tokio::test]
    async fn test_seed_examples() {
        let orch = orchestrator(Arc::default(), AppConfig::default());
        orch.seed_examples().await.unwrap();
        assert!(orch.list_task_types().await.contains_key("Market Research"));
        assert_eq!(
            orch.list_agent_types().await["Research Agent"],
            vec!["Web Search".to_string(), "Data Analysis".to_string()]
        );
    }
}
