//! 编排集成测试：通过边界 API 跑完整的任务生命周期

use std::sync::Arc;

use async_trait::async_trait;
use hive::api::{dispatch, Operation};
use hive::config::AppConfig;
use hive::core::Orchestrator;
use hive::llm::ScriptedLlmClient;
use hive::memory::MemoryTurn;
use hive::tools::{EchoTool, Tool, ToolKind, ToolRegistry};
use serde_json::{json, Value};

/// 固定返回的搜索替身，不访问网络
struct CannedSearch;

#[async_trait]
impl Tool for CannedSearch {
    fn name(&self) -> &str {
        "Web Search"
    }

    fn description(&self) -> &str {
        "Tool to perform web searches. Input should be a search query."
    }

    async fn execute(&self, input: &str) -> Result<String, String> {
        Ok(format!("Top result for {}: EU AI adoption up 20%", input))
    }
}

fn orchestrator(llm: Arc<ScriptedLlmClient>, cfg: AppConfig) -> Orchestrator {
    let mut tools = ToolRegistry::new();
    tools.register(ToolKind::WebSearch, CannedSearch);
    tools.register(ToolKind::Echo, EchoTool);
    Orchestrator::new(llm, tools, &cfg)
}

async fn call(orch: &Orchestrator, op: Operation, payload: Value) -> Value {
    dispatch(orch, op, &payload)
        .await
        .unwrap_or_else(|e| panic!("{} failed: {:?}", op.name(), e))
}

/// 预置类型并创建 T1 / A1，返回 task_id
async fn market_research(orch: &Orchestrator) -> String {
    orch.seed_examples().await.unwrap();
    let body = call(
        orch,
        Operation::AddTask,
        json!({
            "name": "T1",
            "description": "Research the latest trends in AI",
            "task_type": "Market Research"
        }),
    )
    .await;
    call(
        orch,
        Operation::AddAgent,
        json!({"name": "A1", "agent_type": "Research Agent"}),
    )
    .await;
    body["task_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_market_research_end_to_end() {
    let llm = Arc::new(ScriptedLlmClient::new([
        "Thought: I should search.\nAction: Web Search\nAction Input: AI trends EU",
        "Thought: I now know the final answer\nFinal Answer: AI adoption in the EU is rising.",
    ]));
    let orch = orchestrator(llm.clone(), AppConfig::default());
    let task_id = market_research(&orch).await;

    // "Data Analysis" 无实现，创建时被跳过
    let agent = call(&orch, Operation::GetAgent, json!({"name": "A1"})).await;
    assert_eq!(agent["agent"]["tools"], json!(["Web Search"]));

    call(
        &orch,
        Operation::AssignTask,
        json!({"agent_name": "A1", "task_id": task_id}),
    )
    .await;
    assert!(orch.is_executable(&task_id).await);

    let body = call(
        &orch,
        Operation::ExecuteTask,
        json!({"task_id": task_id, "additional_data": {"region": "EU"}}),
    )
    .await;
    assert_eq!(body["result"], "AI adoption in the EU is rising.");

    // 任务 prompt 含参数；第二次调用能看到工具观察结果
    let prompts = llm.prompts();
    let first_user = &prompts[0][1].content;
    assert!(first_user.contains("Complete the following task: T1"));
    assert!(first_user.contains("region: EU"));
    assert!(prompts[1][1]
        .content
        .contains("Observation: Top result for AI trends EU"));

    let task = call(&orch, Operation::GetTask, json!({"task_id": task_id})).await;
    assert_eq!(task["result"], "AI adoption in the EU is rising.");
    assert_eq!(task["result_history"][0]["params"]["region"], "EU");

    let memory = orch.agent_memory("A1").await.unwrap();
    assert_eq!(memory.len(), 2);
    match &memory[1] {
        MemoryTurn::Answer { question, answer } => {
            assert!(question.contains("Complete the following task: T1"));
            assert!(question.contains("region: EU"));
            assert_eq!(answer, "AI adoption in the EU is rising.");
        }
        other => panic!("Expected Answer, got {:?}", other),
    }
}

#[tokio::test]
async fn test_execute_before_assign_is_rejected() {
    let llm = Arc::new(ScriptedLlmClient::default());
    let orch = orchestrator(llm.clone(), AppConfig::default());
    let task_id = market_research(&orch).await;

    let err = dispatch(&orch, Operation::ExecuteTask, &json!({"task_id": task_id}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, "NotAssignedError");
    assert_eq!(err.message, "Task is not assigned or does not exist.");
    assert_eq!(llm.calls(), 0);

    let task = orch.get_task(&task_id).await.unwrap();
    assert!(task.result.is_none());
    assert!(task.result_history.is_empty());
    assert!(!orch.is_executable(&task_id).await);
}

#[tokio::test]
async fn test_reassignment_routes_to_latest_agent() {
    let llm = Arc::new(ScriptedLlmClient::new(["Final Answer: from A2"]));
    let orch = orchestrator(llm, AppConfig::default());
    let task_id = market_research(&orch).await;
    call(
        &orch,
        Operation::AddAgent,
        json!({"name": "A2", "agent_type": "Research Agent"}),
    )
    .await;

    for agent in ["A1", "A2"] {
        call(
            &orch,
            Operation::AssignTask,
            json!({"agent_name": agent, "task_id": task_id}),
        )
        .await;
    }
    let assignments = orch.list_assignments().await;
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[&task_id].agent_name, "A2");

    call(&orch, Operation::ExecuteTask, json!({"task_id": task_id})).await;
    assert_eq!(orch.agent_memory("A2").await.unwrap().len(), 1);
    assert!(orch.agent_memory("A1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_history_grows_and_memory_accumulates() {
    let llm = Arc::new(ScriptedLlmClient::new([
        "Final Answer: first",
        "Final Answer: second",
    ]));
    let orch = orchestrator(llm.clone(), AppConfig::default());
    let task_id = market_research(&orch).await;
    call(
        &orch,
        Operation::AssignTask,
        json!({"agent_name": "A1", "task_id": task_id}),
    )
    .await;

    call(
        &orch,
        Operation::ExecuteTask,
        json!({"task_id": task_id, "additional_data": {"region": "EU"}}),
    )
    .await;
    call(
        &orch,
        Operation::ExecuteTask,
        json!({"task_id": task_id, "additional_data": {"region": "US"}}),
    )
    .await;

    let task = orch.get_task(&task_id).await.unwrap();
    let outputs: Vec<&str> = task
        .result_history
        .iter()
        .map(|r| r.output.as_str())
        .collect();
    assert_eq!(outputs, vec!["first", "second"]);
    assert_eq!(task.result.as_deref(), Some("second"));

    // 第二次执行的 prompt 带有第一次的问答
    let second = &llm.prompts()[1][1].content;
    assert!(second.contains("Final Answer: first"));
    assert!(second.contains("region: US"));
    assert_eq!(orch.agent_memory("A1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_step_budget_failure_keeps_state() {
    let mut cfg = AppConfig::default();
    cfg.agent.max_steps = 2;
    let llm = Arc::new(ScriptedLlmClient::new([
        "Action: Echo\nAction Input: 1",
        "Action: Echo\nAction Input: 2",
    ]));
    let orch = orchestrator(llm, cfg);
    orch.define_task_type("Chores", None).await.unwrap();
    orch.define_agent_type("Helper", vec!["Echo".to_string()])
        .await
        .unwrap();
    let task_id = orch.add_task("T1", "loop forever", "Chores").await.unwrap();
    orch.add_agent("A1", "Helper").await.unwrap();
    orch.assign_task("A1", &task_id).await.unwrap();

    let err = dispatch(&orch, Operation::ExecuteTask, &json!({"task_id": task_id}))
        .await
        .unwrap_err();
    assert_eq!(err.kind, "StepBudgetExceededError");
    assert!(err.transcript.unwrap_or_default().contains("Action Input: 2"));

    assert!(orch.get_task(&task_id).await.unwrap().result_history.is_empty());
    assert!(orch.agent_memory("A1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_operations() {
    let orch = orchestrator(Arc::default(), AppConfig::default());
    let task_id = market_research(&orch).await;

    let tasks = call(&orch, Operation::ListTasks, Value::Null).await;
    assert_eq!(tasks["tasks"], json!([task_id]));
    let agents = call(&orch, Operation::ListAgents, Value::Null).await;
    assert_eq!(agents["agents"], json!(["A1"]));
    let types = call(&orch, Operation::ListTaskTypes, Value::Null).await;
    assert_eq!(
        types["task_types"]["Market Research"],
        "Research market trends and analyze competitor data."
    );
    let agent_types = call(&orch, Operation::ListAgentTypes, Value::Null).await;
    assert_eq!(
        agent_types["agent_types"]["Research Agent"],
        json!(["Web Search", "Data Analysis"])
    );
    let assignments = call(&orch, Operation::ListAssignments, Value::Null).await;
    assert_eq!(assignments["assignments"], json!({}));
}
