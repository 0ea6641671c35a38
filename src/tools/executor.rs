//! 工具执行器
//!
//! 持有某个 Agent 的工具集（有序）与全局超时；execute(tool_name, input) 在超时内调用工具，
//! 不在工具集中返回 UnknownTool，超时或失败时转为 AgentError（ToolTimeout / ToolExecutionFailed）；
//! 每次调用输出结构化审计日志（JSON）。

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::core::AgentError;
use crate::tools::Tool;

/// 工具执行器：对每次调用施加超时，并将结果映射为 AgentError
#[derive(Clone)]
pub struct ToolExecutor {
    tools: Vec<Arc<dyn Tool>>,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(tools: Vec<Arc<dyn Tool>>, timeout_secs: u64) -> Self {
        Self {
            tools,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name.trim()).cloned()
    }

    /// 执行指定工具；输出 JSON 审计日志
    pub async fn execute(&self, tool_name: &str, input: &str) -> Result<String, AgentError> {
        let tool = self
            .get_tool(tool_name)
            .ok_or_else(|| AgentError::UnknownTool(tool_name.to_string()))?;

        let start = Instant::now();
        let result = timeout(self.timeout, tool.execute(input)).await;

        let (ok, outcome): (bool, &str) = match &result {
            Ok(Ok(_)) => (true, "ok"),
            Ok(Err(_)) => (false, "error"),
            Err(_) => (false, "timeout"),
        };
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool.name(),
            "ok": ok,
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "input_preview": input_preview(input),
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        match result {
            Ok(Ok(content)) => Ok(content),
            Ok(Err(e)) => Err(AgentError::ToolExecutionFailed(e)),
            Err(_) => Err(AgentError::ToolTimeout(tool_name.to_string())),
        }
    }

    /// 工具名（有序）
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// (name, description) 列表，用于生成 prompt 中的工具目录
    pub fn tool_descriptions(&self) -> Vec<(String, String)> {
        self.tools
            .iter()
            .map(|t| (t.name().to_string(), t.description().to_string()))
            .collect()
    }
}

fn input_preview(input: &str) -> String {
    if input.chars().count() > 200 {
        format!("{}...", input.chars().take(200).collect::<String>())
    } else {
        input.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::EchoTool;
    use async_trait::async_trait;

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &str {
            "Slow"
        }

        fn description(&self) -> &str {
            "sleeps"
        }

        async fn execute(&self, _input: &str) -> Result<String, String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "Fail"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        async fn execute(&self, _input: &str) -> Result<String, String> {
            Err("network down".to_string())
        }
    }

    #[tokio::test]
    async fn test_execute_known_tool() {
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(EchoTool)];
        let exec = ToolExecutor::new(tools, 5);
        assert_eq!(exec.execute("Echo", " hi ").await.unwrap(), "hi");
        assert_eq!(exec.tool_names(), vec!["Echo".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(EchoTool)];
        let exec = ToolExecutor::new(tools, 5);
        assert!(matches!(
            exec.execute("Web Search", "q").await,
            Err(AgentError::UnknownTool(n)) if n == "Web Search"
        ));
    }

    #[tokio::test]
    async fn test_failure_and_timeout() {
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(FailingTool), Arc::new(SlowTool)];
        let exec = ToolExecutor::new(tools, 0);
        assert!(matches!(
            exec.execute("Fail", "x").await,
            Err(AgentError::ToolExecutionFailed(m)) if m == "network down"
        ));
        assert!(matches!(
            exec.execute("Slow", "x").await,
            Err(AgentError::ToolTimeout(_))
        ));
    }
}
