//! Echo 工具（离线调试用）

use async_trait::async_trait;

use crate::tools::Tool;

/// Echo 工具：回显输入文本
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "Echo"
    }

    fn description(&self) -> &str {
        "Echo the input text back unchanged (for testing)."
    }

    async fn execute(&self, input: &str) -> Result<String, String> {
        let text = input.trim();
        if text.is_empty() {
            Ok("(empty)".to_string())
        } else {
            Ok(text.to_string())
        }
    }
}
