//! 工具注册表
//!
//! 工具种类为封闭集合 ToolKind（按声明名解析），每种工具实现 Tool trait（name / description / execute）。
//! ToolRegistry 在构建时按配置实例化全部已知工具；Agent 创建时按 AgentType 声明的工具名挑选子集，
//! 无法解析的名称由调用方决定宽松跳过或报错。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::core::AgentError;
use crate::tools::{EchoTool, WebSearchTool};

/// 工具 trait：名称、描述（供推理引擎理解）、异步执行（输入为 Action Input 文本）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（与 ReAct 输出中的 Action 一致）
    fn name(&self) -> &str;

    /// 一行描述
    fn description(&self) -> &str;

    /// 执行工具；Err 会作为观察结果回灌给推理引擎
    async fn execute(&self, input: &str) -> Result<String, String>;
}

/// 已实现的工具种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    WebSearch,
    Echo,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::WebSearch, ToolKind::Echo];

    /// 声明名（AgentType 的 tools 列表中使用的名字）
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::WebSearch => "Web Search",
            ToolKind::Echo => "Echo",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name.trim())
    }
}

/// Agent 创建时的工具挑选结果
pub struct ToolSelection {
    /// 按声明顺序去重后的工具
    pub tools: Vec<Arc<dyn Tool>>,
    /// 无法解析而被跳过的声明名
    pub skipped: Vec<String>,
}

/// 工具注册表：ToolKind -> 已实例化的工具
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<ToolKind, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按配置实例化工具；Echo 只在 mock 推理引擎下提供
    pub fn from_config(cfg: &AppConfig) -> Self {
        let mut registry = Self::new();
        registry.register(ToolKind::WebSearch, WebSearchTool::from_config(&cfg.tools.search));
        if cfg.llm.provider.eq_ignore_ascii_case("mock") {
            registry.register(ToolKind::Echo, EchoTool);
        }
        registry
    }

    /// 注册（或替换）某一种工具的实现
    pub fn register(&mut self, kind: ToolKind, tool: impl Tool + 'static) {
        self.tools.insert(kind, Arc::new(tool));
    }

    /// 解析声明名；未知或未注册实现时返回 UnknownTool
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, AgentError> {
        ToolKind::from_name(name)
            .and_then(|k| self.tools.get(&k).cloned())
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    /// 按声明顺序挑选工具集
    pub fn select(&self, declared: &[String]) -> ToolSelection {
        let mut tools: Vec<Arc<dyn Tool>> = Vec::new();
        let mut skipped = Vec::new();
        for name in declared {
            match self.resolve(name) {
                Ok(tool) => {
                    if !tools.iter().any(|t| t.name() == tool.name()) {
                        tools.push(tool);
                    }
                }
                Err(_) => skipped.push(name.clone()),
            }
        }
        ToolSelection { tools, skipped }
    }
}
