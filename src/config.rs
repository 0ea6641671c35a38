//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `HIVE__*` 覆盖（双下划线表示嵌套，如 `HIVE__AGENT__MAX_STEPS=8`）。
//! 密钥不写入配置文件：OPENAI_API_KEY / SERPER_API_KEY 直接读环境变量。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub agent: AgentSection,
    pub tools: ToolsSection,
    pub server: ServerSection,
}

/// [app] 段
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
}

impl AppSection {
    /// 日志与启动横幅中使用的名称
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("hive")
    }
}

/// [llm] 段：推理引擎后端选择
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai / mock；openai 缺少 API Key 时退回 mock
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: f32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            base_url: None,
            temperature: 0.7,
        }
    }
}

/// [agent] 段：ReAct 步数预算与实体创建策略
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// 单次 run 最多调用推理引擎的步数（含纠正重试）
    pub max_steps: usize,
    /// true：AgentType 声明的未知工具在创建 Agent 时被跳过；false：报 ValidationError
    pub lenient_tools: bool,
    /// true：重复 add_agent 报 AlreadyExistsError；false：静默替换（记忆随之丢弃）
    pub strict_agent_names: bool,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_steps: crate::react::DEFAULT_MAX_STEPS,
            lenient_tools: true,
            strict_agent_names: false,
        }
    }
}

/// [tools] 段：工具超时、Web Search
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    pub tool_timeout_secs: u64,
    pub search: SearchSection,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: 30,
            search: SearchSection::default(),
        }
    }
}

/// [tools.search] 段：Serper 端点、超时、结果条数与最大字符数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub endpoint: String,
    /// 一般留空，由 SERPER_API_KEY 提供
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_results: usize,
    pub max_result_chars: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            endpoint: "https://google.serper.dev/search".to_string(),
            api_key: None,
            timeout_secs: 15,
            max_results: 5,
            max_result_chars: 4000,
        }
    }
}

/// [server] 段：HTTP 监听地址与启动时预置的示例类型
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    /// 启动时预置 "Market Research" 任务类型与 "Research Agent" 智能体类型
    pub seed_examples: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            seed_examples: true,
        }
    }
}

/// 从 config 目录加载配置，环境变量 HIVE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 HIVE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    for name in ["config/default", "../config/default"] {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("HIVE")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
