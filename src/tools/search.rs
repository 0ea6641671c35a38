//! Web Search 工具：通过 Serper（Google Search API）检索
//!
//! 输入为查询文本；输出优先取 answer box / knowledge graph，其次拼接前 N 条自然结果摘要。
//! 超过 max_result_chars 时截断并追加 ...[truncated]。未配置 API Key 或请求失败时返回 Err，
//! 由执行器转为观察结果，不会中断推理循环。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::SearchSection;
use crate::tools::Tool;

/// 查询参数（Serper 请求体）
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    pub q: String,
    pub num: usize,
}

impl SearchQuery {
    /// 从 Action Input 构造；去掉首尾引号与空白，空查询返回 None
    pub fn parse(input: &str, num: usize) -> Option<Self> {
        let q = input.trim().trim_matches('"').trim();
        if q.is_empty() {
            None
        } else {
            Some(Self {
                q: q.to_string(),
                num,
            })
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub answer_box: Option<AnswerBox>,
    #[serde(default)]
    pub knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    pub organic: Vec<OrganicResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnswerBox {
    pub answer: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KnowledgeGraph {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrganicResult {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

impl SearchResponse {
    /// 转为供推理引擎阅读的文本
    pub fn render(&self, max_results: usize) -> String {
        let mut lines = Vec::new();
        if let Some(ab) = &self.answer_box {
            if let Some(a) = ab.answer.as_deref().or(ab.snippet.as_deref()) {
                lines.push(format!("Answer: {}", a.trim()));
            }
        }
        if let Some(kg) = &self.knowledge_graph {
            if let Some(desc) = &kg.description {
                let title = kg.title.as_deref().unwrap_or("Summary");
                lines.push(format!("{}: {}", title, desc.trim()));
            }
        }
        for r in self.organic.iter().take(max_results) {
            let Some(snippet) = r.snippet.as_deref() else {
                continue;
            };
            let title = r.title.as_deref().unwrap_or("(untitled)");
            match &r.link {
                Some(link) => lines.push(format!("- {} ({}): {}", title, link, snippet.trim())),
                None => lines.push(format!("- {}: {}", title, snippet.trim())),
            }
        }
        if lines.is_empty() {
            "No good search result found".to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Web Search 工具：持有 HTTP 客户端、端点、API Key 与结果限制
pub struct WebSearchTool {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    max_results: usize,
    max_result_chars: usize,
}

impl WebSearchTool {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout_secs: u64,
        max_results: usize,
        max_result_chars: usize,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            max_results,
            max_result_chars,
        }
    }

    /// API Key 优先取配置，其次环境变量 SERPER_API_KEY
    pub fn from_config(cfg: &SearchSection) -> Self {
        let api_key = cfg
            .api_key
            .clone()
            .or_else(|| std::env::var("SERPER_API_KEY").ok());
        Self::new(
            cfg.endpoint.clone(),
            api_key,
            cfg.timeout_secs,
            cfg.max_results,
            cfg.max_result_chars,
        )
    }

    async fn search(&self, query: &SearchQuery) -> Result<String, String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| "Web search unavailable: SERPER_API_KEY not configured".to_string())?;
        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", api_key)
            .json(query)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }
        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| format!("Invalid search response: {}", e))?;
        Ok(truncate(body.render(self.max_results), self.max_result_chars))
    }
}

fn truncate(text: String, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        text.chars().take(max_chars).collect::<String>() + "\n...[truncated]"
    } else {
        text
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "Web Search"
    }

    fn description(&self) -> &str {
        "Tool to perform web searches. Input should be a search query."
    }

    async fn execute(&self, input: &str) -> Result<String, String> {
        let query = SearchQuery::parse(input, self.max_results)
            .ok_or_else(|| "Missing search query".to_string())?;
        tracing::info!(query = %query.q, "web search");
        self.search(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parse() {
        let q = SearchQuery::parse("  \"EU market trends\" ", 5).unwrap();
        assert_eq!(q.q, "EU market trends");
        assert_eq!(q.num, 5);
        assert!(SearchQuery::parse("  ", 5).is_none());
    }

    #[test]
    fn test_render_prefers_answer_box() {
        let body: SearchResponse = serde_json::from_value(serde_json::json!({
            "answerBox": {"answer": "42"},
            "organic": [
                {"title": "A", "link": "https://a.example", "snippet": "first"},
                {"title": "B", "snippet": "second"},
                {"title": "C", "snippet": "third"}
            ]
        }))
        .unwrap();
        let text = body.render(2);
        assert!(text.starts_with("Answer: 42"));
        assert!(text.contains("- A (https://a.example): first"));
        assert!(text.contains("- B: second"));
        assert!(!text.contains("third"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(SearchResponse::default().render(5), "No good search result found");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef".into(), 3), "abc\n...[truncated]");
        assert_eq!(truncate("abc".into(), 3), "abc");
    }

    #[tokio::test]
    async fn test_missing_key_is_error_not_panic() {
        let tool = WebSearchTool::new("http://127.0.0.1:9/search", None, 1, 5, 100);
        let err = tool.execute("rust").await.unwrap_err();
        assert!(err.contains("SERPER_API_KEY"));
    }
}
