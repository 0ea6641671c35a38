//! ReAct 结构化 prompt 组装
//!
//! system：固定指令前言 + 工具目录（name: description）+ 允许的工具名列表；
//! user：Agent 历史记忆 + 本次问题 + 本次 run 的草稿（已完成的 Thought/Action/Observation）。

/// 无工具时的占位描述
const NO_TOOLS: &str = "(no tools available; answer directly)";

/// 解析失败后追加的纠正指令
pub const FORMAT_CORRECTION: &str = "Your previous reply did not follow the required format. \
Reply with either\nThought: ...\nAction: <one of the tool names>\nAction Input: <input>\n\
or\nThought: I now know the final answer\nFinal Answer: <answer>\nand nothing else.";

/// 生成 system prompt（指令前言 + 工具目录）
pub fn system_prompt(tools: &[(String, String)]) -> String {
    let catalog = if tools.is_empty() {
        NO_TOOLS.to_string()
    } else {
        tools
            .iter()
            .map(|(name, desc)| format!("{}: {}", name, desc))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let names = tools
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Answer the following questions as best you can. You have access to the following tools:\n\n\
{catalog}\n\n\
Use the following format:\n\n\
Question: the input question you must answer\n\
Thought: you should always think about what to do\n\
Action: the action to take, should be one of [{names}]\n\
Action Input: the input to the action\n\
Observation: the result of the action\n\
... (this Thought/Action/Action Input/Observation can repeat N times)\n\
Thought: I now know the final answer\n\
Final Answer: the final answer to the original input question\n\n\
Begin!"
    )
}

/// 生成 user prompt（历史 + 问题 + 草稿 + 可选纠正）
pub fn user_prompt(
    history: &str,
    question: &str,
    scratchpad: &str,
    correction: Option<&str>,
) -> String {
    let mut out = String::new();
    if !history.is_empty() {
        out.push_str("Previous conversation:\n");
        out.push_str(history);
        out.push_str("\n\n");
    }
    out.push_str("Question: ");
    out.push_str(question.trim_end());
    out.push('\n');
    if !scratchpad.is_empty() {
        out.push_str(scratchpad);
        out.push('\n');
    }
    if let Some(c) = correction {
        out.push('\n');
        out.push_str(c);
        out.push('\n');
    }
    out.push_str("Thought:");
    out
}
