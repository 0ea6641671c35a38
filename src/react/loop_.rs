//! ReAct 主循环（显式状态机）
//!
//! Reasoning -> {Acting -> Observing -> Reasoning} | Done | Failed，受步数预算约束。
//! 每次调用推理引擎计一步；输出无法解析时追加纠正指令重试一次，连续第二次失败即 ReasoningFormat。
//! 未知工具不终止循环，而是作为 Observation 回灌，让推理引擎在预算内自行纠正。
//! 本函数不写 Agent 记忆：返回的 turns 由调用方在成功后一次性提交。

use crate::core::AgentError;
use crate::memory::{AgentMemory, MemoryTurn};
use crate::react::planner::{parse_llm_output, Planner, PlannerOutput};
use crate::react::prompt::{system_prompt, user_prompt, FORMAT_CORRECTION};
use crate::tools::ToolExecutor;

/// 默认步数预算
pub const DEFAULT_MAX_STEPS: usize = 15;
/// 日志中思考内容预览最大字符数
const THINKING_PREVIEW_CHARS: usize = 200;

/// 循环状态
#[derive(Debug)]
pub enum ReactState {
    /// 等待推理引擎；correction 为上一轮解析失败后的纠正指令
    Reasoning { correction: Option<&'static str> },
    Acting {
        thought: String,
        tool: String,
        input: String,
    },
    Observing {
        thought: String,
        tool: String,
        input: String,
        observation: String,
    },
    Done { thought: String, answer: String },
    Failed(AgentError),
}

impl ReactState {
    fn label(&self) -> &'static str {
        match self {
            ReactState::Reasoning { .. } => "reasoning",
            ReactState::Acting { .. } => "acting",
            ReactState::Observing { .. } => "observing",
            ReactState::Done { .. } => "done",
            ReactState::Failed(_) => "failed",
        }
    }
}

/// ReAct 执行结果：最终答案与本次 run 产生的记忆轮次（步骤 + 最终问答）
#[derive(Debug)]
pub struct ReactResult {
    pub response: String,
    pub turns: Vec<MemoryTurn>,
    /// 调用推理引擎的次数
    pub steps: usize,
}

fn preview(text: &str) -> String {
    if text.chars().count() > THINKING_PREVIEW_CHARS {
        format!("{}...", text.chars().take(THINKING_PREVIEW_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}

/// 本次 run 的草稿（已完成的工具步骤）
fn render_scratchpad(turns: &[MemoryTurn]) -> String {
    turns
        .iter()
        .map(MemoryTurn::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// 工具调用失败转为观察文本
fn observation_from_error(err: &AgentError, executor: &ToolExecutor) -> String {
    match err {
        AgentError::UnknownTool(name) => format!(
            "{} is not a valid tool (tool not available), try one of [{}].",
            name,
            executor.tool_names().join(", ")
        ),
        other => format!("Error: {}", other),
    }
}

/// 执行 ReAct 循环
///
/// history 为 Agent 既有记忆（只读），question 为本次任务 prompt。
pub async fn react_loop(
    planner: &Planner,
    executor: &ToolExecutor,
    history: &AgentMemory,
    question: &str,
    max_steps: usize,
) -> Result<ReactResult, AgentError> {
    let system = system_prompt(&executor.tool_descriptions());
    let history_block = history.render();
    let mut steps_taken: Vec<MemoryTurn> = Vec::new();
    let mut step = 0;
    let mut state = ReactState::Reasoning { correction: None };

    loop {
        tracing::debug!(state = state.label(), step, "react transition");
        state = match state {
            ReactState::Reasoning { correction } => {
                if step >= max_steps {
                    tracing::warn!(max_steps, "react step budget exhausted");
                    ReactState::Failed(AgentError::StepBudgetExceeded {
                        steps: step,
                        transcript: render_scratchpad(&steps_taken),
                    })
                } else {
                    step += 1;
                    let user = user_prompt(
                        &history_block,
                        question,
                        &render_scratchpad(&steps_taken),
                        correction,
                    );
                    match planner.plan(&system, &user).await {
                        Err(e) => ReactState::Failed(e),
                        Ok(output) => match parse_llm_output(&output) {
                            Ok(PlannerOutput::Action {
                                thought,
                                tool,
                                input,
                            }) => ReactState::Acting {
                                thought,
                                tool,
                                input,
                            },
                            Ok(PlannerOutput::FinalAnswer { thought, text }) => ReactState::Done {
                                thought,
                                answer: text,
                            },
                            Err(_) if correction.is_none() => {
                                tracing::warn!(output = %preview(&output), "unparsable reasoning output, retrying once");
                                ReactState::Reasoning {
                                    correction: Some(FORMAT_CORRECTION),
                                }
                            }
                            Err(e) => ReactState::Failed(e),
                        },
                    }
                }
            }
            ReactState::Acting {
                thought,
                tool,
                input,
            } => {
                tracing::debug!(thought = %preview(&thought), tool = %tool, "react action");
                let observation = match executor.execute(&tool, &input).await {
                    Ok(obs) => obs,
                    Err(e) => observation_from_error(&e, executor),
                };
                ReactState::Observing {
                    thought,
                    tool,
                    input,
                    observation,
                }
            }
            ReactState::Observing {
                thought,
                tool,
                input,
                observation,
            } => {
                steps_taken.push(MemoryTurn::Step {
                    thought,
                    action: tool,
                    action_input: input,
                    observation,
                });
                ReactState::Reasoning { correction: None }
            }
            ReactState::Done { thought, answer } => {
                tracing::debug!(thought = %preview(&thought), steps = step, "react done");
                let mut turns = steps_taken;
                turns.push(MemoryTurn::Answer {
                    question: question.to_string(),
                    answer: answer.clone(),
                });
                return Ok(ReactResult {
                    response: answer,
                    turns,
                    steps: step,
                });
            }
            ReactState::Failed(e) => return Err(e),
        };
    }
}
