//! 认知层：ReAct prompt 组装、输出解析（Planner）、状态机主循环

pub mod loop_;
pub mod planner;
pub mod prompt;

pub use loop_::{react_loop, ReactResult, ReactState, DEFAULT_MAX_STEPS};
pub use planner::{parse_llm_output, Planner, PlannerOutput};
