//! 记忆层：推理引擎消息格式 + Agent 作用域的轮次记忆

pub mod conversation;
pub mod turns;

pub use conversation::{Message, Role};
pub use turns::{AgentMemory, MemoryTurn};
