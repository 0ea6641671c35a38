pub mod echo;
pub mod executor;
pub mod registry;
pub mod search;

pub use echo::EchoTool;
pub use executor::ToolExecutor;
pub use registry::{Tool, ToolKind, ToolRegistry, ToolSelection};
pub use search::WebSearchTool;
