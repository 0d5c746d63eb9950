mod conversation;
mod tool;

pub use conversation::{Conversation, Role, Turn, TurnContent};
pub use tool::{InlineImage, ToolCallRequest, ToolOutput, ToolResult, ToolSpec};
