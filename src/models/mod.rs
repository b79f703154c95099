mod tool;
mod turn;

pub use tool::{ToolRequest, ToolResult};
pub use turn::{Content, ContentBlock, ImageUrl, Role, Turn};
