mod registry;
mod search;

pub use registry::{cap_chars, Tool, ToolRegistry, ToolSettings};
pub use search::{format_hits, SearchHit, SearchProvider, TavilyClient, WebSearchTool, WEB_SEARCH_TOOL};
