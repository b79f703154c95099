pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an elite US college admissions AI consultant named 'Genny', serving students nationwide (California, Georgia, etc.). Your role is to provide comprehensive, up-to-date news and strategic advice on US university admissions. Always use the search tool to find the latest specific local data when asked. IMPORTANT: Answer in the SAME language as the user's question. If the user asks in Korean, answer in Korean. If in English, answer in English.";

pub const DEFAULT_GREETING: &str = "Hello! I am **Genny**, an AI Agent specializing in US college admissions consulting.\n\nAsk me anything!";

pub const DEFAULT_API_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.tavily.com/search";

pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";

pub const TRANSCRIBE_INSTRUCTION: &str = "Transcribe all text from this image exactly as it appears.";

pub fn default_max_iterations() -> usize {
    10
}

pub fn default_tool_timeout() -> u64 {
    30
}

pub fn default_request_timeout() -> u64 {
    120
}

pub fn default_max_result_chars() -> usize {
    8_000
}

pub fn default_search_enabled() -> bool {
    true
}

pub fn default_search_max_results() -> usize {
    5
}
