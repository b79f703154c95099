use thiserror::Error;

#[derive(Debug, Error)]
pub enum GennyError {
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A tool call failed. The agent loop turns this into an error result
    /// for the model instead of aborting the turn.
    #[error("Tool '{name}' failed: {message}")]
    ToolExecution { name: String, message: String },

    /// One uploaded file could not be converted to text.
    #[error("Error reading {file}: {message}")]
    Extraction { file: String, message: String },

    #[error("Profile store error: {0}")]
    Store(String),

    #[error("Agent stopped after {limit} model calls without a final answer")]
    LoopLimitExceeded {
        limit: usize,
        partial: Option<String>,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("{0}")]
    Other(String),
}

impl GennyError {
    pub fn extraction(file: impl Into<String>, message: impl ToString) -> Self {
        GennyError::Extraction {
            file: file.into(),
            message: message.to_string(),
        }
    }

    pub fn store(err: impl ToString) -> Self {
        GennyError::Store(err.to_string())
    }
}

impl From<anyhow::Error> for GennyError {
    fn from(err: anyhow::Error) -> Self {
        GennyError::Other(format!("{:#}", err))
    }
}

impl From<String> for GennyError {
    fn from(msg: String) -> Self {
        GennyError::Other(msg)
    }
}

impl From<&str> for GennyError {
    fn from(msg: &str) -> Self {
        GennyError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GennyError>;
