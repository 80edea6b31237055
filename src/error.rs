//! Error types for Claimscope.

use thiserror::Error;

/// Library-level error type for Claimscope operations.
#[derive(Error, Debug)]
pub enum ClaimscopeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Workspace connection error: {0}")]
    Connection(String),

    #[error("Workspace API error ({status}): {message}")]
    WorkspaceApi { status: u16, message: String },

    #[error("Model endpoint error: {0}")]
    OpenAI(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for Claimscope operations.
pub type Result<T> = std::result::Result<T, ClaimscopeError>;
