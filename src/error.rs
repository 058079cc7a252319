//! Error types for Toolbelt
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;

use thiserror::Error;

use crate::genai::GenAiError;

/// All error types a tool invocation can raise
#[derive(Debug, Error)]
pub enum ToolbeltError {
    /// A path that had to exist does not
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Filesystem or process-launch failure
    #[error("IO error during {operation} on {}: {source}", path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No tool registered under this name
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    /// Missing required parameter or malformed value
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    /// The model answered without the image part we asked for
    #[error("Empty AI response: no image part returned by {operation}")]
    EmptyAiResponse { operation: String },

    /// Generative-AI collaborator error
    #[error("GenAI error: {0}")]
    GenAi(#[from] GenAiError),

    /// Image decode/encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl ToolbeltError {
    /// Wrap an io::Error with the operation and path it came from
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for Toolbelt operations
pub type Result<T> = std::result::Result<T, ToolbeltError>;
