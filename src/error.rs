use thiserror::Error;

/// Errors raised while driving the browser or exporting a storybook
#[derive(Debug, Error)]
pub enum ExportError {
    /// Browser process could not be started
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Existing browser could not be reached
    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// JavaScript evaluation in a tab failed
    #[error("Script evaluation failed: {0}")]
    EvaluationFailed(String),

    /// DOM tree JSON could not be parsed
    #[error("Failed to parse DOM: {0}")]
    DomParseFailed(String),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    #[error("Tool '{tool}' failed: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    /// Output document template failed to compile or render
    #[error("Failed to render document: {0}")]
    RenderFailed(String),

    #[error("Failed to print PDF: {0}")]
    PdfFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Too few story pages were discovered; `message` is the text shown to the user
    #[error("{message}")]
    InsufficientContent { found: usize, minimum: usize, message: String },
}

impl ExportError {
    /// Whether this error is the user-facing "not a storybook" abort
    pub fn is_insufficient_content(&self) -> bool {
        matches!(self, ExportError::InsufficientContent { .. })
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_content_displays_message() {
        let err = ExportError::InsufficientContent {
            found: 2,
            minimum: 4,
            message: "Only 2 pages".to_string(),
        };

        assert_eq!(err.to_string(), "Only 2 pages");
        assert!(err.is_insufficient_content());
    }

    #[test]
    fn test_tool_error_display() {
        let err = ExportError::ToolExecutionFailed {
            tool: "export_storybook".to_string(),
            reason: "tab closed".to_string(),
        };

        assert_eq!(err.to_string(), "Tool 'export_storybook' failed: tab closed");
        assert!(!err.is_insufficient_content());
    }
}
