//! Domain error types for the test analyzer.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

/// Analyzer-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// Named project does not exist in the account
    #[error("Project '{0}' not found")]
    ProjectNotFound(String),

    /// Network failure or timeout talking to the remote API
    #[error("Transport error: {0}")]
    Transport(String),

    /// Remote API answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Remote API answered with a body we could not decode
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Report could not be rendered or written
    #[error("Report error: {0}")]
    Report(String),
}

/// Convenience type alias for Results with AnalyzerError.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

impl AnalyzerError {
    /// Whether the error came from talking to the remote API.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Status { .. } | Self::MalformedPayload(_)
        )
    }
}

// Conversion implementations for common error types

impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        AnalyzerError::MalformedPayload(format!("JSON parsing error: {}", err))
    }
}

impl From<reqwest::Error> for AnalyzerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AnalyzerError::MalformedPayload(err.to_string())
        } else if let Some(status) = err.status() {
            AnalyzerError::Status {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                status: status.as_u16(),
            }
        } else {
            AnalyzerError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(err: std::io::Error) -> Self {
        AnalyzerError::Report(err.to_string())
    }
}
