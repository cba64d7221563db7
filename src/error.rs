//! Error types for the speech client.

use thiserror::Error;

/// Result alias used across the speech client
pub type Result<T> = std::result::Result<T, SpeechError>;

/// Stable error codes, one per failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Authentication,
    Recognition,
    Synthesis,
    Transport,
    MalformedResponse,
    InvalidInput,
    Io,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Recognition => "recognition",
            Self::Synthesis => "synthesis",
            Self::Transport => "transport",
            Self::MalformedResponse => "malformed_response",
            Self::InvalidInput => "invalid_input",
            Self::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SpeechError {
    /// Token exchange failed: unreachable endpoint, bad body or missing token
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The recognition service answered with something other than `success.`
    #[error("recognition failed ({err_no}): {err_msg}")]
    Recognition { err_no: i64, err_msg: String },

    /// The synthesis service answered with a non-200 status
    #[error("synthesis failed ({status}): {body}")]
    Synthesis { status: u16, body: String },

    /// Network failure. The request URL is stripped since its query carries the token.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

impl SpeechError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Authentication(_) => ErrorCode::Authentication,
            Self::Recognition { .. } => ErrorCode::Recognition,
            Self::Synthesis { .. } => ErrorCode::Synthesis,
            Self::Transport(_) => ErrorCode::Transport,
            Self::MalformedResponse(_) => ErrorCode::MalformedResponse,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::Io(_) => ErrorCode::Io,
        }
    }
}
