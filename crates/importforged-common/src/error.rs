//! Common error types used throughout importforged.
//!
//! Every component of the pipeline isolates its own failures; this type is
//! what they carry internally before logging and mapping them into a tagged
//! outcome.

/// Common error type for importforged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request never produced a response (connect, timeout, TLS...).
    #[error("Transport error: {0}")]
    Http(String),

    /// The remote service answered outside the 2xx range.
    #[error("Status code: {status}, Status message: {message}")]
    Status { status: u16, message: String },

    /// A response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The declared source encoding is not known.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// An external tool (ffmpeg, ffprobe) failed or is missing.
    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new Http (transport) error.
    pub fn http<S: Into<String>>(msg: S) -> Self {
        Self::Http(msg.into())
    }

    /// Create a new Status error.
    pub fn status<S: Into<String>>(status: u16, msg: S) -> Self {
        Self::Status {
            status,
            message: msg.into(),
        }
    }

    /// Create a new Tool error.
    pub fn tool<T: Into<String>, S: Into<String>>(tool: T, msg: S) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: msg.into(),
        }
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Status code carried by the error, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
