//! Error types for agent-chat
//!
//! Domain-specific error enums using thiserror. Frame-level errors never leave
//! the stream module; everything else propagates to the chat loop.

/// A single frame could not be turned into an event.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("JSON parse: {0}")]
    Json(String),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("frame has no type tag")]
    MissingType,
    #[error("{kind}: missing field `{field}`")]
    MissingField { kind: String, field: &'static str },
}

/// Failure of the byte stream itself. Malformed frames are not stream errors.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("stream read failed: {0}")]
    Read(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("stream cancelled")]
    Cancelled,
}

impl StreamError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request failed: {status} {reason}. {body}")]
    Status {
        status: u16,
        reason: String,
        body: String,
    },
    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
    #[error("no response body received")]
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("environment validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no chat history to save")]
    Empty,
    #[error("I/O {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("terminal I/O: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ChatError::Stream(StreamError::Cancelled))
    }
}
