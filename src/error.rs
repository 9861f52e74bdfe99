use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShimError>;

#[derive(Debug, Error)]
pub enum ShimError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("stream ended before a completion fragment")]
    StreamInterrupted,

    #[error("protocol violation: {0}")]
    Protocol(String),
}
