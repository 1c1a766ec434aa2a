//! Error types for the advisory engine.

/// Top-level error type for the advisory system.
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    /// Advisory gateway request or response error.
    #[error("gateway error: {0}")]
    Gateway(String),

    /// Audio device or stream error.
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech synthesis or playback error.
    #[error("speech error: {0}")]
    Speech(String),

    /// Live voice session error.
    #[error("session error: {0}")]
    Session(String),

    /// Response cache read/write error.
    #[error("cache error: {0}")]
    Cache(String),

    /// Growth record storage error.
    #[error("growth log error: {0}")]
    Growth(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AdvisoryError>;
