//! Error types for the LINE gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Messaging platform error
    #[error("channel error: {0}")]
    Channel(String),

    /// Generative AI error
    #[error("generation error: {0}")]
    Generation(String),

    /// File type the AI pipeline does not accept
    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),

    /// Downloaded content exceeds the configured size limit
    #[error("file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this failure comes from input the pipeline refuses to handle,
    /// as opposed to a transient remote or local fault
    #[must_use]
    pub const fn is_unsupported_input(&self) -> bool {
        matches!(self, Self::UnsupportedMedia(_) | Self::FileTooLarge { .. })
    }
}
