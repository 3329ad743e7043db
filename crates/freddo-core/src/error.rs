use thiserror::Error;

/// Top-level error type for the Freddo backend.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for FreddoError` so that `?` works across crate
/// boundaries in the binary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FreddoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for FreddoError {
    fn from(err: toml::de::Error) -> Self {
        FreddoError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for FreddoError {
    fn from(err: toml::ser::Error) -> Self {
        FreddoError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for FreddoError {
    fn from(err: serde_json::Error) -> Self {
        FreddoError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Freddo operations.
pub type Result<T> = std::result::Result<T, FreddoError>;
