//! Error types for the fallible edges of the crate.
//!
//! The analysis pipeline itself never fails: degenerate input maps to
//! default values. Errors only arise when loading configuration or reading
//! recorded traces.

/// Result type alias for the touch pattern engine.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Trace parse error at line {line}: {message}")]
    Trace { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
