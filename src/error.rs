//! Error types for the nmstate handler

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The captured state is not valid YAML
    #[error("Failed to parse network state: {0}")]
    StateParseError(#[source] serde_yaml::Error),

    /// The captured state parsed, but its top level is not a mapping
    #[error("Unexpected network state shape: {0}")]
    StateShapeError(String),

    /// The filtered state could not be written back as YAML
    #[error("Failed to serialize network state: {0}")]
    StateSerializeError(#[source] serde_yaml::Error),

    /// The interfaces filter is not a valid glob
    #[error("Invalid interfaces filter {pattern:?}: {source}")]
    InvalidFilterPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Deflate failed while encoding an error payload
    #[error("Compression error: {0}")]
    CompressionError(#[source] std::io::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::StateParseError(_) => "parse",
            Error::StateShapeError(_) => "shape",
            Error::StateSerializeError(_) => "serialize",
            Error::InvalidFilterPattern { .. } => "pattern",
            Error::CompressionError(_) => "compression",
            Error::IoError(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
