//! Common error types for AAVA

use crate::grid::CodecError;
use thiserror::Error;

/// Common result type for AAVA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the AAVA crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML document
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Grid code encode/decode failure
    #[error("Grid code error: {0}")]
    Codec(#[from] CodecError),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
