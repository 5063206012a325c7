//! Error types for oneonone.

use thiserror::Error;

/// Errors that can occur in oneonone operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    Lookup(String),

    #[error("Calendar provider error: {0}")]
    Provider(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for this kind of failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Auth(_) => 2,
            Error::Lookup(_) => 3,
            Error::Validation(_) => 4,
            Error::Provider(_) => 5,
            Error::Config(_) | Error::Dataset(_) | Error::Io(_) => 1,
        }
    }
}

/// Result type alias for oneonone operations.
pub type Result<T> = std::result::Result<T, Error>;
