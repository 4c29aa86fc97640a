use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Token errors
    #[error("Invalid token identity: {message}")]
    InvalidTokenIdentity { message: String },

    #[error("Unknown category name: {0}")]
    UnknownCategory(String),

    #[error("Duplicate token {identity}: already registered as {existing}, got {conflicting}")]
    DuplicateToken {
        identity: String,
        existing: String,
        conflicting: String,
    },

    // Board errors
    #[error("Gate index must be 0-{max}, got {index}")]
    InvalidGateIndex { index: usize, max: usize },

    #[error("Indicator index must be 0-{max}, got {index}")]
    InvalidIndicatorIndex { index: usize, max: usize },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
