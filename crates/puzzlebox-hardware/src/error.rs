//! Error types for hardware operations.
//!
//! Peripheral failures of the puzzle board. The engine never aborts a cycle
//! on these; it logs them and carries on.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// SPI or serial bus error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Token read error.
    #[error("Token read error: {message}")]
    TokenReadError { message: String },

    /// Narration playback error.
    #[error("Playback error: {message}")]
    PlaybackError { message: String },

    /// Domain value rejected by the core types.
    #[error(transparent)]
    Core(#[from] puzzlebox_core::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new token read error.
    pub fn token_read(message: impl Into<String>) -> Self {
        Self::TokenReadError {
            message: message.into(),
        }
    }

    /// Create a new playback error.
    pub fn playback(message: impl Into<String>) -> Self {
        Self::PlaybackError {
            message: message.into(),
        }
    }
}
