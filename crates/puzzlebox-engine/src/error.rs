//! Error types for the puzzle engine.

use std::path::PathBuf;

use puzzlebox_hardware::HardwareError;

/// Errors raised while loading or validating a puzzle configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid TOML for the expected schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration could not be rendered back to TOML.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A registry entry or timing value was rejected.
    #[error("Invalid config entry: {0}")]
    Invalid(#[from] puzzlebox_core::Error),
}

/// Errors that stop the engine's trigger loop.
///
/// A single trigger cycle never fails; only losing the trigger source ends
/// [`PuzzleEngine::run`](crate::PuzzleEngine::run).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The trigger input failed or was closed.
    #[error("Trigger input failed: {0}")]
    Trigger(#[from] HardwareError),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_entry_message() {
        let error = ConfigError::from(puzzlebox_core::Error::UnknownCategory("bulb".into()));
        assert_eq!(
            error.to_string(),
            "Invalid config entry: Unknown category name: bulb"
        );
    }

    #[test]
    fn test_trigger_error_message() {
        let error = EngineError::from(HardwareError::disconnected("trigger"));
        assert_eq!(
            error.to_string(),
            "Trigger input failed: Device disconnected: trigger"
        );
    }
}
