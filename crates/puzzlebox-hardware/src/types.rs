//! Common types shared across hardware device implementations.
//!
//! This module defines types used by multiple device traits, such as reader
//! metadata, narration track addresses and trigger events.

use chrono::{DateTime, Utc};
use puzzlebox_core::constants::NARRATION_FOLDER;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::Instant;

/// Token reader information.
///
/// Contains reader-specific metadata such as supported protocols
/// and firmware version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "MFRC522").
    pub name: String,

    /// List of supported protocols (e.g., ["ISO14443A"]).
    pub protocols: Vec<String>,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>, protocols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            protocols,
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// Address of a narration track on the narrator's storage.
///
/// Tracks are addressed by folder and file number, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Storage folder.
    pub folder: u8,

    /// File number within the folder.
    pub file: u8,
}

impl Track {
    /// Create a track in the narration folder.
    pub const fn narration(file: u8) -> Self {
        Self {
            folder: NARRATION_FOLDER,
            file,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:03}", self.folder, self.file)
    }
}

/// A single debounced press of the trigger button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    /// Wall-clock time of the press, for reports.
    pub pressed_at: DateTime<Utc>,

    /// Monotonic time of the press, for ordering against cycles.
    pub instant: Instant,
}

impl TriggerEvent {
    /// Create a trigger event stamped with the current time.
    pub fn now() -> Self {
        Self {
            pressed_at: Utc::now(),
            instant: Instant::now(),
        }
    }

    /// Create a trigger event with custom timestamps.
    pub fn at(pressed_at: DateTime<Utc>, instant: Instant) -> Self {
        Self {
            pressed_at,
            instant,
        }
    }
}
