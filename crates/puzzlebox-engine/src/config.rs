//! Puzzle configuration.
//!
//! A configuration file lists the registered tokens and optionally tunes
//! timing and admin behavior:
//!
//! ```toml
//! admin_enabled = true
//! diagnostics = false
//!
//! [timing]
//! cascade_delay_ms = 5000
//!
//! [[tokens]]
//! uid = "04:5C:4E:8A"
//! category = "led_straight"
//! ```

use std::path::Path;
use std::time::Duration;

use puzzlebox_core::constants::{
    DEFAULT_BLINK_COUNT, DEFAULT_BRIEFING_PAUSE_MS, DEFAULT_CASCADE_DELAY_MS,
    DEFAULT_CASCADE_STEP_MS, DEFAULT_FLICKER_COUNT, DEFAULT_FLICKER_PERIOD_MS,
    DEFAULT_GATE_SETTLE_MS, DEFAULT_INTRO_PAUSE_MS, DEFAULT_PLAYBACK_POLL_MS,
    DEFAULT_PLAYBACK_TIMEOUT_MS, DEFAULT_READER_STABILIZE_MS, DEFAULT_SCAN_RETRY_DELAY_MS,
};
use puzzlebox_core::{Category, TokenIdentity};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::feedback::FeedbackTiming;
use crate::registry::CategoryRegistry;
use crate::scanner::ScanTiming;

/// Top-level puzzle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    /// Whether admin keys override the cycle. When disabled, admin tokens are
    /// treated as ordinary components and rejected by every level.
    #[serde(default = "default_admin_enabled")]
    pub admin_enabled: bool,

    /// Start with verbose per-gate logging.
    #[serde(default)]
    pub diagnostics: bool,

    /// Delays and repetition counts.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Registered tokens.
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

impl PuzzleConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML is invalid, a UID is malformed or a category is unknown
    /// - A token is registered under two different categories
    /// - A token is registered as `empty`
    /// - The playback poll interval is zero
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the configuration without keeping the registry.
    ///
    /// # Errors
    ///
    /// See [`from_toml`](Self::from_toml).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.playback_poll_ms == 0 {
            return Err(puzzlebox_core::Error::Config(
                "playback_poll_ms must be greater than zero".to_string(),
            )
            .into());
        }
        self.build_registry().map(|_| ())
    }

    /// Build the token registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a token is registered twice with different
    /// categories or registered as `empty`.
    pub fn build_registry(&self) -> Result<CategoryRegistry, ConfigError> {
        let entries = self.tokens.iter().map(|t| (t.uid, t.category));
        Ok(CategoryRegistry::from_entries(entries)?)
    }

    /// Enable or disable admin keys.
    pub fn with_admin_enabled(mut self, enabled: bool) -> Self {
        self.admin_enabled = enabled;
        self
    }

    /// Start with diagnostics on or off.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Replace the timing section.
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Register one more token.
    pub fn with_token(mut self, uid: TokenIdentity, category: Category) -> Self {
        self.tokens.push(TokenEntry { uid, category });
        self
    }
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            admin_enabled: default_admin_enabled(),
            diagnostics: false,
            timing: TimingConfig::default(),
            tokens: Vec::new(),
        }
    }
}

const fn default_admin_enabled() -> bool {
    true
}

/// One registered token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    /// Reader UID, hex with optional `:` or `-` separators.
    pub uid: TokenIdentity,

    /// Category the token represents.
    pub category: Category,
}

/// Delays (milliseconds) and repetition counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_reader_stabilize_ms")]
    pub reader_stabilize_ms: u64,

    #[serde(default = "default_scan_retry_delay_ms")]
    pub scan_retry_delay_ms: u64,

    #[serde(default = "default_gate_settle_ms")]
    pub gate_settle_ms: u64,

    #[serde(default = "default_playback_poll_ms")]
    pub playback_poll_ms: u64,

    #[serde(default = "default_playback_timeout_ms")]
    pub playback_timeout_ms: u64,

    #[serde(default = "default_intro_pause_ms")]
    pub intro_pause_ms: u64,

    #[serde(default = "default_briefing_pause_ms")]
    pub briefing_pause_ms: u64,

    #[serde(default = "default_cascade_delay_ms")]
    pub cascade_delay_ms: u64,

    #[serde(default = "default_cascade_step_ms")]
    pub cascade_step_ms: u64,

    #[serde(default = "default_flicker_period_ms")]
    pub flicker_period_ms: u64,

    #[serde(default = "default_flicker_count")]
    pub flicker_count: u32,

    #[serde(default = "default_blink_count")]
    pub blink_count: u32,
}

impl TimingConfig {
    /// Timing with every delay set to zero, for tests and benches.
    ///
    /// The playback poll stays at 1 ms so waits still yield.
    pub fn instant() -> Self {
        Self {
            reader_stabilize_ms: 0,
            scan_retry_delay_ms: 0,
            gate_settle_ms: 0,
            playback_poll_ms: 1,
            playback_timeout_ms: default_playback_timeout_ms(),
            intro_pause_ms: 0,
            briefing_pause_ms: 0,
            cascade_delay_ms: 0,
            cascade_step_ms: 0,
            flicker_period_ms: 0,
            flicker_count: default_flicker_count(),
            blink_count: default_blink_count(),
        }
    }

    /// Delays used by the gate scanner.
    pub fn scan_timing(&self) -> ScanTiming {
        ScanTiming {
            reader_stabilize: Duration::from_millis(self.reader_stabilize_ms),
            retry_delay: Duration::from_millis(self.scan_retry_delay_ms),
            gate_settle: Duration::from_millis(self.gate_settle_ms),
        }
    }

    /// Delays used by the feedback dispatcher.
    pub fn feedback_timing(&self) -> FeedbackTiming {
        FeedbackTiming {
            playback_poll: Duration::from_millis(self.playback_poll_ms),
            playback_timeout: Duration::from_millis(self.playback_timeout_ms),
            intro_pause: Duration::from_millis(self.intro_pause_ms),
            briefing_pause: Duration::from_millis(self.briefing_pause_ms),
            cascade_delay: Duration::from_millis(self.cascade_delay_ms),
            cascade_step: Duration::from_millis(self.cascade_step_ms),
            flicker_period: Duration::from_millis(self.flicker_period_ms),
            flicker_count: self.flicker_count,
            blink_count: self.blink_count,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reader_stabilize_ms: default_reader_stabilize_ms(),
            scan_retry_delay_ms: default_scan_retry_delay_ms(),
            gate_settle_ms: default_gate_settle_ms(),
            playback_poll_ms: default_playback_poll_ms(),
            playback_timeout_ms: default_playback_timeout_ms(),
            intro_pause_ms: default_intro_pause_ms(),
            briefing_pause_ms: default_briefing_pause_ms(),
            cascade_delay_ms: default_cascade_delay_ms(),
            cascade_step_ms: default_cascade_step_ms(),
            flicker_period_ms: default_flicker_period_ms(),
            flicker_count: default_flicker_count(),
            blink_count: default_blink_count(),
        }
    }
}

const fn default_reader_stabilize_ms() -> u64 {
    DEFAULT_READER_STABILIZE_MS
}

const fn default_scan_retry_delay_ms() -> u64 {
    DEFAULT_SCAN_RETRY_DELAY_MS
}

const fn default_gate_settle_ms() -> u64 {
    DEFAULT_GATE_SETTLE_MS
}

const fn default_playback_poll_ms() -> u64 {
    DEFAULT_PLAYBACK_POLL_MS
}

const fn default_playback_timeout_ms() -> u64 {
    DEFAULT_PLAYBACK_TIMEOUT_MS
}

const fn default_intro_pause_ms() -> u64 {
    DEFAULT_INTRO_PAUSE_MS
}

const fn default_briefing_pause_ms() -> u64 {
    DEFAULT_BRIEFING_PAUSE_MS
}

const fn default_cascade_delay_ms() -> u64 {
    DEFAULT_CASCADE_DELAY_MS
}

const fn default_cascade_step_ms() -> u64 {
    DEFAULT_CASCADE_STEP_MS
}

const fn default_flicker_period_ms() -> u64 {
    DEFAULT_FLICKER_PERIOD_MS
}

const fn default_flicker_count() -> u32 {
    DEFAULT_FLICKER_COUNT
}

const fn default_blink_count() -> u32 {
    DEFAULT_BLINK_COUNT
}
