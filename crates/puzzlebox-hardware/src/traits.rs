//! Hardware device trait definitions.
//!
//! This module defines the narrow interfaces through which the puzzle engine
//! reaches the board's peripherals: the shared token reader, the gate relays,
//! the serial narrator, the stage indicators and the trigger button. Real
//! drivers and the mocks in [`crate::mock`] implement the same traits, so the
//! engine can be exercised without a board attached.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{ReaderInfo, Track, TriggerEvent};
use puzzlebox_core::{GateIndex, TokenIdentity};

/// Token reader abstraction.
///
/// One reader is shared by all gates; the gate relays decide which antenna is
/// connected. A read attempt is the sequence [`wake`](Self::wake) →
/// [`select_and_read_identity`](Self::select_and_read_identity) →
/// [`release_and_stop`](Self::release_and_stop).
///
/// # Object Safety
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters:
///
/// ```no_run
/// use puzzlebox_hardware::traits::TokenReader;
/// use puzzlebox_hardware::error::Result;
/// use puzzlebox_core::TokenIdentity;
///
/// async fn read_once<R: TokenReader>(reader: &mut R) -> Result<Option<TokenIdentity>> {
///     reader.reinitialize().await?;
///     if !reader.wake().await? {
///         return Ok(None);
///     }
///     let identity = reader.select_and_read_identity().await?;
///     reader.release_and_stop().await?;
///     Ok(identity)
/// }
/// ```
pub trait TokenReader: Send + Sync {
    /// Reset the reader peripheral to a known state.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader does not respond after reset.
    async fn reinitialize(&mut self) -> Result<()>;

    /// Wake any token in the field.
    ///
    /// Returns `true` if a token answered.
    ///
    /// # Errors
    ///
    /// Returns an error if a bus error occurs.
    async fn wake(&mut self) -> Result<bool>;

    /// Select the woken token and read its identity.
    ///
    /// Returns `None` if selection failed (collision, token moved away).
    ///
    /// # Errors
    ///
    /// Returns an error if a bus error occurs or the UID is malformed.
    async fn select_and_read_identity(&mut self) -> Result<Option<TokenIdentity>>;

    /// Halt the selected token and stop any crypto session.
    ///
    /// # Errors
    ///
    /// Returns an error if a bus error occurs.
    async fn release_and_stop(&mut self) -> Result<()>;

    /// Get reader information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// reader information.
    async fn reader_info(&self) -> Result<ReaderInfo>;
}

/// Gate relay abstraction.
///
/// Driving a gate active connects its antenna to the shared reader.
pub trait GateActuator: Send + Sync {
    /// Drive the gate's active signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay output cannot be driven.
    async fn set_gate_active(&mut self, gate: GateIndex, active: bool) -> Result<()>;
}

/// Narration player abstraction.
///
/// ```no_run
/// use std::time::Duration;
/// use puzzlebox_hardware::traits::Narrator;
/// use puzzlebox_hardware::types::Track;
/// use puzzlebox_hardware::error::Result;
///
/// async fn play_to_end<N: Narrator>(narrator: &mut N, track: Track) -> Result<()> {
///     narrator.play(track).await?;
///     while !narrator.is_playback_finished().await? {
///         tokio::time::sleep(Duration::from_millis(10)).await;
///     }
///     Ok(())
/// }
/// ```
pub trait Narrator: Send + Sync {
    /// Start playing a track, interrupting any current playback.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be delivered.
    async fn play(&mut self, track: Track) -> Result<()>;

    /// Returns `true` once the last started track has finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be queried.
    async fn is_playback_finished(&mut self) -> Result<bool>;
}

/// Stage indicator lights.
pub trait IndicatorBank: Send + Sync {
    /// Switch an indicator on or off.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the output fails.
    async fn set_indicator(&mut self, index: usize, lit: bool) -> Result<()>;

    /// Number of indicators in the bank.
    fn indicator_count(&self) -> usize;
}

/// Debounced trigger button.
pub trait TriggerInput: Send + Sync {
    /// Wait for the next press.
    ///
    /// # Errors
    ///
    /// Returns an error if the input source is gone.
    async fn next_trigger(&mut self) -> Result<TriggerEvent>;
}
