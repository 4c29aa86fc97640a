//! Mock narrator for testing and development.
//!
//! Records every track it is asked to play and reports playback as finished
//! after a configurable number of status polls.

use crate::{Result, traits::Narrator, types::Track};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct NarratorState {
    /// Every track started, in order.
    played: Vec<Track>,

    /// Track currently playing.
    playing: Option<Track>,

    /// Polls left before the current track reports finished.
    polls_remaining: u32,

    /// Polls each new track takes to finish.
    polls_per_track: u32,

    /// Total status polls answered.
    polls: u64,
}

/// Mock narrator.
///
/// # Examples
///
/// ```
/// use puzzlebox_hardware::mock::MockNarrator;
/// use puzzlebox_hardware::traits::Narrator;
/// use puzzlebox_hardware::types::Track;
///
/// #[tokio::main]
/// async fn main() -> puzzlebox_hardware::Result<()> {
///     let (mut narrator, handle) = MockNarrator::new();
///     narrator.play(Track::narration(1)).await?;
///     assert!(narrator.is_playback_finished().await?);
///     assert_eq!(handle.played().await, vec![Track::narration(1)]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockNarrator {
    state: Arc<Mutex<NarratorState>>,
}

impl MockNarrator {
    /// Create a narrator whose tracks finish on the first poll.
    pub fn new() -> (Self, MockNarratorHandle) {
        Self::with_track_length(0)
    }

    /// Create a narrator whose tracks take `polls` unfinished polls to end.
    pub fn with_track_length(polls: u32) -> (Self, MockNarratorHandle) {
        let state = Arc::new(Mutex::new(NarratorState {
            polls_per_track: polls,
            ..Default::default()
        }));

        let narrator = Self {
            state: Arc::clone(&state),
        };
        let handle = MockNarratorHandle { state };

        (narrator, handle)
    }
}

impl Default for MockNarrator {
    fn default() -> Self {
        Self::new().0
    }
}

impl Narrator for MockNarrator {
    async fn play(&mut self, track: Track) -> Result<()> {
        let mut state = self.state.lock().await;
        state.played.push(track);
        state.playing = Some(track);
        state.polls_remaining = state.polls_per_track;
        Ok(())
    }

    async fn is_playback_finished(&mut self) -> Result<bool> {
        let mut state = self.state.lock().await;
        state.polls += 1;

        if state.polls_remaining > 0 {
            state.polls_remaining -= 1;
            return Ok(false);
        }

        state.playing = None;
        Ok(true)
    }
}

/// Handle for inspecting a mock narrator.
#[derive(Debug, Clone)]
pub struct MockNarratorHandle {
    state: Arc<Mutex<NarratorState>>,
}

impl MockNarratorHandle {
    /// Tracks started so far, in order.
    pub async fn played(&self) -> Vec<Track> {
        self.state.lock().await.played.clone()
    }

    /// File numbers of the tracks started so far.
    pub async fn played_files(&self) -> Vec<u8> {
        self.state
            .lock()
            .await
            .played
            .iter()
            .map(|track| track.file)
            .collect()
    }

    /// Track currently playing, if it has not been polled to completion.
    pub async fn now_playing(&self) -> Option<Track> {
        self.state.lock().await.playing
    }

    /// Total status polls answered.
    pub async fn poll_count(&self) -> u64 {
        self.state.lock().await.polls
    }

    /// Change how many polls subsequent tracks take to finish.
    pub async fn set_track_length(&self, polls: u32) {
        self.state.lock().await.polls_per_track = polls;
    }

    /// Forget the play history.
    pub async fn clear_history(&self) {
        self.state.lock().await.played.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_narrator_records_tracks() {
        let (mut narrator, handle) = MockNarrator::new();

        narrator.play(Track::narration(4)).await.unwrap();
        narrator.play(Track::narration(6)).await.unwrap();

        assert_eq!(handle.played_files().await, vec![4, 6]);
        assert_eq!(handle.now_playing().await, Some(Track::narration(6)));
    }

    #[tokio::test]
    async fn test_mock_narrator_track_length() {
        let (mut narrator, handle) = MockNarrator::with_track_length(2);

        narrator.play(Track::narration(1)).await.unwrap();
        assert!(!narrator.is_playback_finished().await.unwrap());
        assert!(!narrator.is_playback_finished().await.unwrap());
        assert!(narrator.is_playback_finished().await.unwrap());
        assert_eq!(handle.now_playing().await, None);
        assert_eq!(handle.poll_count().await, 3);
    }

    #[tokio::test]
    async fn test_mock_narrator_play_restarts_countdown() {
        let (mut narrator, _handle) = MockNarrator::with_track_length(1);

        narrator.play(Track::narration(1)).await.unwrap();
        assert!(!narrator.is_playback_finished().await.unwrap());
        narrator.play(Track::narration(2)).await.unwrap();
        assert!(!narrator.is_playback_finished().await.unwrap());
        assert!(narrator.is_playback_finished().await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_narrator_clear_history() {
        let (mut narrator, handle) = MockNarrator::new();
        narrator.play(Track::narration(9)).await.unwrap();

        handle.clear_history().await;
        assert!(handle.played().await.is_empty());
    }
}
