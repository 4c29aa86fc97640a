//! Narration and indicator feedback.
//!
//! The dispatcher turns verdicts and level changes into cue playback and
//! light sequences. Collaborator failures are logged and skipped; feedback
//! never aborts a cycle.

use std::time::Duration;

use puzzlebox_core::Level;
use puzzlebox_core::constants::{
    DEFAULT_BLINK_COUNT, DEFAULT_BRIEFING_PAUSE_MS, DEFAULT_CASCADE_DELAY_MS,
    DEFAULT_CASCADE_STEP_MS, DEFAULT_FLICKER_COUNT, DEFAULT_FLICKER_PERIOD_MS,
    DEFAULT_INTRO_PAUSE_MS, DEFAULT_PLAYBACK_POLL_MS, DEFAULT_PLAYBACK_TIMEOUT_MS,
};
use puzzlebox_hardware::{IndicatorBank, Narrator};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::cue::Cue;
use crate::rules::Verdict;

/// Delays and repetition counts of the feedback sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackTiming {
    /// Sleep between playback status polls.
    pub playback_poll: Duration,

    /// Give up waiting for a track after this long.
    pub playback_timeout: Duration,

    /// Pause between the end of the greeting and the first briefing.
    pub intro_pause: Duration,

    /// Pause between a "level cleared" cue and the next briefing.
    pub briefing_pause: Duration,

    /// Pause between the first "level cleared" cue and the light cascade.
    pub cascade_delay: Duration,

    /// Step between indicators in the cascade.
    pub cascade_step: Duration,

    /// On and off time of flickers and blinks.
    pub flicker_period: Duration,

    /// Number of flickers of a stage indicator.
    pub flicker_count: u32,

    /// Number of blinks of the whole bank after the cascade.
    pub blink_count: u32,
}

impl Default for FeedbackTiming {
    fn default() -> Self {
        Self {
            playback_poll: Duration::from_millis(DEFAULT_PLAYBACK_POLL_MS),
            playback_timeout: Duration::from_millis(DEFAULT_PLAYBACK_TIMEOUT_MS),
            intro_pause: Duration::from_millis(DEFAULT_INTRO_PAUSE_MS),
            briefing_pause: Duration::from_millis(DEFAULT_BRIEFING_PAUSE_MS),
            cascade_delay: Duration::from_millis(DEFAULT_CASCADE_DELAY_MS),
            cascade_step: Duration::from_millis(DEFAULT_CASCADE_STEP_MS),
            flicker_period: Duration::from_millis(DEFAULT_FLICKER_PERIOD_MS),
            flicker_count: DEFAULT_FLICKER_COUNT,
            blink_count: DEFAULT_BLINK_COUNT,
        }
    }
}

/// Plays cues and drives the stage indicators.
#[derive(Debug)]
pub struct FeedbackDispatcher<N, I> {
    narrator: N,
    indicators: I,
    timing: FeedbackTiming,
}

impl<N: Narrator, I: IndicatorBank> FeedbackDispatcher<N, I> {
    /// Create a dispatcher with default timing.
    pub fn new(narrator: N, indicators: I) -> Self {
        Self {
            narrator,
            indicators,
            timing: FeedbackTiming::default(),
        }
    }

    /// Override the feedback timing.
    pub fn with_timing(mut self, timing: FeedbackTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Timing in use.
    pub fn timing(&self) -> FeedbackTiming {
        self.timing
    }

    /// Start a cue without waiting for it.
    ///
    /// Returns `true` if playback was started.
    pub async fn play(&mut self, cue: Cue) -> bool {
        let Some(track) = cue.track() else {
            debug!(%cue, "cue has no track");
            return false;
        };

        match self.narrator.play(track).await {
            Ok(()) => {
                info!(%cue, %track, "playing cue");
                true
            }
            Err(e) => {
                warn!(%cue, %track, error = %e, "failed to start cue");
                false
            }
        }
    }

    /// Play a cue and wait until it has finished.
    pub async fn play_and_wait(&mut self, cue: Cue) {
        if self.play(cue).await {
            self.wait_for_playback().await;
        }
    }

    /// Poll the narrator until the current track ends.
    ///
    /// Status errors and the playback timeout end the wait early.
    pub async fn wait_for_playback(&mut self) {
        let poll = self.timing.playback_poll;
        let narrator = &mut self.narrator;
        let waited = timeout(self.timing.playback_timeout, async {
            loop {
                match narrator.is_playback_finished().await {
                    Ok(true) => return,
                    Ok(false) => sleep(poll).await,
                    Err(e) => {
                        warn!(error = %e, "playback status unavailable");
                        return;
                    }
                }
            }
        })
        .await;

        if waited.is_err() {
            warn!(
                timeout_ms = self.timing.playback_timeout.as_millis() as u64,
                "playback did not finish in time"
            );
        }
    }

    /// Returns `true` if nothing is playing. Status errors count as finished.
    pub async fn playback_finished(&mut self) -> bool {
        self.narrator.is_playback_finished().await.unwrap_or_else(|e| {
            warn!(error = %e, "playback status unavailable");
            true
        })
    }

    /// Narrate a failed or ignored verdict.
    ///
    /// [`Verdict::Advance`] is not narrated here; see [`celebrate`](Self::celebrate).
    /// Returns `true` if any narration was played.
    pub async fn announce(&mut self, verdict: Verdict) -> bool {
        let cue = match verdict {
            Verdict::IllegalTopology | Verdict::GenericFailure => Cue::IllegalArrangement,
            Verdict::IllegalComponent => Cue::IllegalComponent,
            Verdict::NarratedFailure(hint) => Cue::Hint(hint),
            Verdict::Advance | Verdict::PuzzleComplete => return false,
        };
        self.play_and_wait(cue).await;
        true
    }

    /// Full feedback for clearing stage `from`.
    ///
    /// - first stage: cleared cue, pause, indicator cascade, blinks, briefing 1;
    /// - stages 1-4: cleared cue, flicker of the stage indicator, next briefing;
    /// - final stage: cleared cue, flicker of the last indicator, finale.
    pub async fn celebrate(&mut self, from: Level) {
        let Some(stage) = from.stage() else {
            return;
        };

        self.play(Cue::LevelCleared(stage)).await;

        if stage == 0 {
            sleep(self.timing.cascade_delay).await;
            self.cascade().await;
            self.blink_all().await;
        } else {
            self.flicker(usize::from(stage - 1)).await;
        }
        self.wait_for_playback().await;

        match from.next().stage() {
            Some(next) => {
                sleep(self.timing.briefing_pause).await;
                self.play_and_wait(Cue::Briefing(next)).await;
            }
            None => self.play_and_wait(Cue::Finale).await,
        }
    }

    /// Switch one indicator, logging failures.
    pub async fn set_indicator(&mut self, index: usize, lit: bool) {
        if let Err(e) = self.indicators.set_indicator(index, lit).await {
            warn!(index, lit, error = %e, "indicator update failed");
        }
    }

    /// Switch every indicator.
    pub async fn set_all(&mut self, lit: bool) {
        for index in 0..self.indicators.indicator_count() {
            self.set_indicator(index, lit).await;
        }
    }

    /// Flicker one indicator and leave it on.
    pub async fn flicker(&mut self, index: usize) {
        for _ in 0..self.timing.flicker_count {
            self.set_indicator(index, true).await;
            sleep(self.timing.flicker_period).await;
            self.set_indicator(index, false).await;
            sleep(self.timing.flicker_period).await;
        }
        self.set_indicator(index, true).await;
    }

    /// Light every indicator in turn.
    pub async fn cascade(&mut self) {
        for index in 0..self.indicators.indicator_count() {
            self.set_indicator(index, true).await;
            sleep(self.timing.cascade_step).await;
        }
    }

    /// Blink the whole bank, ending dark.
    pub async fn blink_all(&mut self) {
        for _ in 0..self.timing.blink_count {
            self.set_all(true).await;
            sleep(self.timing.flicker_period).await;
            self.set_all(false).await;
            sleep(self.timing.flicker_period).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::FailureHint;
    use puzzlebox_hardware::{HardwareError, Track};
    use puzzlebox_hardware::mock::{
        MockIndicators, MockIndicatorsHandle, MockNarrator, MockNarratorHandle,
    };
    use rstest::rstest;

    type Rig = (
        FeedbackDispatcher<MockNarrator, MockIndicators>,
        MockNarratorHandle,
        MockIndicatorsHandle,
    );

    fn rig(track_length: u32) -> Rig {
        let (narrator, narration) = MockNarrator::with_track_length(track_length);
        let (indicators, lights) = MockIndicators::new();
        (
            FeedbackDispatcher::new(narrator, indicators),
            narration,
            lights,
        )
    }

    #[rstest]
    #[case(Verdict::IllegalTopology, 5)]
    #[case(Verdict::GenericFailure, 5)]
    #[case(Verdict::IllegalComponent, 2)]
    #[case(Verdict::NarratedFailure(FailureHint::NoSwitch), 12)]
    #[tokio::test(start_paused = true)]
    async fn test_announce_failure(#[case] verdict: Verdict, #[case] file: u8) {
        let (mut feedback, narration, _) = rig(3);

        assert!(feedback.announce(verdict).await);
        assert_eq!(narration.played_files().await, vec![file]);
        assert_eq!(narration.now_playing().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_announce_is_silent_for_advance_and_complete() {
        let (mut feedback, narration, _) = rig(0);

        assert!(!feedback.announce(Verdict::Advance).await);
        assert!(!feedback.announce(Verdict::PuzzleComplete).await);
        assert!(narration.played().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_stage_celebration() {
        let (mut feedback, narration, lights) = rig(2);
        let started = tokio::time::Instant::now();

        feedback.celebrate(Level::START).await;

        assert_eq!(narration.played_files().await, vec![4, 6]);
        // Cascade lights each indicator once, then three blinks of all five.
        for index in 0..5 {
            assert_eq!(lights.times_lit(index).await, 4);
        }
        assert_eq!(lights.lit().await, [false; 5]);
        // 5 s pause, 2.5 s cascade, 3 s of blinks and 1 s before the briefing.
        assert!(started.elapsed() >= Duration::from_millis(11_500));
    }

    #[rstest]
    #[case(1, 0, vec![7, 10])]
    #[case(2, 1, vec![11, 14])]
    #[case(3, 2, vec![15, 18])]
    #[case(4, 3, vec![19, 22])]
    #[tokio::test(start_paused = true)]
    async fn test_middle_stage_celebration(
        #[case] stage: u8,
        #[case] indicator: usize,
        #[case] files: Vec<u8>,
    ) {
        let (mut feedback, narration, lights) = rig(1);

        feedback.celebrate(Level::from_raw(stage)).await;

        assert_eq!(narration.played_files().await, files);
        assert_eq!(lights.times_lit(indicator).await, 4);
        let mut expected = [false; 5];
        expected[indicator] = true;
        assert_eq!(lights.lit().await, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_stage_celebration() {
        let (mut feedback, narration, lights) = rig(1);
        let started = tokio::time::Instant::now();

        feedback.celebrate(Level::from_raw(5)).await;

        assert_eq!(narration.played_files().await, vec![23, 26]);
        assert!(lights.lit().await[4]);
        // Three flickers only; no briefing pause before the finale.
        assert!(started.elapsed() < Duration::from_millis(3_500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_celebrate_completed_does_nothing() {
        let (mut feedback, narration, lights) = rig(0);

        feedback.celebrate(Level::COMPLETED).await;

        assert!(narration.played().await.is_empty());
        assert!(lights.history().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_gives_up_after_timeout() {
        let (feedback, narration, _) = rig(u32::MAX);
        let mut feedback = feedback.with_timing(FeedbackTiming {
            playback_timeout: Duration::from_secs(1),
            ..FeedbackTiming::default()
        });

        feedback.play_and_wait(Cue::Welcome).await;

        assert_eq!(narration.now_playing().await, Some(Cue::Welcome.track().unwrap()));
        assert!(narration.poll_count().await >= 90);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_without_track_is_skipped() {
        let (mut feedback, narration, _) = rig(0);

        assert!(!feedback.play(Cue::Briefing(9)).await);
        assert!(narration.played().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_all() {
        let (mut feedback, _, lights) = rig(0);

        feedback.set_all(true).await;
        assert_eq!(lights.lit().await, [true; 5]);
        feedback.set_all(false).await;
        assert_eq!(lights.lit().await, [false; 5]);
    }

    /// Narrator with no storage device attached.
    struct MuteNarrator;

    impl Narrator for MuteNarrator {
        async fn play(&mut self, _track: Track) -> puzzlebox_hardware::Result<()> {
            Err(HardwareError::playback("no storage device"))
        }

        async fn is_playback_finished(&mut self) -> puzzlebox_hardware::Result<bool> {
            Err(HardwareError::playback("no storage device"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_narrator_failures_do_not_block_feedback() {
        let (indicators, lights) = MockIndicators::new();
        let mut feedback = FeedbackDispatcher::new(MuteNarrator, indicators);

        assert!(!feedback.play(Cue::Welcome).await);
        assert!(feedback.playback_finished().await);

        feedback.celebrate(Level::from_raw(2)).await;
        assert!(lights.lit().await[1]);
    }
}
