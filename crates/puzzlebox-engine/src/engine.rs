//! The puzzle controller.
//!
//! [`PuzzleEngine`] owns the scanner, the feedback dispatcher and the level
//! state machine, and runs one complete cycle per trigger press:
//!
//! 1. scan all gates into a [`GateSnapshot`] and tally it;
//! 2. if admin keys are on the board, apply them in gate order and stop;
//! 3. otherwise evaluate the level rules, move the level on
//!    [`Verdict::Advance`] and play the matching feedback.
//!
//! Cycles never fail. Collaborator faults are logged by the scanner and the
//! dispatcher and the cycle carries on with what it has.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use puzzlebox_core::{GateSnapshot, Level};
use puzzlebox_hardware::{
    GateActuator, IndicatorBank, Narrator, TokenReader, TriggerEvent, TriggerInput,
};
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, MissedTickBehavior, interval, sleep};
use tracing::{debug, info, warn};

use crate::admin::{AdminCommand, admin_commands};
use crate::config::PuzzleConfig;
use crate::cue::Cue;
use crate::error::{ConfigError, Result};
use crate::feedback::FeedbackDispatcher;
use crate::level::{LevelStateMachine, LevelTransition};
use crate::rules::{Verdict, evaluate};
use crate::scanner::GateScanner;
use crate::tally::CategoryTally;

/// How a cycle was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Admin keys replaced rule evaluation. Commands are listed in gate order.
    Override(Vec<AdminCommand>),
    /// The level rules judged the board.
    Evaluated(Verdict),
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Override(commands) => {
                f.write_str("override:")?;
                for command in commands {
                    write!(f, " {command}")?;
                }
                Ok(())
            }
            CycleOutcome::Evaluated(verdict) => write!(f, "{verdict}"),
        }
    }
}

/// Everything that happened during one trigger cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// When the trigger was pressed.
    pub triggered_at: DateTime<Utc>,

    /// When the cycle, feedback included, was done.
    pub finished_at: DateTime<Utc>,

    /// Time since the engine was created, at the start of the cycle.
    pub uptime: Duration,

    /// Level the cycle started at.
    pub level_before: Level,

    /// Level after the cycle.
    pub level_after: Level,

    /// Gate contents as scanned.
    pub snapshot: GateSnapshot,

    /// Group counts of the snapshot.
    pub tally: CategoryTally,

    /// Override or verdict.
    pub outcome: CycleOutcome,

    /// Level changes made by the cycle, oldest first.
    pub transitions: Vec<LevelTransition>,
}

impl CycleReport {
    /// The verdict, when the rules were evaluated.
    pub fn verdict(&self) -> Option<Verdict> {
        match self.outcome {
            CycleOutcome::Evaluated(verdict) => Some(verdict),
            CycleOutcome::Override(_) => None,
        }
    }

    /// Returns `true` if admin keys handled the cycle.
    pub fn is_override(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Override(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intro {
    /// Greeting playing; the first briefing follows once it ends.
    AwaitingWelcomeEnd,
    Idle,
}

/// Puzzle controller for one board.
pub struct PuzzleEngine<R, G, N, I> {
    scanner: GateScanner<R, G>,
    feedback: FeedbackDispatcher<N, I>,
    levels: LevelStateMachine,
    admin_enabled: bool,
    diagnostics: bool,
    intro: Intro,
    started_at: Instant,
    last_cycle_end: Option<Instant>,
    last_snapshot: GateSnapshot,
    last_tally: CategoryTally,
}

impl<R, G, N, I> PuzzleEngine<R, G, N, I>
where
    R: TokenReader,
    G: GateActuator,
    N: Narrator,
    I: IndicatorBank,
{
    /// Build an engine at the first stage from a configuration and devices.
    ///
    /// # Errors
    ///
    /// Returns an error if the token registry in `config` is invalid.
    pub fn new(
        config: &PuzzleConfig,
        reader: R,
        gates: G,
        narrator: N,
        indicators: I,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let registry = config.build_registry()?;

        let mut scanner =
            GateScanner::new(reader, gates, registry).with_timing(config.timing.scan_timing());
        scanner.set_verbose(config.diagnostics);

        let feedback = FeedbackDispatcher::new(narrator, indicators)
            .with_timing(config.timing.feedback_timing());

        info!(
            tokens = scanner.registry().len(),
            admin_enabled = config.admin_enabled,
            diagnostics = config.diagnostics,
            "puzzle engine created"
        );

        Ok(Self {
            scanner,
            feedback,
            levels: LevelStateMachine::new(),
            admin_enabled: config.admin_enabled,
            diagnostics: config.diagnostics,
            intro: Intro::Idle,
            started_at: Instant::now(),
            last_cycle_end: None,
            last_snapshot: GateSnapshot::empty(),
            last_tally: CategoryTally::default(),
        })
    }

    /// Replace the level state machine, e.g. to resume at a saved level.
    pub fn with_levels(mut self, levels: LevelStateMachine) -> Self {
        self.levels = levels;
        self
    }

    /// Current level.
    pub fn level(&self) -> Level {
        self.levels.current()
    }

    /// Level state machine with its history.
    pub fn levels(&self) -> &LevelStateMachine {
        &self.levels
    }

    /// Returns `true` if verbose diagnostics are on.
    pub fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    /// Returns `true` if admin keys override cycles.
    pub fn admin_enabled(&self) -> bool {
        self.admin_enabled
    }

    /// Returns `true` while the first briefing is still waiting for the
    /// greeting to end.
    pub fn intro_pending(&self) -> bool {
        self.intro == Intro::AwaitingWelcomeEnd
    }

    /// Snapshot of the latest cycle.
    pub fn last_snapshot(&self) -> &GateSnapshot {
        &self.last_snapshot
    }

    /// Tally of the latest cycle.
    pub fn last_tally(&self) -> &CategoryTally {
        &self.last_tally
    }

    /// Gate scanner, for its registry and timing.
    pub fn scanner(&self) -> &GateScanner<R, G> {
        &self.scanner
    }

    /// Time since the engine was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Play the greeting and arm the introduction.
    pub async fn start(&mut self) {
        match self.scanner.reader_info().await {
            Ok(reader) => info!(
                reader = %reader.name,
                firmware = reader.firmware_version.as_deref().unwrap_or("unknown"),
                "token reader ready"
            ),
            Err(e) => warn!(error = %e, "token reader did not identify itself"),
        }
        info!(level = %self.level(), "puzzle starting");
        if self.feedback.play(Cue::Welcome).await {
            self.intro = Intro::AwaitingWelcomeEnd;
        }
    }

    /// Advance the introduction between cycles.
    ///
    /// Once the greeting has finished, waits the intro pause and starts the
    /// briefing of the current level without waiting for it.
    pub async fn poll_idle(&mut self) {
        if self.intro != Intro::AwaitingWelcomeEnd || !self.feedback.playback_finished().await {
            return;
        }

        self.intro = Intro::Idle;
        sleep(self.feedback.timing().intro_pause).await;
        if let Some(cue) = Cue::briefing_for(self.level()) {
            self.feedback.play(cue).await;
        }
    }

    /// Run one cycle for a trigger press.
    ///
    /// Returns `None` if the press happened before the previous cycle ended;
    /// such presses are discarded, not queued.
    pub async fn on_trigger(&mut self, event: TriggerEvent) -> Option<CycleReport> {
        if let Some(end) = self.last_cycle_end
            && event.instant < end
        {
            debug!(
                pressed_at = %event.pressed_at,
                early_by_ms = (end - event.instant).as_millis() as u64,
                "discarding stale trigger"
            );
            return None;
        }

        let uptime = self.uptime();
        let level_before = self.level();

        let snapshot = self.scanner.scan_all().await;
        let tally = CategoryTally::of(&snapshot);
        info!(
            level = %level_before,
            uptime = %format_uptime(uptime),
            %snapshot,
            "trigger"
        );
        if self.diagnostics {
            info!(%tally, "tally");
        } else {
            debug!(%tally, "tally");
        }

        let mut transitions = Vec::new();
        let outcome = match self.override_commands(&snapshot) {
            Some(commands) => {
                for command in &commands {
                    self.apply_admin(*command, &mut transitions).await;
                }
                CycleOutcome::Override(commands)
            }
            None => {
                let verdict = evaluate(level_before, &snapshot, &tally);
                info!(level = %level_before, %verdict, "verdict");
                self.apply_verdict(verdict, &mut transitions).await;
                CycleOutcome::Evaluated(verdict)
            }
        };

        self.last_snapshot = snapshot;
        self.last_tally = tally;

        let finished_at = Utc::now();
        self.last_cycle_end = Some(Instant::now());

        Some(CycleReport {
            triggered_at: event.pressed_at,
            finished_at,
            uptime,
            level_before,
            level_after: self.level(),
            snapshot,
            tally,
            outcome,
            transitions,
        })
    }

    /// Start the puzzle and serve triggers until the trigger input fails.
    ///
    /// The introduction is advanced between presses.
    ///
    /// # Errors
    ///
    /// Returns an error when the trigger input reports a failure, for example
    /// because it was disconnected.
    pub async fn run<T: TriggerInput>(&mut self, trigger: &mut T) -> Result<()> {
        self.start().await;

        let mut idle = interval(self.feedback.timing().playback_poll);
        idle.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = trigger.next_trigger() => {
                    let event = event?;
                    if let Some(report) = self.on_trigger(event).await {
                        debug!(outcome = %report.outcome, level = %report.level_after, "cycle done");
                    }
                }
                _ = idle.tick() => self.poll_idle().await,
            }
        }
    }

    /// Admin commands that take over this cycle, if any.
    fn override_commands(&self, snapshot: &GateSnapshot) -> Option<Vec<AdminCommand>> {
        if !self.admin_enabled {
            return None;
        }

        let commands: Vec<_> = admin_commands(snapshot)
            .into_iter()
            .inspect(|(gate, command)| debug!(%gate, %command, "admin key"))
            .map(|(_, command)| command)
            .collect();

        if commands.iter().any(|command| command.is_override()) {
            Some(commands)
        } else {
            if !commands.is_empty() {
                info!("unassigned admin key ignored");
            }
            None
        }
    }

    async fn apply_verdict(&mut self, verdict: Verdict, transitions: &mut Vec<LevelTransition>) {
        match self.levels.apply_verdict(verdict) {
            Some(transition) => {
                info!(%transition, "level cleared");
                self.intro = Intro::Idle;
                self.feedback.celebrate(transition.from).await;
                transitions.push(transition);
            }
            None => {
                if self.feedback.announce(verdict).await {
                    self.intro = Intro::Idle;
                }
            }
        }
    }

    async fn apply_admin(&mut self, command: AdminCommand, transitions: &mut Vec<LevelTransition>) {
        info!(%command, level = %self.level(), "admin override");

        match command {
            AdminCommand::Reset => {
                let transition = self.levels.reset();
                self.feedback.set_all(false).await;
                self.intro = if self.feedback.play(Cue::Welcome).await {
                    Intro::AwaitingWelcomeEnd
                } else {
                    Intro::Idle
                };
                transitions.push(transition);
            }
            AdminCommand::StepBack => match self.levels.step_back() {
                Some(transition) => transitions.push(transition),
                None => debug!(level = %self.level(), "already at the first stage"),
            },
            AdminCommand::ForceAdvance => match self.levels.force_advance() {
                Some(transition) => {
                    self.intro = Intro::Idle;
                    self.feedback.celebrate(transition.from).await;
                    transitions.push(transition);
                }
                None => debug!("puzzle already completed"),
            },
            AdminCommand::ReplayHint(_) | AdminCommand::PlayFallback | AdminCommand::ReplayBriefing => {
                match command.replay_cue(self.level()) {
                    Some(cue) => {
                        self.intro = Intro::Idle;
                        self.feedback.play_and_wait(cue).await;
                    }
                    None => warn!(%command, level = %self.level(), "nothing to replay"),
                }
            }
            AdminCommand::ToggleDiagnostics => {
                self.diagnostics = !self.diagnostics;
                self.scanner.set_verbose(self.diagnostics);
                info!(enabled = self.diagnostics, "diagnostics toggled");
            }
            AdminCommand::Unassigned => {}
        }
    }
}

impl<R, G, N, I> fmt::Debug for PuzzleEngine<R, G, N, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PuzzleEngine")
            .field("level", &self.levels.current())
            .field("admin_enabled", &self.admin_enabled)
            .field("diagnostics", &self.diagnostics)
            .field("intro", &self.intro)
            .field("last_snapshot", &self.last_snapshot)
            .finish_non_exhaustive()
    }
}

/// Render a duration as `hh:mm:ss`.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
