//! Per-level shot session
//!
//! Tracks the shot budget for one playthrough of a level and decides when
//! the level is lost, won, and ready to restart or advance. The session never
//! goes back to `Playing`; a restart builds a fresh session.

use serde::{Deserialize, Serialize};

use super::level::scene_name;
use super::wall::{WallContact, WallKind};

/// Shot label once the budget is spent
pub const NO_MORE_SHOTS: &str = "No more shots!";
/// Prompt shown when the level can be restarted
pub const RESTART_PROMPT: &str = "TOUCH SCREEN TO RESTART";
/// Prompt shown when the next level can be loaded
pub const ADVANCE_PROMPT: &str = "TOUCH SCREEN TO ADVANCE";

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Shots can be taken
    Playing,
    /// Budget exhausted, waiting out the end delay
    Lost,
    /// Objective reached, waiting out the end delay
    Won,
    /// A tap reloads the level
    CanRestart,
    /// A tap loads the next level
    CanAdvance,
}

impl LevelPhase {
    /// Whether the level is over (shots no longer accepted)
    pub fn is_finished(&self) -> bool {
        !matches!(self, LevelPhase::Playing)
    }
}

/// A phase change that fires once the simulation clock reaches `at_tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTransition {
    pub at_tick: u64,
    pub to: LevelPhase,
}

impl ScheduledTransition {
    pub fn is_due(&self, now: u64) -> bool {
        now >= self.at_tick
    }
}

/// Scene change the host should perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneRequest {
    /// Reload the current level from scratch
    Reload { level: u32 },
    /// Load a different level
    Load { level: u32 },
}

impl SceneRequest {
    pub fn level(&self) -> u32 {
        match *self {
            SceneRequest::Reload { level } | SceneRequest::Load { level } => level,
        }
    }

    pub fn scene_name(&self) -> String {
        scene_name(self.level())
    }
}

/// Shot budget and win/lose state for one level playthrough
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotSession {
    level: u32,
    shots_remaining: u32,
    shots_taken: u32,
    /// Debug flag: shots are never consumed
    infinite_shots: bool,
    got_objective: bool,
    phase: LevelPhase,
    pending: Option<ScheduledTransition>,
    /// Ticks between Lost/Won and the restart/advance prompt
    end_delay_ticks: u64,
}

impl ShotSession {
    pub fn new(level: u32, attempts: u32, infinite_shots: bool, end_delay_ticks: u64) -> Self {
        Self {
            level,
            shots_remaining: attempts,
            shots_taken: 0,
            infinite_shots,
            got_objective: false,
            phase: LevelPhase::Playing,
            pending: None,
            end_delay_ticks,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn shots_remaining(&self) -> u32 {
        self.shots_remaining
    }

    pub fn shots_taken(&self) -> u32 {
        self.shots_taken
    }

    pub fn got_objective(&self) -> bool {
        self.got_objective
    }

    pub fn pending(&self) -> Option<ScheduledTransition> {
        self.pending
    }

    /// Gestures are only honoured while playing
    pub fn accepts_shots(&self) -> bool {
        self.phase == LevelPhase::Playing
    }

    /// Record a completed shot; `contact` is what the ball touched at release.
    ///
    /// Returns false (and changes nothing) once the level is over.
    pub fn record_shot(&mut self, contact: WallContact) -> bool {
        if !self.accepts_shots() {
            return false;
        }

        self.shots_taken += 1;
        if !self.infinite_shots {
            self.shots_remaining = self.shots_remaining.saturating_sub(1);
        }
        log::debug!(
            "Shot {} on level {} ({:?}), {} left",
            self.shots_taken,
            self.level,
            contact,
            self.shots_remaining
        );

        if contact == WallContact::Objective {
            self.objective_reached();
        }
        true
    }

    /// Report a wall the ball collided with during simulation
    pub fn report_contact(&mut self, kind: WallKind) {
        if kind == WallKind::Objective {
            self.objective_reached();
        }
    }

    /// The ball touched the objective. Still counts while the last shot of a
    /// lost level is in the air.
    pub fn objective_reached(&mut self) {
        if matches!(self.phase, LevelPhase::Playing | LevelPhase::Lost) && !self.got_objective {
            log::debug!("Objective reached on level {}", self.level);
            self.got_objective = true;
        }
    }

    /// Advance the session to simulation tick `now`.
    ///
    /// Returns the new phase if it changed during this step.
    pub fn step(&mut self, now: u64) -> Option<LevelPhase> {
        let before = self.phase;

        match self.phase {
            LevelPhase::Playing | LevelPhase::Lost if self.got_objective => {
                self.enter(LevelPhase::Won, now, LevelPhase::CanAdvance);
            }
            LevelPhase::Playing if self.shots_remaining == 0 && !self.infinite_shots => {
                self.enter(LevelPhase::Lost, now, LevelPhase::CanRestart);
            }
            _ => {}
        }

        if let Some(pending) = self.pending.filter(|p| p.is_due(now)) {
            self.pending = None;
            self.phase = pending.to;
            log::info!("Level {} -> {:?}", self.level, self.phase);
        }

        (self.phase != before).then_some(self.phase)
    }

    fn enter(&mut self, phase: LevelPhase, now: u64, then: LevelPhase) {
        self.phase = phase;
        self.pending = Some(ScheduledTransition {
            at_tick: now.saturating_add(self.end_delay_ticks),
            to: then,
        });
        log::info!("Level {} -> {:?}", self.level, phase);
    }

    /// Text for the shot counter
    pub fn shots_label(&self) -> String {
        match self.phase {
            LevelPhase::Lost | LevelPhase::CanRestart => NO_MORE_SHOTS.to_string(),
            _ => self.shots_remaining.to_string(),
        }
    }

    /// Prompt text, if one should be shown
    pub fn prompt_label(&self) -> Option<&'static str> {
        match self.phase {
            LevelPhase::CanRestart => Some(RESTART_PROMPT),
            LevelPhase::CanAdvance => Some(ADVANCE_PROMPT),
            _ => None,
        }
    }

    /// A tap anywhere on screen; only meaningful once a prompt is up
    pub fn tap(&self) -> Option<SceneRequest> {
        match self.phase {
            LevelPhase::CanRestart => Some(SceneRequest::Reload { level: self.level }),
            LevelPhase::CanAdvance => Some(SceneRequest::Load {
                level: self.level.saturating_add(1),
            }),
            _ => None,
        }
    }
}
