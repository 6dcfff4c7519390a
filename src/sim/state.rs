//! Game state and core simulation types
//!
//! Everything that belongs to one playthrough of one level lives here. A
//! restart throws the whole `GameState` away and builds a new one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aim::{AimGesture, Launch, PointerPose};
use super::level::LevelDetails;
use super::session::{LevelPhase, SceneRequest, ShotSession};
use super::wall::{Wall, WallContact, WallKind};
use crate::consts::*;
use crate::secs_to_ticks;
use crate::settings::Settings;

/// The player's ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
        }
    }

    /// Launch the ball: stall it, then apply the impulse (unit mass)
    pub fn launch(&mut self, launch: &Launch) {
        self.vel = launch.impulse();
    }
}

/// Something the host may want to react to (sound, HUD, scene loading)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A gesture ended and the ball was launched
    ShotFired { launch: Launch, contact: WallContact },
    /// The ball collided with a wall
    WallHit { wall_id: u32, kind: WallKind },
    /// The session moved to a new phase
    PhaseChanged(LevelPhase),
    /// The player tapped a restart/advance prompt
    SceneRequested(SceneRequest),
}

/// Complete state of one level playthrough
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Level number
    pub level: u32,
    pub walls: Vec<Wall>,
    pub ball: Ball,
    pub session: ShotSession,
    /// Drag in progress, if any
    pub gesture: Option<AimGesture>,
    /// Aim indicator, hidden unless dragging
    pub pointer: PointerPose,
    /// Launch power range
    pub min_power: f32,
    pub max_power: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events produced since the host last drained them
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Start a level
    pub fn new(level: &LevelDetails, settings: &Settings) -> Self {
        log::info!(
            "Starting {} with {} shot(s)",
            level.scene_name(),
            level.attempts
        );
        Self {
            level: level.number,
            walls: level.layout.walls.clone(),
            ball: Ball::new(level.start_position()),
            session: ShotSession::new(
                level.number,
                level.attempts,
                settings.infinite_shots,
                secs_to_ticks(settings.end_delay_secs),
            ),
            gesture: None,
            pointer: PointerPose::hidden(),
            min_power: settings.min_power,
            max_power: settings.max_power,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> LevelPhase {
        self.session.phase()
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pointer position in world space (centre of the pointer sprite)
    pub fn pointer_world_pos(&self) -> Vec2 {
        self.ball.pos + self.pointer.direction() * self.pointer.distance
    }
}
