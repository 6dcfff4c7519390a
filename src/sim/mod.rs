//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Time comes in as a tick count, never from a wall clock
//! - Stable iteration order (walls in layout order)
//! - No rendering or platform dependencies

pub mod aim;
pub mod level;
pub mod session;
pub mod state;
pub mod tick;
pub mod wall;

pub use aim::{AimGesture, Launch, PointerPose, compute_launch, power_interpolant};
pub use level::{LevelDetails, LevelLayout, LevelTable, scene_name};
pub use session::{LevelPhase, SceneRequest, ScheduledTransition, ShotSession};
pub use state::{Ball, GameEvent, GameState};
pub use tick::{TickInput, Touch, TouchPhase, tick};
pub use wall::{CollisionResult, Wall, WallContact, WallKind, ball_wall_collision, classify_contact};
