//! Ball Game - a drag-to-launch physics puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (aiming, ball physics, shot session)
//! - `renderer`: WebGPU rendering pipeline
//! - `pacing`: Frame rate limiting against an injectable clock
//! - `runner`: Fixed timestep accumulator
//! - `settings`: Player-facing tunables

pub mod error;
pub mod pacing;
pub mod renderer;
pub mod runner;
pub mod settings;
pub mod sim;

pub use error::{LevelError, SettingsError};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Simulation ticks per second
    pub const TICKS_PER_SECOND: u32 = 120;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Drag length (screen pixels) that maps to full power
    pub const DRAG_NORMALIZATION: f32 = 1500.0;
    /// Launch impulse at zero drag
    pub const MIN_POWER: f32 = 1.0;
    /// Launch impulse at full drag
    pub const MAX_POWER: f32 = 10.0;

    /// Delay before the restart/advance prompt appears
    pub const END_DELAY_SECS: f32 = 1.0;

    /// Ball defaults (world units)
    pub const BALL_RADIUS: f32 = 0.25;
    /// Downward acceleration, units/s²
    pub const GRAVITY: f32 = 9.81;
    /// Fraction of normal speed kept after a bounce
    pub const RESTITUTION: f32 = 0.3;
    /// Fraction of tangential speed lost per contact tick
    pub const WALL_FRICTION: f32 = 0.04;
    /// Extra distance at which a resting ball still counts as touching
    pub const CONTACT_SKIN: f32 = 0.02;

    /// Pointer animation ranges (local offset and scale)
    pub const POINTER_DISTANCE: (f32, f32) = (0.5, 1.0);
    pub const POINTER_SCALE: (f32, f32) = (0.18, 0.4);
}

/// Linear interpolation, `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Convert a duration in seconds to whole simulation ticks (rounded)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    (secs.max(0.0) * consts::TICKS_PER_SECOND as f32).round() as u64
}
