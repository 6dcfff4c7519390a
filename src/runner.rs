//! Fixed timestep driver
//!
//! Turns variable frame deltas into whole simulation ticks, and swaps levels
//! when the player asks for a restart or the next level.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::LevelError;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, LevelTable, SceneRequest, TickInput, tick};

/// Longest frame delta honoured; anything longer (tab switch, debugger) is clipped
const MAX_FRAME_DT: f32 = 0.1;

/// Fixed-step accumulator
#[derive(Debug, Clone, Default)]
pub struct FixedStepper {
    accumulator: f32,
}

impl FixedStepper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Leftover time not yet simulated, in seconds
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Run as many fixed ticks as `frame_dt` covers (at most `MAX_SUBSTEPS`).
    ///
    /// `input` is only delivered to the first tick so touches are not replayed.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, state: &mut GameState, input: &TickInput, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let idle = TickInput::default();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = if substeps == 0 { input } else { &idle };
            tick(state, input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        // Anything past the substep cap is dropped rather than carried forward
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }
}

/// Owns the current level and performs scene changes
#[derive(Debug, Clone)]
pub struct GameRunner {
    levels: LevelTable,
    settings: Settings,
    state: GameState,
    stepper: FixedStepper,
}

impl GameRunner {
    /// Start on `settings.start_level`
    pub fn new(levels: LevelTable, settings: Settings) -> Result<Self, LevelError> {
        let level = levels.load(settings.start_level)?;
        let state = GameState::new(&level, &settings);
        Ok(Self {
            levels,
            settings,
            state,
            stepper: FixedStepper::new(),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Simulate one rendered frame and return what happened during it
    pub fn frame(&mut self, input: &TickInput, frame_dt: f32) -> Vec<GameEvent> {
        self.stepper.advance(&mut self.state, input, frame_dt);
        let events = self.state.drain_events();

        for event in &events {
            if let GameEvent::SceneRequested(request) = event {
                if let Err(e) = self.change_scene(*request) {
                    log::error!("Scene change failed: {}", e);
                }
                // Remaining events belong to the level that was just replaced
                break;
            }
        }
        events
    }

    /// Replace the current level. Advancing past the last level wraps to the first.
    pub fn change_scene(&mut self, request: SceneRequest) -> Result<(), LevelError> {
        let level = match request {
            SceneRequest::Reload { level } => self.levels.load(level)?,
            SceneRequest::Load { level } => match self.levels.load(level) {
                Err(LevelError::UnknownLevel { number })
                    if self.levels.last_level().is_some_and(|last| number > last) =>
                {
                    let first = self.levels.first_level().unwrap_or(1);
                    log::info!(
                        "No {}; all levels cleared, back to level {}",
                        request.scene_name(),
                        first
                    );
                    self.levels.load(first)?
                }
                other => other?,
            },
        };

        self.state = GameState::new(&level, &self.settings);
        self.stepper.reset();
        Ok(())
    }
}
