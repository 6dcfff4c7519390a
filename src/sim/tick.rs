//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::aim::{AimGesture, PointerPose};
use super::state::{GameEvent, GameState};
use super::wall::{ball_wall_collision, bounce_velocity, classify_contact};
use crate::consts::*;

/// Impacts slower than this (units/s into the wall) are resting contact, not hits
const IMPACT_SPEED: f32 = 0.5;

/// Phase of a touch, mirroring what touch screens report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
}

/// One touch sample in screen space (pixels, y up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub phase: TouchPhase,
    pub pos: Vec2,
}

impl Touch {
    pub fn began(pos: Vec2) -> Self {
        Self { phase: TouchPhase::Began, pos }
    }

    pub fn moved(pos: Vec2) -> Self {
        Self { phase: TouchPhase::Moved, pos }
    }

    pub fn ended(pos: Vec2) -> Self {
        Self { phase: TouchPhase::Ended, pos }
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Touch samples in the order they happened; mouse input is fed in as a touch
    pub touches: Vec<Touch>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    for touch in &input.touches {
        handle_touch(state, touch);
    }

    integrate_ball(state, dt);

    if let Some(phase) = state.session.step(state.time_ticks) {
        if phase.is_finished() {
            state.gesture = None;
            state.pointer = PointerPose::hidden();
        }
        state.events.push(GameEvent::PhaseChanged(phase));
    }
}

fn handle_touch(state: &mut GameState, touch: &Touch) {
    if state.session.accepts_shots() {
        match touch.phase {
            TouchPhase::Began => {
                state.gesture = Some(AimGesture::begin(touch.pos));
            }
            TouchPhase::Moved => {
                if let Some(gesture) = state.gesture.as_mut() {
                    gesture.update(touch.pos);
                    state.pointer = gesture.pointer_pose();
                }
            }
            TouchPhase::Ended => {
                if let Some(mut gesture) = state.gesture.take() {
                    gesture.update(touch.pos);
                    fire(state, gesture);
                }
            }
        }
    }

    if touch.phase == TouchPhase::Began {
        if let Some(request) = state.session.tap() {
            log::info!("Scene requested: {}", request.scene_name());
            state.events.push(GameEvent::SceneRequested(request));
        }
    }
}

fn fire(state: &mut GameState, gesture: AimGesture) {
    state.pointer = PointerPose::hidden();

    let contact = classify_contact(state.ball.pos, state.ball.radius, &state.walls);
    let launch = gesture.release(state.min_power, state.max_power);
    state.ball.launch(&launch);

    if state.session.record_shot(contact) {
        state.events.push(GameEvent::ShotFired { launch, contact });
    }
}

fn integrate_ball(state: &mut GameState, dt: f32) {
    let ball = &mut state.ball;
    ball.vel.y -= GRAVITY * dt;
    ball.pos += ball.vel * dt;

    for wall in &state.walls {
        let hit = ball_wall_collision(ball.pos, ball.radius, wall);
        if !hit.hit {
            continue;
        }

        ball.pos += hit.normal * hit.penetration;
        let impact = -ball.vel.dot(hit.normal);
        ball.vel = bounce_velocity(ball.vel, hit.normal, RESTITUTION, WALL_FRICTION);

        state.session.report_contact(wall.kind);
        if impact > IMPACT_SPEED {
            log::trace!("Ball hit wall {} at {:.2} u/s", wall.id, impact);
            state.events.push(GameEvent::WallHit {
                wall_id: wall.id,
                kind: wall.kind,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::level::{LevelDetails, LevelLayout};
    use crate::sim::session::{LevelPhase, SceneRequest};
    use crate::sim::wall::{Wall, WallContact, WallKind};

    /// Flat floor at y=0 with a wide objective ceiling at y=1
    fn target_level(attempts: u32) -> LevelDetails {
        LevelDetails {
            number: 4,
            attempts,
            start_pos: Some(Vec2::new(0.0, BALL_RADIUS)),
            layout: LevelLayout {
                spawn: Vec2::ZERO,
                walls: vec![
                    Wall::new(1, WallKind::Normal, Vec2::new(-10.0, -1.0), Vec2::new(10.0, 0.0)),
                    Wall::new(2, WallKind::Objective, Vec2::new(-10.0, 1.0), Vec2::new(10.0, 1.5)),
                ],
            },
        }
    }

    /// Flat floor only, objective out of reach
    fn floor_level(attempts: u32) -> LevelDetails {
        let mut level = target_level(attempts);
        level.layout.walls[1] =
            Wall::new(2, WallKind::Objective, Vec2::new(50.0, 50.0), Vec2::new(51.0, 51.0));
        level
    }

    fn drag(from: Vec2, to: Vec2) -> TickInput {
        TickInput {
            touches: vec![Touch::began(from), Touch::moved(to), Touch::ended(to)],
        }
    }

    fn tap() -> TickInput {
        TickInput {
            touches: vec![Touch::began(Vec2::new(10.0, 10.0))],
        }
    }

    fn run(state: &mut GameState, secs: f32) {
        let idle = TickInput::default();
        for _ in 0..(secs / SIM_DT) as u32 {
            tick(state, &idle, SIM_DT);
        }
    }

    #[test]
    fn test_drag_shows_pointer_then_launches() {
        let mut state = GameState::new(&floor_level(3), &Settings::default());
        let start = Vec2::new(500.0, 500.0);

        let input = TickInput {
            touches: vec![Touch::began(start), Touch::moved(start + Vec2::new(750.0, 0.0))],
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.pointer.visible);
        assert!((state.pointer.distance - 0.75).abs() < 1e-5);
        assert_eq!(state.session.shots_remaining(), 3);

        let input = TickInput {
            touches: vec![Touch::ended(start + Vec2::new(750.0, 0.0))],
        };
        tick(&mut state, &input, SIM_DT);
        assert!(!state.pointer.visible);
        assert!(state.gesture.is_none());
        assert_eq!(state.session.shots_remaining(), 2);
        assert!(state.ball.vel.x > 5.0);

        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::ShotFired {
                contact: WallContact::Normal,
                ..
            }
        )));
    }

    #[test]
    fn test_three_normal_shots_then_restart() {
        let mut state = GameState::new(&floor_level(3), &Settings::default());
        let origin = Vec2::new(100.0, 100.0);

        for _ in 0..3 {
            assert_eq!(state.phase(), LevelPhase::Playing);
            tick(&mut state, &drag(origin, origin + Vec2::new(10.0, 10.0)), SIM_DT);
            run(&mut state, 0.5);
        }
        assert!(matches!(state.phase(), LevelPhase::Lost | LevelPhase::CanRestart));
        assert_eq!(state.session.shots_label(), "No more shots!");

        run(&mut state, 1.5);
        assert_eq!(state.phase(), LevelPhase::CanRestart);

        // Further drags do nothing, a tap asks for a reload
        tick(&mut state, &drag(origin, origin + Vec2::new(0.0, 1500.0)), SIM_DT);
        assert_eq!(state.session.shots_taken(), 3);

        state.drain_events();
        tick(&mut state, &tap(), SIM_DT);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::SceneRequested(SceneRequest::Reload { level: 4 })]
        );
    }

    #[test]
    fn test_objective_on_second_shot_advances() {
        let mut state = GameState::new(&target_level(3), &Settings::default());
        let origin = Vec2::new(100.0, 100.0);

        // Weak sideways shot stays under the objective
        tick(&mut state, &drag(origin, origin + Vec2::new(1.0, 0.0)), SIM_DT);
        run(&mut state, 0.5);
        assert_eq!(state.phase(), LevelPhase::Playing);
        assert!(!state.session.got_objective());

        // Full power straight up
        tick(&mut state, &drag(origin, origin + Vec2::new(0.0, 1500.0)), SIM_DT);
        run(&mut state, 0.5);
        assert!(state.session.got_objective());
        assert_eq!(state.session.shots_remaining(), 1);

        run(&mut state, 1.0);
        assert_eq!(state.phase(), LevelPhase::CanAdvance);

        state.drain_events();
        tick(&mut state, &tap(), SIM_DT);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::SceneRequested(SceneRequest::Load { level: 5 })]
        );
    }

    #[test]
    fn test_phase_changes_are_reported() {
        let mut state = GameState::new(&floor_level(1), &Settings::default());
        let origin = Vec2::new(100.0, 100.0);
        tick(&mut state, &drag(origin, origin + Vec2::new(5.0, 5.0)), SIM_DT);
        run(&mut state, 1.5);

        let phases: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::PhaseChanged(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(phases, vec![LevelPhase::Lost, LevelPhase::CanRestart]);
    }

    #[test]
    fn test_ball_comes_to_rest_on_floor() {
        let mut level = floor_level(1);
        level.start_pos = Some(Vec2::new(0.0, 2.0));
        let mut state = GameState::new(&level, &Settings::default());
        run(&mut state, 3.0);

        assert!(state.ball.pos.y >= BALL_RADIUS - 0.05);
        assert!(state.ball.pos.y < BALL_RADIUS + 0.05);
        assert!(state.ball.vel.length() < 0.5);
    }

    #[test]
    fn test_huge_end_delay_from_settings_still_loses() {
        let settings = Settings::from_json(r#"{ "end_delay_secs": 1.0e30 }"#).unwrap();
        let mut state = GameState::new(&floor_level(1), &settings);
        let origin = Vec2::new(100.0, 100.0);
        tick(&mut state, &drag(origin, origin + Vec2::new(5.0, 5.0)), SIM_DT);
        assert_eq!(state.phase(), LevelPhase::Lost);

        run(&mut state, 2.0);
        assert_eq!(state.phase(), LevelPhase::Lost);
    }

    #[test]
    fn test_release_without_begin_is_ignored() {
        let mut state = GameState::new(&floor_level(2), &Settings::default());
        let input = TickInput {
            touches: vec![Touch::ended(Vec2::new(10.0, 10.0))],
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.session.shots_remaining(), 2);
    }

    #[test]
    fn test_determinism() {
        let level = target_level(3);
        let mut state1 = GameState::new(&level, &Settings::default());
        let mut state2 = GameState::new(&level, &Settings::default());

        let inputs = [
            drag(Vec2::ZERO, Vec2::new(300.0, 200.0)),
            TickInput::default(),
            drag(Vec2::ZERO, Vec2::new(-100.0, 900.0)),
        ];
        for _ in 0..60 {
            for input in &inputs {
                tick(&mut state1, input, SIM_DT);
                tick(&mut state2, input, SIM_DT);
            }
        }

        assert_eq!(state1.ball.pos, state2.ball.pos);
        assert_eq!(state1.ball.vel, state2.ball.vel);
        assert_eq!(state1.phase(), state2.phase());
        assert_eq!(state1.time_ticks, state2.time_ticks);
    }
}
