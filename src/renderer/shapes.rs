//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::{Vertex, colors};
use crate::sim::{GameState, Wall, WallKind};

/// Segments used for the ball outline
const BALL_SEGMENTS: u32 = 24;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        // Triangle from center to edge
        vertices.push(Vertex::at(center, color));
        vertices.push(Vertex::at(center + Vec2::from_angle(theta1) * radius, color));
        vertices.push(Vertex::at(center + Vec2::from_angle(theta2) * radius, color));
    }

    vertices
}

/// Generate vertices for an axis-aligned rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let a = Vertex::new(min.x, min.y, color);
    let b = Vertex::new(max.x, min.y, color);
    let c = Vertex::new(max.x, max.y, color);
    let d = Vertex::new(min.x, max.y, color);
    vec![a, b, c, a, c, d]
}

/// A wall, coloured by kind
pub fn wall(wall: &Wall) -> Vec<Vertex> {
    let color = match wall.kind {
        WallKind::Normal => colors::WALL,
        WallKind::Objective => colors::OBJECTIVE,
    };
    rect(wall.min, wall.max, color)
}

/// Aim pointer: a triangle at `center` facing `dir`, `size` across
pub fn pointer(center: Vec2, dir: Vec2, size: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = dir.normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    let side = dir.perp();
    let half = size * 0.5;

    let tip = center + dir * half;
    let left = center - dir * half + side * half;
    let right = center - dir * half - side * half;
    vec![
        Vertex::at(tip, color),
        Vertex::at(left, color),
        Vertex::at(right, color),
    ]
}

/// Everything visible in a level, back to front
pub fn scene_vertices(state: &GameState) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(state.walls.len() * 6 + BALL_SEGMENTS as usize * 3 + 3);

    for w in &state.walls {
        vertices.extend(wall(w));
    }

    vertices.extend(circle(
        state.ball.pos,
        state.ball.radius,
        colors::BALL,
        BALL_SEGMENTS,
    ));

    if state.pointer.visible {
        vertices.extend(pointer(
            state.pointer_world_pos(),
            state.pointer.direction(),
            state.pointer.scale,
            colors::POINTER,
        ));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{LevelTable, PointerPose};

    #[test]
    fn test_circle_vertices_on_radius() {
        let verts = circle(Vec2::new(1.0, 2.0), 0.5, colors::BALL, 8);
        assert_eq!(verts.len(), 24);
        for tri in verts.chunks(3) {
            assert_eq!(tri[0].pos(), Vec2::new(1.0, 2.0));
            assert!(((tri[1].pos() - Vec2::new(1.0, 2.0)).length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pointer_tip_leads() {
        let verts = pointer(Vec2::ZERO, Vec2::X, 0.4, colors::POINTER);
        assert_eq!(verts.len(), 3);
        assert!((verts[0].pos() - Vec2::new(0.2, 0.0)).length() < 1e-6);
        assert!(verts[1].pos().x < 0.0 && verts[2].pos().x < 0.0);
        assert!(pointer(Vec2::ZERO, Vec2::ZERO, 0.4, colors::POINTER).is_empty());
    }

    #[test]
    fn test_scene_includes_pointer_only_while_aiming() {
        let level = LevelTable::builtin().load(1).unwrap();
        let mut state = GameState::new(&level, &Settings::default());
        let base = state.walls.len() * 6 + BALL_SEGMENTS as usize * 3;
        assert_eq!(scene_vertices(&state).len(), base);

        state.pointer = PointerPose::from_drag(Vec2::Y, 0.5);
        assert_eq!(scene_vertices(&state).len(), base + 3);
    }
}
