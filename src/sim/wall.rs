//! Walls and ball-vs-wall collision
//!
//! Every level is built from axis-aligned wall boxes. A wall is either a
//! normal surface that simply absorbs the ball, or the level's objective.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::CONTACT_SKIN;

/// What a wall means to the shot session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallKind {
    #[default]
    Normal,
    Objective,
}

/// What the ball is touching, as reported on gesture end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WallContact {
    #[default]
    None,
    Normal,
    Objective,
}

impl From<WallKind> for WallContact {
    fn from(kind: WallKind) -> Self {
        match kind {
            WallKind::Normal => WallContact::Normal,
            WallKind::Objective => WallContact::Objective,
        }
    }
}

/// An axis-aligned wall box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: u32,
    #[serde(default)]
    pub kind: WallKind,
    pub min: Vec2,
    pub max: Vec2,
}

impl Wall {
    /// Build a wall from two opposite corners in any order
    pub fn new(id: u32, kind: WallKind, a: Vec2, b: Vec2) -> Self {
        Self {
            id,
            kind,
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn is_objective(&self) -> bool {
        self.kind == WallKind::Objective
    }

    /// Closest point on (or in) the box to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Collision point (if hit)
    pub point: Vec2,
    /// Surface normal at collision (pointing toward ball center)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check collision between a ball and a wall box
pub fn ball_wall_collision(ball_pos: Vec2, ball_radius: f32, wall: &Wall) -> CollisionResult {
    if wall.contains_point(ball_pos) {
        // Centre tunnelled inside: push out through the nearest face
        let to_min = ball_pos - wall.min;
        let to_max = wall.max - ball_pos;
        let faces = [
            (to_min.x, Vec2::NEG_X),
            (to_max.x, Vec2::X),
            (to_min.y, Vec2::NEG_Y),
            (to_max.y, Vec2::Y),
        ];
        let (depth, normal) = faces
            .into_iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .unwrap_or((0.0, Vec2::Y));
        return CollisionResult {
            hit: true,
            point: ball_pos - normal * depth,
            normal,
            penetration: depth + ball_radius,
        };
    }

    let closest = wall.closest_point(ball_pos);
    let delta = ball_pos - closest;
    let dist = delta.length();

    if dist < ball_radius {
        return CollisionResult {
            hit: true,
            point: closest,
            normal: delta / dist,
            penetration: ball_radius - dist,
        };
    }

    CollisionResult::miss()
}

/// Whether a ball overlaps a wall, allowing for the contact skin
pub fn ball_touches_wall(ball_pos: Vec2, ball_radius: f32, wall: &Wall) -> bool {
    let closest = wall.closest_point(ball_pos);
    (ball_pos - closest).length() <= ball_radius + CONTACT_SKIN
}

/// Classify what the ball is touching; an objective wins over a normal wall
pub fn classify_contact(ball_pos: Vec2, ball_radius: f32, walls: &[Wall]) -> WallContact {
    let mut contact = WallContact::None;
    for wall in walls {
        if ball_touches_wall(ball_pos, ball_radius, wall) {
            if wall.is_objective() {
                return WallContact::Objective;
            }
            contact = WallContact::Normal;
        }
    }
    contact
}

/// Collision response for a ball hitting a wall
///
/// The normal component is reflected and scaled by `restitution`, the
/// tangential component is reduced by `friction`. Velocity already moving
/// away from the surface is left alone.
pub fn bounce_velocity(velocity: Vec2, normal: Vec2, restitution: f32, friction: f32) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return velocity;
    }
    let normal_part = normal * vn;
    let tangent_part = velocity - normal_part;
    tangent_part * (1.0 - friction) - normal_part * restitution
}
