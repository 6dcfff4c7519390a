//! Drag-to-aim gestures and launch power
//!
//! A gesture starts where the finger (or mouse) goes down. Dragging away from
//! that point sets both the launch direction and, through the drag length,
//! how hard the ball is hit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DRAG_NORMALIZATION, POINTER_DISTANCE, POINTER_SCALE};
use crate::lerp;

/// Power interpolant for a drag vector: `clamp(|offset| / 1500, 0, 1)`
#[inline]
pub fn power_interpolant(offset: Vec2) -> f32 {
    (offset.length() / DRAG_NORMALIZATION).clamp(0.0, 1.0)
}

/// A computed launch: unit direction and impulse magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub direction: Vec2,
    pub power: f32,
}

impl Launch {
    /// Impulse vector to apply to the ball
    pub fn impulse(&self) -> Vec2 {
        self.direction * self.power
    }
}

/// Turn a drag vector into a launch, lerping power between `min_power` and `max_power`
pub fn compute_launch(offset: Vec2, min_power: f32, max_power: f32) -> Launch {
    Launch {
        direction: offset.normalize_or_zero(),
        power: lerp(min_power, max_power, power_interpolant(offset)),
    }
}

/// An in-progress drag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimGesture {
    /// Screen position where the drag started
    pub start: Vec2,
    /// Vector from `start` to the current drag position
    pub offset: Vec2,
    /// Cached power interpolant for `offset`
    pub interp: f32,
}

impl AimGesture {
    pub fn begin(start: Vec2) -> Self {
        Self {
            start,
            offset: Vec2::ZERO,
            interp: 0.0,
        }
    }

    /// Follow the drag to a new screen position
    pub fn update(&mut self, pos: Vec2) {
        self.offset = pos - self.start;
        self.interp = power_interpolant(self.offset);
    }

    /// Finish the drag and compute the launch
    pub fn release(self, min_power: f32, max_power: f32) -> Launch {
        compute_launch(self.offset, min_power, max_power)
    }

    /// Pointer indicator pose for this drag
    pub fn pointer_pose(&self) -> PointerPose {
        PointerPose::from_drag(self.offset, self.interp)
    }
}

/// Where and how big to draw the aim pointer, relative to the ball
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerPose {
    pub visible: bool,
    /// Rotation of the pointer container, degrees counter-clockwise from +x
    pub angle_deg: f32,
    /// Distance of the pointer from the ball centre
    pub distance: f32,
    /// Uniform pointer scale
    pub scale: f32,
}

impl PointerPose {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn from_drag(offset: Vec2, interp: f32) -> Self {
        Self {
            visible: true,
            angle_deg: offset.y.atan2(offset.x).to_degrees(),
            distance: lerp(POINTER_DISTANCE.0, POINTER_DISTANCE.1, interp),
            scale: lerp(POINTER_SCALE.0, POINTER_SCALE.1, interp),
        }
    }

    /// Unit vector the pointer faces
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.angle_deg.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MAX_POWER, MIN_POWER};
    use proptest::prelude::*;

    #[test]
    fn test_interpolant_reference_points() {
        assert_eq!(power_interpolant(Vec2::ZERO), 0.0);
        assert!((power_interpolant(Vec2::new(750.0, 0.0)) - 0.5).abs() < 1e-6);
        assert_eq!(power_interpolant(Vec2::new(0.0, -1500.0)), 1.0);
        assert_eq!(power_interpolant(Vec2::new(3000.0, 3000.0)), 1.0);
    }

    #[test]
    fn test_launch_power_range() {
        let weak = compute_launch(Vec2::new(1.0, 0.0), MIN_POWER, MAX_POWER);
        assert!(weak.power >= MIN_POWER && weak.power < MIN_POWER + 0.01);

        let strong = compute_launch(Vec2::new(0.0, 5000.0), MIN_POWER, MAX_POWER);
        assert_eq!(strong.power, MAX_POWER);
        assert!((strong.direction - Vec2::Y).length() < 1e-6);
        assert!((strong.impulse() - Vec2::new(0.0, MAX_POWER)).length() < 1e-5);
    }

    #[test]
    fn test_zero_drag_has_no_direction() {
        let launch = compute_launch(Vec2::ZERO, MIN_POWER, MAX_POWER);
        assert_eq!(launch.direction, Vec2::ZERO);
        assert_eq!(launch.impulse(), Vec2::ZERO);
    }

    #[test]
    fn test_gesture_tracks_offset() {
        let mut gesture = AimGesture::begin(Vec2::new(100.0, 100.0));
        gesture.update(Vec2::new(400.0, 500.0));
        assert_eq!(gesture.offset, Vec2::new(300.0, 400.0));
        assert!((gesture.interp - 500.0 / 1500.0).abs() < 1e-6);

        let launch = gesture.release(MIN_POWER, MAX_POWER);
        assert!((launch.direction - Vec2::new(0.6, 0.8)).length() < 1e-6);
        assert!((launch.power - (1.0 + 9.0 / 3.0)).abs() < 1e-4);
    }

    #[test]
    fn test_pointer_pose_animation() {
        let pose = PointerPose::from_drag(Vec2::new(0.0, 10.0), 0.0);
        assert!(pose.visible);
        assert!((pose.angle_deg - 90.0).abs() < 1e-4);
        assert_eq!(pose.distance, 0.5);
        assert_eq!(pose.scale, 0.18);

        let full = PointerPose::from_drag(Vec2::new(-10.0, 0.0), 1.0);
        assert!((full.angle_deg.abs() - 180.0).abs() < 1e-4);
        assert_eq!(full.distance, 1.0);
        assert_eq!(full.scale, 0.4);
        assert!(!PointerPose::hidden().visible);
    }

    proptest! {
        #[test]
        fn interpolant_is_clamped(x in -1.0e5f32..1.0e5, y in -1.0e5f32..1.0e5) {
            let t = power_interpolant(Vec2::new(x, y));
            prop_assert!((0.0..=1.0).contains(&t));
        }

        #[test]
        fn interpolant_is_monotonic(
            angle in 0.0f32..std::f32::consts::TAU,
            a in 0.0f32..4000.0,
            b in 0.0f32..4000.0,
        ) {
            let (short, long) = if a <= b { (a, b) } else { (b, a) };
            let dir = Vec2::from_angle(angle);
            prop_assert!(power_interpolant(dir * short) <= power_interpolant(dir * long));
        }

        #[test]
        fn launch_is_pure(x in -5000.0f32..5000.0, y in -5000.0f32..5000.0) {
            let offset = Vec2::new(x, y);
            let first = compute_launch(offset, MIN_POWER, MAX_POWER);
            let second = compute_launch(offset, MIN_POWER, MAX_POWER);
            prop_assert_eq!(first, second);
            prop_assert!(first.power >= MIN_POWER && first.power <= MAX_POWER);
        }
    }
}
