//! Engine configuration

use glam::DVec2;

use super::defaults;
use crate::types::{Color, PenSize};

/// Where a blocked motion returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollbackPolicy {
    /// The last step that passed collision testing.
    #[default]
    LastCheckpoint,
    /// The position and rotation the motion started from.
    MotionStart,
}

/// Tunables for a [`Turtle`](super::Turtle).
#[derive(Debug, Clone, PartialEq)]
pub struct TurtleConfig {
    /// Start position, also used by reset
    pub home: DVec2,
    /// Units per second
    pub speed: f32,
    /// Keypoints needed for a full circle
    pub arc_segments: f32,
    pub pen_size: PenSize,
    pub pen_color: Color,
    pub rollback: RollbackPolicy,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        TurtleConfig {
            home: defaults::HOME,
            speed: defaults::SPEED,
            arc_segments: defaults::ARC_SEGMENTS,
            pen_size: PenSize::new(defaults::PEN_RADIUS),
            pen_color: defaults::PEN_COLOR,
            rollback: RollbackPolicy::default(),
        }
    }
}

impl TurtleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_home(mut self, home: DVec2) -> Self {
        self.home = home;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = clamp_speed(speed);
        self
    }

    pub fn with_arc_segments(mut self, segments: f32) -> Self {
        self.arc_segments = segments.max(1.0);
        self
    }

    pub fn with_pen_size(mut self, radius: f32) -> Self {
        self.pen_size = PenSize::new(radius);
        self
    }

    pub fn with_pen_color(mut self, color: Color) -> Self {
        self.pen_color = color;
        self
    }

    pub fn with_rollback(mut self, rollback: RollbackPolicy) -> Self {
        self.rollback = rollback;
        self
    }
}

/// Keep speed positive so every animation has a finite duration.
pub(crate) fn clamp_speed(speed: f32) -> f32 {
    if speed.is_nan() {
        return defaults::MIN_SPEED;
    }
    speed.clamp(defaults::MIN_SPEED, defaults::MAX_SPEED)
}
