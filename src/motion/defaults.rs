//! Default engine settings

use glam::{DVec2, dvec2};

use crate::types::Color;

pub const HOME: DVec2 = dvec2(450.0, 450.0);
pub const SPEED: f32 = 200.0;
pub const MIN_SPEED: f32 = 1.0;
pub const MAX_SPEED: f32 = 9999.0;
pub const ARC_SEGMENTS: f32 = 50.0;
pub const PEN_RADIUS: f32 = 3.0;
pub const PEN_COLOR: Color = Color::BLACK;
pub const FOOTPRINT_SIDES: usize = 10;
/// Arcs with a smaller radius complete immediately without moving.
pub const MIN_ARC_RADIUS: f32 = 0.001;
