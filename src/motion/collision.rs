//! Per-step collision testing against an obstacle field

use glam::DVec2;

use crate::field::ObstacleField;
use crate::geometry::Polygon;

/// What the turtle ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitObject {
    /// The turtle left the drawable area entirely.
    Boundary,
    /// Index into [`ObstacleField::obstacles`].
    Obstacle(usize),
}

/// Side-channel collision report: the object hit and its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub object: HitObject,
    pub shape: Polygon,
}

/// Test a footprint at `position` against the field.
///
/// Obstacles are only candidates while the footprint still touches the
/// boundary; an obstacle is skipped unless `position` lies within its
/// bounding radius of its centroid. The first hit in field order wins.
pub fn test_collision(
    field: &dyn ObstacleField,
    footprint: &Polygon,
    position: DVec2,
) -> Option<Collision> {
    let boundary = field.boundary_shape();
    if !boundary.intersects(footprint) {
        return Some(Collision {
            object: HitObject::Boundary,
            shape: boundary,
        });
    }

    field
        .obstacles()
        .iter()
        .enumerate()
        .filter(|(_, obstacle)| {
            position.distance(obstacle.position()) <= obstacle.bounding_radius()
        })
        .find(|(_, obstacle)| obstacle.points().intersects(footprint))
        .map(|(index, obstacle)| Collision {
            object: HitObject::Obstacle(index),
            shape: obstacle.points().clone(),
        })
}
