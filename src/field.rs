//! Obstacle field consumed by the motion engine.
//!
//! The engine only reads the field. Whoever owns it may add or remove
//! obstacles, but only while no motion is in flight.

use glam::{DVec2, dvec2};

use crate::geometry::{Polygon, Rect};
use crate::types::Color;

/// Read-only view of the canvas and its obstacles.
pub trait ObstacleField: Send + Sync {
    /// Outline of the drawable area. A turtle whose footprint leaves it
    /// entirely collides with the boundary itself.
    fn boundary_shape(&self) -> Polygon;

    /// Obstacles in hit-test order.
    fn obstacles(&self) -> &[Obstacle];
}

/// A solid polygon the turtle cannot enter.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    points: Polygon,
    color: Color,
    position: DVec2,
    bounding_radius: f64,
}

impl Obstacle {
    pub fn new(points: Polygon, color: Color) -> Self {
        let position = points.centroid();
        let bounding_radius = points.bounding_radius();
        Obstacle {
            points,
            color,
            position,
            bounding_radius,
        }
    }

    /// Regular polygon obstacle centered on `center`.
    pub fn regular(center: DVec2, size: f64, sides: usize, rotation: f64, color: Color) -> Self {
        Obstacle::new(Polygon::regular(center, size, sides, rotation), color)
    }

    /// Axis-aligned rectangle obstacle.
    pub fn rect(min: DVec2, max: DVec2, color: Color) -> Self {
        Obstacle::new(Rect::from_corners(min, max).to_polygon(), color)
    }

    pub fn points(&self) -> &Polygon {
        &self.points
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Centroid of the vertices
    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Move the obstacle so its centroid lands on `position`.
    ///
    /// The bounding radius is translation-invariant and stays as computed.
    pub fn set_position(&mut self, position: DVec2) {
        let delta = position - self.position;
        if delta == DVec2::ZERO {
            return;
        }
        self.position = position;
        self.points.translate(delta);
    }

    pub fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.points.intersects_rect(rect)
    }
}

/// Rectangular canvas anchored at the origin, holding obstacles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Canvas {
    width: f64,
    height: f64,
    obstacles: Vec<Obstacle>,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Canvas {
            width,
            height,
            obstacles: Vec::new(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.add_obstacle(obstacle);
        self
    }

    pub fn obstacle(&self, index: usize) -> Option<&Obstacle> {
        self.obstacles.get(index)
    }

    pub fn obstacle_mut(&mut self, index: usize) -> Option<&mut Obstacle> {
        self.obstacles.get_mut(index)
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }
}

impl ObstacleField for Canvas {
    fn boundary_shape(&self) -> Polygon {
        Rect::from_corners(DVec2::ZERO, dvec2(self.width, self.height)).to_polygon()
    }

    fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }
}
