//! Geometry and collision primitives: polygons, bounding rectangles, and the
//! bounding-rectangle overlap test used as the collision predicate.
//!
//! Exact polygon/polygon intersection is never computed. Two shapes collide
//! when their axis-aligned bounding rectangles overlap.

use glam::{DVec2, dvec2};

/// Axis-aligned bounding rectangle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    /// Create an empty rectangle (will expand on first point)
    pub fn empty() -> Self {
        Rect {
            min: DVec2::splat(f64::MAX),
            max: DVec2::splat(f64::MIN),
        }
    }

    /// Rectangle spanning two corners in any order
    pub fn from_corners(a: DVec2, b: DVec2) -> Self {
        Rect {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Check if the rect is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Length of the diagonal from top-left to bottom-right
    pub fn diagonal(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.min.distance(self.max)
        }
    }

    /// Strict overlap test.
    ///
    /// Rectangles with zero width or height never intersect, and rectangles
    /// that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    fn is_degenerate(&self) -> bool {
        self.is_empty() || self.width() == 0.0 || self.height() == 0.0
    }

    /// The four corners as a closed polygon (clockwise on screen)
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(vec![
            self.min,
            dvec2(self.max.x, self.min.y),
            self.max,
            dvec2(self.min.x, self.max.y),
        ])
    }
}

/// Ordered list of vertices
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    points: Vec<DVec2>,
}

impl Polygon {
    pub fn new(points: Vec<DVec2>) -> Self {
        Polygon { points }
    }

    /// `sides` vertices equally spaced by `360 / sides` degrees around `center`,
    /// the first one at `rotation` degrees (measured from +x toward +y).
    pub fn regular(center: DVec2, radius: f64, sides: usize, rotation: f64) -> Self {
        if sides == 0 {
            return Polygon::default();
        }
        let step = 360.0 / sides as f64;
        let points = (0..sides)
            .map(|i| {
                let angle = (rotation + step * i as f64).to_radians();
                center + radius * dvec2(angle.cos(), angle.sin())
            })
            .collect();
        Polygon { points }
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounding_rect(&self) -> Rect {
        let mut rect = Rect::empty();
        for &p in &self.points {
            rect.expand_point(p);
        }
        rect
    }

    /// Half the diagonal of the bounding rectangle.
    ///
    /// A conservative distance bound, not the tight circumradius.
    pub fn bounding_radius(&self) -> f64 {
        self.bounding_rect().diagonal() * 0.5
    }

    /// Vertex average, or the origin for an empty polygon
    pub fn centroid(&self) -> DVec2 {
        if self.points.is_empty() {
            return DVec2::ZERO;
        }
        self.points.iter().copied().sum::<DVec2>() / self.points.len() as f64
    }

    pub fn translate(&mut self, delta: DVec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    pub fn translated(&self, delta: DVec2) -> Polygon {
        let mut moved = self.clone();
        moved.translate(delta);
        moved
    }

    /// Bounding-rectangle collision predicate
    pub fn intersects(&self, other: &Polygon) -> bool {
        self.bounding_rect().intersects(&other.bounding_rect())
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.bounding_rect().intersects(rect)
    }
}

impl FromIterator<DVec2> for Polygon {
    fn from_iter<I: IntoIterator<Item = DVec2>>(iter: I) -> Self {
        Polygon::new(iter.into_iter().collect())
    }
}
