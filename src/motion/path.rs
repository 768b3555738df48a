//! Trajectories followed by animated motions.
//!
//! Each trajectory is described by progress-stamped vertices. The engine
//! samples it once per step and records a drawn segment every time progress
//! passes a vertex.

use enum_dispatch::enum_dispatch;
use glam::{DVec2, dvec2};

use crate::types::Heading;

/// Common behavior for all trajectories
#[enum_dispatch]
pub trait Trajectory {
    /// Position and raw (unnormalized) rotation at progress `t` in `[0, 1]`.
    fn sample(&self, t: f64) -> (DVec2, f32);

    /// Number of vertices, counting the start and the end point.
    fn vertex_count(&self) -> usize;

    /// Vertex `index` as `(progress, point)`. Vertex 0 is at progress 0 and
    /// the last one at progress 1.
    fn vertex(&self, index: usize) -> (f64, DVec2);

    /// Length travelled along the path.
    fn length(&self) -> f64;

    fn end(&self) -> (DVec2, f32) {
        self.sample(1.0)
    }
}

#[enum_dispatch(Trajectory)]
#[derive(Debug, Clone)]
pub enum Path {
    Straight(Straight),
    Circular(Circular),
}

/// Forward vector for a heading: rotation 0 faces screen-up.
pub fn forward_vector(heading: Heading) -> DVec2 {
    let angle = (heading.degrees() as f64 - 90.0).to_radians();
    dvec2(angle.cos(), angle.sin())
}

/// Right vector for a heading: rotation 0 faces screen-right.
pub fn right_vector(heading: Heading) -> DVec2 {
    let angle = heading.radians();
    dvec2(angle.cos(), angle.sin())
}

// ============================================================================
// Straight
// ============================================================================

/// Straight move with a fixed rotation.
#[derive(Debug, Clone)]
pub struct Straight {
    rotation: f32,
    vertices: [(f64, DVec2); 2],
}

impl Straight {
    pub fn new(start: DVec2, heading: Heading, distance: f32) -> Self {
        let end = start + forward_vector(heading) * distance as f64;
        Straight {
            rotation: heading.degrees(),
            vertices: [(0.0, start), (1.0, end)],
        }
    }
}

impl Trajectory for Straight {
    fn sample(&self, t: f64) -> (DVec2, f32) {
        let [(_, start), (_, end)] = self.vertices;
        if t >= 1.0 {
            return (end, self.rotation);
        }
        (start.lerp(end, t.max(0.0)), self.rotation)
    }

    fn vertex_count(&self) -> usize {
        2
    }

    fn vertex(&self, index: usize) -> (f64, DVec2) {
        self.vertices[index.min(1)]
    }

    fn length(&self) -> f64 {
        self.vertices[0].1.distance(self.vertices[1].1)
    }
}

// ============================================================================
// Circular
// ============================================================================

/// Arc of a true circle, sampled at keypoints and interpolated linearly
/// between them. Rotation sweeps uniformly with progress.
///
/// Keypoints are computed on demand, so a sweep of many turns costs no memory.
#[derive(Debug, Clone)]
pub struct Circular {
    start: DVec2,
    right: DVec2,
    direction: f64,
    start_radians: f64,
    sweep_radians: f64,
    start_rotation: f32,
    degrees: f32,
    radius: f32,
    /// Keypoints per unit of progress
    per_progress: f64,
    /// Keypoints before the end point, including the start
    interior: usize,
}

impl Circular {
    /// Arc of `radius` sweeping `degrees` (positive turns clockwise on screen).
    ///
    /// `segments` is the number of keypoints a full circle would get; a partial
    /// arc gets `ceil(segments * |degrees| / 360)` of them before the end point.
    pub fn new(start: DVec2, heading: Heading, radius: f32, degrees: f32, segments: f32) -> Self {
        let arc_factor = (degrees.abs() / 360.0) as f64;
        let per_progress = segments.max(1.0) as f64 * arc_factor;
        let interior = if per_progress > 0.0 {
            (per_progress.ceil() as usize).clamp(1, usize::MAX - 1)
        } else {
            1
        };

        Circular {
            start,
            right: right_vector(heading),
            direction: if degrees > 0.0 { -1.0 } else { 1.0 },
            start_radians: heading.radians(),
            sweep_radians: (degrees as f64).to_radians(),
            start_rotation: heading.degrees(),
            degrees,
            radius,
            per_progress,
            interior,
        }
    }

    fn point(&self, s: f64) -> DVec2 {
        let angle = self.start_radians + self.sweep_radians * s;
        self.start + self.direction * self.radius as f64 * (dvec2(angle.cos(), angle.sin()) - self.right)
    }

    /// Progress of keypoint `index`, which must be below `vertex_count`.
    fn progress_at(&self, index: usize) -> f64 {
        if index >= self.interior {
            1.0
        } else if index == 0 {
            0.0
        } else {
            index as f64 / self.per_progress
        }
    }
}

impl Trajectory for Circular {
    fn sample(&self, t: f64) -> (DVec2, f32) {
        let rotation = self.start_rotation + self.degrees * t.clamp(0.0, 1.0) as f32;
        if t >= 1.0 {
            return (self.point(1.0), rotation);
        }
        let t = t.max(0.0);
        let idx = ((t * self.per_progress).floor() as usize).min(self.interior - 1);
        let (t0, p0) = self.vertex(idx);
        let (t1, p1) = self.vertex(idx + 1);
        let span = t1 - t0;
        let local = if span > 0.0 { (t - t0) / span } else { 1.0 };
        (p0.lerp(p1, local.clamp(0.0, 1.0)), rotation)
    }

    fn vertex_count(&self) -> usize {
        self.interior + 1
    }

    fn vertex(&self, index: usize) -> (f64, DVec2) {
        let progress = self.progress_at(index);
        let point = if index == 0 { self.start } else { self.point(progress) };
        (progress, point)
    }

    fn length(&self) -> f64 {
        (self.degrees.abs() / 360.0) as f64 * std::f64::consts::TAU * self.radius as f64
    }
}
