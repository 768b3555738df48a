//! Motion state machine for the turtle cursor.
//!
//! This module is organized into submodules:
//! - `defaults`: Default engine settings
//! - `config`: `TurtleConfig` and the rollback policy
//! - `path`: Straight and circular trajectories
//! - `collision`: Per-step collision testing
//!
//! `turn` is applied synchronously. `forward` and `arc` start an animation
//! that only progresses when the host calls [`Turtle::advance`]. With an
//! obstacle field attached, each advance is split into sub-steps no longer
//! than the footprint radius, and every sub-step is collision-tested before it
//! becomes the new checkpoint. A collision cancels the motion, rolls the
//! turtle back and removes the segments the motion drew. Results and state changes
//! are queued as [`MotionEvent`]s for the host to drain.

pub mod collision;
pub mod config;
pub mod defaults;
pub mod path;

use std::sync::Arc;
use std::time::Duration;

use glam::DVec2;

pub use collision::{Collision, HitObject};
pub use config::{RollbackPolicy, TurtleConfig};
use path::{Circular, Path, Straight, Trajectory};

use crate::field::ObstacleField;
use crate::geometry::Polygon;
use crate::log::{debug, warn};
use crate::types::{Color, Heading, Line, MovementResult, PenSize};

/// Identifies one motion request; completions carry it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MotionId(u64);

impl MotionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Immediate answer to a motion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The request finished (or was rejected) synchronously.
    Settled(MovementResult),
    /// An animation started; its terminal result arrives later.
    InFlight(MotionId),
}

/// Notifications queued by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionEvent {
    /// A motion reported a result. Only `Paused` is non-terminal.
    Completed {
        motion: MotionId,
        result: MovementResult,
    },
    /// A motion was blocked by this object.
    Collision(Collision),
    /// Position or rotation changed.
    Moved { position: DVec2, rotation: f32 },
    /// Pen state, size or color changed.
    PenChanged,
    /// The drawn-lines sequence changed.
    LinesChanged { count: usize },
}

/// An animation in flight
#[derive(Debug, Clone)]
struct Animation {
    id: MotionId,
    path: Path,
    duration_ms: f64,
    elapsed_ms: f64,
    start: (DVec2, Heading),
    /// Index of the next trajectory vertex that ends a drawn segment
    next_vertex: usize,
    /// Where the segment currently being drawn began
    anchor: DVec2,
    /// Drawn-line count when the motion started
    lines_before: usize,
    paused: bool,
}

/// The turtle: position, rotation, pen and drawn lines, plus at most one
/// motion in flight.
pub struct Turtle {
    position: DVec2,
    heading: Heading,
    speed: f32,
    arc_segments: f32,
    pen_down: bool,
    pen_size: PenSize,
    pen_color: Color,
    lines: Vec<Line>,
    /// Footprint used for collisions, kept centered on `position`
    shape: Polygon,
    /// Last known-good position and rotation
    checkpoint: (DVec2, Heading),
    animation: Option<Animation>,
    field: Option<Arc<dyn ObstacleField>>,
    config: TurtleConfig,
    events: Vec<MotionEvent>,
    next_id: u64,
    /// Most recent motion that started an animation
    last_animation: Option<MotionId>,
}

impl Default for Turtle {
    fn default() -> Self {
        Turtle::new(TurtleConfig::default())
    }
}

impl std::fmt::Debug for Turtle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Turtle")
            .field("position", &self.position)
            .field("rotation", &self.heading.degrees())
            .field("pen_down", &self.pen_down)
            .field("pen_radius", &self.pen_size.radius())
            .field("lines", &self.lines.len())
            .field("moving", &self.is_moving())
            .finish()
    }
}

impl Turtle {
    pub fn new(config: TurtleConfig) -> Self {
        let mut turtle = Turtle {
            position: config.home,
            heading: Heading::NORTH,
            speed: config::clamp_speed(config.speed),
            arc_segments: config.arc_segments.max(1.0),
            pen_down: true,
            pen_size: config.pen_size,
            pen_color: config.pen_color,
            lines: Vec::new(),
            shape: Polygon::default(),
            checkpoint: (config.home, Heading::NORTH),
            animation: None,
            field: None,
            config,
            events: Vec::new(),
            next_id: 0,
            last_animation: None,
        };
        turtle.rebuild_shape();
        turtle
    }

    /// Attach the obstacle field used for collision testing.
    pub fn with_field(mut self, field: Arc<dyn ObstacleField>) -> Self {
        self.field = Some(field);
        self
    }

    pub fn set_field(&mut self, field: Option<Arc<dyn ObstacleField>>) {
        self.field = field;
    }

    pub fn field(&self) -> Option<&Arc<dyn ObstacleField>> {
        self.field.as_ref()
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    // ─── State queries ───────────────────────────────────────────────────────

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// Rotation in degrees, in `[0, 360)`
    pub fn rotation(&self) -> f32 {
        self.heading.degrees()
    }

    pub fn pen_down(&self) -> bool {
        self.pen_down
    }

    pub fn pen_radius(&self) -> f32 {
        self.pen_size.radius()
    }

    pub fn pen_color(&self) -> Color {
        self.pen_color
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn arc_segments(&self) -> f32 {
        self.arc_segments
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Footprint polygon: a decagon of pen radius around the position
    pub fn shape(&self) -> &Polygon {
        &self.shape
    }

    /// The position and rotation a collision would roll back to
    pub fn checkpoint(&self) -> (DVec2, Heading) {
        self.checkpoint
    }

    pub fn forward_vector(&self) -> DVec2 {
        path::forward_vector(self.heading)
    }

    pub fn right_vector(&self) -> DVec2 {
        path::right_vector(self.heading)
    }

    pub fn is_moving(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.animation.as_ref().is_some_and(|a| a.paused)
    }

    /// The motion currently in flight, if any
    pub fn current_motion(&self) -> Option<MotionId> {
        self.animation.as_ref().map(|a| a.id)
    }

    /// The most recent motion that started an animation, finished or not.
    ///
    /// Only this motion's terminal completion can have a waiter; every other
    /// completion was already answered synchronously.
    pub fn last_animation(&self) -> Option<MotionId> {
        self.last_animation
    }

    /// Take every queued notification, oldest first.
    pub fn drain_events(&mut self) -> Vec<MotionEvent> {
        std::mem::take(&mut self.events)
    }

    // ─── Setters ─────────────────────────────────────────────────────────────

    /// Teleport without drawing. While idle this also moves the checkpoint.
    pub fn set_position(&mut self, position: DVec2) {
        if self.position == position {
            return;
        }
        self.place(position, self.heading);
        if !self.is_moving() {
            self.checkpoint.0 = position;
        }
    }

    /// Set the rotation, normalized into `[0, 360)`.
    pub fn set_rotation(&mut self, degrees: f32) {
        let heading = Heading::new(degrees);
        if heading != self.heading {
            self.place(self.position, heading);
        }
        if !self.is_moving() {
            self.checkpoint.1 = heading;
        }
    }

    pub fn set_pen_down(&mut self, down: bool) {
        if self.pen_down == down {
            return;
        }
        self.pen_down = down;
        self.events.push(MotionEvent::PenChanged);
    }

    /// Set the pen radius (clamped to `[1, 9]`), which also resizes the footprint.
    pub fn set_pen_radius(&mut self, radius: f32) {
        let size = PenSize::new(radius);
        if size == self.pen_size {
            return;
        }
        self.pen_size = size;
        self.rebuild_shape();
        self.events.push(MotionEvent::PenChanged);
    }

    pub fn set_pen_color(&mut self, color: Color) {
        if self.pen_color == color {
            return;
        }
        self.pen_color = color;
        self.events.push(MotionEvent::PenChanged);
    }

    /// Set the speed in units per second, clamped to `[1, 9999]`.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = config::clamp_speed(speed);
    }

    pub fn set_arc_segments(&mut self, segments: f32) {
        self.arc_segments = segments.max(1.0);
    }

    /// Replace the whole drawn-lines sequence.
    pub fn set_lines(&mut self, lines: Vec<Line>) {
        self.lines = lines;
        self.events.push(MotionEvent::LinesChanged {
            count: self.lines.len(),
        });
    }

    // ─── Motion requests ─────────────────────────────────────────────────────

    /// Rotate clockwise by `degrees`. Instantaneous.
    pub fn turn(&mut self, degrees: f32) -> Dispatch {
        if self.is_moving() {
            return self.reject("turn");
        }
        let id = self.next_motion_id();
        self.set_rotation(self.heading.degrees() + degrees);
        self.complete(id, MovementResult::Success);
        Dispatch::Settled(MovementResult::Success)
    }

    /// Move `distance` along the forward vector (backwards when negative).
    pub fn forward(&mut self, distance: f32) -> Dispatch {
        if self.is_moving() {
            return self.reject("forward");
        }
        let path = Straight::new(self.position, self.heading, distance);
        self.start(path.into())
    }

    /// Move along an arc of `radius`, turning by `degrees` on the way.
    pub fn arc(&mut self, radius: f32, degrees: f32) -> Dispatch {
        if self.is_moving() {
            return self.reject("arc");
        }
        if radius.is_nan() || radius < defaults::MIN_ARC_RADIUS {
            let id = self.next_motion_id();
            self.complete(id, MovementResult::Success);
            return Dispatch::Settled(MovementResult::Success);
        }
        let path = Circular::new(
            self.position,
            self.heading,
            radius,
            degrees,
            self.arc_segments,
        );
        self.start(path.into())
    }

    /// Advance the animation in flight by `dt` of playback time.
    pub fn advance(&mut self, dt: Duration) {
        let Some(mut anim) = self.animation.take() else {
            return;
        };
        if anim.paused {
            self.animation = Some(anim);
            return;
        }

        let before = (anim.elapsed_ms / anim.duration_ms).min(1.0);
        anim.elapsed_ms += dt.as_secs_f64() * 1000.0;
        let progress = (anim.elapsed_ms / anim.duration_ms).min(1.0);

        // With a field attached, no sub-step is longer than the footprint radius.
        let substeps = match self.field {
            Some(_) => {
                let travel = (progress - before) * anim.path.length();
                (travel / self.pen_size.radius() as f64).ceil().clamp(1.0, u32::MAX as f64) as u32
            }
            None => 1,
        };

        for i in 1..=substeps {
            let t = if i == substeps {
                progress
            } else {
                before + (progress - before) * (i as f64 / substeps as f64)
            };
            let (position, rotation) = anim.path.sample(t);
            self.translate(position, Heading::new(rotation));

            if let Some(hit) = self.check_collision() {
                self.block(anim, hit);
                return;
            }

            self.checkpoint = (self.position, self.heading);
            self.commit_vertices(&mut anim, t);
        }
        self.events.push(MotionEvent::Moved {
            position: self.position,
            rotation: self.heading.degrees(),
        });

        if progress >= 1.0 {
            self.complete(anim.id, MovementResult::Success);
        } else {
            self.animation = Some(anim);
        }
    }

    /// Freeze the motion in flight. Reports `Paused`, which is not terminal.
    pub fn pause(&mut self) {
        let Some(anim) = self.animation.as_mut() else {
            return;
        };
        if anim.paused {
            return;
        }
        anim.paused = true;
        let id = anim.id;
        self.complete(id, MovementResult::Paused);
    }

    pub fn resume(&mut self) {
        if let Some(anim) = self.animation.as_mut() {
            anim.paused = false;
        }
    }

    /// Return home facing up with the pen down and no lines.
    ///
    /// A motion in flight is cancelled and reported as `Success` so that
    /// whoever waits on it is released.
    pub fn reset(&mut self) {
        let cancelled = self.animation.take();
        let home = self.config.home;
        self.place(home, Heading::NORTH);
        self.checkpoint = (home, Heading::NORTH);
        self.set_pen_down(true);
        self.set_lines(Vec::new());
        if let Some(anim) = cancelled {
            debug!(motion = anim.id.get(), "motion cancelled by reset");
            self.complete(anim.id, MovementResult::Success);
        }
    }

    // ─── Internals ───────────────────────────────────────────────────────────

    fn next_motion_id(&mut self) -> MotionId {
        self.next_id += 1;
        MotionId(self.next_id)
    }

    fn complete(&mut self, motion: MotionId, result: MovementResult) {
        self.events.push(MotionEvent::Completed { motion, result });
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn reject(&mut self, what: &str) -> Dispatch {
        let id = self.next_motion_id();
        warn!(motion = id.get(), "{what} rejected: turtle is already moving");
        self.complete(id, MovementResult::Failure);
        Dispatch::Settled(MovementResult::Failure)
    }

    fn start(&mut self, path: Path) -> Dispatch {
        let id = self.next_motion_id();
        let duration_ms = path.length() * 1000.0 / self.speed as f64;
        if !(duration_ms > 0.0 && duration_ms.is_finite()) {
            self.complete(id, MovementResult::Success);
            return Dispatch::Settled(MovementResult::Success);
        }

        debug!(motion = id.get(), duration_ms, "motion started");
        self.last_animation = Some(id);
        self.checkpoint = (self.position, self.heading);
        self.animation = Some(Animation {
            id,
            path,
            duration_ms,
            elapsed_ms: 0.0,
            start: (self.position, self.heading),
            next_vertex: 1,
            anchor: self.position,
            lines_before: self.lines.len(),
            paused: false,
        });
        Dispatch::InFlight(id)
    }

    /// Cancel the animation after a hit: roll back, drop the segments it
    /// drew and report `Blocked`.
    fn block(&mut self, anim: Animation, hit: Collision) {
        let (back_position, back_heading) = match self.config.rollback {
            RollbackPolicy::LastCheckpoint => self.checkpoint,
            RollbackPolicy::MotionStart => anim.start,
        };
        self.place(back_position, back_heading);
        self.checkpoint = (back_position, back_heading);
        if self.lines.len() > anim.lines_before {
            self.lines.truncate(anim.lines_before);
            self.events.push(MotionEvent::LinesChanged {
                count: self.lines.len(),
            });
        }
        warn!(
            motion = anim.id.get(),
            object = ?hit.object,
            "motion blocked, rolled back to ({}, {})",
            back_position.x,
            back_position.y
        );
        self.events.push(MotionEvent::Collision(hit));
        self.complete(anim.id, MovementResult::Blocked);
    }

    /// Draw a segment for every trajectory vertex reached by progress `t`.
    fn commit_vertices(&mut self, anim: &mut Animation, t: f64) {
        let count = anim.path.vertex_count();
        while anim.next_vertex < count {
            let (at, point) = anim.path.vertex(anim.next_vertex);
            if at > t {
                break;
            }
            self.record_line(anim.anchor, point);
            anim.anchor = point;
            anim.next_vertex += 1;
        }
    }

    /// Move the turtle and its footprint without notifying.
    fn translate(&mut self, position: DVec2, heading: Heading) {
        let delta = position - self.position;
        if delta != DVec2::ZERO {
            self.position = position;
            self.shape.translate(delta);
        }
        self.heading = heading;
    }

    /// Move the turtle, translating the footprint along with it.
    fn place(&mut self, position: DVec2, heading: Heading) {
        self.translate(position, heading);
        self.events.push(MotionEvent::Moved {
            position,
            rotation: heading.degrees(),
        });
    }

    fn rebuild_shape(&mut self) {
        self.shape = Polygon::regular(
            self.position,
            self.pen_size.radius() as f64,
            defaults::FOOTPRINT_SIDES,
            0.0,
        );
    }

    fn check_collision(&self) -> Option<Collision> {
        let field = self.field.as_deref()?;
        collision::test_collision(field, &self.shape, self.position)
    }

    fn record_line(&mut self, from: DVec2, to: DVec2) {
        if !self.pen_down || from == to {
            return;
        }
        self.lines.push(Line::new(
            from,
            to,
            self.pen_color,
            self.pen_size.radius(),
        ));
        self.events.push(MotionEvent::LinesChanged {
            count: self.lines.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Canvas, Obstacle};
    use glam::dvec2;

    const STEP: Duration = Duration::from_millis(16);

    fn run_to_end(turtle: &mut Turtle) -> Vec<MovementResult> {
        for _ in 0..100_000 {
            if !turtle.is_moving() {
                break;
            }
            turtle.advance(STEP);
        }
        completions(turtle)
    }

    fn completions(turtle: &mut Turtle) -> Vec<MovementResult> {
        turtle
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                MotionEvent::Completed { result, .. } => Some(result),
                _ => None,
            })
            .collect()
    }

    fn close(a: DVec2, b: DVec2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn starts_home_facing_up() {
        let turtle = Turtle::default();
        assert_eq!(turtle.position(), dvec2(450.0, 450.0));
        assert_eq!(turtle.rotation(), 0.0);
        assert!(turtle.pen_down());
        assert!(!turtle.is_moving());
    }

    #[test]
    fn forward_moves_along_heading_and_draws_one_line() {
        let mut turtle = Turtle::default();
        turtle.set_speed(1000.0);
        let expected = turtle.position() + turtle.forward_vector() * 150.0;

        assert!(matches!(turtle.forward(150.0), Dispatch::InFlight(_)));
        assert!(turtle.is_moving());
        assert_eq!(run_to_end(&mut turtle), vec![MovementResult::Success]);

        assert!(close(turtle.position(), expected));
        assert_eq!(turtle.line_count(), 1);
        let line = turtle.line(0).copied().expect("one line");
        assert!(close(line.start, dvec2(450.0, 450.0)));
        assert!(close(line.end, expected));
        assert_eq!(line.width, 3.0);
        assert_eq!(turtle.checkpoint().0, turtle.position());
    }

    #[test]
    fn second_motion_while_moving_fails_without_side_effects() {
        let mut turtle = Turtle::default();
        turtle.forward(100.0);
        turtle.advance(STEP);
        let position = turtle.position();
        let rotation = turtle.rotation();
        let checkpoint = turtle.checkpoint();
        turtle.drain_events();

        assert_eq!(turtle.forward(10.0), Dispatch::Settled(MovementResult::Failure));
        assert_eq!(turtle.turn(45.0), Dispatch::Settled(MovementResult::Failure));
        assert_eq!(turtle.arc(10.0, 90.0), Dispatch::Settled(MovementResult::Failure));
        assert_eq!(turtle.position(), position);
        assert_eq!(turtle.rotation(), rotation);
        assert_eq!(turtle.checkpoint(), checkpoint);
        assert_eq!(completions(&mut turtle), vec![MovementResult::Failure; 3]);
    }

    #[test]
    fn turn_is_synchronous() {
        let mut turtle = Turtle::default();
        assert_eq!(turtle.turn(15.0), Dispatch::Settled(MovementResult::Success));
        assert_eq!(turtle.rotation(), 15.0);
        assert_eq!(turtle.turn(-30.0), Dispatch::Settled(MovementResult::Success));
        assert_eq!(turtle.rotation(), 345.0);
        assert_eq!(turtle.checkpoint().1.degrees(), 345.0);
        assert!(!turtle.is_moving());
    }

    #[test]
    fn full_circle_returns_to_start() {
        let mut turtle = Turtle::default();
        turtle.set_speed(3500.0);
        turtle.turn(20.0);
        turtle.drain_events();
        let start = turtle.position();

        turtle.arc(100.0, 360.0);
        assert_eq!(run_to_end(&mut turtle), vec![MovementResult::Success]);
        assert!(close(turtle.position(), start));
        assert!((turtle.rotation() - 20.0).abs() < 1e-3);
        // 50 keypoint chords around the circle
        assert_eq!(turtle.line_count(), 50);
    }

    #[test]
    fn partial_arc_ends_on_the_circle() {
        let mut turtle = Turtle::default();
        turtle.set_speed(2000.0);
        let start = turtle.position();
        let end_angle = 120.0_f64.to_radians();
        let expected = start - 100.0 * (dvec2(end_angle.cos(), end_angle.sin()) - dvec2(1.0, 0.0));

        turtle.arc(100.0, 120.0);
        assert_eq!(run_to_end(&mut turtle), vec![MovementResult::Success]);
        assert!(close(turtle.position(), expected), "{}", turtle.position());
        assert_eq!(turtle.rotation(), 120.0);
    }

    #[test]
    fn multi_turn_arc_wraps_rotation() {
        let mut turtle = Turtle::default();
        turtle.set_speed(9999.0);
        let start = turtle.position();
        turtle.arc(20.0, -450.0);
        assert_eq!(run_to_end(&mut turtle), vec![MovementResult::Success]);
        assert_eq!(turtle.rotation(), 270.0);
        assert!(turtle.position().distance(start) > 1.0);
    }

    #[test]
    fn degenerate_motions_complete_immediately() {
        let mut turtle = Turtle::default();
        assert_eq!(turtle.forward(0.0), Dispatch::Settled(MovementResult::Success));
        assert_eq!(turtle.arc(0.0005, 90.0), Dispatch::Settled(MovementResult::Success));
        assert_eq!(turtle.arc(-5.0, 90.0), Dispatch::Settled(MovementResult::Success));
        assert_eq!(turtle.arc(10.0, 0.0), Dispatch::Settled(MovementResult::Success));
        assert_eq!(turtle.position(), dvec2(450.0, 450.0));
        assert_eq!(turtle.line_count(), 0);
    }

    #[test]
    fn pen_up_moves_without_drawing() {
        let mut turtle = Turtle::default();
        turtle.set_pen_down(false);
        turtle.forward(20.0);
        run_to_end(&mut turtle);
        assert_eq!(turtle.line_count(), 0);
        assert!(close(turtle.position(), dvec2(450.0, 430.0)));
    }

    #[test]
    fn blocked_forward_rolls_back_to_last_clear_step() {
        let canvas = Canvas::new(900.0, 900.0).with_obstacle(Obstacle::rect(
            dvec2(430.0, 355.0),
            dvec2(470.0, 395.0),
            Color::RED,
        ));
        let mut turtle = Turtle::default().with_field(Arc::new(canvas));
        let start = turtle.position();

        turtle.forward(150.0);
        let events = {
            while turtle.is_moving() {
                turtle.advance(STEP);
            }
            turtle.drain_events()
        };

        let results: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                MotionEvent::Completed { result, .. } => Some(*result),
                _ => None,
            })
            .collect();
        assert_eq!(results, vec![MovementResult::Blocked]);
        assert!(events.iter().any(|e| matches!(
            e,
            MotionEvent::Collision(Collision { object: HitObject::Obstacle(0), .. })
        )));

        let y = turtle.position().y;
        assert!(y < start.y && y > 300.0, "stopped at {y}");
        assert!(y > 395.0, "never inside the obstacle: {y}");
        assert_eq!(turtle.line_count(), 0);
        assert_eq!(turtle.checkpoint().0, turtle.position());
    }

    #[test]
    fn fast_forward_cannot_skip_a_thin_wall() {
        let canvas = Canvas::new(900.0, 900.0).with_obstacle(Obstacle::rect(
            dvec2(400.0, 300.0),
            dvec2(500.0, 310.0),
            Color::RED,
        ));
        let mut turtle = Turtle::default().with_field(Arc::new(canvas));
        turtle.set_speed(9999.0);

        turtle.forward(400.0);
        assert_eq!(run_to_end(&mut turtle), vec![MovementResult::Blocked]);
        let y = turtle.position().y;
        assert!(y > 310.0 && y < 450.0, "stopped at {y}");
        assert_eq!(turtle.line_count(), 0);
    }

    #[test]
    fn blocked_arc_keeps_no_chords() {
        let canvas = Canvas::new(900.0, 900.0).with_obstacle(Obstacle::rect(
            dvec2(540.0, 440.0),
            dvec2(560.0, 460.0),
            Color::RED,
        ));
        let mut turtle = Turtle::default().with_field(Arc::new(canvas));
        let earlier = Line::new(dvec2(10.0, 10.0), dvec2(20.0, 20.0), Color::BLACK, 3.0);
        turtle.set_lines(vec![earlier]);
        turtle.drain_events();

        turtle.arc(50.0, 180.0);
        let mut drew = false;
        while turtle.is_moving() {
            turtle.advance(STEP);
            drew |= turtle.line_count() > 1;
        }
        assert!(drew, "the arc drew chords before the hit");
        assert_eq!(completions(&mut turtle), vec![MovementResult::Blocked]);
        assert_eq!(turtle.lines(), &[earlier]);
    }

    #[test]
    fn huge_arc_starts_without_allocating_keypoints() {
        let mut turtle = Turtle::default();
        turtle.set_speed(9999.0);
        assert!(matches!(turtle.arc(10.0, 1.0e9), Dispatch::InFlight(_)));
        turtle.advance(Duration::from_secs(1));
        assert!(turtle.is_moving());
        // One second at full speed is 9999 units of arc, about 159 turns
        assert!(turtle.line_count() > 7_000);
        turtle.reset();
        assert_eq!(turtle.line_count(), 0);
    }

    #[test]
    fn motion_start_policy_rolls_back_the_whole_motion() {
        let canvas = Canvas::new(900.0, 900.0).with_obstacle(Obstacle::rect(
            dvec2(430.0, 355.0),
            dvec2(470.0, 395.0),
            Color::RED,
        ));
        let config = TurtleConfig::new().with_rollback(RollbackPolicy::MotionStart);
        let mut turtle = Turtle::new(config).with_field(Arc::new(canvas));
        turtle.forward(150.0);
        assert_eq!(run_to_end(&mut turtle), vec![MovementResult::Blocked]);
        assert_eq!(turtle.position(), dvec2(450.0, 450.0));
    }

    #[test]
    fn leaving_the_canvas_hits_the_boundary() {
        let canvas = Canvas::new(900.0, 900.0);
        let mut turtle = Turtle::default().with_field(Arc::new(canvas));
        turtle.set_speed(9999.0);
        turtle.forward(1000.0);
        while turtle.is_moving() {
            turtle.advance(STEP);
        }
        let events = turtle.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            MotionEvent::Collision(Collision { object: HitObject::Boundary, .. })
        )));
        assert!(turtle.position().y > -3.0);
    }

    #[test]
    fn pause_reports_without_ending_the_motion() {
        let mut turtle = Turtle::default();
        turtle.forward(100.0);
        turtle.advance(STEP);
        turtle.pause();
        let frozen = turtle.position();
        turtle.advance(Duration::from_secs(10));
        assert_eq!(turtle.position(), frozen);
        assert!(turtle.is_moving() && turtle.is_paused());

        turtle.resume();
        assert_eq!(
            run_to_end(&mut turtle),
            vec![MovementResult::Paused, MovementResult::Success]
        );
    }

    #[test]
    fn reset_releases_the_motion_in_flight() {
        let mut turtle = Turtle::default();
        turtle.forward(50.0);
        run_to_end(&mut turtle);
        turtle.turn(90.0);
        let Dispatch::InFlight(id) = turtle.forward(300.0) else {
            panic!("expected an animation");
        };
        turtle.advance(STEP);
        turtle.drain_events();

        turtle.reset();
        assert!(!turtle.is_moving());
        assert_eq!(turtle.position(), dvec2(450.0, 450.0));
        assert_eq!(turtle.rotation(), 0.0);
        assert_eq!(turtle.line_count(), 0);
        let events = turtle.drain_events();
        assert!(events.contains(&MotionEvent::Completed {
            motion: id,
            result: MovementResult::Success
        }));
    }

    #[test]
    fn footprint_follows_the_turtle() {
        let mut turtle = Turtle::default();
        turtle.set_pen_radius(5.0);
        turtle.turn(90.0);
        turtle.forward(40.0);
        run_to_end(&mut turtle);
        turtle.set_position(dvec2(10.0, 20.0));

        let fresh = Polygon::regular(turtle.position(), 5.0, 10, 0.0);
        for (a, b) in turtle.shape().points().iter().zip(fresh.points()) {
            assert!(a.distance(*b) < 1e-9);
        }
    }

    #[test]
    fn pen_radius_is_clamped() {
        let mut turtle = Turtle::default();
        turtle.set_pen_radius(0.0);
        assert_eq!(turtle.pen_radius(), 1.0);
        turtle.set_pen_radius(100.0);
        assert_eq!(turtle.pen_radius(), 9.0);
        assert!((turtle.shape().bounding_radius() - 9.0 * 2.0_f64.sqrt()).abs() < 1.0);
    }

    #[test]
    fn set_lines_replaces_history() {
        let mut turtle = Turtle::default();
        turtle.forward(10.0);
        run_to_end(&mut turtle);
        let replacement = vec![Line::new(DVec2::ZERO, dvec2(1.0, 1.0), Color::RED, 2.0)];
        turtle.set_lines(replacement.clone());
        assert_eq!(turtle.lines(), replacement.as_slice());
        assert!(turtle.line(1).is_none());
    }
}
