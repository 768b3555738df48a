//! Capabilities the interpreter drives motion through.
//!
//! The interpreter never advances time itself. It issues requests through a
//! [`MotionSink`] and, for every request that starts an animation, suspends on
//! a [`CompletionSource`] until a terminal result arrives. A [`Driver`] is
//! anything that offers both.
//!
//! [`Stepper`] is the deterministic headless host: waiting on a motion simply
//! advances the turtle in fixed steps until it finishes.

use std::time::Duration;

use glam::DVec2;

pub use crate::motion::Dispatch;
use crate::log::{debug, warn};
use crate::motion::{MotionEvent, MotionId, Turtle};
use crate::types::{Color, MovementResult};

/// Default fixed step for headless playback, one 60 Hz frame.
pub const DEFAULT_STEP: Duration = Duration::from_millis(16);

/// Primitive motion requests.
pub trait MotionSink {
    fn forward(&mut self, distance: f32) -> Dispatch;
    fn turn(&mut self, degrees: f32) -> Dispatch;
    fn arc(&mut self, radius: f32, degrees: f32) -> Dispatch;
    fn set_position(&mut self, position: DVec2);
    fn set_rotation(&mut self, degrees: f32);
    fn set_pen_down(&mut self, down: bool);
    fn set_pen_size(&mut self, radius: f32);
    fn set_speed(&mut self, speed: f32);
    fn set_pen_color(&mut self, color: Color);
}

/// Where completion results come from.
pub trait CompletionSource {
    /// Suspend until `motion` reports a terminal result.
    ///
    /// `Paused` notifications are not terminal and never end the wait.
    fn wait_for(&mut self, motion: MotionId) -> MovementResult;
}

/// A host that both accepts motion requests and reports their completion.
pub trait Driver: MotionSink + CompletionSource {}

impl<T: MotionSink + CompletionSource> Driver for T {}

impl MotionSink for Turtle {
    fn forward(&mut self, distance: f32) -> Dispatch {
        Turtle::forward(self, distance)
    }

    fn turn(&mut self, degrees: f32) -> Dispatch {
        Turtle::turn(self, degrees)
    }

    fn arc(&mut self, radius: f32, degrees: f32) -> Dispatch {
        Turtle::arc(self, radius, degrees)
    }

    fn set_position(&mut self, position: DVec2) {
        Turtle::set_position(self, position)
    }

    fn set_rotation(&mut self, degrees: f32) {
        Turtle::set_rotation(self, degrees)
    }

    fn set_pen_down(&mut self, down: bool) {
        Turtle::set_pen_down(self, down)
    }

    fn set_pen_size(&mut self, radius: f32) {
        self.set_pen_radius(radius)
    }

    fn set_speed(&mut self, speed: f32) {
        Turtle::set_speed(self, speed)
    }

    fn set_pen_color(&mut self, color: Color) {
        Turtle::set_pen_color(self, color)
    }
}

/// Notifications a host keeps for [`take_events`](Stepper::take_events).
/// Once full, newer notifications are dropped and counted.
pub const EVENT_BACKLOG: usize = 256;

/// A terminal result for the turtle's latest animation.
pub(crate) type Finished = (MotionId, MovementResult);

/// Drain the turtle's notifications, separating the terminal completion a
/// waiter may claim from the side-channel events. `Moved` is discarded.
pub(crate) fn drain(turtle: &mut Turtle) -> (Option<Finished>, Vec<MotionEvent>) {
    let awaited = turtle.last_animation();
    let mut finished = None;
    let mut events = Vec::new();
    for event in turtle.drain_events() {
        match event {
            MotionEvent::Moved { .. } => continue,
            MotionEvent::Completed { motion, result }
                if result.is_terminal() && Some(motion) == awaited =>
            {
                finished = Some((motion, result));
            }
            _ => {}
        }
        events.push(event);
    }
    (finished, events)
}

// ============================================================================
// Stepper
// ============================================================================

/// Headless host advancing the turtle in fixed steps of simulated time.
///
/// `Moved` notifications are discarded; at most [`EVENT_BACKLOG`] of the
/// others are kept until [`Stepper::take_events`].
#[derive(Debug)]
pub struct Stepper {
    turtle: Turtle,
    step: Duration,
    elapsed: Duration,
    backlog: Vec<MotionEvent>,
    dropped: u64,
    finished: Option<Finished>,
}

impl Stepper {
    pub fn new(turtle: Turtle) -> Self {
        Stepper {
            turtle,
            step: DEFAULT_STEP,
            elapsed: Duration::ZERO,
            backlog: Vec::new(),
            dropped: 0,
            finished: None,
        }
    }

    pub fn with_step(mut self, step: Duration) -> Self {
        if !step.is_zero() {
            self.step = step;
        }
        self
    }

    pub fn turtle(&self) -> &Turtle {
        &self.turtle
    }

    pub fn turtle_mut(&mut self) -> &mut Turtle {
        &mut self.turtle
    }

    pub fn into_turtle(self) -> Turtle {
        self.turtle
    }

    /// Simulated time spent animating so far
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Notifications dropped because the backlog was full
    pub fn dropped_events(&self) -> u64 {
        self.dropped
    }

    pub fn take_events(&mut self) -> Vec<MotionEvent> {
        self.collect();
        std::mem::take(&mut self.backlog)
    }

    /// Advance one step.
    pub fn tick(&mut self) {
        self.turtle.advance(self.step);
        self.elapsed += self.step;
        self.collect();
    }

    /// Run until no motion is in flight.
    pub fn settle(&mut self) {
        while self.turtle.is_moving() {
            if self.turtle.is_paused() {
                self.turtle.resume();
            }
            self.tick();
        }
    }

    fn collect(&mut self) {
        let (finished, events) = drain(&mut self.turtle);
        if finished.is_some() {
            self.finished = finished;
        }
        for event in events {
            if self.backlog.len() < EVENT_BACKLOG {
                self.backlog.push(event);
            } else {
                self.dropped += 1;
            }
        }
    }
}

impl CompletionSource for Stepper {
    fn wait_for(&mut self, motion: MotionId) -> MovementResult {
        loop {
            self.collect();
            if let Some((finished, result)) = self.finished {
                if finished == motion {
                    self.finished = None;
                    debug!(motion = motion.get(), %result, "motion finished");
                    return result;
                }
            }
            if self.turtle.current_motion() != Some(motion) {
                warn!(motion = motion.get(), "waited on a motion that is not in flight");
                return MovementResult::Failure;
            }
            // Nothing else can resume a paused turtle in a single-threaded host.
            if self.turtle.is_paused() {
                self.turtle.resume();
            }
            self.tick();
        }
    }
}

impl MotionSink for Stepper {
    fn forward(&mut self, distance: f32) -> Dispatch {
        self.turtle.forward(distance)
    }

    fn turn(&mut self, degrees: f32) -> Dispatch {
        self.turtle.turn(degrees)
    }

    fn arc(&mut self, radius: f32, degrees: f32) -> Dispatch {
        self.turtle.arc(radius, degrees)
    }

    fn set_position(&mut self, position: DVec2) {
        self.turtle.set_position(position)
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.turtle.set_rotation(degrees)
    }

    fn set_pen_down(&mut self, down: bool) {
        self.turtle.set_pen_down(down)
    }

    fn set_pen_size(&mut self, radius: f32) {
        self.turtle.set_pen_radius(radius)
    }

    fn set_speed(&mut self, speed: f32) {
        self.turtle.set_speed(speed)
    }

    fn set_pen_color(&mut self, color: Color) {
        self.turtle.set_pen_color(color)
    }
}
