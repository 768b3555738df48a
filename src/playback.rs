//! Wall-clock playback on a ticker thread.
//!
//! The turtle lives behind a mutex shared with a ticker thread that advances
//! it by the real time elapsed between frames. Terminal completions travel
//! over a bounded completion channel that the interpreter blocks on while a
//! motion is in flight; other notifications go to a bounded backlog that never
//! blocks the ticker and drops what does not fit. A [`PlaybackHandle`] can
//! pause, resume or reset the turtle from any other thread; a reset emits a
//! synthetic `Success` that releases the waiter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, select, tick};
use glam::DVec2;

use crate::driver::{CompletionSource, Dispatch, EVENT_BACKLOG, Finished, MotionSink, drain};
use crate::log::{debug, info, warn};
use crate::motion::{MotionEvent, MotionId, Turtle};
use crate::session::SessionState;
use crate::types::{Color, MovementResult};

/// Default interval between frames
pub const DEFAULT_FRAME: Duration = Duration::from_millis(16);

/// Completions the ticker can hand over before it waits for the interpreter
const COMPLETION_BUFFER: usize = 16;

type Shared = Arc<Mutex<Turtle>>;

fn lock(turtle: &Shared) -> MutexGuard<'_, Turtle> {
    turtle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Threaded host driving a turtle in real time.
pub struct Playback {
    turtle: Shared,
    completions: Receiver<Finished>,
    events: Receiver<MotionEvent>,
    dropped: Arc<AtomicU64>,
    stop: Sender<()>,
    ticker: Option<JoinHandle<()>>,
}

/// Cloneable remote control for a running [`Playback`].
#[derive(Clone)]
pub struct PlaybackHandle {
    turtle: Shared,
}

/// Ticker-side ends of the channels.
struct Outlets {
    completions: Sender<Finished>,
    events: Sender<MotionEvent>,
    dropped: Arc<AtomicU64>,
    stop: Receiver<()>,
}

impl Playback {
    pub fn start(turtle: Turtle) -> Self {
        Self::with_frame(turtle, DEFAULT_FRAME)
    }

    pub fn with_frame(turtle: Turtle, frame: Duration) -> Self {
        let frame = frame.max(Duration::from_millis(1));
        let turtle = Arc::new(Mutex::new(turtle));
        let (completions_tx, completions) = bounded(COMPLETION_BUFFER);
        let (events_tx, events) = bounded(EVENT_BACKLOG);
        let (stop, stop_rx) = bounded(1);
        let dropped = Arc::new(AtomicU64::new(0));

        let outlets = Outlets {
            completions: completions_tx,
            events: events_tx,
            dropped: Arc::clone(&dropped),
            stop: stop_rx,
        };
        let ticker = {
            let turtle = Arc::clone(&turtle);
            thread::spawn(move || run_ticker(turtle, outlets, frame))
        };
        info!(frame_ms = frame.as_millis() as u64, "playback started");

        Playback {
            turtle,
            completions,
            events,
            dropped,
            stop,
            ticker: Some(ticker),
        }
    }

    pub fn handle(&self) -> PlaybackHandle {
        PlaybackHandle {
            turtle: Arc::clone(&self.turtle),
        }
    }

    /// Run `f` with the turtle locked.
    pub fn with_turtle<R>(&self, f: impl FnOnce(&mut Turtle) -> R) -> R {
        f(&mut lock(&self.turtle))
    }

    /// Notifications delivered so far, at most [`EVENT_BACKLOG`] of them.
    pub fn take_events(&mut self) -> Vec<MotionEvent> {
        self.events.try_iter().collect()
    }

    /// Notifications dropped because the backlog was full
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stop the ticker and hand back the turtle's final state.
    pub fn finish(mut self) -> SessionState {
        self.shutdown();
        SessionState::capture(&lock(&self.turtle))
    }

    fn shutdown(&mut self) {
        let Some(ticker) = self.ticker.take() else {
            return;
        };
        // A full or closed stop channel means the ticker is already stopping
        let _ = self.stop.try_send(());
        if ticker.join().is_err() {
            warn!("playback ticker panicked");
        }
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_ticker(turtle: Shared, outlets: Outlets, frame: Duration) {
    let frames = tick(frame);
    let mut last = Instant::now();
    loop {
        select! {
            recv(outlets.stop) -> _ => return,
            recv(frames) -> _ => {}
        }
        let now = Instant::now();
        let (finished, events) = {
            let mut turtle = lock(&turtle);
            turtle.advance(now - last);
            drain(&mut turtle)
        };
        last = now;

        for event in events {
            match outlets.events.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    outlets.dropped.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }

        if let Some(finished) = finished {
            select! {
                send(outlets.completions, finished) -> sent => {
                    if sent.is_err() {
                        debug!("playback receiver gone, ticker exiting");
                        return;
                    }
                }
                recv(outlets.stop) -> _ => return,
            }
        }
    }
}

impl PlaybackHandle {
    pub fn pause(&self) {
        lock(&self.turtle).pause();
    }

    pub fn resume(&self) {
        lock(&self.turtle).resume();
    }

    /// Reset the turtle, releasing any interpreter waiting on its motion.
    pub fn reset(&self) {
        lock(&self.turtle).reset();
    }

    pub fn is_moving(&self) -> bool {
        lock(&self.turtle).is_moving()
    }

    pub fn snapshot(&self) -> SessionState {
        SessionState::capture(&lock(&self.turtle))
    }
}

impl CompletionSource for Playback {
    fn wait_for(&mut self, motion: MotionId) -> MovementResult {
        loop {
            match self.completions.recv() {
                Ok((finished, result)) if finished == motion => return result,
                Ok((stale, _)) => {
                    debug!(motion = stale.get(), "discarding completion nobody waited on");
                }
                Err(_) => {
                    warn!(motion = motion.get(), "playback stopped while waiting");
                    return MovementResult::Failure;
                }
            }
        }
    }
}

impl MotionSink for Playback {
    fn forward(&mut self, distance: f32) -> Dispatch {
        lock(&self.turtle).forward(distance)
    }

    fn turn(&mut self, degrees: f32) -> Dispatch {
        lock(&self.turtle).turn(degrees)
    }

    fn arc(&mut self, radius: f32, degrees: f32) -> Dispatch {
        lock(&self.turtle).arc(radius, degrees)
    }

    fn set_position(&mut self, position: DVec2) {
        lock(&self.turtle).set_position(position)
    }

    fn set_rotation(&mut self, degrees: f32) {
        lock(&self.turtle).set_rotation(degrees)
    }

    fn set_pen_down(&mut self, down: bool) {
        lock(&self.turtle).set_pen_down(down)
    }

    fn set_pen_size(&mut self, radius: f32) {
        lock(&self.turtle).set_pen_radius(radius)
    }

    fn set_speed(&mut self, speed: f32) {
        lock(&self.turtle).set_speed(speed)
    }

    fn set_pen_color(&mut self, color: Color) {
        lock(&self.turtle).set_pen_color(color)
    }
}
