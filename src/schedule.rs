//! Frame and interval scheduling.
//!
//! Everything runs on one thread: callbacks are plain boxed closures and
//! shared state lives in `Rc`/`Cell`/`RefCell`. A [`Scheduler`] hands out a
//! [`Token`] for every registration; cancelling a token guarantees the
//! callback will not run afterwards, even when the cancel happens from inside
//! another callback of the same batch.
//!
//! [`HeadlessScheduler`] is a deterministic implementation driven by a virtual
//! clock. Frames fire on a fixed grid (60 Hz unless configured through
//! [`HeadlessScheduler::from_config`]) and interval timers fire at their due
//! times, both only when the clock is advanced.

use crate::config::RenderSettings;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Callback for a single animation frame, given the frame timestamp in ms.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Callback for a recurring timer, given the tick timestamp in ms.
pub type TickCallback = Box<dyn FnMut(f64)>;

/// Handle identifying one scheduled registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u64);

/// Source of animation frames and recurring timers.
///
/// All methods take `&self` so that a scheduler can be shared through `Rc`
/// and re-entered from the callbacks it runs.
pub trait Scheduler {
    /// Current time in milliseconds on this scheduler's clock.
    fn now(&self) -> f64;

    /// Run `callback` once on the next frame.
    fn request_frame(&self, callback: FrameCallback) -> Token;

    /// Run `callback` every `period` until cancelled.
    fn every(&self, period: Duration, callback: TickCallback) -> Token;

    /// Cancel a frame or timer. Unknown or spent tokens are ignored.
    fn cancel(&self, token: Token);
}

/// 60 Hz frame interval in microseconds.
pub const DEFAULT_FRAME_INTERVAL_US: u64 = 16_667;

/// Shortest accepted timer period in microseconds.
const MIN_TIMER_PERIOD_US: u64 = 1_000;

struct Timer {
    period_us: u64,
    next_due_us: u64,
    /// `None` while the callback is executing.
    callback: Option<TickCallback>,
}

#[derive(Default)]
struct Queues {
    now_us: u64,
    next_id: u64,
    frames: BTreeMap<u64, FrameCallback>,
    timers: BTreeMap<u64, Timer>,
}

impl Queues {
    fn issue(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Deterministic scheduler with a virtual clock.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
/// use trueno_live::schedule::{HeadlessScheduler, Scheduler};
///
/// let scheduler = HeadlessScheduler::new();
/// let ticks = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&ticks);
/// scheduler.every(Duration::from_millis(100), Box::new(move |_| counter.set(counter.get() + 1)));
///
/// scheduler.advance(Duration::from_millis(350));
/// assert_eq!(ticks.get(), 3);
/// ```
pub struct HeadlessScheduler {
    frame_interval_us: u64,
    queues: RefCell<Queues>,
}

impl HeadlessScheduler {
    /// Scheduler with a 60 Hz frame grid starting at t = 0.
    #[must_use]
    pub fn new() -> Self {
        Self::with_frame_interval(Duration::from_micros(DEFAULT_FRAME_INTERVAL_US))
    }

    /// Scheduler with a custom frame interval (at least 1 µs).
    #[must_use]
    pub fn with_frame_interval(interval: Duration) -> Self {
        let frame_interval_us = u64::try_from(interval.as_micros()).unwrap_or(u64::MAX).max(1);
        Self { frame_interval_us, queues: RefCell::new(Queues::default()) }
    }

    /// Scheduler whose frames follow `render.frame_interval_ms`.
    #[must_use]
    pub fn from_config(render: &RenderSettings) -> Self {
        Self::with_frame_interval(render.frame_interval())
    }

    /// Frame interval of the virtual display.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(self.frame_interval_us)
    }

    /// Number of outstanding frame requests and timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        let q = self.queues.borrow();
        q.frames.len() + q.timers.len()
    }

    /// Number of outstanding frame requests.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.queues.borrow().frames.len()
    }

    /// Number of live interval timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.queues.borrow().timers.len()
    }

    /// Move the virtual clock forward by `delta`, running every frame and
    /// timer that falls due on the way. Returns the number of callbacks run.
    ///
    /// Timers due at the same instant as a frame run first.
    pub fn advance(&self, delta: Duration) -> usize {
        let delta_us = u64::try_from(delta.as_micros()).unwrap_or(u64::MAX);
        let target = self.queues.borrow().now_us.saturating_add(delta_us);
        let mut ran = 0;

        while let Some(at) = self.next_event_before(target) {
            self.queues.borrow_mut().now_us = at;
            ran += self.fire_timers(at);
            if self.next_frame_time() == Some(at) {
                ran += self.fire_frames(at);
            }
        }

        self.queues.borrow_mut().now_us = target;
        ran
    }

    /// Drive the scheduler against the wall clock for `duration`, sleeping
    /// one frame interval between steps.
    pub fn run_realtime(&self, duration: Duration) -> usize {
        let start = Instant::now();
        let mut elapsed = Duration::ZERO;
        let mut ran = 0;

        while elapsed < duration {
            std::thread::sleep(self.frame_interval().min(duration - elapsed));
            let now = start.elapsed().min(duration);
            ran += self.advance(now - elapsed);
            elapsed = now;
        }
        ran
    }

    /// Next frame grid point strictly after the current time, if any frame is
    /// pending.
    fn next_frame_time(&self) -> Option<u64> {
        let q = self.queues.borrow();
        if q.frames.is_empty() {
            return None;
        }
        Some((q.now_us / self.frame_interval_us + 1) * self.frame_interval_us)
    }

    fn next_event_before(&self, target: u64) -> Option<u64> {
        let timer = self.queues.borrow().timers.values().map(|t| t.next_due_us).min();
        let frame = self.next_frame_time();
        let next = match (timer, frame) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        next.filter(|&at| at <= target)
    }

    fn fire_frames(&self, at: u64) -> usize {
        let now_ms = at as f64 / 1_000.0;
        let batch: Vec<u64> = self.queues.borrow().frames.keys().copied().collect();
        let mut ran = 0;

        for id in batch {
            // Removed at execution time so a cancel from an earlier callback
            // in this batch is honoured.
            let callback = self.queues.borrow_mut().frames.remove(&id);
            if let Some(callback) = callback {
                callback(now_ms);
                ran += 1;
            }
        }
        ran
    }

    fn fire_timers(&self, at: u64) -> usize {
        let now_ms = at as f64 / 1_000.0;
        let due: Vec<u64> = self
            .queues
            .borrow()
            .timers
            .iter()
            .filter(|(_, t)| t.next_due_us <= at)
            .map(|(&id, _)| id)
            .collect();
        let mut ran = 0;

        for id in due {
            let callback = {
                let mut q = self.queues.borrow_mut();
                match q.timers.get_mut(&id) {
                    Some(timer) if timer.next_due_us <= at => {
                        timer.next_due_us += timer.period_us;
                        timer.callback.take()
                    }
                    _ => None,
                }
            };
            let Some(mut callback) = callback else { continue };

            callback(now_ms);
            ran += 1;

            if let Some(timer) = self.queues.borrow_mut().timers.get_mut(&id) {
                timer.callback = Some(callback);
            }
        }
        ran
    }
}

impl Default for HeadlessScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for HeadlessScheduler {
    fn now(&self) -> f64 {
        self.queues.borrow().now_us as f64 / 1_000.0
    }

    fn request_frame(&self, callback: FrameCallback) -> Token {
        let mut q = self.queues.borrow_mut();
        let id = q.issue();
        q.frames.insert(id, callback);
        Token(id)
    }

    fn every(&self, period: Duration, callback: TickCallback) -> Token {
        let period_us =
            u64::try_from(period.as_micros()).unwrap_or(u64::MAX).max(MIN_TIMER_PERIOD_US);
        let mut q = self.queues.borrow_mut();
        let id = q.issue();
        let next_due_us = q.now_us.saturating_add(period_us);
        q.timers.insert(id, Timer { period_us, next_due_us, callback: Some(callback) });
        Token(id)
    }

    fn cancel(&self, token: Token) {
        let mut q = self.queues.borrow_mut();
        if q.frames.remove(&token.0).is_none() {
            q.timers.remove(&token.0);
        }
    }
}
