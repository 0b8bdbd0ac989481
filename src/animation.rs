//! Recurring activities on top of a [`Scheduler`].
//!
//! [`AnimationLoop`] re-requests a frame after every callback and
//! [`IntervalTask`] holds a single interval timer. Both keep at most one live
//! token, treat a second `start` as a no-op and make `stop` idempotent. Once
//! `stop` returns the callback never runs again, including when `stop` is
//! called from inside the callback itself.

use crate::schedule::{Scheduler, Token};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

type Callback = Box<dyn FnMut(f64)>;

/// State shared between a handle and the closures it hands to the scheduler.
///
/// The scheduler only ever holds a `Weak` to this, so dropping the handle
/// ends the activity.
struct Activity {
    scheduler: Rc<dyn Scheduler>,
    running: Cell<bool>,
    /// Bumped on every start and stop; stale scheduler callbacks compare
    /// against it and bail out.
    generation: Cell<u64>,
    token: Cell<Option<Token>>,
    runs: Cell<u64>,
    /// Empty while the callback is executing.
    callback: RefCell<Option<Callback>>,
}

impl Activity {
    fn new(scheduler: Rc<dyn Scheduler>) -> Rc<Self> {
        Rc::new(Self {
            scheduler,
            running: Cell::new(false),
            generation: Cell::new(0),
            token: Cell::new(None),
            runs: Cell::new(0),
            callback: RefCell::new(None),
        })
    }

    /// Mark running with a fresh callback. False if already running.
    fn begin(&self, callback: Callback) -> Option<u64> {
        if self.running.get() {
            return None;
        }
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.running.set(true);
        *self.callback.borrow_mut() = Some(callback);
        Some(generation)
    }

    /// Cancel the outstanding token and drop the callback. False if idle.
    fn end(&self) -> bool {
        if !self.running.replace(false) {
            return false;
        }
        self.generation.set(self.generation.get() + 1);
        if let Some(token) = self.token.take() {
            self.scheduler.cancel(token);
        }
        // Empty when stopping from inside the callback; it is dropped on return.
        self.callback.borrow_mut().take();
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        self.running.get() && self.generation.get() == generation
    }

    /// Run the callback once. Returns true if the activity is still the same
    /// run afterwards.
    fn invoke(&self, generation: u64, timestamp: f64) -> bool {
        let Some(mut callback) = self.callback.borrow_mut().take() else {
            return false;
        };
        callback(timestamp);
        self.runs.set(self.runs.get() + 1);

        if self.is_current(generation) {
            *self.callback.borrow_mut() = Some(callback);
            true
        } else {
            false
        }
    }
}

// ============================================================================
// AnimationLoop
// ============================================================================

/// Calls a closure once per animation frame until stopped.
pub struct AnimationLoop {
    activity: Rc<Activity>,
}

impl AnimationLoop {
    /// Create an idle loop on `scheduler`.
    #[must_use]
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self { activity: Activity::new(scheduler) }
    }

    /// Begin calling `callback` every frame with the frame timestamp in ms.
    ///
    /// Returns false, leaving the running loop untouched, if already running.
    pub fn start<F>(&self, callback: F) -> bool
    where
        F: FnMut(f64) + 'static,
    {
        let Some(generation) = self.activity.begin(Box::new(callback)) else {
            return false;
        };
        log::info!("animation loop started");
        Self::request(&self.activity, generation);
        true
    }

    /// Stop the loop and cancel the pending frame. Idempotent.
    pub fn stop(&self) {
        if self.activity.end() {
            log::info!("animation loop stopped after {} frames", self.activity.runs.get());
        }
    }

    /// True between `start` and `stop`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.activity.running.get()
    }

    /// Frames delivered since construction.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.activity.runs.get()
    }

    fn request(activity: &Rc<Activity>, generation: u64) {
        let weak: Weak<Activity> = Rc::downgrade(activity);
        let token = activity.scheduler.request_frame(Box::new(move |timestamp| {
            if let Some(activity) = weak.upgrade() {
                Self::on_frame(&activity, generation, timestamp);
            }
        }));
        activity.token.set(Some(token));
    }

    fn on_frame(activity: &Rc<Activity>, generation: u64, timestamp: f64) {
        if !activity.is_current(generation) {
            return;
        }
        activity.token.set(None);
        if activity.invoke(generation, timestamp) {
            Self::request(activity, generation);
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// IntervalTask
// ============================================================================

/// Calls a closure at a fixed period until stopped.
pub struct IntervalTask {
    activity: Rc<Activity>,
    period: Duration,
}

impl IntervalTask {
    /// Create an idle task firing every `period`.
    #[must_use]
    pub fn new(scheduler: Rc<dyn Scheduler>, period: Duration) -> Self {
        Self { activity: Activity::new(scheduler), period }
    }

    /// Begin calling `callback` every period with the tick timestamp in ms.
    ///
    /// Returns false if already running.
    pub fn start<F>(&self, callback: F) -> bool
    where
        F: FnMut(f64) + 'static,
    {
        let Some(generation) = self.activity.begin(Box::new(callback)) else {
            return false;
        };

        let weak = Rc::downgrade(&self.activity);
        let token = self.activity.scheduler.every(
            self.period,
            Box::new(move |timestamp| {
                if let Some(activity) = weak.upgrade() {
                    if activity.is_current(generation) {
                        activity.invoke(generation, timestamp);
                    }
                }
            }),
        );
        self.activity.token.set(Some(token));
        log::info!("interval task started ({:?} period)", self.period);
        true
    }

    /// Cancel the timer. Idempotent.
    pub fn stop(&self) {
        if self.activity.end() {
            log::info!("interval task stopped after {} ticks", self.activity.runs.get());
        }
    }

    /// True between `start` and `stop`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.activity.running.get()
    }

    /// Ticks delivered since construction.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.activity.runs.get()
    }

    /// Configured period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for IntervalTask {
    fn drop(&mut self) {
        self.stop();
    }
}
