//! Frame-rate and memory diagnostics.
//!
//! [`PerformanceMonitor`] runs its own [`AnimationLoop`] beside the chart's, so
//! it observes the real frame cadence without touching the render path. Frames
//! are counted over windows of at least one second; when a window closes the
//! count is published as `fps` and memory is sampled through a
//! [`MemoryProbe`]. Unavailable memory figures read as zero.

use crate::animation::AnimationLoop;
use crate::schedule::Scheduler;
use std::cell::RefCell;
use std::rc::Rc;

/// Length of one fps window in ms.
const FPS_WINDOW_MS: f64 = 1_000.0;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Memory figures in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MemoryStats {
    /// Resident memory of this process.
    pub used: f64,
    /// Address space reserved by this process.
    pub total: f64,
    /// Physical memory of the host.
    pub limit: f64,
}

/// Latest published diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerformanceMetrics {
    /// Frames counted in the last closed window.
    pub fps: u32,
    /// Memory sampled when that window closed.
    pub memory: MemoryStats,
    /// Scheduler time of the last recorded frame, in ms.
    pub last_update_time: f64,
}

impl PerformanceMetrics {
    /// One-line human readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} fps, {} used",
            self.fps,
            batuta_common::fmt::format_bytes_si(self.memory.used as u64)
        )
    }
}

/// Memory figures formatted as megabytes with one decimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedMemory {
    /// Used MB.
    pub used: String,
    /// Total MB.
    pub total: String,
    /// Limit MB.
    pub limit: String,
}

/// Host memory source.
pub trait MemoryProbe {
    /// Current figures; zeroes for anything unavailable.
    fn sample(&self) -> MemoryStats;
}

/// Probe that always reports zeroes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMemoryProbe;

impl MemoryProbe for NoMemoryProbe {
    fn sample(&self) -> MemoryStats {
        MemoryStats::default()
    }
}

/// Reads `/proc/self/status` and `/proc/meminfo` on Linux; zeroes elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcMemoryProbe;

impl MemoryProbe for ProcMemoryProbe {
    #[cfg(target_os = "linux")]
    fn sample(&self) -> MemoryStats {
        let status = std::fs::read_to_string("/proc/self/status").unwrap_or_default();
        let meminfo = std::fs::read_to_string("/proc/meminfo").unwrap_or_default();
        MemoryStats {
            used: proc_field_bytes(&status, "VmRSS:"),
            total: proc_field_bytes(&status, "VmSize:"),
            limit: proc_field_bytes(&meminfo, "MemTotal:"),
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn sample(&self) -> MemoryStats {
        MemoryStats::default()
    }
}

/// Value of a `Key:   1234 kB` line in bytes, or 0 if absent.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn proc_field_bytes(content: &str, key: &str) -> f64 {
    content
        .lines()
        .find_map(|line| {
            let mut parts = line.split_whitespace();
            (parts.next() == Some(key)).then(|| parts.next()?.parse::<f64>().ok()).flatten()
        })
        .map_or(0.0, |kb| kb * 1024.0)
}

struct MonitorState {
    metrics: PerformanceMetrics,
    frame_count: u32,
    last_fps_update: f64,
    probe: Box<dyn MemoryProbe>,
}

impl MonitorState {
    fn record_frame(&mut self, now: f64) {
        self.frame_count += 1;
        if now - self.last_fps_update >= FPS_WINDOW_MS {
            self.metrics.fps = self.frame_count;
            self.frame_count = 0;
            self.last_fps_update = now;
            self.metrics.memory = self.probe.sample();
        }
        self.metrics.last_update_time = now;
    }
}

/// Diagnostic sampler running on its own frame loop.
pub struct PerformanceMonitor {
    scheduler: Rc<dyn Scheduler>,
    animation: AnimationLoop,
    state: Rc<RefCell<MonitorState>>,
}

impl PerformanceMonitor {
    /// Idle monitor sampling memory through `probe`.
    pub fn new<P>(scheduler: Rc<dyn Scheduler>, probe: P) -> Self
    where
        P: MemoryProbe + 'static,
    {
        let state = MonitorState {
            metrics: PerformanceMetrics::default(),
            frame_count: 0,
            last_fps_update: scheduler.now(),
            probe: Box::new(probe),
        };
        Self {
            animation: AnimationLoop::new(Rc::clone(&scheduler)),
            scheduler,
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Begin counting frames. Returns false if already running.
    pub fn start(&self) -> bool {
        if self.animation.is_running() {
            return false;
        }
        {
            let mut state = self.state.borrow_mut();
            state.frame_count = 0;
            state.last_fps_update = self.scheduler.now();
            state.metrics.memory = state.probe.sample();
        }
        let state = Rc::clone(&self.state);
        self.animation.start(move |now| state.borrow_mut().record_frame(now))
    }

    /// Stop counting. Idempotent; the last metrics stay readable.
    pub fn stop(&self) {
        self.animation.stop();
    }

    /// True while the monitor's frame loop runs.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.animation.is_running()
    }

    /// Count one frame at `now` ms, for hosts driving frames themselves.
    pub fn record_frame(&self, now: f64) {
        self.state.borrow_mut().record_frame(now);
    }

    /// Latest published metrics.
    #[must_use]
    pub fn metrics(&self) -> PerformanceMetrics {
        self.state.borrow().metrics
    }

    /// Memory in MB with one decimal.
    #[must_use]
    pub fn formatted_memory(&self) -> FormattedMemory {
        let MemoryStats { used, total, limit } = self.metrics().memory;
        let mb = |bytes: f64| format!("{:.1}", bytes / BYTES_PER_MB);
        FormattedMemory { used: mb(used), total: mb(total), limit: mb(limit) }
    }
}
