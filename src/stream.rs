//! Producer loop feeding a [`StreamBuffer`] at a fixed cadence.
//!
//! Each tick reads the latest point per category, asks the [`DataProducer`]
//! for the next batch and appends it. The whole step runs inside one timer
//! callback, so a render frame sees the buffer either before or after a tick,
//! never in between.

use crate::animation::IntervalTask;
use crate::buffer::{AppendStats, StreamBuffer};
use crate::generator::DataProducer;
use crate::schedule::Scheduler;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Buffer handle shared between the stream and its readers.
pub type SharedBuffer = Rc<RefCell<StreamBuffer>>;

type SharedProducer = Rc<RefCell<Box<dyn DataProducer>>>;

/// Recurring producer task bound to one buffer.
pub struct DataStream {
    buffer: SharedBuffer,
    producer: SharedProducer,
    scheduler: Rc<dyn Scheduler>,
    task: IntervalTask,
    /// Wall-clock ms corresponding to scheduler time zero.
    epoch_ms: i64,
}

impl DataStream {
    /// Create an idle stream ticking every `update_interval`.
    ///
    /// Producer timestamps are wall-clock milliseconds, anchored now.
    pub fn new<P>(
        scheduler: Rc<dyn Scheduler>,
        buffer: SharedBuffer,
        producer: P,
        update_interval: Duration,
    ) -> Self
    where
        P: DataProducer + 'static,
    {
        let epoch_ms = chrono::Utc::now().timestamp_millis() - scheduler.now() as i64;
        let producer: Box<dyn DataProducer> = Box::new(producer);
        Self {
            buffer,
            producer: Rc::new(RefCell::new(producer)),
            task: IntervalTask::new(Rc::clone(&scheduler), update_interval),
            scheduler,
            epoch_ms,
        }
    }

    /// Anchor producer timestamps so that scheduler time zero is `epoch_ms`.
    #[must_use]
    pub fn with_epoch(mut self, epoch_ms: i64) -> Self {
        self.set_epoch(epoch_ms);
        self
    }

    /// Re-anchor producer timestamps. Takes effect on the next start.
    pub fn set_epoch(&mut self, epoch_ms: i64) {
        self.epoch_ms = epoch_ms;
    }

    /// Begin producing. Returns false if already streaming.
    pub fn start_stream(&self) -> bool {
        let buffer = Rc::clone(&self.buffer);
        let producer = Rc::clone(&self.producer);
        let epoch_ms = self.epoch_ms;
        self.task.start(move |now| {
            step(&buffer, &producer, epoch_ms + now as i64);
        })
    }

    /// Stop producing. Idempotent.
    pub fn stop_stream(&self) {
        self.task.stop();
    }

    /// True while the producer task is scheduled.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.task.is_running()
    }

    /// Run one producer step immediately.
    pub fn update_data(&self) -> AppendStats {
        step(&self.buffer, &self.producer, self.epoch_ms + self.scheduler.now() as i64)
    }

    /// The buffer this stream feeds.
    #[must_use]
    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    /// Interval between producer steps.
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        self.task.period()
    }

    /// Producer steps run by the timer so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.task.ticks()
    }
}

fn step(buffer: &SharedBuffer, producer: &SharedProducer, now_ms: i64) -> AppendStats {
    let latest = buffer.borrow().latest_per_category();
    let points = producer.borrow_mut().next_points(&latest, now_ms);
    buffer.borrow_mut().append(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataPoint;
    use crate::generator::SyntheticGenerator;
    use crate::schedule::HeadlessScheduler;

    fn shared_buffer(max_points: usize) -> SharedBuffer {
        Rc::new(RefCell::new(StreamBuffer::new(["Alpha", "Beta"], max_points).unwrap()))
    }

    fn echo(latest: &[DataPoint], now: i64) -> Vec<DataPoint> {
        latest.iter().map(|p| DataPoint { timestamp: now, ..p.clone() }).collect()
    }

    #[test]
    fn test_stream_ticks_feed_buffer() {
        let sched = Rc::new(HeadlessScheduler::new());
        let buffer = shared_buffer(100);
        buffer.borrow_mut().backfill([
            DataPoint::categorized(0, 1.0, "Alpha"),
            DataPoint::categorized(0, 2.0, "Beta"),
        ]);

        let stream = DataStream::new(sched.clone(), Rc::clone(&buffer), echo, Duration::from_millis(100))
            .with_epoch(1_000);
        assert!(stream.start_stream());
        sched.advance(Duration::from_millis(300));

        let buf = buffer.borrow();
        assert_eq!(buf.len("Alpha"), 4);
        assert_eq!(buf.series("Beta").unwrap().latest().unwrap().timestamp, 1_300);
        assert_eq!(stream.ticks(), 3);
    }

    #[test]
    fn test_double_start_single_schedule() {
        let sched = Rc::new(HeadlessScheduler::new());
        let buffer = shared_buffer(100);
        buffer.borrow_mut().backfill([DataPoint::categorized(0, 1.0, "Alpha")]);

        let stream = DataStream::new(sched.clone(), Rc::clone(&buffer), echo, Duration::from_millis(100));
        assert!(stream.start_stream());
        assert!(!stream.start_stream());
        assert_eq!(sched.pending_timers(), 1);

        sched.advance(Duration::from_millis(500));
        assert_eq!(buffer.borrow().len("Alpha"), 6);
    }

    #[test]
    fn test_stop_stream_halts_updates() {
        let sched = Rc::new(HeadlessScheduler::new());
        let buffer = shared_buffer(100);
        buffer.borrow_mut().backfill([DataPoint::categorized(0, 1.0, "Alpha")]);

        let stream = DataStream::new(sched.clone(), Rc::clone(&buffer), echo, Duration::from_millis(100));
        stream.start_stream();
        sched.advance(Duration::from_millis(200));
        stream.stop_stream();
        stream.stop_stream();
        sched.advance(Duration::from_secs(2));

        assert!(!stream.is_streaming());
        assert_eq!(buffer.borrow().len("Alpha"), 3);
    }

    #[test]
    fn test_update_data_with_generator_stays_bounded() {
        let sched = Rc::new(HeadlessScheduler::new());
        let buffer = shared_buffer(10);
        let mut gen = SyntheticGenerator::new(9);
        let seed: Vec<DataPoint> = gen
            .initial_data(10, 0)
            .into_iter()
            .filter(|p| matches!(p.category(), Some("Alpha" | "Beta")))
            .collect();
        buffer.borrow_mut().backfill(seed);

        let stream = DataStream::new(sched, Rc::clone(&buffer), gen, Duration::from_millis(100))
            .with_epoch(10_000);
        for _ in 0..25 {
            let stats = stream.update_data();
            assert_eq!(stats.accepted, 2);
            assert_eq!(stats.evicted, 2);
        }

        let buf = buffer.borrow();
        assert_eq!(buf.total_len(), 20);
        assert_eq!(stream.update_interval(), Duration::from_millis(100));
    }
}
