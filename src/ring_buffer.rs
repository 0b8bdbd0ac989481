//! Bounded FIFO buffer backing each category's rolling window.
//!
//! Key properties:
//!
//! - **Bounded capacity**: never exceeds the configured size
//! - **Strict FIFO eviction**: a push into a full buffer drops exactly the oldest entry
//! - **O(1) access** to the newest and oldest entries
//! - **No allocations after warmup**: storage is reserved up front
//!
//! # Example
//!
//! ```
//! use trueno_live::ring_buffer::RingBuffer;
//!
//! let mut buffer = RingBuffer::new(3).unwrap();
//! for i in 0..5 {
//!     buffer.push(i);
//! }
//! assert_eq!(buffer.len(), 3);
//! assert_eq!(buffer.oldest(), Some(&2));
//! assert_eq!(buffer.latest(), Some(&4));
//! ```

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::ops::Range;

/// A fixed-capacity ring buffer.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Internal storage using VecDeque for O(1) push/pop at both ends.
    data: VecDeque<T>,
    /// Maximum capacity (never exceeded).
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Creates a new ring buffer with the specified capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        Ok(Self { data: VecDeque::with_capacity(capacity), capacity })
    }

    /// Pushes a value, returning the evicted oldest value when full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.data.len() >= self.capacity { self.data.pop_front() } else { None };
        self.data.push_back(value);
        evicted
    }

    /// Returns the most recent value, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.data.back()
    }

    /// Returns the oldest value, if any.
    #[must_use]
    pub fn oldest(&self) -> Option<&T> {
        self.data.front()
    }

    /// Returns the current number of elements in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if the buffer is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.data.len() >= self.capacity
    }

    /// Returns the maximum capacity of the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns an iterator over the values from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.data.iter()
    }

    /// Iterates a sub-range of positions, oldest first.
    ///
    /// The range is clamped to the current length.
    pub fn iter_range(&self, range: Range<usize>) -> impl Iterator<Item = &T> + '_ {
        let end = range.end.min(self.data.len());
        let start = range.start.min(end);
        self.data.range(start..end)
    }

    /// Index of the first element for which `pred` is false.
    ///
    /// The buffer must be partitioned by `pred` (e.g. sorted timestamps).
    pub fn partition_point<P>(&self, pred: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        self.data.partition_point(pred)
    }

    /// Clears all elements from the buffer.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        /// Buffer never exceeds capacity.
        #[test]
        fn prop_buffer_never_exceeds_capacity(
            capacity in 1usize..1000,
            pushes in 0usize..10000
        ) {
            let mut buf = RingBuffer::<u64>::new(capacity).unwrap();
            for i in 0..pushes {
                buf.push(i as u64);
            }
            prop_assert_eq!(buf.len(), pushes.min(capacity));
        }

        /// Iteration yields exactly the most recent `capacity` values, oldest first.
        #[test]
        fn prop_iter_preserves_order(
            capacity in 1usize..50,
            values in prop::collection::vec(any::<i32>(), 1..100)
        ) {
            let mut buf = RingBuffer::new(capacity).unwrap();
            for &v in &values {
                buf.push(v);
            }

            let collected: Vec<_> = buf.iter().copied().collect();
            let skip = values.len().saturating_sub(capacity);
            let expected: Vec<_> = values.into_iter().skip(skip).collect();
            prop_assert_eq!(collected, expected);
        }
    }
}
