//! Category-partitioned rolling buffer for streamed points.
//!
//! Each category owns an independent [`RingBuffer`] capped at `max_points`;
//! appending to a full category evicts exactly its oldest point. Categories are
//! fixed at construction and points for any other category are dropped and
//! counted.
//!
//! [`StreamBuffer::all_points_sorted`] merges every category into one
//! chronological sequence. The merge costs O(n log n) over all buffered points,
//! so the result is cached until the next mutation: a render loop that reads
//! it every frame only pays once per producer tick.

use crate::data::{DataExtent, DataPoint};
use crate::error::{Error, Result};
use crate::ring_buffer::RingBuffer;
use std::collections::HashMap;

/// Outcome of one append batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppendStats {
    /// Points stored.
    pub accepted: usize,
    /// Old points evicted to make room.
    pub evicted: usize,
    /// Points rejected for a missing or unknown category.
    pub dropped: usize,
}

/// Bounded per-category storage of the rolling window.
#[derive(Debug, Clone)]
pub struct StreamBuffer {
    /// Category names in construction order.
    categories: Vec<String>,
    /// Category name → index into `series`.
    index: HashMap<String, usize>,
    /// One bounded buffer per category.
    series: Vec<RingBuffer<DataPoint>>,
    max_points: usize,
    dropped_total: u64,
    sorted_cache: Option<Vec<DataPoint>>,
}

impl StreamBuffer {
    /// Create empty buffers for a fixed set of categories.
    ///
    /// Duplicate names are collapsed, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] for `max_points == 0` and
    /// [`Error::EmptyData`] when no categories are given.
    pub fn new<I, S>(categories: I, max_points: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        let mut index = HashMap::new();
        for name in categories {
            let name = name.into();
            if !index.contains_key(&name) {
                index.insert(name.clone(), names.len());
                names.push(name);
            }
        }
        if names.is_empty() {
            return Err(Error::EmptyData);
        }

        let series = names
            .iter()
            .map(|_| RingBuffer::new(max_points))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            categories: names,
            index,
            series,
            max_points,
            dropped_total: 0,
            sorted_cache: None,
        })
    }

    /// Replace all contents with a historical seed batch.
    pub fn backfill<I>(&mut self, points: I) -> AppendStats
    where
        I: IntoIterator<Item = DataPoint>,
    {
        for buffer in &mut self.series {
            buffer.clear();
        }
        self.sorted_cache = None;
        let stats = self.append(points);
        log::info!(
            "backfilled {} points across {} categories ({} dropped)",
            stats.accepted,
            self.categories.len(),
            stats.dropped
        );
        stats
    }

    /// Route each point to its category buffer, evicting the oldest when full.
    pub fn append<I>(&mut self, points: I) -> AppendStats
    where
        I: IntoIterator<Item = DataPoint>,
    {
        let mut stats = AppendStats::default();

        for point in points {
            let slot = point.category().and_then(|c| self.index.get(c)).copied();
            match slot {
                Some(i) => {
                    if self.series[i].push(point).is_some() {
                        stats.evicted += 1;
                    }
                    stats.accepted += 1;
                }
                None => stats.dropped += 1,
            }
        }

        if stats.accepted > 0 {
            self.sorted_cache = None;
        }
        if stats.dropped > 0 {
            self.dropped_total += stats.dropped as u64;
            log::debug!("dropped {} points with missing or unknown category", stats.dropped);
        }
        stats
    }

    /// Newest point of every non-empty category, in category order.
    #[must_use]
    pub fn latest_per_category(&self) -> Vec<DataPoint> {
        self.series.iter().filter_map(|s| s.latest().cloned()).collect()
    }

    /// Every buffered point in chronological order.
    ///
    /// Ties keep category order, then insertion order (stable sort).
    pub fn all_points_sorted(&mut self) -> &[DataPoint] {
        let series = &self.series;
        self.sorted_cache.get_or_insert_with(|| {
            let mut merged: Vec<DataPoint> =
                series.iter().flat_map(|s| s.iter().cloned()).collect();
            merged.sort_by_key(|p| p.timestamp);
            merged
        })
    }

    /// Buffer for one category.
    #[must_use]
    pub fn series(&self, category: &str) -> Option<&RingBuffer<DataPoint>> {
        self.index.get(category).map(|&i| &self.series[i])
    }

    /// `(category, buffer)` pairs in category order.
    pub fn iter_series(&self) -> impl Iterator<Item = (&str, &RingBuffer<DataPoint>)> + '_ {
        self.categories.iter().map(String::as_str).zip(self.series.iter())
    }

    /// Category names in construction order.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of points buffered for `category` (0 if unknown).
    #[must_use]
    pub fn len(&self, category: &str) -> usize {
        self.series(category).map_or(0, RingBuffer::len)
    }

    /// Number of points across all categories.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.series.iter().map(RingBuffer::len).sum()
    }

    /// True when no category holds any point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(RingBuffer::is_empty)
    }

    /// Per-category capacity.
    #[must_use]
    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Points dropped since construction.
    #[must_use]
    pub fn dropped_total(&self) -> u64 {
        self.dropped_total
    }

    /// Bounding box of all buffered points.
    #[must_use]
    pub fn extent(&self) -> Option<DataExtent> {
        self.series
            .iter()
            .filter_map(|s| DataExtent::from_points(s.iter()))
            .reduce(DataExtent::union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(t: i64, category: &str) -> DataPoint {
        DataPoint::categorized(t, t as f64, category)
    }

    fn buffer(max_points: usize) -> StreamBuffer {
        StreamBuffer::new(["A", "B"], max_points).unwrap()
    }

    #[test]
    fn test_new_validation() {
        assert!(matches!(StreamBuffer::new(["A"], 0), Err(Error::InvalidCapacity(0))));
        assert!(matches!(StreamBuffer::new(Vec::<String>::new(), 10), Err(Error::EmptyData)));
    }

    #[test]
    fn test_duplicate_categories_collapse() {
        let buf = StreamBuffer::new(["A", "B", "A"], 4).unwrap();
        assert_eq!(buf.categories(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_append_evicts_oldest_per_category() {
        let mut buf = buffer(3);
        let stats = buf.append((0..10).map(|t| point(t, "A")));

        assert_eq!(stats, AppendStats { accepted: 10, evicted: 7, dropped: 0 });
        assert_eq!(buf.len("A"), 3);
        let kept: Vec<i64> = buf.series("A").unwrap().iter().map(|p| p.timestamp).collect();
        assert_eq!(kept, vec![7, 8, 9]);
    }

    #[test]
    fn test_eviction_is_independent_across_categories() {
        let mut buf = buffer(2);
        buf.append([point(1, "B")]);
        buf.append((10..20).map(|t| point(t, "A")));

        assert_eq!(buf.len("A"), 2);
        assert_eq!(buf.len("B"), 1);
        assert_eq!(buf.series("B").unwrap().latest().unwrap().timestamp, 1);
    }

    #[test]
    fn test_unknown_category_dropped() {
        let mut buf = buffer(5);
        let stats = buf.append([point(1, "Z"), DataPoint::new(2, 1.0), point(3, "A")]);

        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.accepted, 1);
        assert_eq!(buf.total_len(), 1);
        assert_eq!(buf.dropped_total(), 2);
    }

    #[test]
    fn test_latest_per_category_skips_empty() {
        let mut buf = buffer(5);
        buf.append([point(1, "A"), point(4, "A")]);

        let latest = buf.latest_per_category();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].timestamp, 4);
    }

    #[test]
    fn test_all_points_sorted_merges() {
        let mut buf = buffer(5);
        buf.append([point(1, "A"), point(3, "A"), point(2, "B"), point(4, "B")]);

        let ts: Vec<i64> = buf.all_points_sorted().iter().map(|p| p.timestamp).collect();
        assert_eq!(ts, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_all_points_sorted_stable_on_ties() {
        let mut buf = buffer(5);
        buf.append([point(5, "B"), point(5, "A")]);

        let cats: Vec<&str> =
            buf.all_points_sorted().iter().filter_map(DataPoint::category).collect();
        assert_eq!(cats, vec!["A", "B"]);
    }

    #[test]
    fn test_sorted_cache_invalidated_on_append() {
        let mut buf = buffer(5);
        buf.append([point(2, "A")]);
        assert_eq!(buf.all_points_sorted().len(), 1);

        buf.append([point(1, "B")]);
        let ts: Vec<i64> = buf.all_points_sorted().iter().map(|p| p.timestamp).collect();
        assert_eq!(ts, vec![1, 2]);
    }

    #[test]
    fn test_backfill_replaces_contents() {
        let mut buf = buffer(3);
        buf.append([point(100, "A")]);
        let stats = buf.backfill((0..8).map(|t| point(t, if t % 2 == 0 { "A" } else { "B" })));

        assert_eq!(stats.accepted, 8);
        assert_eq!(buf.len("A"), 3);
        assert_eq!(buf.len("B"), 3);
        assert_eq!(buf.series("A").unwrap().latest().unwrap().timestamp, 6);
        assert!(buf.all_points_sorted().iter().all(|p| p.timestamp < 100));
    }

    #[test]
    fn test_extent() {
        let mut buf = buffer(5);
        assert!(buf.extent().is_none());
        buf.append([
            DataPoint::categorized(10, -2.0, "A"),
            DataPoint::categorized(30, 8.0, "B"),
        ]);
        let extent = buf.extent().unwrap();
        assert_eq!((extent.t_min, extent.t_max), (10, 30));
        assert_eq!((extent.v_min, extent.v_max), (-2.0, 8.0));
    }

    #[test]
    fn test_iter_series_order() {
        let buf = buffer(1);
        let names: Vec<&str> = buf.iter_series().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(buf.is_empty());
        assert_eq!(buf.max_points(), 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Appending N > max_points to one category keeps the newest max_points in order.
        #[test]
        fn prop_keeps_most_recent_window(max_points in 1usize..64, extra in 1usize..200) {
            let mut buf = StreamBuffer::new(["A"], max_points).unwrap();
            let n = max_points + extra;
            buf.append((0..n as i64).map(|t| DataPoint::categorized(t, 0.0, "A")));

            let kept: Vec<i64> = buf.series("A").unwrap().iter().map(|p| p.timestamp).collect();
            let expected: Vec<i64> = ((n - max_points) as i64..n as i64).collect();
            prop_assert_eq!(kept, expected);
        }

        /// The merged view is sorted and holds every buffered point.
        #[test]
        fn prop_merged_is_sorted(
            a in prop::collection::vec(0i64..1000, 0..50),
            b in prop::collection::vec(0i64..1000, 0..50),
        ) {
            let mut a = a;
            let mut b = b;
            a.sort_unstable();
            b.sort_unstable();

            let mut buf = StreamBuffer::new(["A", "B"], 100).unwrap();
            buf.append(a.iter().map(|&t| DataPoint::categorized(t, 0.0, "A")));
            buf.append(b.iter().map(|&t| DataPoint::categorized(t, 0.0, "B")));

            let total = buf.total_len();
            let merged = buf.all_points_sorted();
            prop_assert_eq!(merged.len(), total);
            for pair in merged.windows(2) {
                prop_assert!(pair[0].timestamp <= pair[1].timestamp);
            }
        }
    }
}
