//! Data points and their bounding extents.

/// A single sample of a time series.
///
/// Points are immutable once created; producers emit new points instead of
/// editing old ones.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Measured value.
    pub value: f64,
    /// Series the point belongs to, if any.
    pub category: Option<String>,
}

impl DataPoint {
    /// Create an uncategorized point.
    #[must_use]
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value, category: None }
    }

    /// Create a point belonging to `category`.
    #[must_use]
    pub fn categorized(timestamp: i64, value: f64, category: impl Into<String>) -> Self {
        Self { timestamp, value, category: Some(category.into()) }
    }

    /// Category name, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Bounding box of a set of points in data space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataExtent {
    /// Earliest timestamp.
    pub t_min: i64,
    /// Latest timestamp.
    pub t_max: i64,
    /// Smallest finite value.
    pub v_min: f64,
    /// Largest finite value.
    pub v_max: f64,
}

impl DataExtent {
    /// Extent of a single point.
    #[must_use]
    pub fn of(point: &DataPoint) -> Option<Self> {
        point.value.is_finite().then_some(Self {
            t_min: point.timestamp,
            t_max: point.timestamp,
            v_min: point.value,
            v_max: point.value,
        })
    }

    /// Grow the extent to cover `point`. Non-finite values are ignored.
    pub fn include(&mut self, point: &DataPoint) {
        if !point.value.is_finite() {
            return;
        }
        self.t_min = self.t_min.min(point.timestamp);
        self.t_max = self.t_max.max(point.timestamp);
        self.v_min = self.v_min.min(point.value);
        self.v_max = self.v_max.max(point.value);
    }

    /// Extent of every finite point, or `None` when there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DataPoint>) -> Option<Self> {
        points.into_iter().fold(None, |acc, point| match acc {
            None => Self::of(point),
            Some(mut extent) => {
                extent.include(point);
                Some(extent)
            }
        })
    }

    /// Union of two extents.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            t_min: self.t_min.min(other.t_min),
            t_max: self.t_max.max(other.t_max),
            v_min: self.v_min.min(other.v_min),
            v_max: self.v_max.max(other.v_max),
        }
    }
}
