//! Data producers.
//!
//! [`DataProducer`] is the only shape the stream needs: given the newest point
//! of each category, return the next batch. [`SyntheticGenerator`] is the
//! built-in producer, a seeded sine backfill followed by a mean-reverting
//! random walk clamped to `[min_value, max_value]`.

use crate::data::DataPoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::FRAC_PI_2;

/// Source of new points for a running stream.
pub trait DataProducer {
    /// Produce the next points given the latest point per category.
    ///
    /// `now_ms` is the stream clock in milliseconds since the epoch.
    fn next_points(&mut self, latest: &[DataPoint], now_ms: i64) -> Vec<DataPoint>;
}

impl<F> DataProducer for F
where
    F: FnMut(&[DataPoint], i64) -> Vec<DataPoint>,
{
    fn next_points(&mut self, latest: &[DataPoint], now_ms: i64) -> Vec<DataPoint> {
        self(latest, now_ms)
    }
}

/// Shape of the synthetic signal.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Category names, one series each.
    pub categories: Vec<String>,
    /// Lower clamp for values.
    pub min_value: f64,
    /// Upper clamp for values.
    pub max_value: f64,
    /// Sine frequency in radians per backfill sample.
    pub base_frequency: f64,
    /// Peak uniform noise added to backfill samples.
    pub noise_amplitude: f64,
    /// Spacing of backfill samples in ms.
    pub interval_ms: i64,
    /// Fraction of the distance to the midpoint recovered per step.
    pub mean_reversion: f64,
    /// Random-walk noise as a multiple of `noise_amplitude`.
    pub volatility: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            categories: ["Alpha", "Beta", "Gamma", "Delta"].map(String::from).to_vec(),
            min_value: 0.0,
            max_value: 100.0,
            base_frequency: 1.0 / 400.0,
            noise_amplitude: 10.0,
            interval_ms: 100,
            mean_reversion: 0.3,
            volatility: 0.5,
        }
    }
}

/// Seeded synthetic producer.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl SyntheticGenerator {
    /// Generator with the default signal and a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(GeneratorConfig::default(), seed)
    }

    /// Generator with a custom signal and a fixed seed.
    #[must_use]
    pub fn with_config(config: GeneratorConfig, seed: u64) -> Self {
        Self { config, rng: StdRng::seed_from_u64(seed) }
    }

    /// Generator seeded from OS entropy.
    #[must_use]
    pub fn from_entropy(config: GeneratorConfig) -> Self {
        Self { config, rng: StdRng::from_entropy() }
    }

    /// Signal parameters.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// `count` samples per category spaced `interval_ms` apart from `start_ms`.
    ///
    /// Each category is a sine wave shifted by a quarter period from the
    /// previous one, mapped onto the value range, plus uniform noise.
    pub fn initial_data(&mut self, count: usize, start_ms: i64) -> Vec<DataPoint> {
        let GeneratorConfig { min_value, max_value, base_frequency, noise_amplitude, .. } =
            self.config;
        let span = max_value - min_value;
        let mut points = Vec::with_capacity(count * self.config.categories.len());

        for i in 0..count {
            let timestamp = start_ms + i as i64 * self.config.interval_ms;
            for (index, category) in self.config.categories.iter().enumerate() {
                let phase = index as f64 * FRAC_PI_2;
                let base = (i as f64 * base_frequency + phase).sin();
                let noise = self.rng.gen_range(-1.0..1.0) * noise_amplitude;
                let value = ((base + 1.0) / 2.0 * span + min_value + noise).clamp(min_value, max_value);
                points.push(DataPoint::categorized(timestamp, value, category.as_str()));
            }
        }
        points
    }
}

impl DataProducer for SyntheticGenerator {
    fn next_points(&mut self, latest: &[DataPoint], now_ms: i64) -> Vec<DataPoint> {
        let c = &self.config;
        let target = (c.max_value + c.min_value) / 2.0;

        latest
            .iter()
            .map(|last| {
                let jitter = (self.rng.gen::<f64>() - 0.5) * c.volatility * c.noise_amplitude;
                let value = (last.value + c.mean_reversion * (target - last.value) + jitter)
                    .clamp(c.min_value, c.max_value);
                DataPoint {
                    timestamp: now_ms.max(last.timestamp),
                    value,
                    category: last.category.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_data_layout() {
        let mut gen = SyntheticGenerator::new(7);
        let points = gen.initial_data(10, 1_000);

        assert_eq!(points.len(), 40);
        assert_eq!(points[0].timestamp, 1_000);
        assert_eq!(points[39].timestamp, 1_900);
        assert_eq!(points[0].category(), Some("Alpha"));
        assert_eq!(points[3].category(), Some("Delta"));
        assert!(points.iter().all(|p| (0.0..=100.0).contains(&p.value)));
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = SyntheticGenerator::new(42).initial_data(50, 0);
        let b = SyntheticGenerator::new(42).initial_data(50, 0);
        let c = SyntheticGenerator::new(43).initial_data(50, 0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_next_points_one_per_latest() {
        let mut gen = SyntheticGenerator::new(1);
        let latest = vec![
            DataPoint::categorized(10, 50.0, "Alpha"),
            DataPoint::categorized(10, 99.0, "Beta"),
        ];
        let next = gen.next_points(&latest, 500);

        assert_eq!(next.len(), 2);
        assert_eq!(next[0].category(), Some("Alpha"));
        assert_eq!(next[1].category(), Some("Beta"));
        assert!(next.iter().all(|p| p.timestamp == 500));
        // Mean reversion pulls 99 towards 50: 99 - 14.7 ± 2.5
        assert!(next[1].value < 90.0);
    }

    #[test]
    fn test_next_points_never_go_backwards() {
        let mut gen = SyntheticGenerator::new(1);
        let latest = vec![DataPoint::categorized(5_000, 50.0, "Alpha")];
        let next = gen.next_points(&latest, 100);
        assert_eq!(next[0].timestamp, 5_000);
    }

    #[test]
    fn test_values_stay_clamped() {
        let config = GeneratorConfig { volatility: 50.0, ..GeneratorConfig::default() };
        let mut gen = SyntheticGenerator::with_config(config, 3);
        let mut latest = vec![DataPoint::categorized(0, 50.0, "Alpha")];
        for t in 1..200 {
            latest = gen.next_points(&latest, t);
            assert!((0.0..=100.0).contains(&latest[0].value));
        }
    }

    #[test]
    fn test_closure_producer() {
        let mut producer = |latest: &[DataPoint], now: i64| -> Vec<DataPoint> {
            latest.iter().map(|p| DataPoint { timestamp: now, ..p.clone() }).collect()
        };
        let out = producer.next_points(&[DataPoint::new(1, 2.0)], 9);
        assert_eq!(out, vec![DataPoint::new(9, 2.0)]);
    }
}
