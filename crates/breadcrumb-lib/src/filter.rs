//! Acceptance filter deciding which samples extend the path

use crate::Sample;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// Outcome of evaluating a candidate sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The sample extends the path
    Accept,
    /// The sample is older than the maximum age (cached or backlog data)
    Stale,
    /// The sample did not move far enough from the last accepted one
    TooClose,
}

impl Verdict {
    #[inline]
    pub fn is_accepted(self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Policy for accepting new samples into the path
///
/// Rules are applied in order:
/// 1. Samples at least `max_sample_age` old are stale.
/// 2. While the path holds at most `bootstrap_samples` samples, everything else is kept,
///    so there is data to draw while the location service is still converging.
/// 3. Afterwards a sample must be strictly more than `min_movement_meters` away from
///    the last accepted one.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AcceptanceFilter {
    /// Samples at least this old are rejected
    pub max_sample_age: Duration,
    /// Path length up to which samples are accepted regardless of movement
    pub bootstrap_samples: usize,
    /// Minimum distance in meters from the last accepted sample
    pub min_movement_meters: f64,
}

impl Default for AcceptanceFilter {
    fn default() -> Self {
        Self {
            max_sample_age: Duration::from_secs(60),
            bootstrap_samples: 10,
            min_movement_meters: 10.0,
        }
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl AcceptanceFilter {
    /// Evaluate a candidate against the tail of the path
    ///
    /// # Arguments
    /// * `candidate` - The sample being considered
    /// * `last` - The last accepted sample, if any
    /// * `count` - Number of samples currently in the path
    /// * `now` - Evaluation time used for the staleness check
    pub fn evaluate(
        &self,
        candidate: &Sample,
        last: Option<&Sample>,
        count: usize,
        now: SystemTime,
    ) -> Verdict {
        // Timestamps in the future count as fresh
        let age = now
            .duration_since(candidate.timestamp())
            .unwrap_or(Duration::ZERO);
        if age >= self.max_sample_age {
            return Verdict::Stale;
        }

        if count <= self.bootstrap_samples {
            return Verdict::Accept;
        }

        match last {
            Some(last) if !self.moved_enough(candidate.distance_to(last)) => Verdict::TooClose,
            _ => Verdict::Accept,
        }
    }

    /// Convenience wrapper around [`AcceptanceFilter::evaluate`]
    #[inline]
    pub fn should_accept(
        &self,
        candidate: &Sample,
        last: Option<&Sample>,
        count: usize,
        now: SystemTime,
    ) -> bool {
        self.evaluate(candidate, last, count, now).is_accepted()
    }

    /// Whether a movement of `distance_meters` clears the threshold (strictly greater)
    #[inline]
    pub fn moved_enough(&self, distance_meters: f64) -> bool {
        distance_meters > self.min_movement_meters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::EARTH_RADIUS_M;

    fn sample_at(lat: f64, lon: f64, timestamp: SystemTime) -> Sample {
        Sample::new(lat, lon, timestamp, None).unwrap()
    }

    /// Latitude offset in degrees that moves `meters` north along a meridian
    fn north_offset(meters: f64) -> f64 {
        (meters / EARTH_RADIUS_M).to_degrees()
    }

    #[test]
    fn test_filter_defaults() {
        let filter = AcceptanceFilter::default();
        assert_eq!(filter.max_sample_age, Duration::from_secs(60));
        assert_eq!(filter.bootstrap_samples, 10);
        assert_eq!(filter.min_movement_meters, 10.0);
    }

    #[test]
    fn test_stale_samples_rejected_for_all_states() {
        let filter = AcceptanceFilter::default();
        let now = SystemTime::now();
        let old = sample_at(0.0, 0.0, now - Duration::from_secs(60));
        let far = sample_at(1.0, 1.0, now);

        for count in [0, 1, 10, 11, 500] {
            assert_eq!(filter.evaluate(&old, None, count, now), Verdict::Stale);
            assert_eq!(filter.evaluate(&old, Some(&far), count, now), Verdict::Stale);
        }
    }

    #[test]
    fn test_recent_sample_is_fresh() {
        let filter = AcceptanceFilter::default();
        let now = SystemTime::now();
        let recent = sample_at(0.0, 0.0, now - Duration::from_millis(59_999));
        assert!(filter.should_accept(&recent, None, 0, now));

        let future = sample_at(0.0, 0.0, now + Duration::from_secs(5));
        assert!(filter.should_accept(&future, None, 0, now));
    }

    #[test]
    fn test_bootstrap_accepts_regardless_of_distance() {
        let filter = AcceptanceFilter::default();
        let now = SystemTime::now();
        let last = sample_at(0.0, 0.0, now);
        let same_place = sample_at(0.0, 0.0, now);

        for count in 0..=10 {
            assert!(filter.should_accept(&same_place, Some(&last), count, now));
        }
        assert_eq!(
            filter.evaluate(&same_place, Some(&last), 11, now),
            Verdict::TooClose
        );
    }

    #[test]
    fn test_empty_path_accepts() {
        let filter = AcceptanceFilter::default();
        let now = SystemTime::now();
        assert!(filter.should_accept(&sample_at(0.0, 0.0, now), None, 0, now));
    }

    #[test]
    fn test_movement_threshold() {
        let filter = AcceptanceFilter::default();
        let now = SystemTime::now();
        let last = sample_at(0.0, 0.0, now);

        let near = sample_at(north_offset(9.9), 0.0, now);
        let just_over = sample_at(north_offset(10.0001), 0.0, now);
        assert_eq!(filter.evaluate(&near, Some(&last), 11, now), Verdict::TooClose);
        assert_eq!(filter.evaluate(&just_over, Some(&last), 11, now), Verdict::Accept);
    }

    #[test]
    fn test_threshold_is_strict() {
        let filter = AcceptanceFilter::default();
        assert!(!filter.moved_enough(10.0));
        assert!(filter.moved_enough(10.0001));
        assert!(!filter.moved_enough(0.0));
    }
}
