//! BreadcrumbPath - Lock-protected, append-only breadcrumb path
//!
//! One writer appends samples while any number of readers take snapshots. A single
//! mutex covers the whole aggregate (samples, bounds, cached stats), so an append and
//! its bounds update are observed together or not at all.
//!
//! Samples live behind an `Arc<Vec<_>>` that is cloned on write: readers copy out the
//! `Arc` under the lock and iterate it afterwards without holding anything, and an
//! append only copies the vector when some reader still holds an older snapshot.

use crate::{AcceptanceFilter, BoundsPolicy, Sample, Verdict, utils};
use geo::Rect;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

/// Result of offering a sample to the path
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AppendOutcome {
    /// Whether the sample was appended
    pub added: bool,
    /// Whether the bounds rectangle changed as a result
    pub bounds_changed: bool,
    /// Rectangle enclosing the previous and new projected points (when added)
    pub changed_region: Option<Rect<f64>>,
}

/// Consistent point-in-time view of the path
#[derive(Debug, Clone)]
pub struct PathSnapshot {
    pub samples: Arc<Vec<Sample>>,
    pub bounds: Rect<f64>,
}

/// Information about the path
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathInfo {
    /// Number of accepted samples
    pub sample_count: usize,
    /// Length of the path in meters
    pub total_distance_meters: f64,
    /// Current bounds in Web Mercator meters
    pub bounds: Rect<f64>,
    /// Bounds as `(min_lat, min_lon, max_lat, max_lon)`, `None` while the path is empty
    pub bounding_box_wgs84: Option<(f64, f64, f64, f64)>,
}

/// The protected aggregate
#[derive(Debug)]
struct PathState {
    samples: Arc<Vec<Sample>>,
    bounds: Rect<f64>,
    /// Updated incrementally on every append
    total_distance_meters: f64,
}

impl PathState {
    fn new() -> Self {
        Self {
            samples: Arc::new(Vec::new()),
            bounds: utils::world_rect(),
            total_distance_meters: 0.0,
        }
    }

    fn bounding_box_wgs84(&self) -> Option<(f64, f64, f64, f64)> {
        if self.samples.is_empty() {
            return None;
        }
        let (min, max) = (self.bounds.min(), self.bounds.max());
        let (min_lat, min_lon) = utils::mercator_to_wgs84(min.x, min.y);
        let (max_lat, max_lon) = utils::mercator_to_wgs84(max.x, max.y);
        Some((min_lat, min_lon, max_lat, max_lon))
    }
}

/// Append-only breadcrumb path shared between one writer and many readers
#[derive(Debug)]
pub struct BreadcrumbPath {
    state: Mutex<PathState>,
    filter: AcceptanceFilter,
    bounds_policy: BoundsPolicy,
}

impl Default for BreadcrumbPath {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl BreadcrumbPath {
    /// Create an empty path with the default filter and bounds policy
    pub fn new() -> Self {
        Self::with_policies(AcceptanceFilter::default(), BoundsPolicy::default())
    }

    /// Create an empty path with explicit policies
    pub fn with_policies(filter: AcceptanceFilter, bounds_policy: BoundsPolicy) -> Self {
        Self {
            state: Mutex::new(PathState::new()),
            filter,
            bounds_policy,
        }
    }

    /// Offer a sample, evaluating staleness against the current wall clock
    pub fn append(&self, candidate: Sample) -> AppendOutcome {
        self.append_at(candidate, SystemTime::now())
    }

    /// Offer a sample, evaluating staleness against `now`
    ///
    /// Filter evaluation, the push and the bounds update happen under one lock hold.
    pub fn append_at(&self, candidate: Sample, now: SystemTime) -> AppendOutcome {
        let mut state = self.lock();

        let previous = state.samples.last().copied();
        let verdict =
            self.filter
                .evaluate(&candidate, previous.as_ref(), state.samples.len(), now);
        if verdict != Verdict::Accept {
            tracing::trace!(?verdict, "Sample rejected");
            return AppendOutcome::default();
        }

        // The first sample acts as its own predecessor
        let previous = previous.unwrap_or(candidate);
        let is_first = state.samples.is_empty();

        Arc::make_mut(&mut state.samples).push(candidate);
        state.total_distance_meters += previous.distance_to(&candidate);

        let mut bounds_changed = false;
        if is_first {
            state.bounds = self.bounds_policy.initial_bounds(&candidate);
            bounds_changed = true;
        }
        if let Some(grown) = self
            .bounds_policy
            .grow_bounds(&state.bounds, &previous, &candidate)
        {
            state.bounds = grown;
            bounds_changed = true;
        }

        if bounds_changed {
            tracing::debug!(
                samples = state.samples.len(),
                width = state.bounds.width(),
                height = state.bounds.height(),
                "Path bounds grew"
            );
        }

        AppendOutcome {
            added: true,
            bounds_changed,
            changed_region: Some(utils::rect_from_points(
                previous.projected(),
                candidate.projected(),
            )),
        }
    }

    /// Current bounds in Web Mercator meters
    pub fn snapshot_bounds(&self) -> Rect<f64> {
        self.lock().bounds
    }

    /// Current ordered samples; the returned view never changes
    pub fn snapshot_samples(&self) -> Arc<Vec<Sample>> {
        self.lock().samples.clone()
    }

    /// Samples and bounds taken under a single lock hold
    pub fn snapshot(&self) -> PathSnapshot {
        let state = self.lock();
        PathSnapshot {
            samples: state.samples.clone(),
            bounds: state.bounds,
        }
    }

    /// Number of accepted samples
    #[inline]
    pub fn len(&self) -> usize {
        self.lock().samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recently accepted sample
    pub fn last_sample(&self) -> Option<Sample> {
        self.lock().samples.last().copied()
    }

    /// The first accepted sample, fixed for the lifetime of the path
    pub fn anchor(&self) -> Option<Sample> {
        self.lock().samples.first().copied()
    }

    /// Get path information
    pub fn info(&self) -> PathInfo {
        let state = self.lock();
        PathInfo {
            sample_count: state.samples.len(),
            total_distance_meters: state.total_distance_meters,
            bounds: state.bounds,
            bounding_box_wgs84: state.bounding_box_wgs84(),
        }
    }

    /// Get the bounds in WGS84 coordinates (lat/lon)
    ///
    /// Returns `None` while the path is empty (the bounds are still the world sentinel).
    /// Returns `Some((min_lat, min_lon, max_lat, max_lon))` otherwise.
    pub fn bounding_box_wgs84(&self) -> Option<(f64, f64, f64, f64)> {
        self.lock().bounding_box_wgs84()
    }

    /// The filter used by this path
    #[inline]
    pub fn filter(&self) -> &AcceptanceFilter {
        &self.filter
    }

    /// Acquire the state lock; a panicking holder cannot leave the state torn, so
    /// poisoning is ignored.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, PathState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
