//! RecordingSession - Turns location events into path updates and display changes
//!
//! The session is the single writer of its path. It consumes events from the location
//! service, validates every fix at the boundary, appends the survivors and reports what
//! the display has to do: redraw a small region, or rebuild everything that depends on
//! the path bounds.

use crate::{
    AcceptanceFilter, BoundsPolicy, BreadcrumbError, BreadcrumbPath, LocationFix, PathRenderer,
    RenderConfig, Result, Sample,
};
use geo::Rect;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Desired accuracy requested from the location service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AccuracyTier {
    #[default]
    Best,
    BestForNavigation,
    TenMeters,
    HundredMeters,
    Kilometer,
    ThreeKilometers,
}

impl AccuracyTier {
    /// Nominal accuracy radius in meters (0 for the "best" tiers)
    pub fn nominal_meters(self) -> f64 {
        match self {
            AccuracyTier::Best | AccuracyTier::BestForNavigation => 0.0,
            AccuracyTier::TenMeters => 10.0,
            AccuracyTier::HundredMeters => 100.0,
            AccuracyTier::Kilometer => 1000.0,
            AccuracyTier::ThreeKilometers => 3000.0,
        }
    }
}

impl fmt::Display for AccuracyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccuracyTier::Best => "best",
            AccuracyTier::BestForNavigation => "navigation",
            AccuracyTier::TenMeters => "10m",
            AccuracyTier::HundredMeters => "100m",
            AccuracyTier::Kilometer => "1km",
            AccuracyTier::ThreeKilometers => "3km",
        };
        f.write_str(name)
    }
}

impl FromStr for AccuracyTier {
    type Err = BreadcrumbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "best" => Ok(AccuracyTier::Best),
            "navigation" | "best-for-navigation" => Ok(AccuracyTier::BestForNavigation),
            "10m" => Ok(AccuracyTier::TenMeters),
            "100m" => Ok(AccuracyTier::HundredMeters),
            "1km" => Ok(AccuracyTier::Kilometer),
            "3km" => Ok(AccuracyTier::ThreeKilometers),
            _ => Err(BreadcrumbError::InvalidSetting {
                name: "accuracy",
                value: s.to_string(),
            }),
        }
    }
}

/// Kind of movement hinted to the location service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActivityType {
    #[default]
    Other,
    Automotive,
    Fitness,
    OtherNavigation,
    Airborne,
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityType::Other => "other",
            ActivityType::Automotive => "automotive",
            ActivityType::Fitness => "fitness",
            ActivityType::OtherNavigation => "navigation",
            ActivityType::Airborne => "airborne",
        };
        f.write_str(name)
    }
}

impl FromStr for ActivityType {
    type Err = BreadcrumbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "other" => Ok(ActivityType::Other),
            "automotive" => Ok(ActivityType::Automotive),
            "fitness" => Ok(ActivityType::Fitness),
            "navigation" => Ok(ActivityType::OtherNavigation),
            "airborne" => Ok(ActivityType::Airborne),
            _ => Err(BreadcrumbError::InvalidSetting {
                name: "activity",
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration read once when a session starts
///
/// Accuracy and activity are hints for the location service only; they do not change
/// how samples are filtered.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionConfig {
    pub accuracy: AccuracyTier,
    pub activity: ActivityType,
    /// Ask the display to play a chime whenever the path grows
    pub chime_on_update: bool,
    /// Report bounds changes for a bounds overlay
    pub show_bounds_overlay: bool,
    pub render: RenderConfig,
    pub filter: AcceptanceFilter,
    pub bounds: BoundsPolicy,
}

/// Events delivered by the location service
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    /// Zero or more new fixes, oldest first
    Updates(Vec<LocationFix>),
    /// The user refused location access
    AuthorizationDenied,
    /// The service failed (hardware error, lost signal, ...)
    Failure(String),
    /// The service is delivering fixes again
    Resumed,
}

/// Whether the session is currently taking fixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Recording,
    AuthorizationDenied,
    Suspended,
}

/// What the display has to do after an event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathChange {
    /// A point was added inside the existing bounds; redraw this region
    PointAdded { region: Rect<f64> },
    /// The bounds grew; everything depending on them must be rebuilt
    BoundsChanged { bounds: Rect<f64> },
}

/// Result of handling one location event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionUpdate {
    pub changes: Vec<PathChange>,
    /// At least one sample was added and chimes are enabled
    pub chime: bool,
    /// New bounds for the bounds overlay, when it is enabled and the bounds changed
    pub bounds_overlay: Option<Rect<f64>>,
}

impl SessionUpdate {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Counters for the current recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionStats {
    /// Fixes received from the location service
    pub received: usize,
    /// Samples appended to the path
    pub accepted: usize,
    /// Valid samples dropped by the acceptance filter
    pub filtered: usize,
    /// Fixes rejected as malformed before reaching the path
    pub malformed: usize,
    /// Number of times the bounds grew
    pub bounds_changes: usize,
}

/// A single recording, owning the writer side of its path
#[derive(Debug)]
pub struct RecordingSession {
    config: SessionConfig,
    path: Arc<BreadcrumbPath>,
    status: SessionStatus,
    stats: SessionStats,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RecordingSession {
    /// Start a new recording with an empty path
    pub fn new(config: SessionConfig) -> Self {
        tracing::info!(
            accuracy = %config.accuracy,
            activity = %config.activity,
            "Starting recording session"
        );
        Self {
            path: Self::new_path(&config),
            config,
            status: SessionStatus::Recording,
            stats: SessionStats::default(),
        }
    }

    fn new_path(config: &SessionConfig) -> Arc<BreadcrumbPath> {
        Arc::new(BreadcrumbPath::with_policies(config.filter, config.bounds))
    }

    /// Shared handle to the path being recorded
    #[inline]
    pub fn path(&self) -> Arc<BreadcrumbPath> {
        self.path.clone()
    }

    /// Renderer over the current path using the session render settings
    pub fn renderer(&self) -> PathRenderer {
        PathRenderer::new(self.path.clone(), self.config.render)
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[inline]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Handle one event from the location service
    pub fn handle_event(&mut self, event: LocationEvent) -> SessionUpdate {
        match event {
            LocationEvent::Updates(fixes) => self.handle_fixes(fixes),
            LocationEvent::AuthorizationDenied => {
                tracing::warn!("Location access denied; recording paused");
                self.status = SessionStatus::AuthorizationDenied;
                SessionUpdate::default()
            }
            LocationEvent::Failure(reason) => {
                tracing::warn!(%reason, "Location service failed; recording suspended");
                self.status = SessionStatus::Suspended;
                SessionUpdate::default()
            }
            LocationEvent::Resumed => {
                if self.status != SessionStatus::Recording {
                    tracing::info!("Location service resumed");
                }
                self.status = SessionStatus::Recording;
                SessionUpdate::default()
            }
        }
    }

    fn handle_fixes(&mut self, fixes: Vec<LocationFix>) -> SessionUpdate {
        let mut update = SessionUpdate::default();
        if self.status != SessionStatus::Recording {
            tracing::debug!(
                count = fixes.len(),
                status = ?self.status,
                "Ignoring fixes while not recording"
            );
            return update;
        }

        for fix in fixes {
            self.stats.received += 1;
            let sample = match Sample::try_from(fix) {
                Ok(sample) => sample,
                Err(e) => {
                    tracing::warn!("Dropping malformed fix: {}", e);
                    self.stats.malformed += 1;
                    continue;
                }
            };

            let outcome = self.path.append(sample);
            if !outcome.added {
                self.stats.filtered += 1;
                continue;
            }
            self.stats.accepted += 1;

            if outcome.bounds_changed {
                self.stats.bounds_changes += 1;
                let bounds = self.path.snapshot_bounds();
                update.changes.push(PathChange::BoundsChanged { bounds });
                if self.config.show_bounds_overlay {
                    update.bounds_overlay = Some(bounds);
                }
            } else if let Some(region) = outcome.changed_region {
                update.changes.push(PathChange::PointAdded { region });
            }
        }

        update.chime = self.config.chime_on_update && !update.changes.is_empty();
        update
    }

    /// Replace the path with a new, empty one
    ///
    /// Renderers created before the restart keep drawing the old path; callers swap
    /// them for [`RecordingSession::renderer`] of the new one.
    pub fn restart(&mut self) -> Arc<BreadcrumbPath> {
        tracing::info!(
            previous_samples = self.path.len(),
            "Restarting recording session"
        );
        self.path = Self::new_path(&self.config);
        self.stats = SessionStats::default();
        self.status = SessionStatus::Recording;
        self.path.clone()
    }
}
