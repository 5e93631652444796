//! Breadcrumb Library - Live Path Recording Core
//!
//! This library records a live stream of position samples into a growing breadcrumb
//! path and answers zoom-aware rendering queries against it while new samples keep
//! arriving. A single writer appends; any number of rendering passes read concurrently.
//!
//! # Architecture
//!
//! - **[`Sample`]**: Immutable, validated position sample
//! - **[`AcceptanceFilter`]**: Stale and no-movement sample rejection
//! - **[`BoundsPolicy`]**: Incremental padded growth of the path bounds
//! - **[`BreadcrumbPath`]**: Lock-protected append-only path with copy-out snapshots
//! - **[`PathRenderer`]**: Level-of-detail draw path queries for a viewport and zoom
//! - **[`RecordingSession`]**: Consumes location events and emits display changes
//!
//! # Coordinates
//!
//! All planar math happens in Web Mercator meters (EPSG:3857). The bounding rectangle,
//! query rectangles and draw commands all use that unit; zoom scales are expressed in
//! screen pixels per map unit.

mod bounds;
mod filter;
mod overlay;
mod renderer;
mod sample;
mod session;
mod simplify;
mod store;
pub mod utils;

// Public API exports
pub use bounds::BoundsPolicy;
pub use filter::{AcceptanceFilter, Verdict};
pub use overlay::Overlay;
pub use renderer::{PathRenderer, RenderConfig, tile_grid};
pub use sample::{LocationFix, Sample};
pub use session::{
    AccuracyTier, ActivityType, LocationEvent, PathChange, RecordingSession, SessionConfig,
    SessionStats, SessionStatus, SessionUpdate,
};
pub use simplify::{DrawCommand, DrawPath, simplify_for_display};
pub use store::{AppendOutcome, BreadcrumbPath, PathInfo, PathSnapshot};

/// Error types for the breadcrumb core
#[derive(Debug, thiserror::Error)]
pub enum BreadcrumbError {
    #[error("Invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("Invalid value for {name}: {value}")]
    InvalidSetting { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, BreadcrumbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_reaches_path() {
        let filter = AcceptanceFilter {
            min_movement_meters: 25.0,
            ..Default::default()
        };
        let session = RecordingSession::new(SessionConfig {
            filter,
            ..Default::default()
        });

        assert_eq!(*session.path().filter(), filter);
        assert!(session.path().is_empty());
        assert_eq!(session.status(), SessionStatus::Recording);
    }

    #[test]
    fn test_error_messages() {
        let err = BreadcrumbError::InvalidCoordinate {
            lat: f64::NAN,
            lon: 0.0,
        };
        assert!(err.to_string().starts_with("Invalid coordinate"));

        let err = BreadcrumbError::InvalidSetting {
            name: "accuracy",
            value: "bogus".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for accuracy: bogus");
    }
}
