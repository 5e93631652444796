//! Position samples and the validation boundary for raw location fixes
//!
//! A [`Sample`] can only be built from a well-formed coordinate. Raw data arriving from
//! the location service is carried as a [`LocationFix`] and converted at the boundary,
//! so malformed input is rejected before it can reach the path store.

use crate::{BreadcrumbError, Result, utils};
use geo::Point;
use std::time::SystemTime;

/// A raw location fix as delivered by the sensing service
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocationFix {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Time the fix was taken
    pub timestamp: SystemTime,
    /// Horizontal accuracy radius in meters, if the service reported one
    pub horizontal_accuracy: Option<f64>,
}

/// A validated, immutable position sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// WGS84 coordinate (x = longitude, y = latitude)
    coordinate: Point<f64>,
    timestamp: SystemTime,
    horizontal_accuracy: Option<f64>,
}

impl Sample {
    /// Create a new sample
    ///
    /// # Errors
    /// Returns [`BreadcrumbError::InvalidCoordinate`] when either component is not finite
    /// or lies outside the WGS84 range. Accuracy values that are not finite or are
    /// negative are treated as unknown.
    pub fn new(
        latitude: f64,
        longitude: f64,
        timestamp: SystemTime,
        horizontal_accuracy: Option<f64>,
    ) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(BreadcrumbError::InvalidCoordinate {
                lat: latitude,
                lon: longitude,
            });
        }

        Ok(Self {
            coordinate: Point::new(longitude, latitude),
            timestamp,
            horizontal_accuracy: horizontal_accuracy.filter(|a| a.is_finite() && *a >= 0.0),
        })
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.coordinate.y()
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.coordinate.x()
    }

    /// WGS84 coordinate as a point (x = longitude, y = latitude)
    #[inline]
    pub fn coordinate(&self) -> Point<f64> {
        self.coordinate
    }

    #[inline]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    #[inline]
    pub fn horizontal_accuracy(&self) -> Option<f64> {
        self.horizontal_accuracy
    }

    /// Projected planar point in Web Mercator meters
    #[inline]
    pub fn projected(&self) -> Point<f64> {
        utils::wgs84_to_mercator(self.latitude(), self.longitude())
    }

    /// Great-circle distance to another sample in meters
    #[inline]
    pub fn distance_to(&self, other: &Sample) -> f64 {
        utils::haversine_distance(
            self.latitude(),
            self.longitude(),
            other.latitude(),
            other.longitude(),
        )
    }
}

impl TryFrom<LocationFix> for Sample {
    type Error = BreadcrumbError;

    fn try_from(fix: LocationFix) -> Result<Self> {
        Sample::new(
            fix.latitude,
            fix.longitude,
            fix.timestamp,
            fix.horizontal_accuracy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_creation() {
        let now = SystemTime::now();
        let sample = Sample::new(51.5074, -0.1278, now, Some(5.0)).unwrap();

        assert_eq!(sample.latitude(), 51.5074);
        assert_eq!(sample.longitude(), -0.1278);
        assert_eq!(sample.timestamp(), now);
        assert_eq!(sample.horizontal_accuracy(), Some(5.0));
    }

    #[test]
    fn test_malformed_coordinates_rejected() {
        let now = SystemTime::now();
        assert!(Sample::new(f64::NAN, 0.0, now, None).is_err());
        assert!(Sample::new(0.0, f64::INFINITY, now, None).is_err());
        assert!(Sample::new(90.5, 0.0, now, None).is_err());
        assert!(Sample::new(0.0, -180.5, now, None).is_err());
        assert!(Sample::new(-90.0, 180.0, now, None).is_ok());
    }

    #[test]
    fn test_bad_accuracy_is_unknown() {
        let now = SystemTime::now();
        let sample = Sample::new(0.0, 0.0, now, Some(-1.0)).unwrap();
        assert_eq!(sample.horizontal_accuracy(), None);

        let sample = Sample::new(0.0, 0.0, now, Some(f64::NAN)).unwrap();
        assert_eq!(sample.horizontal_accuracy(), None);
    }

    #[test]
    fn test_projected_matches_utils() {
        let sample = Sample::new(45.0, -90.0, SystemTime::now(), None).unwrap();
        let expected = utils::wgs84_to_mercator(45.0, -90.0);
        assert_eq!(sample.projected(), expected);
    }

    #[test]
    fn test_distance_to() {
        let now = SystemTime::now();
        let a = Sample::new(0.0, 0.0, now, None).unwrap();
        let b = Sample::new(0.0, 0.0001, now, None).unwrap();
        let d = a.distance_to(&b);
        assert!(d > 11.0 && d < 11.2, "{d}");
        assert!((d - b.distance_to(&a)).abs() < 1e-9);
    }

    #[test]
    fn test_try_from_fix() {
        let fix = LocationFix {
            latitude: 10.0,
            longitude: 20.0,
            timestamp: SystemTime::now(),
            horizontal_accuracy: None,
        };
        let sample = Sample::try_from(fix).unwrap();
        assert_eq!(sample.latitude(), 10.0);

        let bad = LocationFix {
            latitude: f64::NAN,
            ..fix
        };
        assert!(Sample::try_from(bad).is_err());
    }
}
