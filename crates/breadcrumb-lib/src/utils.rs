//! Utility functions for coordinate conversions and rectangle math

use geo::{Coord, Point, Rect};

/// Web Mercator bounds in meters (EPSG:3857)
pub const EARTH_MERCATOR_MAX: f64 = 20037508.34;
pub const EARTH_MERCATOR_MIN: f64 = -20037508.34;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_M: f64 = 6371000.0;

/// Precomputed constant: EARTH_MERCATOR_MAX / 180.0
const LON_TO_X_FACTOR: f64 = EARTH_MERCATOR_MAX / 180.0;

/// Precomputed constant: EARTH_MERCATOR_MAX / PI
const Y_FACTOR: f64 = EARTH_MERCATOR_MAX / std::f64::consts::PI;

/// Precomputed constant: 180.0 / EARTH_MERCATOR_MAX
const X_TO_LON_FACTOR: f64 = 180.0 / EARTH_MERCATOR_MAX;

/// Precomputed constant: PI / EARTH_MERCATOR_MAX
const Y_TO_LAT_FACTOR: f64 = std::f64::consts::PI / EARTH_MERCATOR_MAX;

/// Convert WGS84 (lat, lon) to Web Mercator (x, y) in meters
///
/// Latitude is clamped to the representable range and the result is clamped to
/// [`world_rect`], so every projected point lies inside the universe rectangle.
#[inline(always)]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Point<f64> {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);

    let x = lon * LON_TO_X_FACTOR;
    let lat_rad = lat.to_radians();
    let y = (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() * Y_FACTOR;

    Point::new(
        x.clamp(EARTH_MERCATOR_MIN, EARTH_MERCATOR_MAX),
        y.clamp(EARTH_MERCATOR_MIN, EARTH_MERCATOR_MAX),
    )
}

/// Convert Web Mercator (x, y) in meters to WGS84 (lat, lon)
#[inline(always)]
pub fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = x * X_TO_LON_FACTOR;
    let lat =
        (std::f64::consts::PI / 2.0 - 2.0 * ((-y * Y_TO_LAT_FACTOR).exp()).atan()).to_degrees();
    (lat, lon)
}

/// The universal bounding rectangle covering the whole projected world
#[inline]
pub fn world_rect() -> Rect<f64> {
    Rect::new(
        Coord {
            x: EARTH_MERCATOR_MIN,
            y: EARTH_MERCATOR_MIN,
        },
        Coord {
            x: EARTH_MERCATOR_MAX,
            y: EARTH_MERCATOR_MAX,
        },
    )
}

/// Number of map units covering one ground meter at the given latitude
///
/// Web Mercator stretches distances by `1 / cos(lat)` away from the equator.
#[inline]
pub fn map_units_per_meter(lat: f64) -> f64 {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    1.0 / lat.to_radians().cos()
}

/// Convert a ground distance in meters to map units at the given latitude
#[inline]
pub fn meters_to_map_units(meters: f64, lat: f64) -> f64 {
    meters * map_units_per_meter(lat)
}

/// Great-circle distance between two (lat, lon) pairs in meters (Haversine)
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Minimal rectangle enclosing two points (zero area when they coincide)
#[inline]
pub fn rect_from_points(a: Point<f64>, b: Point<f64>) -> Rect<f64> {
    Rect::new(a.0, b.0)
}

/// Whether `outer` fully contains `inner` (edges inclusive)
#[inline]
pub fn rect_contains(outer: &Rect<f64>, inner: &Rect<f64>) -> bool {
    outer.min().x <= inner.min().x
        && outer.min().y <= inner.min().y
        && outer.max().x >= inner.max().x
        && outer.max().y >= inner.max().y
}

/// Whether `rect` contains the point (edges inclusive)
#[inline]
pub fn rect_contains_point(rect: &Rect<f64>, point: Point<f64>) -> bool {
    point.x() >= rect.min().x
        && point.x() <= rect.max().x
        && point.y() >= rect.min().y
        && point.y() <= rect.max().y
}

/// Whether two rectangles overlap (edges inclusive, valid for zero-area rectangles)
#[inline]
pub fn rect_intersects(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x
        && a.max().x >= b.min().x
        && a.min().y <= b.max().y
        && a.max().y >= b.min().y
}

/// Smallest rectangle containing both rectangles
#[inline]
pub fn rect_union(a: &Rect<f64>, b: &Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

/// Overlap of two rectangles, or `None` when they are disjoint
#[inline]
pub fn rect_intersection(a: &Rect<f64>, b: &Rect<f64>) -> Option<Rect<f64>> {
    if !rect_intersects(a, b) {
        return None;
    }
    Some(Rect::new(
        Coord {
            x: a.min().x.max(b.min().x),
            y: a.min().y.max(b.min().y),
        },
        Coord {
            x: a.max().x.min(b.max().x),
            y: a.max().y.min(b.max().y),
        },
    ))
}

/// Grow a rectangle by `amount` on every edge
#[inline]
pub fn rect_outset(rect: &Rect<f64>, amount: f64) -> Rect<f64> {
    Rect::new(
        Coord {
            x: rect.min().x - amount,
            y: rect.min().y - amount,
        },
        Coord {
            x: rect.max().x + amount,
            y: rect.max().y + amount,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Rect<f64> {
        Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y })
    }

    #[test]
    fn test_wgs84_to_mercator_origin() {
        let point = wgs84_to_mercator(0.0, 0.0);
        assert!((point.x() - 0.0).abs() < 0.01);
        assert!((point.y() - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_wgs84_to_mercator_stays_in_world() {
        let world = world_rect();
        for (lat, lon) in [(90.0, 180.0), (-90.0, -180.0), (85.0511, 179.9999)] {
            let point = wgs84_to_mercator(lat, lon);
            assert!(rect_contains_point(&world, point), "{lat},{lon} -> {point:?}");
        }
    }

    #[test]
    fn test_mercator_to_wgs84_roundtrip() {
        let (lat, lon) = (51.5074, -0.1278);
        let mercator = wgs84_to_mercator(lat, lon);
        let (lat2, lon2) = mercator_to_wgs84(mercator.x(), mercator.y());

        assert!((lat - lat2).abs() < 0.0001);
        assert!((lon - lon2).abs() < 0.0001);
    }

    #[test]
    fn test_map_units_per_meter() {
        assert!((map_units_per_meter(0.0) - 1.0).abs() < 1e-12);
        // At 60 degrees the Mercator scale factor is 2
        assert!((map_units_per_meter(60.0) - 2.0).abs() < 1e-9);
        assert!((meters_to_map_units(1000.0, 60.0) - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_haversine_distance() {
        // 0.0001 degrees of longitude on the equator is about 11.1 meters
        let d = haversine_distance(0.0, 0.0, 0.0, 0.0001);
        assert!(d > 11.0 && d < 11.2, "{d}");
        assert_eq!(haversine_distance(10.0, 10.0, 10.0, 10.0), 0.0);
    }

    #[test]
    fn test_rect_predicates() {
        let outer = rect(0.0, 0.0, 10.0, 10.0);
        assert!(rect_contains(&outer, &rect(0.0, 0.0, 10.0, 10.0)));
        assert!(rect_contains(&outer, &rect(2.0, 2.0, 2.0, 2.0)));
        assert!(!rect_contains(&outer, &rect(-1.0, 2.0, 3.0, 3.0)));

        assert!(rect_intersects(&outer, &rect(10.0, 10.0, 12.0, 12.0)));
        assert!(rect_intersects(&outer, &rect(5.0, 5.0, 5.0, 5.0)));
        assert!(!rect_intersects(&outer, &rect(10.1, 0.0, 12.0, 1.0)));
    }

    #[test]
    fn test_rect_union_intersection_outset() {
        let a = rect(0.0, 0.0, 4.0, 4.0);
        let b = rect(2.0, -1.0, 6.0, 3.0);
        assert_eq!(rect_union(&a, &b), rect(0.0, -1.0, 6.0, 4.0));
        assert_eq!(rect_intersection(&a, &b), Some(rect(2.0, 0.0, 4.0, 3.0)));
        assert_eq!(rect_intersection(&a, &rect(5.0, 5.0, 6.0, 6.0)), None);
        assert_eq!(rect_outset(&a, 1.0), rect(-1.0, -1.0, 5.0, 5.0));
    }
}
