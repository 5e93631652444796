//! Incremental growth of the path bounding rectangle
//!
//! The bounds only change in padded steps so that dependent overlays are not rebuilt
//! on every new point. Growth is per edge: only the edges overrun by the newest segment
//! move, each by the padding distance, and the result never leaves the world rectangle.

use crate::{Sample, utils};
use geo::{Coord, Rect};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sizes used when creating and growing the path bounds
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundsPolicy {
    /// Edge length in meters of the square placed around the first sample
    pub initial_edge_meters: f64,
    /// Extra distance in meters added to each overrun edge
    pub padding_meters: f64,
}

impl Default for BoundsPolicy {
    fn default() -> Self {
        Self {
            initial_edge_meters: 1000.0,
            padding_meters: 1000.0,
        }
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl BoundsPolicy {
    /// Square region centred on the first sample, clamped to the world
    pub fn initial_bounds(&self, first: &Sample) -> Rect<f64> {
        let center = first.projected();
        let half = utils::meters_to_map_units(self.initial_edge_meters, first.latitude()) / 2.0;
        let square = Rect::new(
            Coord {
                x: center.x() - half,
                y: center.y() - half,
            },
            Coord {
                x: center.x() + half,
                y: center.y() + half,
            },
        );
        clamp_to_world(&square)
    }

    /// Grow `bounds` so it covers the segment from `previous` to `new`
    ///
    /// Returns `None` when the segment is already covered. Otherwise returns the new
    /// bounds: the union with the segment, padded on each overrun edge only.
    pub fn grow_bounds(
        &self,
        bounds: &Rect<f64>,
        previous: &Sample,
        new: &Sample,
    ) -> Option<Rect<f64>> {
        let segment = utils::rect_from_points(previous.projected(), new.projected());
        if utils::rect_contains(bounds, &segment) {
            return None;
        }

        let padding = utils::meters_to_map_units(self.padding_meters, new.latitude());
        let union = utils::rect_union(bounds, &segment);
        let mut min = union.min();
        let mut max = union.max();

        if segment.min().y < bounds.min().y {
            min.y -= padding;
        }
        if segment.max().y > bounds.max().y {
            max.y += padding;
        }
        if segment.min().x < bounds.min().x {
            min.x -= padding;
        }
        if segment.max().x > bounds.max().x {
            max.x += padding;
        }

        Some(clamp_to_world(&Rect::new(min, max)))
    }
}

/// Clamp a rectangle to the world; rectangles always overlap it once projected
fn clamp_to_world(rect: &Rect<f64>) -> Rect<f64> {
    let world = utils::world_rect();
    utils::rect_intersection(rect, &world).unwrap_or(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn sample_at(lat: f64, lon: f64) -> Sample {
        Sample::new(lat, lon, SystemTime::now(), None).unwrap()
    }

    #[test]
    fn test_initial_bounds_centered_square() {
        let policy = BoundsPolicy::default();
        let first = sample_at(0.0, 0.0);
        let bounds = policy.initial_bounds(&first);

        assert!((bounds.width() - 1000.0).abs() < 1e-6);
        assert!((bounds.height() - 1000.0).abs() < 1e-6);
        assert!(bounds.center().x.abs() < 1e-6);
        assert!(bounds.center().y.abs() < 1e-6);
    }

    #[test]
    fn test_initial_bounds_scale_with_latitude() {
        let policy = BoundsPolicy::default();
        let bounds = policy.initial_bounds(&sample_at(60.0, 10.0));
        // Mercator stretches 1 km to 2 km of map units at 60 degrees
        assert!((bounds.width() - 2000.0).abs() < 1e-3);
        assert!(utils::rect_contains_point(
            &bounds,
            sample_at(60.0, 10.0).projected()
        ));
    }

    #[test]
    fn test_initial_bounds_clamped_to_world() {
        let policy = BoundsPolicy::default();
        let bounds = policy.initial_bounds(&sample_at(0.0, 180.0));
        assert_eq!(bounds.max().x, utils::EARTH_MERCATOR_MAX);
        assert!(utils::rect_contains(&utils::world_rect(), &bounds));
    }

    #[test]
    fn test_contained_segment_does_not_grow() {
        let policy = BoundsPolicy::default();
        let first = sample_at(0.0, 0.0);
        let bounds = policy.initial_bounds(&first);

        assert_eq!(policy.grow_bounds(&bounds, &first, &first), None);
        let nearby = sample_at(0.001, 0.001); // ~110 m away, inside the 1 km square
        assert_eq!(policy.grow_bounds(&bounds, &first, &nearby), None);
    }

    #[test]
    fn test_growth_pads_only_overrun_edges() {
        let policy = BoundsPolicy::default();
        let first = sample_at(0.0, 0.0);
        let bounds = policy.initial_bounds(&first);

        // ~2 km east of the anchor: only the east edge is overrun
        let east = sample_at(0.0, 0.018);
        let grown = policy.grow_bounds(&bounds, &first, &east).unwrap();

        assert_eq!(grown.min().x, bounds.min().x);
        assert_eq!(grown.min().y, bounds.min().y);
        assert_eq!(grown.max().y, bounds.max().y);
        let expected_max_x = east.projected().x() + 1000.0;
        assert!((grown.max().x - expected_max_x).abs() < 1e-6);
    }

    #[test]
    fn test_growth_on_two_edges() {
        let policy = BoundsPolicy::default();
        let first = sample_at(0.0, 0.0);
        let bounds = policy.initial_bounds(&first);

        // South-west, beyond two edges
        let south_west = sample_at(-0.02, -0.02);
        let grown = policy.grow_bounds(&bounds, &first, &south_west).unwrap();

        assert!(grown.min().x < south_west.projected().x());
        assert!(grown.min().y < south_west.projected().y());
        assert_eq!(grown.max().x, bounds.max().x);
        assert_eq!(grown.max().y, bounds.max().y);
    }

    #[test]
    fn test_growth_clamped_to_world() {
        let policy = BoundsPolicy::default();
        let first = sample_at(0.0, 179.99);
        let bounds = policy.initial_bounds(&first);
        let edge = sample_at(0.0, 180.0);
        let grown = policy
            .grow_bounds(&bounds, &first, &edge)
            .unwrap_or(bounds);
        assert!(utils::rect_contains(&utils::world_rect(), &grown));
        assert!(utils::rect_contains_point(&grown, edge.projected()));
    }
}
