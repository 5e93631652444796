//! Overlay conformance for map display surfaces

use crate::{BreadcrumbPath, utils};
use geo::Rect;

/// A drawable map overlay with a fixed advertised region and mutable real bounds
///
/// Display surfaces should cull against [`Overlay::universe_bounds`], which never
/// changes for the lifetime of the overlay. [`Overlay::current_bounds`] is the tighter
/// region actually covered right now and may grow at any time.
pub trait Overlay: Send + Sync {
    /// Static region advertised to the display for visibility culling
    fn universe_bounds(&self) -> Rect<f64> {
        utils::world_rect()
    }

    /// Region currently covered by the overlay content
    fn current_bounds(&self) -> Rect<f64>;

    /// Whether anything may need drawing inside `query`
    fn can_draw(&self, query: &Rect<f64>) -> bool {
        utils::rect_intersects(&self.current_bounds(), query)
    }
}

impl Overlay for BreadcrumbPath {
    fn current_bounds(&self) -> Rect<f64> {
        self.snapshot_bounds()
    }
}
