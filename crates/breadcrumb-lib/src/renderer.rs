//! PathRenderer - Zoom-aware draw path queries against a live breadcrumb path
//!
//! Every query works on its own snapshot, so any number of rendering passes (for
//! example one per map tile) can run in parallel while the writer keeps appending.

use crate::{BreadcrumbPath, DrawPath, Overlay, Sample, simplify_for_display, utils};
use geo::{Coord, Point, Rect};
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for rendering queries
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RenderConfig {
    /// Stroke width in screen pixels
    pub line_width_px: f64,
    /// On-screen distance below which consecutive points are merged
    pub min_point_delta_px: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            line_width_px: 5.0,
            min_point_delta_px: 5.0,
        }
    }
}

impl RenderConfig {
    /// Stroke width in map units at the given zoom scale (pixels per map unit)
    ///
    /// Zooming out makes the stroke cover more of the map.
    #[inline]
    pub fn line_width_at_zoom(&self, zoom_scale: f64) -> f64 {
        self.line_width_px / zoom_scale
    }
}

/// Read-only rendering view over a shared breadcrumb path
#[derive(Debug, Clone)]
pub struct PathRenderer {
    path: Arc<BreadcrumbPath>,
    config: RenderConfig,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PathRenderer {
    pub fn new(path: Arc<BreadcrumbPath>, config: RenderConfig) -> Self {
        Self { path, config }
    }

    #[inline]
    pub fn path(&self) -> &Arc<BreadcrumbPath> {
        &self.path
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Cheap pre-check: whether the current bounds intersect `query`
    #[inline]
    pub fn can_draw(&self, query: &Rect<f64>) -> bool {
        self.path.can_draw(query)
    }

    /// Build the draw path for one viewport at one zoom scale
    ///
    /// The query rectangle is outset by the stroke width so strokes are not clipped at
    /// the edge. Paths with fewer than two samples produce an empty result.
    pub fn build_draw_path(&self, query: &Rect<f64>, zoom_scale: f64) -> DrawPath {
        let samples = self.path.snapshot_samples();
        let points = project(&samples);
        self.draw_projected(&points, query, zoom_scale)
    }

    /// Render several tiles in parallel at the same zoom scale
    ///
    /// All tiles are drawn from one snapshot projected once, so a frame never mixes
    /// path versions. Tiles outside the snapshot bounds are answered with an empty path
    /// without simplifying. Results are in the same order as `tiles`.
    pub fn render_tiles(&self, tiles: &[Rect<f64>], zoom_scale: f64) -> Vec<DrawPath> {
        let snapshot = self.path.snapshot();
        let points = project(&snapshot.samples);

        tiles
            .par_iter()
            .map(|tile| {
                if utils::rect_intersects(&snapshot.bounds, tile) {
                    self.draw_projected(&points, tile, zoom_scale)
                } else {
                    DrawPath::default()
                }
            })
            .collect()
    }

    fn draw_projected(
        &self,
        points: &[Point<f64>],
        query: &Rect<f64>,
        zoom_scale: f64,
    ) -> DrawPath {
        if points.len() < 2 || !zoom_scale.is_finite() || zoom_scale <= 0.0 {
            return DrawPath::default();
        }

        let clip = utils::rect_outset(query, self.config.line_width_at_zoom(zoom_scale));
        simplify_for_display(points, &clip, zoom_scale, self.config.min_point_delta_px)
    }

    /// Screen region to invalidate after a point was added without a bounds change
    pub fn redraw_region(&self, changed_region: &Rect<f64>, zoom_scale: f64) -> Rect<f64> {
        utils::rect_outset(changed_region, self.config.line_width_at_zoom(zoom_scale))
    }
}

fn project(samples: &[Sample]) -> Vec<Point<f64>> {
    samples.iter().map(Sample::projected).collect()
}

/// Split `rect` into a `columns` x `rows` grid of equally sized tiles
///
/// Tiles are listed row by row starting at the minimum corner. A zero count yields no tiles.
pub fn tile_grid(rect: &Rect<f64>, columns: usize, rows: usize) -> Vec<Rect<f64>> {
    if columns == 0 || rows == 0 {
        return Vec::new();
    }

    let tile_width = rect.width() / columns as f64;
    let tile_height = rect.height() / rows as f64;
    let min = rect.min();

    let mut tiles = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        for column in 0..columns {
            let x0 = min.x + tile_width * column as f64;
            let y0 = min.y + tile_height * row as f64;
            // Snap the last row/column to the exact edge to avoid gaps from rounding
            let x1 = if column + 1 == columns {
                rect.max().x
            } else {
                x0 + tile_width
            };
            let y1 = if row + 1 == rows {
                rect.max().y
            } else {
                y0 + tile_height
            };
            tiles.push(Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 }));
        }
    }
    tiles
}
