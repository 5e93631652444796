//! Screen-space line simplification for drawing the breadcrumb path
//!
//! The fastest way to draw a long path is to elide points that are too close together
//! on screen and to omit segments that cannot be visible. Decimation here is greedy:
//! each point is compared with the last *emitted* anchor, not with its raw predecessor,
//! so merged points never drift more than one threshold from a retained segment.
//! The final pair is always evaluated so the live end of the path is never dropped.

use crate::utils;
use geo::{Coord, Point, Rect};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single drawing instruction in map units
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DrawCommand {
    /// Lift the pen and start a new disconnected sub-path here
    MoveTo(Coord<f64>),
    /// Continue the current sub-path to here
    LineTo(Coord<f64>),
}

impl DrawCommand {
    #[inline]
    pub fn coord(&self) -> Coord<f64> {
        match *self {
            DrawCommand::MoveTo(c) | DrawCommand::LineTo(c) => c,
        }
    }
}

/// Sequence of drawing instructions produced for one viewport and zoom
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DrawPath {
    commands: Vec<DrawCommand>,
}

impl DrawPath {
    #[inline]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Empty means there is nothing to draw
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Number of drawn line segments
    pub fn segment_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::LineTo(_)))
            .count()
    }

    /// Split into connected sub-paths, each starting with a `MoveTo`
    pub fn subpaths(&self) -> Vec<&[DrawCommand]> {
        let mut result = Vec::new();
        let mut start = 0;
        for (i, command) in self.commands.iter().enumerate() {
            if i > start && matches!(command, DrawCommand::MoveTo(_)) {
                result.push(&self.commands[start..i]);
                start = i;
            }
        }
        if start < self.commands.len() {
            result.push(&self.commands[start..]);
        }
        result
    }

    /// Sub-paths as plain polylines
    pub fn polylines(&self) -> Vec<Vec<Coord<f64>>> {
        self.subpaths()
            .into_iter()
            .map(|part| part.iter().map(DrawCommand::coord).collect())
            .collect()
    }

    /// Whether any instruction ends exactly at `coord`
    pub fn touches(&self, coord: Coord<f64>) -> bool {
        self.commands.iter().any(|c| c.coord() == coord)
    }

    #[inline]
    fn move_to(&mut self, point: Point<f64>) {
        self.commands.push(DrawCommand::MoveTo(point.0));
    }

    #[inline]
    fn line_to(&mut self, point: Point<f64>) {
        self.commands.push(DrawCommand::LineTo(point.0));
    }
}

/// Simplify projected points into draw commands for one rendering pass
///
/// # Arguments
/// * `points` - Projected path points in chronological order
/// * `clip` - Query rectangle in map units (already outset by the line width)
/// * `zoom_scale` - Screen pixels per map unit
/// * `min_point_delta_px` - Minimum on-screen distance between retained points
///
/// Returns an empty path for fewer than two points or an unusable zoom scale.
pub fn simplify_for_display(
    points: &[Point<f64>],
    clip: &Rect<f64>,
    zoom_scale: f64,
    min_point_delta_px: f64,
) -> DrawPath {
    #[cfg(feature = "profiling")]
    profiling::scope!("simplify::simplify_for_display");

    let mut path = DrawPath::default();
    if points.len() < 2 || !zoom_scale.is_finite() || zoom_scale <= 0.0 {
        return path;
    }

    let min_delta = min_point_delta_px / zoom_scale;
    let threshold = min_delta * min_delta;

    let last_index = points.len() - 1;
    let mut anchor = points[0];
    let mut needs_move = true;

    for &point in &points[1..last_index] {
        if squared_distance(anchor, point) < threshold {
            continue;
        }

        if segment_intersects(anchor, point, clip) {
            if needs_move {
                path.move_to(anchor);
                needs_move = false;
            }
            path.line_to(point);
        } else {
            needs_move = true;
        }
        anchor = point;
    }

    // The trailing pair is kept even below the threshold
    let last = points[last_index];
    if segment_intersects(anchor, last, clip) {
        if needs_move {
            path.move_to(anchor);
        }
        path.line_to(last);
    }

    path
}

#[inline]
fn squared_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let dx = b.x() - a.x();
    let dy = b.y() - a.y();
    dx * dx + dy * dy
}

/// Bounding-box test of a segment against the clip rectangle
#[inline]
fn segment_intersects(a: Point<f64>, b: Point<f64>, clip: &Rect<f64>) -> bool {
    utils::rect_intersects(&utils::rect_from_points(a, b), clip)
}
