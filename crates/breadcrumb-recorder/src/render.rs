//! Tiled render loop standing in for the map display
//!
//! Each frame splits the current path bounds into tiles and renders them in parallel,
//! exactly like a tiled map surface would, while the session keeps appending.

use crate::Settings;
use breadcrumb_lib::{PathRenderer, tile_grid};
use geo::Rect;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Options for the render loop
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Tiles per axis
    pub tiles: usize,
    pub interval: Duration,
    /// Fixed zoom scale, or `None` to fit the bounds into the viewport
    pub zoom_scale: Option<f64>,
    pub viewport_px: f64,
}

impl From<&Settings> for RenderOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            tiles: settings.tiles.max(1),
            // Interval timers reject a zero period
            interval: Duration::from_millis(settings.render_interval_ms.max(1)),
            zoom_scale: settings.zoom_scale,
            viewport_px: settings.viewport_px,
        }
    }
}

impl RenderOptions {
    /// Zoom scale to use for the given bounds
    pub fn zoom_for(&self, bounds: &Rect<f64>) -> f64 {
        self.zoom_scale
            .unwrap_or_else(|| fit_zoom(bounds, self.viewport_px))
    }
}

/// Zoom scale (pixels per map unit) that fits `bounds` into a square viewport
pub fn fit_zoom(bounds: &Rect<f64>, viewport_px: f64) -> f64 {
    viewport_px / bounds.width().max(bounds.height()).max(1.0)
}

/// Totals for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Tiles that produced something to draw
    pub tiles_drawn: usize,
    pub commands: usize,
    pub segments: usize,
    pub zoom_scale: f64,
}

/// Totals for the whole render loop
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderReport {
    pub frames: usize,
    pub max_segments: usize,
}

/// Render one frame of the current path
pub fn render_frame(renderer: &PathRenderer, options: &RenderOptions) -> FrameStats {
    profiling::scope!("render_frame");

    let bounds = renderer.path().snapshot_bounds();
    let zoom_scale = options.zoom_for(&bounds);
    let tiles = tile_grid(&bounds, options.tiles, options.tiles);

    let draws = renderer.render_tiles(&tiles, zoom_scale);
    draws.iter().fold(
        FrameStats {
            zoom_scale,
            ..Default::default()
        },
        |mut stats, draw| {
            if !draw.is_empty() {
                stats.tiles_drawn += 1;
                stats.commands += draw.len();
                stats.segments += draw.segment_count();
            }
            stats
        },
    )
}

/// Render frames until the renderer channel closes
///
/// The latest renderer in the channel is used for every frame, so a session restart
/// switches rendering to the new path.
pub fn spawn_render_loop(
    mut renderers: watch::Receiver<PathRenderer>,
    options: RenderOptions,
) -> JoinHandle<RenderReport> {
    tokio::spawn(async move {
        let mut report = RenderReport::default();
        let mut ticker = tokio::time::interval(options.interval);

        loop {
            ticker.tick().await;
            if renderers.has_changed().is_err() {
                break;
            }
            let renderer = renderers.borrow_and_update().clone();

            let frame =
                tokio::task::spawn_blocking(move || render_frame(&renderer, &options)).await;
            match frame {
                Ok(stats) => {
                    report.frames += 1;
                    report.max_segments = report.max_segments.max(stats.segments);
                    tracing::debug!(
                        tiles = stats.tiles_drawn,
                        segments = stats.segments,
                        zoom = stats.zoom_scale,
                        "Rendered frame"
                    );
                }
                Err(e) => {
                    tracing::error!("Render worker failed: {}", e);
                    break;
                }
            }
        }

        report
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use breadcrumb_lib::{BreadcrumbPath, RenderConfig, Sample};
    use geo::Coord;
    use std::sync::Arc;
    use std::time::SystemTime;

    fn options() -> RenderOptions {
        RenderOptions {
            tiles: 3,
            interval: Duration::from_millis(1),
            zoom_scale: None,
            viewport_px: 1024.0,
        }
    }

    fn walked_path(count: usize) -> Arc<BreadcrumbPath> {
        let path = Arc::new(BreadcrumbPath::new());
        let now = SystemTime::now();
        for i in 0..count {
            let sample = Sample::new(40.0, -3.0 + i as f64 * 0.001, now, None).unwrap();
            path.append_at(sample, now);
        }
        path
    }

    #[test]
    fn test_fit_zoom() {
        let bounds = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 2048.0, y: 512.0 });
        assert_eq!(fit_zoom(&bounds, 1024.0), 0.5);

        let degenerate = Rect::new(Coord { x: 5.0, y: 5.0 }, Coord { x: 5.0, y: 5.0 });
        assert_eq!(fit_zoom(&degenerate, 1024.0), 1024.0);
    }

    #[test]
    fn test_fixed_zoom_wins() {
        let options = RenderOptions {
            zoom_scale: Some(2.0),
            ..options()
        };
        assert_eq!(options.zoom_for(&breadcrumb_lib::utils::world_rect()), 2.0);
    }

    #[test]
    fn test_render_frame() {
        let renderer = PathRenderer::new(walked_path(30), RenderConfig::default());
        let stats = render_frame(&renderer, &options());
        assert!(stats.tiles_drawn > 0);
        assert!(stats.segments > 0);
        assert!(stats.commands >= stats.segments);
    }

    #[test]
    fn test_render_frame_empty_path() {
        let renderer = PathRenderer::new(Arc::new(BreadcrumbPath::new()), RenderConfig::default());
        assert_eq!(render_frame(&renderer, &options()).segments, 0);
    }

    #[tokio::test]
    async fn test_render_loop_stops_when_channel_closes() {
        let renderer = PathRenderer::new(walked_path(20), RenderConfig::default());
        let (tx, rx) = watch::channel(renderer);
        let handle = spawn_render_loop(rx, options());

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(tx);
        let report = handle.await.unwrap();
        assert!(report.frames > 0);
        assert!(report.max_segments > 0);
    }
}
