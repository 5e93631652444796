//! Headless breadcrumb recorder
//!
//! Replays a location feed into a [`RecordingSession`] while a tiled render loop keeps
//! querying the live path, then reports what was recorded.

pub mod feed;
pub mod logging;
pub mod render;
pub mod settings;
pub mod summary;

pub use settings::Settings;
pub use summary::RecordingSummary;

use breadcrumb_lib::{BreadcrumbError, PathChange, RecordingSession};
use render::RenderOptions;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GPX parse error: {0}")]
    Gpx(#[from] gpx::errors::GpxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Breadcrumb(#[from] BreadcrumbError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Track contains no points")]
    EmptyTrack,
}

pub type Result<T> = std::result::Result<T, RecorderError>;

/// Record the configured feed until it ends
pub async fn run(settings: Settings) -> Result<RecordingSummary> {
    let track = feed::load_track(&settings).await?;
    let render_options = RenderOptions::from(&settings);

    let mut session = RecordingSession::new(settings.session_config());
    let (renderer_tx, renderer_rx) = watch::channel(session.renderer());
    let render_loop = render::spawn_render_loop(renderer_rx, render_options);
    let (mut events, feed_task) = feed::spawn_feed(track, feed::FeedOptions::from(&settings));

    let mut restarts = 0;
    while let Some(event) = events.recv().await {
        let update = session.handle_event(event);

        for change in &update.changes {
            match change {
                PathChange::PointAdded { region } => {
                    let renderer = renderer_tx.borrow();
                    let zoom = render_options.zoom_for(&renderer.path().snapshot_bounds());
                    let dirty = renderer.redraw_region(region, zoom);
                    tracing::debug!(
                        min_x = dirty.min().x,
                        min_y = dirty.min().y,
                        max_x = dirty.max().x,
                        max_y = dirty.max().y,
                        "Redraw region"
                    );
                }
                PathChange::BoundsChanged { bounds } => {
                    tracing::info!(
                        width = bounds.width(),
                        height = bounds.height(),
                        "Path bounds changed; rebuilding tiles"
                    );
                }
            }
        }
        if update.chime {
            tracing::info!("Chime");
        }
        if let Some(bounds) = update.bounds_overlay {
            tracing::info!(?bounds, "Bounds overlay moved");
        }

        let accepted = session.stats().accepted;
        if settings
            .restart_after
            .is_some_and(|limit| limit > 0 && accepted >= limit)
        {
            session.restart();
            renderer_tx.send_replace(session.renderer());
            restarts += 1;
        }
    }

    feed_task.await?;
    drop(renderer_tx);
    let report = render_loop.await?;

    let path = session.path();
    let bounds = path.snapshot_bounds();
    let final_zoom_scale = render_options.zoom_for(&bounds);
    let final_draw = session.renderer().build_draw_path(&bounds, final_zoom_scale);

    let summary = RecordingSummary {
        path: path.info(),
        stats: session.stats(),
        config: *session.config(),
        restarts,
        frames_rendered: report.frames,
        final_zoom_scale,
        final_draw_commands: final_draw.len(),
        final_subpaths: final_draw.subpaths().len(),
    };
    tracing::info!(
        samples = summary.path.sample_count,
        distance_m = summary.path.total_distance_meters,
        frames = summary.frames_rendered,
        restarts,
        "Recording finished"
    );

    if let Some(file) = &settings.summary_json {
        summary::write_summary(file, &summary).await?;
    }
    Ok(summary)
}
