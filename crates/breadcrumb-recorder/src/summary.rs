//! Summary written at the end of a recording

use breadcrumb_lib::{PathInfo, SessionConfig, SessionStats};
use serde::Serialize;
use std::path::Path;

/// What a recording produced
#[derive(Debug, Clone, Serialize)]
pub struct RecordingSummary {
    /// The path as it stands after the last restart
    pub path: PathInfo,
    /// Counters since the last restart
    pub stats: SessionStats,
    pub config: SessionConfig,
    pub restarts: usize,
    pub frames_rendered: usize,
    /// Zoom scale of the final full-bounds draw
    pub final_zoom_scale: f64,
    pub final_draw_commands: usize,
    pub final_subpaths: usize,
}

/// Write `summary` as pretty JSON to `path`
pub async fn write_summary(path: &Path, summary: &RecordingSummary) -> crate::Result<()> {
    let json = serde_json::to_vec_pretty(summary)?;
    tokio::fs::write(path, json).await?;
    tracing::info!(file = %path.display(), "Wrote recording summary");
    Ok(())
}
