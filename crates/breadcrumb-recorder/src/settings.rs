use breadcrumb_lib::{AccuracyTier, ActivityType, RenderConfig, SessionConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Breadcrumb Recorder - Records a live location feed while tiled renderers draw it
pub struct Settings {
    /// GPX file replayed as the live location feed (a synthetic walk is used otherwise)
    #[clap(short, long, value_name = "FILE")]
    pub gpx_file: Option<PathBuf>,

    /// Number of fixes in the synthetic walk
    #[clap(long, default_value = "500")]
    pub synthetic_points: usize,

    /// Distance between synthetic fixes in meters
    #[clap(long, default_value = "15.0")]
    pub synthetic_step_meters: f64,

    /// Latitude where the synthetic walk starts
    #[clap(long, default_value = "51.5074", allow_hyphen_values = true)]
    pub start_lat: f64,

    /// Longitude where the synthetic walk starts
    #[clap(long, default_value = "-0.1278", allow_hyphen_values = true)]
    pub start_lon: f64,

    /// Fixes delivered per location event
    #[clap(long, default_value = "1")]
    pub batch_size: usize,

    /// Delay between location events in milliseconds
    #[clap(long, default_value = "10")]
    pub interval_ms: u64,

    /// Deliver an authorization denial (then a resume) before the first fix
    #[clap(long)]
    pub deny_authorization: bool,

    /// Desired accuracy: best, navigation, 10m, 100m, 1km, 3km
    #[clap(long, default_value = "best")]
    pub accuracy: AccuracyTier,

    /// Activity hint: other, automotive, fitness, navigation, airborne
    #[clap(long, default_value = "other")]
    pub activity: ActivityType,

    /// Chime whenever the path grows
    #[clap(long)]
    pub chime: bool,

    /// Track the path bounds overlay
    #[clap(long)]
    pub show_bounds: bool,

    /// Track line width in pixels
    #[clap(long, default_value = "5.0")]
    pub line_width: f64,

    /// Minimum on-screen distance in pixels between drawn points
    #[clap(long, default_value = "5.0")]
    pub min_point_delta: f64,

    /// Render the bounds as an N x N grid of tiles
    #[clap(long, default_value = "4")]
    pub tiles: usize,

    /// Delay between rendered frames in milliseconds
    #[clap(long, default_value = "100")]
    pub render_interval_ms: u64,

    /// Zoom scale in screen pixels per map unit (fits the bounds to the viewport if omitted)
    #[clap(long)]
    pub zoom_scale: Option<f64>,

    /// Viewport size in pixels used when fitting the zoom scale
    #[clap(long, default_value = "1024")]
    pub viewport_px: f64,

    /// Restart the recording every N accepted samples
    #[clap(long)]
    pub restart_after: Option<usize>,

    /// Write a JSON summary of the recording to this file
    #[clap(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Session configuration derived from these settings
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            accuracy: self.accuracy,
            activity: self.activity,
            chime_on_update: self.chime,
            show_bounds_overlay: self.show_bounds,
            render: RenderConfig {
                line_width_px: self.line_width,
                min_point_delta_px: self.min_point_delta,
            },
            ..Default::default()
        }
    }
}
