//! Location feed standing in for the platform location service
//!
//! A track (from a GPX file or a synthetic walk) is replayed as live fixes: every fix is
//! stamped with the wall clock at delivery, grouped into batches and sent over a channel.

use crate::{RecorderError, Result, Settings};
use breadcrumb_lib::{LocationEvent, LocationFix, utils};
use std::io::Read;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Accuracy reported for replayed fixes when the requested tier has no nominal value
const REPLAY_ACCURACY_METERS: f64 = 5.0;

/// How the feed delivers fixes
#[derive(Debug, Clone, Copy)]
pub struct FeedOptions {
    pub batch_size: usize,
    pub interval: Duration,
    pub deny_authorization: bool,
    pub accuracy_meters: f64,
}

impl From<&Settings> for FeedOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            batch_size: settings.batch_size.max(1),
            interval: Duration::from_millis(settings.interval_ms),
            deny_authorization: settings.deny_authorization,
            accuracy_meters: settings
                .accuracy
                .nominal_meters()
                .max(REPLAY_ACCURACY_METERS),
        }
    }
}

/// Load the (lat, lon) track to replay
pub async fn load_track(settings: &Settings) -> Result<Vec<(f64, f64)>> {
    match &settings.gpx_file {
        Some(path) => {
            let bytes = tokio::fs::read(path).await?;
            let track = parse_gpx(std::io::Cursor::new(bytes))?;
            tracing::info!(file = %path.display(), points = track.len(), "Loaded GPX track");
            Ok(track)
        }
        None => Ok(synthetic_walk(
            settings.start_lat,
            settings.start_lon,
            settings.synthetic_step_meters,
            settings.synthetic_points,
        )),
    }
}

/// All track points of a GPX document in file order
pub fn parse_gpx<R: Read>(reader: R) -> Result<Vec<(f64, f64)>> {
    let gpx = gpx::read(reader)?;
    let track: Vec<(f64, f64)> = gpx
        .tracks
        .iter()
        .flat_map(|track| &track.segments)
        .flat_map(|segment| &segment.points)
        .map(|waypoint| (waypoint.point().y(), waypoint.point().x()))
        .collect();

    if track.is_empty() {
        return Err(RecorderError::EmptyTrack);
    }
    Ok(track)
}

/// A gently curving walk with a fixed step length
pub fn synthetic_walk(lat: f64, lon: f64, step_meters: f64, count: usize) -> Vec<(f64, f64)> {
    let mut track = Vec::with_capacity(count);
    let (mut lat, mut lon) = (lat, lon);
    for i in 0..count {
        track.push((lat, lon));
        let heading = i as f64 * 0.05;
        let north = step_meters * heading.cos();
        let east = step_meters * heading.sin();
        lat += (north / utils::EARTH_RADIUS_M).to_degrees();
        lon += (east / (utils::EARTH_RADIUS_M * lat.to_radians().cos())).to_degrees();
    }
    track
}

/// Start replaying `track` on a background task
pub fn spawn_feed(
    track: Vec<(f64, f64)>,
    options: FeedOptions,
) -> (mpsc::Receiver<LocationEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(64);

    let handle = tokio::spawn(async move {
        if options.deny_authorization {
            // The user later grants access in the settings
            if tx.send(LocationEvent::AuthorizationDenied).await.is_err()
                || tx.send(LocationEvent::Resumed).await.is_err()
            {
                return;
            }
        }

        for chunk in track.chunks(options.batch_size) {
            let fixes = chunk
                .iter()
                .map(|&(latitude, longitude)| LocationFix {
                    latitude,
                    longitude,
                    timestamp: SystemTime::now(),
                    horizontal_accuracy: Some(options.accuracy_meters),
                })
                .collect();

            if tx.send(LocationEvent::Updates(fixes)).await.is_err() {
                tracing::debug!("Location consumer gone; stopping feed");
                break;
            }
            tokio::time::sleep(options.interval).await;
        }
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="breadcrumb-tests" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <trkseg>
      <trkpt lat="51.5074" lon="-0.1278"></trkpt>
      <trkpt lat="51.5076" lon="-0.1276"></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="51.5078" lon="-0.1274"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_parse_gpx_in_order() {
        let track = parse_gpx(SAMPLE_GPX.as_bytes()).unwrap();
        assert_eq!(
            track,
            vec![(51.5074, -0.1278), (51.5076, -0.1276), (51.5078, -0.1274)]
        );
    }

    #[test]
    fn test_parse_gpx_without_points() {
        let empty = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="breadcrumb-tests" xmlns="http://www.topografix.com/GPX/1/1">
</gpx>"#;
        assert!(matches!(
            parse_gpx(empty.as_bytes()),
            Err(RecorderError::EmptyTrack)
        ));
    }

    #[test]
    fn test_synthetic_walk_step_length() {
        let track = synthetic_walk(51.5, -0.1, 15.0, 50);
        assert_eq!(track.len(), 50);
        assert_eq!(track[0], (51.5, -0.1));
        for pair in track.windows(2) {
            let d = utils::haversine_distance(pair[0].0, pair[0].1, pair[1].0, pair[1].1);
            assert!((d - 15.0).abs() < 0.01, "{d}");
        }
    }

    #[tokio::test]
    async fn test_feed_batches_all_fixes() {
        let track = synthetic_walk(0.0, 0.0, 20.0, 7);
        let options = FeedOptions {
            batch_size: 3,
            interval: Duration::ZERO,
            deny_authorization: true,
            accuracy_meters: 5.0,
        };
        let (mut rx, handle) = spawn_feed(track, options);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        handle.await.unwrap();

        assert_eq!(events[0], LocationEvent::AuthorizationDenied);
        assert_eq!(events[1], LocationEvent::Resumed);
        let sizes: Vec<usize> = events[2..]
            .iter()
            .map(|e| match e {
                LocationEvent::Updates(fixes) => fixes.len(),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }
}
