use std::{io, path::Path, sync::Mutex};

use futures::{future, StreamExt};
use models::utils::GeoPoint;
use serde::Deserialize;
use time::OffsetDateTime;
use tokio::{
	fs::File,
	io::{AsyncBufRead, AsyncBufReadExt, BufReader},
};
use tokio_stream::wrappers::LinesStream;

use super::{DeviceFix, GeolocationError, GeolocationProvider, PositionStream, WatchOptions};
use crate::prelude::*;

/// A position source that reads one JSON object per line, such as
/// `{"lat": 51.28, "lng": -0.08, "accuracy": 6.5}`. A line may also carry a
/// RFC 3339 `timestamp`; lines without one are stamped when they are read.
///
/// The reader can only be watched once. Blank and unparseable lines are
/// skipped, and the end of the input ends the watch.
pub struct JsonLinesGeolocation {
	/// The input, taken by the first watch
	reader: Mutex<Option<Box<dyn AsyncBufRead + Send + Unpin>>>,
}

impl JsonLinesGeolocation {
	/// Reads positions from any buffered reader.
	pub fn new(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
		Self {
			reader: Mutex::new(Some(Box::new(reader))),
		}
	}

	/// Reads positions from the process's standard input.
	pub fn stdin() -> Self {
		Self::new(BufReader::new(tokio::io::stdin()))
	}

	/// Reads positions from a file.
	pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
		let file = File::open(path).await?;
		Ok(Self::new(BufReader::new(file)))
	}
}

/// A single line of input
#[derive(Debug, Deserialize)]
struct JsonLineFix {
	/// Latitude in WGS-84 degrees
	lat: f64,
	/// Longitude in WGS-84 degrees
	lng: f64,
	/// Radius of the confidence circle in meters
	accuracy: f64,
	/// When the position was captured
	#[serde(default, with = "time::serde::rfc3339::option")]
	timestamp: Option<OffsetDateTime>,
}

impl GeolocationProvider for JsonLinesGeolocation {
	fn watch_position(&self, options: WatchOptions) -> Result<PositionStream, GeolocationError> {
		let reader = self
			.reader
			.lock()
			.map_err(|_| GeolocationError::Unavailable("position source is poisoned".into()))?
			.take()
			.ok_or_else(|| GeolocationError::Unavailable("position source already in use".into()))?;

		let lines = LinesStream::new(reader.lines());
		let stream = tokio_stream::StreamExt::timeout(lines, options.timeout).filter_map(|item| {
			future::ready(match item {
				Err(_) => Some(Err(GeolocationError::Timeout)),
				Ok(Err(err)) => Some(Err(GeolocationError::Unavailable(err.to_string()))),
				Ok(Ok(line)) => parse_line(&line).map(Ok),
			})
		});

		Ok(stream.boxed())
	}
}

/// Parses a line into a fix, skipping it if it is blank or malformed.
fn parse_line(line: &str) -> Option<DeviceFix> {
	let line = line.trim();
	if line.is_empty() {
		return None;
	}

	match serde_json::from_str::<JsonLineFix>(line) {
		Ok(fix) => {
			let point = GeoPoint::new(fix.lat, fix.lng);
			if !point.is_valid() || fix.accuracy.is_nan() || fix.accuracy < 0.0 {
				warn!("Skipping impossible position `{}`", line);
				return None;
			}
			Some(DeviceFix {
				point,
				accuracy: fix.accuracy,
				captured_at: fix.timestamp.unwrap_or_else(OffsetDateTime::now_utc),
			})
		}
		Err(err) => {
			warn!("Skipping unreadable position `{}`: {}", line, err);
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use time::macros::datetime;

	use super::*;

	#[tokio::test]
	async fn reads_fixes_and_skips_junk() {
		let input = concat!(
			"{\"lat\": 51.28, \"lng\": -0.08, \"accuracy\": 6.5, \"timestamp\": \"2025-12-20T18:30:00Z\"}\n",
			"\n",
			"not json\n",
			"{\"lat\": 51.29, \"lng\": -0.07, \"accuracy\": 30}\n",
		);
		let source = JsonLinesGeolocation::new(input.as_bytes());
		let fixes = source
			.watch_position(WatchOptions::default())
			.unwrap()
			.collect::<Vec<_>>()
			.await;

		assert_eq!(fixes.len(), 2);
		let first = fixes[0].clone().unwrap();
		assert_eq!(first.point, GeoPoint::new(51.28, -0.08));
		assert_eq!(first.accuracy, 6.5);
		assert_eq!(first.captured_at, datetime!(2025-12-20 18:30:00 UTC));
		assert_eq!(fixes[1].clone().unwrap().accuracy, 30.0);
	}

	#[test]
	fn impossible_positions_are_skipped() {
		assert_eq!(parse_line(r#"{"lat": 91.0, "lng": -0.08, "accuracy": 5}"#), None);
		assert_eq!(parse_line(r#"{"lat": 51.28, "lng": 181.0, "accuracy": 5}"#), None);
		assert_eq!(parse_line(r#"{"lat": 51.28, "lng": -0.08, "accuracy": -1}"#), None);

		let fix = parse_line(r#"{"lat": 51.28, "lng": -0.08, "accuracy": 0}"#).unwrap();
		assert_eq!(fix.point, GeoPoint::new(51.28, -0.08));
		assert_eq!(fix.accuracy, 0.0);
	}

	#[tokio::test]
	async fn second_watch_is_refused() {
		let source = JsonLinesGeolocation::new(&b""[..]);
		assert!(source.watch_position(WatchOptions::default()).is_ok());
		assert!(matches!(
			source.watch_position(WatchOptions::default()),
			Err(GeolocationError::Unavailable(_))
		));
	}

	#[tokio::test(start_paused = true)]
	async fn silence_is_reported_as_timeout() {
		let (_writer, reader) = tokio::io::duplex(64);
		let source = JsonLinesGeolocation::new(BufReader::new(reader));
		let mut stream = source
			.watch_position(
				WatchOptions::builder()
					.timeout(Duration::from_secs(2))
					.build(),
			)
			.unwrap();

		assert_eq!(stream.next().await, Some(Err(GeolocationError::Timeout)));
	}
}
