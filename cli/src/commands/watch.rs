use std::{path::PathBuf, time::Duration};

use clap::Args;
use time::OffsetDateTime;
use tokio::{
	io::{AsyncBufReadExt, BufReader},
	sync::mpsc,
};
use tracker::prelude::{
	Consumer,
	ConsumerControl,
	ConsumerSnapshot,
	FeedUpdate,
	FixedPosition,
	GeolocationError,
	GeolocationProvider,
	JsonLinesGeolocation,
	LocationFeed,
	PollingFeed,
	PositionStream,
	SignalStatus,
	StreamingFeed,
	UnsupportedGeolocation,
	WatchOptions,
};

use crate::{
	prelude::*,
	utils::{describe_age, TerminalBell},
};

/// Arguments for following the sleigh.
#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
	/// Your latitude, if you're standing still
	#[arg(long, requires = "viewer_lng", allow_negative_numbers = true)]
	pub viewer_lat: Option<f64>,
	/// Your longitude, if you're standing still
	#[arg(long, requires = "viewer_lat", allow_negative_numbers = true)]
	pub viewer_lng: Option<f64>,
	/// A file of your positions, one JSON object per line, if you're on the
	/// move
	#[arg(long, conflicts_with_all = ["viewer_lat", "viewer_lng"])]
	pub viewer_source: Option<PathBuf>,
	/// Switch the bell on straight away. Type `s` and Enter to toggle it later.
	#[arg(long)]
	pub sound: bool,
	/// Have the server push every new position instead of polling for it
	#[arg(long)]
	pub push: bool,
	/// Seconds between polls
	#[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
	pub interval: u64,
}

/// Where the viewer's own position comes from.
enum ViewerGeolocation {
	/// Given on the command line
	Fixed(FixedPosition),
	/// Read from a file
	Moving(JsonLinesGeolocation),
	/// Not given. Distances are never shown.
	Unknown(UnsupportedGeolocation),
}

impl GeolocationProvider for ViewerGeolocation {
	fn watch_position(&self, options: WatchOptions) -> Result<PositionStream, GeolocationError> {
		match self {
			Self::Fixed(fixed) => fixed.watch_position(options),
			Self::Moving(moving) => moving.watch_position(options),
			Self::Unknown(unknown) => unknown.watch_position(options),
		}
	}
}

/// How the sleigh's position reaches the terminal.
enum CliFeed {
	/// Asking the server on an interval
	Polling(PollingFeed<ApiClient>),
	/// The server pushing over a websocket
	Push(StreamingFeed),
}

impl LocationFeed for CliFeed {
	async fn next_update(&mut self) -> FeedUpdate {
		match self {
			Self::Polling(feed) => feed.next_update().await,
			Self::Push(feed) => feed.next_update().await,
		}
	}
}

/// Follows the sleigh until the viewer types `q` or presses Ctrl+C, printing
/// a line every time something changes.
pub(super) async fn execute(
	args: WatchArgs,
	_global_args: GlobalArgs,
	client: ApiClient,
) -> Result<CommandOutput, ApiErrorResponse> {
	let viewer = match (args.viewer_lat, args.viewer_lng, &args.viewer_source) {
		(Some(lat), Some(lng), _) => {
			let point = GeoPoint::new(lat, lng);
			if !point.is_valid() {
				return Err(ApiErrorResponse::error_with_message(
					ErrorType::WrongParameters,
					format!("({}, {}) is not a place on Earth", lat, lng),
				));
			}
			ViewerGeolocation::Fixed(FixedPosition::new(point))
		}
		(_, _, Some(path)) => ViewerGeolocation::Moving(
			JsonLinesGeolocation::open(path).await.map_err(|err| {
				ApiErrorResponse::error_with_message(
					ErrorType::WrongParameters,
					format!("Cannot read `{}`: {}", path.display(), err),
				)
			})?,
		),
		_ => ViewerGeolocation::Unknown(UnsupportedGeolocation),
	};

	let feed = if args.push {
		let url = client.stream_url().map_err(|err| {
			ApiErrorResponse::error_with_message(ErrorType::WrongParameters, err.to_string())
		})?;
		CliFeed::Push(StreamingFeed::new(url))
	} else {
		CliFeed::Polling(PollingFeed::with_interval(
			client,
			Duration::from_secs(args.interval),
		))
	};

	let consumer = Consumer::new(feed, viewer, TerminalBell::default());
	let mut snapshots = consumer.snapshot();

	let (controls, control_rx) = mpsc::channel(4);
	if args.sound {
		_ = controls.send(ConsumerControl::EnableAudio).await;
	}
	let input = tokio::spawn(read_controls(controls));

	let printer = tokio::spawn(async move {
		let mut printed = ConsumerSnapshot::default();
		while snapshots.changed().await.is_ok() {
			let snapshot = snapshots.borrow_and_update().clone();
			if snapshot == printed {
				continue;
			}
			if snapshot.audio_error != printed.audio_error {
				if let Some(err) = &snapshot.audio_error {
					warn!("{}", err);
				}
			}
			if snapshot.viewer_error != printed.viewer_error {
				if let Some(err) = &snapshot.viewer_error {
					warn!("Your position is unknown: {}", err);
				}
			}
			info!("{}", status_line(&snapshot, OffsetDateTime::now_utc()));
			printed = snapshot;
		}
	});

	let last = consumer.run(control_rx).await;
	input.abort();
	printer.abort();

	CommandOutput {
		text: status_line(&last, OffsetDateTime::now_utc()),
		json: serde_json::json!({
			"headline": last.headline(),
			"sleigh": last.sleigh,
			"distanceMeters": last.distance_meters,
			"audioEnabled": last.audio_enabled,
		}),
	}
	.into_result()
}

/// Turns what the viewer types into controls. `s` toggles the bell and `q`
/// quits, as does Ctrl+C. Closing stdin leaves Ctrl+C as the only way out.
async fn read_controls(controls: mpsc::Sender<ConsumerControl>) {
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	let mut stdin_open = true;

	loop {
		let control = tokio::select! {
			_ = tokio::signal::ctrl_c() => ConsumerControl::Stop,
			line = lines.next_line(), if stdin_open => match line {
				Ok(Some(line)) => match parse_control(&line) {
					Some(control) => control,
					None => continue,
				},
				Ok(None) | Err(_) => {
					stdin_open = false;
					continue;
				}
			},
		};

		let stop = control == ConsumerControl::Stop;
		if controls.send(control).await.is_err() || stop {
			break;
		}
	}
}

/// Reads one typed command.
fn parse_control(line: &str) -> Option<ConsumerControl> {
	match line.trim() {
		"" => None,
		"s" | "sound" => Some(ConsumerControl::ToggleAudio),
		"q" | "quit" => Some(ConsumerControl::Stop),
		other => {
			warn!("Unknown command `{}`. Type `s` to toggle the bell or `q` to quit", other);
			None
		}
	}
}

/// One line summing up the map.
fn status_line(snapshot: &ConsumerSnapshot, now: OffsetDateTime) -> String {
	let mut line = snapshot.headline();
	match (&snapshot.sleigh, snapshot.signal) {
		(Some(fix), SignalStatus::Retrying) => line.push_str(&format!(
			" (signal lost, last seen {})",
			describe_age(fix.age(now))
		)),
		(Some(fix), _) => line.push_str(&format!(" (seen {})", describe_age(fix.age(now)))),
		(None, SignalStatus::Retrying) => line.push_str(" (server unreachable, retrying)"),
		(None, _) => (),
	}
	line.push_str(if snapshot.audio_enabled {
		" | bell on"
	} else {
		" | bell off"
	});
	line
}
