use tokio::sync::{mpsc, watch};

use crate::{
	platform::{next_position, PositionStream},
	prelude::*,
};

/// Polled and pushed sources of the sleigh's location
mod feed;
/// Distance to the sleigh and the bell's volume
mod proximity;

pub use self::{feed::*, proximity::*};

/// What the viewer can ask the map to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerControl {
	/// Switch the sound on. This is the user gesture that unlocks playback.
	EnableAudio,
	/// Switch the sound off
	DisableAudio,
	/// Switch the sound on if it is off, and off if it is on
	ToggleAudio,
	/// Close the map
	Stop,
}

/// How the sleigh's feed is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalStatus {
	/// The server has no fix yet
	#[default]
	WaitingForSignal,
	/// The last request brought back a fix
	Live,
	/// The last request failed. The last known fix, if any, is still shown.
	Retrying,
}

/// Everything the map shows, published after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerSnapshot {
	/// How the feed is doing
	pub signal: SignalStatus,
	/// The sleigh's last fix, drawn as the sleigh marker
	pub sleigh: Option<LocationFix>,
	/// Where the viewer is
	pub viewer: Option<GeoPoint>,
	/// Where the map is centered. Follows the sleigh and stays put when the
	/// signal is lost.
	pub map_center: Option<GeoPoint>,
	/// Meters from the viewer to the sleigh
	pub distance_meters: Option<u32>,
	/// Whether the sound is on
	pub audio_enabled: bool,
	/// What the bell is doing
	pub alert: AlertDecision,
	/// Why the sound could not be switched on
	pub audio_error: Option<AudioError>,
	/// Why the viewer's own position is unknown
	pub viewer_error: Option<GeolocationError>,
}

impl Default for ConsumerSnapshot {
	fn default() -> Self {
		Self {
			signal: SignalStatus::default(),
			sleigh: None,
			viewer: None,
			map_center: None,
			distance_meters: None,
			audio_enabled: false,
			alert: AlertDecision::Pause,
			audio_error: None,
			viewer_error: None,
		}
	}
}

impl ConsumerSnapshot {
	/// A one-line summary for the top of the map.
	pub fn headline(&self) -> String {
		match (&self.sleigh, self.distance_meters) {
			(None, _) => "Waiting for signal...".to_string(),
			(Some(_), Some(distance)) => format!("The sleigh is {} m away", distance),
			(Some(_), None) => "The sleigh is on its way".to_string(),
		}
	}
}

/// Follows the sleigh and rings the bell as it gets close.
///
/// Like the producer, the consumer reacts to three independent inputs: the
/// sleigh's feed, the viewer's own position and the viewer's controls. Each
/// one only updates the consumer's own state, and the bell is re-derived from
/// scratch after every change.
pub struct Consumer<F, G, A> {
	/// Where the sleigh's location comes from
	feed: F,
	/// Where the viewer's position comes from
	viewer_geolocation: G,
	/// Passed to the device when the viewer's watch is opened
	watch_options: WatchOptions,
	/// Everything else, driven by the run loop
	state: ConsumerState<A>,
}

impl<F, G, A> Consumer<F, G, A>
where
	F: LocationFeed,
	G: GeolocationProvider,
	A: AudioCue,
{
	/// Creates a consumer with the sound off.
	pub fn new(feed: F, viewer_geolocation: G, audio: A) -> Self {
		let (snapshot_tx, _) = watch::channel(ConsumerSnapshot::default());
		Self {
			feed,
			viewer_geolocation,
			watch_options: WatchOptions::default(),
			state: ConsumerState {
				audio,
				playing: false,
				monitor: ProximityMonitor::new(),
				snapshot: ConsumerSnapshot::default(),
				snapshot_tx,
			},
		}
	}

	/// Uses the given options when opening the viewer's watch.
	pub fn with_watch_options(mut self, watch_options: WatchOptions) -> Self {
		self.watch_options = watch_options;
		self
	}

	/// A receiver for every change to what the map shows.
	pub fn snapshot(&self) -> watch::Receiver<ConsumerSnapshot> {
		self.state.snapshot_tx.subscribe()
	}

	/// Runs until [`ConsumerControl::Stop`] is received or `controls` is
	/// closed. The feed and the viewer's watch are torn down and the bell is
	/// paused before the last snapshot is returned.
	pub async fn run(self, mut controls: mpsc::Receiver<ConsumerControl>) -> ConsumerSnapshot {
		let Self {
			mut feed,
			viewer_geolocation,
			watch_options,
			mut state,
		} = self;

		let (updates_tx, mut updates) = mpsc::channel(1);
		let feed_task = tokio::spawn(async move {
			loop {
				let update = feed.next_update().await;
				if updates_tx.send(update).await.is_err() {
					break;
				}
			}
		});

		let mut viewer_positions: Option<PositionStream> =
			match viewer_geolocation.watch_position(watch_options) {
				Ok(stream) => Some(stream),
				Err(err) => {
					state.on_viewer_error(err);
					None
				}
			};

		loop {
			tokio::select! {
				control = controls.recv() => match control {
					Some(ConsumerControl::Stop) | None => break,
					Some(control) => state.on_control(control),
				},
				Some(update) = updates.recv() => state.on_feed_update(update),
				position = next_position(&mut viewer_positions) => match position {
					Some(Ok(fix)) => state.on_viewer(fix.point),
					Some(Err(err)) if err.is_fatal() => {
						viewer_positions = None;
						state.on_viewer_error(err);
					}
					Some(Err(err)) => debug!("Viewer position is late: {}", err),
					None => {
						debug!("Viewer position watch ended");
						viewer_positions = None;
					}
				},
			}
		}

		feed_task.abort();
		drop(viewer_positions);
		state.shutdown()
	}
}

/// The part of the consumer that reacts to each input
struct ConsumerState<A> {
	/// The bell
	audio: A,
	/// Whether the bell is currently playing
	playing: bool,
	/// Distance and alert decisions
	monitor: ProximityMonitor,
	/// What the map currently shows
	snapshot: ConsumerSnapshot,
	/// Publishes `snapshot`
	snapshot_tx: watch::Sender<ConsumerSnapshot>,
}

impl<A> ConsumerState<A>
where
	A: AudioCue,
{
	/// Handles a button press.
	fn on_control(&mut self, control: ConsumerControl) {
		match control {
			ConsumerControl::EnableAudio => self.enable_audio(),
			ConsumerControl::DisableAudio => self.monitor.set_audio_enabled(false),
			ConsumerControl::ToggleAudio if self.monitor.audio_enabled() => {
				self.monitor.set_audio_enabled(false)
			}
			ConsumerControl::ToggleAudio => self.enable_audio(),
			ConsumerControl::Stop => (),
		}
		self.refresh();
	}

	/// Unlocks playback and switches the sound on. If playback is refused the
	/// sound stays off.
	fn enable_audio(&mut self) {
		if self.monitor.audio_enabled() {
			return;
		}
		match self.audio.prime() {
			Ok(()) => {
				self.playing = false;
				self.snapshot.audio_error = None;
				self.monitor.set_audio_enabled(true);
			}
			Err(err) => {
				warn!("Sound could not be switched on: {}", err);
				self.snapshot.audio_error = Some(err);
			}
		}
	}

	/// Handles news about the sleigh.
	fn on_feed_update(&mut self, update: FeedUpdate) {
		match update {
			FeedUpdate::Fix(fix) => {
				self.monitor.set_sleigh(fix.position());
				self.snapshot.map_center = Some(fix.position());
				self.snapshot.sleigh = Some(fix);
				self.snapshot.signal = SignalStatus::Live;
			}
			FeedUpdate::NoSignal => {
				self.monitor.clear_sleigh();
				self.snapshot.sleigh = None;
				self.snapshot.signal = SignalStatus::WaitingForSignal;
			}
			FeedUpdate::Unreachable(reason) => {
				debug!("Sleigh location unavailable: {}", reason);
				self.snapshot.signal = SignalStatus::Retrying;
			}
		}
		self.refresh();
	}

	/// Handles the viewer moving.
	fn on_viewer(&mut self, viewer: GeoPoint) {
		self.monitor.set_viewer(viewer);
		self.snapshot.viewer = Some(viewer);
		self.snapshot.viewer_error = None;
		self.refresh();
	}

	/// Handles the viewer's position becoming unavailable.
	fn on_viewer_error(&mut self, error: GeolocationError) {
		warn!("Viewer position unavailable: {}", error);
		self.snapshot.viewer_error = Some(error);
		self.refresh();
	}

	/// Re-derives the bell from the latest inputs and publishes the snapshot.
	fn refresh(&mut self) {
		let decision = self.monitor.decision();
		match decision {
			AlertDecision::Play { volume } => {
				self.audio.set_volume(volume);
				if !self.playing {
					match self.audio.play() {
						Ok(()) => self.playing = true,
						Err(err) => warn!("Bell could not be played: {}", err),
					}
				}
			}
			AlertDecision::Pause => {
				if self.playing {
					self.audio.pause();
					self.playing = false;
				}
			}
		}

		self.snapshot.distance_meters = self.monitor.distance_meters();
		self.snapshot.audio_enabled = self.monitor.audio_enabled();
		self.snapshot.alert = decision;
		self.snapshot_tx.send_replace(self.snapshot.clone());
	}

	/// Pauses the bell and returns the final snapshot.
	fn shutdown(mut self) -> ConsumerSnapshot {
		if self.playing {
			self.audio.pause();
			self.playing = false;
		}
		self.snapshot.alert = AlertDecision::Pause;
		self.snapshot_tx.send_replace(self.snapshot.clone());
		self.snapshot
	}
}
