//! Stand-ins for the device and the network, driven from tests.

use std::{
	future,
	sync::{
		atomic::{AtomicBool, AtomicUsize, Ordering},
		Arc,
		Mutex,
	},
};

use futures::StreamExt;
use models::utils::GeoPoint;
use time::macros::datetime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::prelude::*;

/// A position at the sleigh's depot with the given accuracy.
pub fn device_fix(accuracy: f64) -> DeviceFix {
	DeviceFix {
		point: GeoPoint::new(51.28, -0.08),
		accuracy,
		captured_at: datetime!(2025-12-20 18:30:00 UTC),
	}
}

/// A shared count that can be read after the counted thing has moved.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
	/// Adds one.
	pub fn bump(&self) {
		self.0.fetch_add(1, Ordering::SeqCst);
	}

	/// The current count.
	pub fn get(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}
}

/// A device whose positions are pushed in by the test.
pub struct ScriptedGeolocation {
	/// Handed to the first watch
	positions: Mutex<Option<UnboundedReceiver<Result<DeviceFix, GeolocationError>>>>,
	/// Returned from every watch instead, if set
	refusal: Option<GeolocationError>,
	/// How many watches were requested
	watch_calls: Counter,
	/// The options the last watch was opened with
	options: Arc<Mutex<Option<WatchOptions>>>,
}

impl ScriptedGeolocation {
	/// A device that reports whatever is sent on the returned sender.
	pub fn new() -> (Self, UnboundedSender<Result<DeviceFix, GeolocationError>>) {
		let (sender, receiver) = mpsc::unbounded_channel();
		let geolocation = Self {
			positions: Mutex::new(Some(receiver)),
			refusal: None,
			watch_calls: Counter::default(),
			options: Arc::default(),
		};
		(geolocation, sender)
	}

	/// A device that refuses every watch with `error`.
	pub fn refusing(error: GeolocationError) -> Self {
		Self {
			positions: Mutex::new(None),
			refusal: Some(error),
			watch_calls: Counter::default(),
			options: Arc::default(),
		}
	}

	/// The number of watches requested so far.
	pub fn watch_calls(&self) -> Counter {
		self.watch_calls.clone()
	}

	/// Reads back the options of the last watch once the device has moved.
	pub fn watch_options(&self) -> Arc<Mutex<Option<WatchOptions>>> {
		self.options.clone()
	}
}

impl GeolocationProvider for ScriptedGeolocation {
	fn watch_position(&self, options: WatchOptions) -> Result<PositionStream, GeolocationError> {
		self.watch_calls.bump();
		*self.options.lock().unwrap() = Some(options);
		if let Some(error) = &self.refusal {
			return Err(error.clone());
		}
		let receiver = self
			.positions
			.lock()
			.unwrap()
			.take()
			.ok_or_else(|| GeolocationError::Unavailable("already watched".into()))?;
		Ok(UnboundedReceiverStream::new(receiver).boxed())
	}
}

/// A sink that forwards every request to the test, failing on demand.
#[derive(Clone)]
pub struct RecordingSink {
	/// Receives every request
	sent: UnboundedSender<RecordLocationRequest>,
	/// Whether requests currently fail
	failing: Arc<AtomicBool>,
}

impl RecordingSink {
	/// A sink that succeeds until told otherwise.
	pub fn new() -> (Self, UnboundedReceiver<RecordLocationRequest>) {
		let (sent, receiver) = mpsc::unbounded_channel();
		let sink = Self {
			sent,
			failing: Arc::new(AtomicBool::new(false)),
		};
		(sink, receiver)
	}

	/// Makes every following request fail, or succeed again.
	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}
}

impl LocationSink for RecordingSink {
	async fn record_fix(&self, request: RecordLocationRequest) -> Result<(), ApiErrorResponse> {
		let failing = self.failing.load(Ordering::SeqCst);
		_ = self.sent.send(request);
		if failing {
			Err(ApiErrorResponse::internal_server_error("connection reset"))
		} else {
			Ok(())
		}
	}
}

/// A wake lock that is always granted and counts what happened to it.
#[derive(Debug, Clone, Default)]
pub struct CountingWakeLock {
	/// How many times it was acquired
	acquires: Counter,
	/// How many times it was released
	releases: Counter,
}

impl CountingWakeLock {
	/// How many times it was acquired.
	pub fn acquired(&self) -> usize {
		self.acquires.get()
	}

	/// How many times it was released.
	pub fn released(&self) -> usize {
		self.releases.get()
	}
}

impl WakeLock for CountingWakeLock {
	fn acquire(&mut self) -> bool {
		self.acquires.bump();
		true
	}

	fn release(&mut self) {
		self.releases.bump();
	}
}

/// Everything the audio cue has been asked to do.
#[derive(Debug, Default)]
pub struct AudioLog {
	/// Whether it is currently playing
	pub playing: bool,
	/// The last volume set
	pub volume: Option<f64>,
	/// How many times playback started
	pub plays: usize,
	/// How many times playback paused
	pub pauses: usize,
}

/// An audio cue that records what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
	/// Shared with the test
	log: Arc<Mutex<AudioLog>>,
	/// Whether playback is refused
	blocked: Arc<AtomicBool>,
}

impl RecordingAudio {
	/// An audio cue that refuses to play.
	pub fn blocked() -> Self {
		let audio = Self::default();
		audio.blocked.store(true, Ordering::SeqCst);
		audio
	}

	/// Reads the log.
	pub fn inspect<R>(&self, read: impl FnOnce(&AudioLog) -> R) -> R {
		read(&self.log.lock().unwrap())
	}
}

impl AudioCue for RecordingAudio {
	fn play(&mut self) -> Result<(), AudioError> {
		if self.blocked.load(Ordering::SeqCst) {
			return Err(AudioError::Blocked("no user gesture".into()));
		}
		let mut log = self.log.lock().unwrap();
		log.playing = true;
		log.plays += 1;
		Ok(())
	}

	fn pause(&mut self) {
		let mut log = self.log.lock().unwrap();
		if log.playing {
			log.pauses += 1;
		}
		log.playing = false;
	}

	fn set_volume(&mut self, volume: f64) {
		self.log.lock().unwrap().volume = Some(volume);
	}
}

/// A feed whose updates are pushed in by the test. Once the sender is
/// dropped it never produces anything again.
pub struct ScriptedFeed {
	/// Where updates come from
	updates: UnboundedReceiver<FeedUpdate>,
}

impl ScriptedFeed {
	/// A feed that yields whatever is sent on the returned sender.
	pub fn new() -> (Self, UnboundedSender<FeedUpdate>) {
		let (sender, updates) = mpsc::unbounded_channel();
		(Self { updates }, sender)
	}
}

impl LocationFeed for ScriptedFeed {
	async fn next_update(&mut self) -> FeedUpdate {
		match self.updates.recv().await {
			Some(update) => update,
			None => future::pending().await,
		}
	}
}
