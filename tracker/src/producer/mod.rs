use std::future::Future;

use tokio::sync::{mpsc, watch};

use crate::{
	platform::{next_position, PositionStream},
	prelude::*,
};

/// The broadcast state machine and its transitions
mod state;

pub use self::state::*;

/// Where accepted fixes are sent. [`ApiClient`] sends them to the server.
pub trait LocationSink: Clone + Send + Sync + 'static {
	/// Sends a fix. Nothing is retried; the next accepted fix is the retry.
	fn record_fix(
		&self,
		request: RecordLocationRequest,
	) -> impl Future<Output = Result<(), ApiErrorResponse>> + Send;
}

/// What the driver can ask the broadcaster to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerControl {
	/// Start broadcasting
	Start,
	/// Stop broadcasting
	Stop,
}

/// Broadcasts the device's position while the driver has it switched on.
///
/// The producer reacts to three independent inputs: the driver's controls,
/// positions from the device, and the results of earlier sends. Sends are
/// never awaited, so a slow network never holds up the next position.
pub struct Producer<G, W, S> {
	/// Where positions come from
	geolocation: G,
	/// Keeps the screen on while broadcasting
	wake_lock: W,
	/// Where accepted positions go
	sink: S,
	/// Whether the API can be trusted with the device's position
	secure_context: bool,
	/// Passed to the device when the watch is opened
	watch_options: WatchOptions,
	/// The current state. Every change is published on `state_tx`.
	state: TrackingState,
	/// Publishes the state to whatever is showing it to the driver
	state_tx: watch::Sender<TrackingState>,
}

impl<G, W, S> Producer<G, W, S>
where
	G: GeolocationProvider,
	W: WakeLock,
	S: LocationSink,
{
	/// Creates an idle producer.
	pub fn new(geolocation: G, wake_lock: W, sink: S, secure_context: bool) -> Self {
		let (state_tx, _) = watch::channel(TrackingState::Idle);
		Self {
			geolocation,
			wake_lock,
			sink,
			secure_context,
			watch_options: WatchOptions::default(),
			state: TrackingState::Idle,
			state_tx,
		}
	}

	/// Uses the given options when opening the watch.
	pub fn with_watch_options(mut self, watch_options: WatchOptions) -> Self {
		self.watch_options = watch_options;
		self
	}

	/// A receiver for every change of state.
	pub fn state(&self) -> watch::Receiver<TrackingState> {
		self.state_tx.subscribe()
	}

	/// Runs until `controls` is closed, then stops broadcasting and returns
	/// the final state.
	pub async fn run(mut self, mut controls: mpsc::Receiver<ProducerControl>) -> TrackingState {
		let mut positions = None;
		let (results_tx, mut results) = mpsc::unbounded_channel();

		loop {
			tokio::select! {
				control = controls.recv() => match control {
					Some(ProducerControl::Start) => self.start(&mut positions),
					Some(ProducerControl::Stop) => self.stop(&mut positions),
					None => {
						self.stop(&mut positions);
						break;
					}
				},
				position = next_position(&mut positions) => match position {
					Some(Ok(fix)) => self.on_fix(fix, &results_tx),
					Some(Err(err)) => self.on_geolocation_error(err, &mut positions),
					None => self.on_geolocation_error(
						GeolocationError::Unavailable("the position watch ended".into()),
						&mut positions,
					),
				},
				Some(succeeded) = results.recv() => {
					self.state.on_submission(succeeded);
					self.publish();
				}
			}
		}

		self.state
	}

	/// Opens the watch and takes the wake lock.
	fn start(&mut self, positions: &mut Option<PositionStream>) {
		let geolocation = &self.geolocation;
		let options = self.watch_options.clone();
		match self
			.state
			.start(self.secure_context, || geolocation.watch_position(options))
		{
			Some(stream) => {
				*positions = Some(stream);
				if !self.wake_lock.acquire() {
					debug!("Broadcasting without a wake lock");
				}
				info!("Broadcast started");
			}
			None => warn!("Broadcast not started: {}", self.state),
		}
		self.publish();
	}

	/// Tears down the watch and releases the wake lock.
	fn stop(&mut self, positions: &mut Option<PositionStream>) {
		if self.state.stop() {
			*positions = None;
			self.wake_lock.release();
			info!("Broadcast stopped");
			self.publish();
		}
	}

	/// Sends the position if it is accurate enough.
	fn on_fix(&mut self, fix: DeviceFix, results: &mpsc::UnboundedSender<bool>) {
		match self.state.on_fix(fix) {
			FixDecision::Transmit(fix) => {
				let sink = self.sink.clone();
				let results = results.clone();
				let request = RecordLocationRequest {
					lat: fix.point.lat,
					lng: fix.point.lng,
					accuracy: fix.accuracy,
					active: true,
					captured_at: Some(fix.captured_at),
				};
				tokio::spawn(async move {
					let succeeded = match sink.record_fix(request).await {
						Ok(()) => true,
						Err(err) => {
							warn!("Failed to send location: {}", err);
							false
						}
					};
					_ = results.send(succeeded);
				});
			}
			FixDecision::Discard => trace!("Discarding fix with accuracy {}m", fix.accuracy),
			FixDecision::Ignore => (),
		}
		self.publish();
	}

	/// Tears down the watch if the error is fatal.
	fn on_geolocation_error(&mut self, error: GeolocationError, positions: &mut Option<PositionStream>) {
		if self.state.on_geolocation_error(error.clone()) {
			*positions = None;
			self.wake_lock.release();
			error!("Broadcast stopped: {}", error);
			self.publish();
		} else {
			debug!("Position watch reported: {}", error);
		}
	}

	/// Publishes the current state.
	fn publish(&self) {
		self.state_tx.send_replace(self.state.clone());
	}
}
