use std::time::Duration;

use futures::stream::BoxStream;
use models::utils::GeoPoint;
use time::OffsetDateTime;
use typed_builder::TypedBuilder;

/// Reads positions from a JSON-lines file or stdin
mod json_lines;
/// A position that never moves, for a viewer standing still
mod fixed;
/// Stand-ins for capabilities the device does not have
mod unsupported;

pub use self::{fixed::*, json_lines::*, unsupported::*};

/// A position reported by the device, before it is sent anywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceFix {
	/// Where the device thinks it is
	pub point: GeoPoint,
	/// Radius in meters of the confidence circle around `point`
	pub accuracy: f64,
	/// When the device captured this position
	pub captured_at: OffsetDateTime,
}

/// How the position watch should behave.
#[derive(Debug, Clone, TypedBuilder)]
pub struct WatchOptions {
	/// Ask for the most accurate position the device can give
	#[builder(default = true)]
	pub high_accuracy: bool,
	/// The oldest cached position the device may return
	#[builder(default = Duration::ZERO)]
	pub maximum_age: Duration,
	/// How long to wait for each position before reporting a timeout
	#[builder(default = Duration::from_secs(5))]
	pub timeout: Duration,
}

impl Default for WatchOptions {
	fn default() -> Self {
		Self::builder().build()
	}
}

/// Why the device could not give a position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
	/// The user refused to share their position
	#[error("Location permission was denied")]
	PermissionDenied,
	/// The device has no way of knowing where it is right now
	#[error("Location is unavailable: {0}")]
	Unavailable(String),
	/// No position arrived within the watch's timeout
	#[error("Timed out waiting for a location")]
	Timeout,
}

impl GeolocationError {
	/// Whether the watch should be torn down. A timeout only means the next
	/// position is late, so the watch keeps going.
	pub fn is_fatal(&self) -> bool {
		!matches!(self, Self::Timeout)
	}
}

/// A continuous stream of positions from the device.
pub type PositionStream = BoxStream<'static, Result<DeviceFix, GeolocationError>>;

/// Something that can report where the device is.
pub trait GeolocationProvider {
	/// Starts watching the device's position. Fails straight away if the
	/// device has no position capability at all.
	fn watch_position(&self, options: WatchOptions) -> Result<PositionStream, GeolocationError>;
}

/// Keeps the device's screen from sleeping while the driver is broadcasting.
/// Devices without one use [`NoopWakeLock`].
pub trait WakeLock {
	/// Requests the lock, returning whether it was granted. Failure is never
	/// fatal; broadcasting continues without it.
	fn acquire(&mut self) -> bool;

	/// Releases the lock if held.
	fn release(&mut self);
}

/// Why the bell could not be played.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
	/// Playback was refused, usually because the user has not interacted with
	/// the page yet
	#[error("Audio playback was blocked: {0}")]
	Blocked(String),
}

/// A looping sound whose volume can be changed while it plays.
pub trait AudioCue {
	/// Starts or resumes playback.
	fn play(&mut self) -> Result<(), AudioError>;

	/// Pauses playback. Does nothing if already paused.
	fn pause(&mut self);

	/// Sets the volume, from 0 (silent) to 1 (full).
	fn set_volume(&mut self, volume: f64);

	/// Unlocks playback with a play immediately followed by a pause. Must be
	/// called in response to the user asking for sound.
	fn prime(&mut self) -> Result<(), AudioError> {
		self.play()?;
		self.pause();
		Ok(())
	}
}

/// Waits for the next item from the watch, or forever if there is no watch.
pub(crate) async fn next_position(
	stream: &mut Option<PositionStream>,
) -> Option<Result<DeviceFix, GeolocationError>> {
	use futures::StreamExt;

	match stream {
		Some(stream) => stream.next().await,
		None => std::future::pending().await,
	}
}
