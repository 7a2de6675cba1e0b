use std::fmt::{Display, Formatter};

use models::api::santa_tour::location::MAX_BROADCAST_ACCURACY_METERS;

use crate::platform::{DeviceFix, GeolocationError};

/// Why broadcasting stopped on its own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackingError {
	/// The API isn't served over a secure connection, so the device's position
	/// is never read
	#[error("Location sharing needs a secure (HTTPS) connection")]
	InsecureContext,
	/// The device could not give a position
	#[error(transparent)]
	Geolocation(#[from] GeolocationError),
}

/// What the driver sees while broadcasting is on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackingStatus {
	/// Waiting for the first position from the device
	AcquiringFix,
	/// The device has a position, but it isn't accurate enough to send
	ImprovingAccuracy {
		/// The accuracy of the last position, in meters
		accuracy: f64,
	},
	/// The last accurate position was sent
	Live {
		/// The accuracy of the last sent position, in meters
		accuracy: f64,
	},
	/// The last send failed. The next accurate position will try again.
	NetworkError,
}

impl Display for TrackingStatus {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::AcquiringFix => write!(f, "Acquiring GPS..."),
			Self::ImprovingAccuracy { accuracy } => {
				write!(f, "Improving accuracy ({:.0}m)", accuracy)
			}
			Self::Live { accuracy } => write!(f, "Live (±{:.0}m)", accuracy),
			Self::NetworkError => write!(f, "Network Error - Retrying"),
		}
	}
}

/// The state of the driver's broadcast.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TrackingState {
	/// Not broadcasting, and never has been
	#[default]
	Idle,
	/// The watch is open but nothing has been sent yet
	Initializing {
		/// What the driver sees
		status: TrackingStatus,
	},
	/// At least one accurate position has been seen
	Broadcasting {
		/// The last position that was accurate enough to send
		last_fix: DeviceFix,
		/// What the driver sees
		status: TrackingStatus,
	},
	/// Broadcasting stopped because of an error. It can be started again.
	Error(TrackingError),
	/// The driver stopped broadcasting
	Stopped,
}

/// What to do with a position from the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixDecision {
	/// Send it to the server
	Transmit(DeviceFix),
	/// Too inaccurate, drop it
	Discard,
	/// Broadcasting is off, so nobody asked for it
	Ignore,
}

impl TrackingState {
	/// Whether the watch is open.
	pub fn is_tracking(&self) -> bool {
		matches!(self, Self::Initializing { .. } | Self::Broadcasting { .. })
	}

	/// Whether broadcasting can be started from here.
	pub fn can_start(&self) -> bool {
		!self.is_tracking()
	}

	/// The status shown to the driver, if broadcasting.
	pub fn status(&self) -> Option<TrackingStatus> {
		match self {
			Self::Initializing { status } | Self::Broadcasting { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Starts broadcasting. `open_watch` is only called when the context is
	/// secure, and what it returns is handed back when the watch opened. Both
	/// an insecure context and a failed watch leave the state in
	/// [`TrackingState::Error`].
	pub fn start<T>(
		&mut self,
		secure_context: bool,
		open_watch: impl FnOnce() -> Result<T, GeolocationError>,
	) -> Option<T> {
		if !self.can_start() {
			return None;
		}
		if !secure_context {
			*self = Self::Error(TrackingError::InsecureContext);
			return None;
		}

		match open_watch() {
			Ok(watch) => {
				*self = Self::Initializing {
					status: TrackingStatus::AcquiringFix,
				};
				Some(watch)
			}
			Err(err) => {
				*self = Self::Error(err.into());
				None
			}
		}
	}

	/// Handles a position from the device. Only positions at or under the
	/// accuracy limit are sent.
	pub fn on_fix(&mut self, fix: DeviceFix) -> FixDecision {
		if !self.is_tracking() {
			return FixDecision::Ignore;
		}

		if fix.accuracy <= MAX_BROADCAST_ACCURACY_METERS {
			// A send failure stays on screen until a later send succeeds
			let status = match self {
				Self::Broadcasting {
					status: TrackingStatus::NetworkError,
					..
				} => TrackingStatus::NetworkError,
				_ => TrackingStatus::Live {
					accuracy: fix.accuracy,
				},
			};
			*self = Self::Broadcasting {
				last_fix: fix,
				status,
			};
			return FixDecision::Transmit(fix);
		}

		let status = TrackingStatus::ImprovingAccuracy {
			accuracy: fix.accuracy,
		};
		match self {
			Self::Broadcasting {
				status: current, ..
			} |
			Self::Initializing { status: current } => *current = status,
			_ => (),
		}
		FixDecision::Discard
	}

	/// Handles a failed watch. Returns whether the watch has to be torn down.
	pub fn on_geolocation_error(&mut self, error: GeolocationError) -> bool {
		if !self.is_tracking() || !error.is_fatal() {
			return false;
		}
		*self = Self::Error(error.into());
		true
	}

	/// Handles the result of sending a position to the server. A failure is
	/// shown until a later send succeeds.
	pub fn on_submission(&mut self, succeeded: bool) {
		let Self::Broadcasting { last_fix, status } = self else {
			return;
		};
		if !succeeded {
			*status = TrackingStatus::NetworkError;
		} else if *status == TrackingStatus::NetworkError {
			*status = TrackingStatus::Live {
				accuracy: last_fix.accuracy,
			};
		}
	}

	/// Stops broadcasting. Returns whether there was a watch to tear down.
	pub fn stop(&mut self) -> bool {
		let was_tracking = self.is_tracking();
		if was_tracking {
			*self = Self::Stopped;
		}
		was_tracking
	}
}

impl Display for TrackingState {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Idle => write!(f, "Ready to broadcast"),
			Self::Initializing { status } | Self::Broadcasting { status, .. } => {
				write!(f, "{}", status)
			}
			Self::Error(err) => write!(f, "Error: {}", err),
			Self::Stopped => write!(f, "Broadcast stopped"),
		}
	}
}
