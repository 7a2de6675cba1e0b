use super::{GeolocationError, GeolocationProvider, PositionStream, WakeLock, WatchOptions};
use crate::prelude::*;

/// A wake lock for devices that have none. Requests are never granted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
	fn acquire(&mut self) -> bool {
		debug!("Wake lock is not supported on this device");
		false
	}

	fn release(&mut self) {}
}

/// A device with no position capability. Every watch fails immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedGeolocation;

impl GeolocationProvider for UnsupportedGeolocation {
	fn watch_position(&self, _: WatchOptions) -> Result<PositionStream, GeolocationError> {
		Err(GeolocationError::Unavailable(
			"geolocation is not supported on this device".into(),
		))
	}
}
