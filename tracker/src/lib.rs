#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! The client side of the sleigh tracker.
//!
//! The [`producer`] runs on the driver's device. It watches the device's
//! position, drops fixes that aren't accurate enough and sends the rest to the
//! server. The [`consumer`] runs on every viewer's device. It follows the
//! sleigh's location from the server and plays a bell that gets louder as the
//! sleigh gets closer.
//!
//! Device capabilities (position, wake lock, audio) are behind the traits in
//! [`platform`], so the same state machines drive a terminal, a test or
//! anything else that can provide them.

/// The HTTP client for the location API
pub mod client;
/// The viewer side: following the sleigh and the proximity bell
pub mod consumer;
/// Traits for the device capabilities used by the producer and consumer
pub mod platform;
/// The driver side: broadcasting the sleigh's position
pub mod producer;
/// Deciding whether the API can be trusted with a device's position
pub mod secure_context;

#[cfg(test)]
mod test_support;

/// A prelude that re-exports commonly used items.
pub mod prelude {
	pub use models::prelude::*;
	pub use tracing::{debug, error, info, instrument, trace, warn};

	pub use crate::{
		client::ApiClient,
		consumer::{
			AlertDecision,
			Consumer,
			ConsumerControl,
			ConsumerSnapshot,
			FeedUpdate,
			LocationFeed,
			LocationSource,
			PollingFeed,
			ProximityMonitor,
			SignalStatus,
			StreamingFeed,
		},
		platform::{
			AudioCue,
			AudioError,
			DeviceFix,
			FixedPosition,
			GeolocationError,
			GeolocationProvider,
			JsonLinesGeolocation,
			NoopWakeLock,
			PositionStream,
			UnsupportedGeolocation,
			WakeLock,
			WatchOptions,
		},
		producer::{
			FixDecision,
			LocationSink,
			Producer,
			ProducerControl,
			TrackingError,
			TrackingState,
			TrackingStatus,
		},
	};
}
