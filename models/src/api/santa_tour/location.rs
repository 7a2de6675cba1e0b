use http::Method;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{utils::GeoPoint, ApiEndpoint, ErrorType};

/// The worst accuracy, in meters, that a driver's device may report for a fix
/// to be broadcast. Fixes with a larger confidence radius are dropped on the
/// device and never reach the server.
pub const MAX_BROADCAST_ACCURACY_METERS: f64 = 25.0;

/// The last known location of the sleigh. The server only ever holds one of
/// these; every accepted write replaces the previous one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationFix {
	/// Latitude in WGS-84 degrees
	pub lat: f64,
	/// Longitude in WGS-84 degrees
	pub lng: f64,
	/// Radius in meters of the reporting device's confidence circle
	pub accuracy: f64,
	/// When the fix was captured. This is the device time if the driver sent
	/// one, otherwise the time the server received it.
	#[serde(with = "time::serde::rfc3339")]
	pub timestamp: OffsetDateTime,
	/// Whether the driver was broadcasting when this fix was sent
	pub active: bool,
}

impl LocationFix {
	/// The position of the fix, without its accuracy and timing.
	pub fn position(&self) -> GeoPoint {
		GeoPoint::new(self.lat, self.lng)
	}

	/// How long ago the fix was captured, relative to `now`. There is no
	/// expiry on the server, so readers use this to judge freshness.
	pub fn age(&self, now: OffsetDateTime) -> Duration {
		now - self.timestamp
	}
}

/// The body sent by the driver for every fix that passes the accuracy filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordLocationRequest {
	/// Latitude in WGS-84 degrees
	pub lat: f64,
	/// Longitude in WGS-84 degrees
	pub lng: f64,
	/// Radius in meters of the device's confidence circle
	pub accuracy: f64,
	/// Whether the driver is currently broadcasting
	pub active: bool,
	/// When the device captured this fix, if it knows
	#[serde(
		default,
		with = "time::serde::rfc3339::option",
		skip_serializing_if = "Option::is_none"
	)]
	pub captured_at: Option<OffsetDateTime>,
}

impl RecordLocationRequest {
	/// Checks that the coordinates and accuracy describe a real place.
	pub fn validate(&self) -> Result<(), ErrorType> {
		if !GeoPoint::new(self.lat, self.lng).is_valid() {
			return Err(ErrorType::WrongParameters);
		}
		if !self.accuracy.is_finite() || self.accuracy < 0.0 {
			return Err(ErrorType::WrongParameters);
		}
		Ok(())
	}

	/// Turns the request into the fix that gets stored, stamping it with
	/// `received_at` when the device didn't send a capture time.
	pub fn into_fix(self, received_at: OffsetDateTime) -> LocationFix {
		LocationFix {
			lat: self.lat,
			lng: self.lng,
			accuracy: self.accuracy,
			timestamp: self.captured_at.unwrap_or(received_at),
			active: self.active,
		}
	}
}

/// The response sent back once a fix has been stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordLocationResponse {
	/// A human readable confirmation
	pub message: String,
}

impl RecordLocationResponse {
	/// The confirmation sent for every stored fix.
	pub fn updated() -> Self {
		Self {
			message: "Location updated".to_string(),
		}
	}
}

/// The current fix, or `null` on the wire when nothing has been recorded yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct GetLocationResponse {
	/// The last recorded fix, if any
	pub fix: Option<LocationFix>,
}

/// Record the sleigh's latest location. Used exclusively by the driver.
#[derive(Debug, Clone, Copy)]
pub struct RecordLocationEndpoint;

impl ApiEndpoint for RecordLocationEndpoint {
	const METHOD: Method = Method::POST;
	const PATH: &'static str = "/api/santa-tour/location";

	type RequestBody = RecordLocationRequest;
	type ResponseBody = RecordLocationResponse;
}

/// Read the sleigh's latest location. Polled by every map viewer.
#[derive(Debug, Clone, Copy)]
pub struct GetLocationEndpoint;

impl ApiEndpoint for GetLocationEndpoint {
	const METHOD: Method = Method::GET;
	const PATH: &'static str = "/api/santa-tour/location";

	type RequestBody = ();
	type ResponseBody = GetLocationResponse;
}

/// Upgrade to a websocket that pushes the current fix on connect and then
/// every new fix as it is recorded. Each message is a [`GetLocationResponse`].
#[derive(Debug, Clone, Copy)]
pub struct StreamLocationEndpoint;

impl ApiEndpoint for StreamLocationEndpoint {
	const METHOD: Method = Method::GET;
	const PATH: &'static str = "/api/santa-tour/location/stream";

	type RequestBody = ();
	type ResponseBody = GetLocationResponse;
}

#[cfg(test)]
mod test {
	use serde_json::json;
	use time::macros::datetime;

	use super::*;

	fn fix() -> LocationFix {
		LocationFix {
			lat: 51.28,
			lng: -0.08,
			accuracy: 10.0,
			timestamp: datetime!(2025-12-20 18:30:00 UTC),
			active: true,
		}
	}

	#[test]
	fn fix_serializes_with_rfc3339_timestamp() {
		assert_eq!(
			serde_json::to_value(fix()).unwrap(),
			json!({
				"lat": 51.28,
				"lng": -0.08,
				"accuracy": 10.0,
				"timestamp": "2025-12-20T18:30:00Z",
				"active": true,
			})
		);
	}

	#[test]
	fn empty_location_is_null_on_the_wire() {
		assert_eq!(
			serde_json::to_value(GetLocationResponse::default()).unwrap(),
			serde_json::Value::Null
		);
		let parsed: GetLocationResponse = serde_json::from_str("null").unwrap();
		assert_eq!(parsed.fix, None);
	}

	#[test]
	fn request_without_capture_time_is_stamped_on_receipt() {
		let request: RecordLocationRequest = serde_json::from_value(json!({
			"lat": 51.28,
			"lng": -0.08,
			"accuracy": 10,
			"active": true,
		}))
		.unwrap();
		assert_eq!(request.captured_at, None);

		let received_at = datetime!(2025-12-20 18:30:00 UTC);
		assert_eq!(request.into_fix(received_at), fix());
	}

	#[test]
	fn request_keeps_device_capture_time() {
		let request: RecordLocationRequest = serde_json::from_value(json!({
			"lat": 51.28,
			"lng": -0.08,
			"accuracy": 10,
			"active": true,
			"capturedAt": "2025-12-20T18:29:58Z",
		}))
		.unwrap();
		let stored = request.into_fix(datetime!(2025-12-20 18:30:00 UTC));
		assert_eq!(stored.timestamp, datetime!(2025-12-20 18:29:58 UTC));
	}

	#[test]
	fn validation_rejects_impossible_fixes() {
		let mut request = RecordLocationRequest {
			lat: 51.28,
			lng: -0.08,
			accuracy: 10.0,
			active: true,
			captured_at: None,
		};
		assert_eq!(request.validate(), Ok(()));

		request.lat = 123.0;
		assert_eq!(request.validate(), Err(ErrorType::WrongParameters));

		request.lat = 51.28;
		request.accuracy = -1.0;
		assert_eq!(request.validate(), Err(ErrorType::WrongParameters));
	}

	#[test]
	fn age_is_measured_from_capture_time() {
		let now = datetime!(2025-12-20 18:30:12 UTC);
		assert_eq!(fix().age(now), Duration::seconds(12));
	}
}
