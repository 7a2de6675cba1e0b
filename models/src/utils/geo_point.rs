use serde::{Deserialize, Serialize};

/// Mean radius of the Earth in meters, as used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Represents a point on the globe in WGS-84 degrees. Used both for the
/// sleigh's reported position and for the viewer's own device position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct GeoPoint {
	/// The latitude of the point, between -90 and 90.
	pub lat: f64,
	/// The longitude of the point, between -180 and 180.
	pub lng: f64,
}

impl GeoPoint {
	/// Create a new point from a latitude and longitude in degrees.
	pub const fn new(lat: f64, lng: f64) -> Self {
		Self { lat, lng }
	}

	/// Whether both coordinates are finite and inside their WGS-84 ranges.
	pub fn is_valid(&self) -> bool {
		self.lat.is_finite() &&
			self.lng.is_finite() &&
			(-90.0..=90.0).contains(&self.lat) &&
			(-180.0..=180.0).contains(&self.lng)
	}

	/// Great-circle distance to `other` in meters, using the haversine
	/// formula on a spherical Earth.
	pub fn distance_to(&self, other: &GeoPoint) -> f64 {
		let lat_from = self.lat.to_radians();
		let lat_to = other.lat.to_radians();
		let delta_lat = (other.lat - self.lat).to_radians();
		let delta_lng = (other.lng - self.lng).to_radians();

		let a = (delta_lat / 2.0).sin().powi(2) +
			lat_from.cos() * lat_to.cos() * (delta_lng / 2.0).sin().powi(2);
		// rounding can push `a` a hair over 1 for antipodal points
		let c = 2.0 * a.sqrt().min(1.0).asin();

		EARTH_RADIUS_METERS * c
	}
}
