use models::utils::GeoPoint;

/// Within this many meters of the sleigh, the bell starts to play.
pub const ALERT_RADIUS_METERS: f64 = 500.0;

/// The bell's volume at `distance` meters from the sleigh: full volume on top
/// of it, fading linearly to silence at [`ALERT_RADIUS_METERS`].
pub fn alert_volume(distance: f64) -> f64 {
	(1.0 - distance / ALERT_RADIUS_METERS).clamp(0.0, 1.0)
}

/// What the bell should be doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertDecision {
	/// Play (or keep playing) at the given volume
	Play {
		/// From 0 to 1
		volume: f64,
	},
	/// Pause, so playback can resume from the same point later
	Pause,
}

/// Works out how far the viewer is from the sleigh and what the bell should be
/// doing about it. Everything is recomputed from the latest inputs each time,
/// so the order updates arrive in doesn't matter.
#[derive(Debug, Clone, Default)]
pub struct ProximityMonitor {
	/// Where the sleigh last was
	sleigh: Option<GeoPoint>,
	/// Where the viewer is
	viewer: Option<GeoPoint>,
	/// Whether the viewer has switched the sound on
	audio_enabled: bool,
}

impl ProximityMonitor {
	/// Creates a monitor with nothing known and the sound off.
	pub fn new() -> Self {
		Self::default()
	}

	/// Whether the sound is on.
	pub fn audio_enabled(&self) -> bool {
		self.audio_enabled
	}

	/// Moves the sleigh.
	pub fn set_sleigh(&mut self, sleigh: GeoPoint) {
		self.sleigh = Some(sleigh);
	}

	/// Forgets the sleigh, e.g. when the server has no fix.
	pub fn clear_sleigh(&mut self) {
		self.sleigh = None;
	}

	/// Moves the viewer.
	pub fn set_viewer(&mut self, viewer: GeoPoint) {
		self.viewer = Some(viewer);
	}

	/// Switches the sound on or off.
	pub fn set_audio_enabled(&mut self, enabled: bool) {
		self.audio_enabled = enabled;
	}

	/// The distance from the viewer to the sleigh, rounded to the meter. `None`
	/// until both positions are known.
	pub fn distance_meters(&self) -> Option<u32> {
		let (sleigh, viewer) = (self.sleigh?, self.viewer?);
		Some(sleigh.distance_to(&viewer).round() as u32)
	}

	/// What the bell should be doing right now.
	pub fn decision(&self) -> AlertDecision {
		if !self.audio_enabled {
			return AlertDecision::Pause;
		}
		match self.distance_meters() {
			Some(distance) if f64::from(distance) < ALERT_RADIUS_METERS => AlertDecision::Play {
				volume: alert_volume(f64::from(distance)),
			},
			_ => AlertDecision::Pause,
		}
	}
}
