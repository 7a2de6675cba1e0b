use std::io::{self, IsTerminal, Write};

use tracker::prelude::{AudioCue, AudioError};

use crate::prelude::*;

/// Rings the terminal bell when the sleigh comes into range. A terminal can't
/// loop a sound or change its volume, so the bell rings once each time
/// playback starts and the volume is only logged.
#[derive(Debug, Clone, Default)]
pub struct TerminalBell {
	/// Whether the bell is "playing"
	playing: bool,
}

impl AudioCue for TerminalBell {
	fn play(&mut self) -> Result<(), AudioError> {
		if self.playing {
			return Ok(());
		}
		let mut stderr = io::stderr();
		stderr
			.write_all(b"\x07")
			.and_then(|()| stderr.flush())
			.map_err(|err| AudioError::Blocked(err.to_string()))?;
		self.playing = true;
		Ok(())
	}

	fn pause(&mut self) {
		self.playing = false;
	}

	fn set_volume(&mut self, volume: f64) {
		debug!("Bell volume set to {:.0}%", volume * 100.0);
	}

	fn prime(&mut self) -> Result<(), AudioError> {
		if io::stderr().is_terminal() {
			Ok(())
		} else {
			Err(AudioError::Blocked("stderr is not a terminal".into()))
		}
	}
}
