use tokio::sync::watch;

use crate::prelude::*;

/// The single slot holding the sleigh's last known location. Every accepted
/// write replaces whatever was there before; there is no history.
pub trait LocationStore: Send + Sync + 'static {
	/// Store a fix, replacing the current one. Fails only if the store refuses
	/// the write because it is older than the stored fix.
	fn record_fix(&self, fix: LocationFix) -> Result<(), ErrorType>;

	/// The last stored fix, or `None` if nothing has been recorded since the
	/// server started.
	fn current_fix(&self) -> Option<LocationFix>;

	/// A receiver that is notified every time a new fix is stored.
	fn subscribe(&self) -> watch::Receiver<Option<LocationFix>>;
}

/// A [`LocationStore`] kept in process memory. The contents are lost when the
/// server restarts.
#[derive(Debug)]
pub struct InMemoryLocationStore {
	/// The slot itself. Readers borrow the latest value and subscribers are
	/// woken on every accepted write.
	slot: watch::Sender<Option<LocationFix>>,
	/// How writes older than the stored fix are treated
	policy: StaleWritePolicy,
}

impl InMemoryLocationStore {
	/// Creates an empty store.
	pub fn new(policy: StaleWritePolicy) -> Self {
		let (slot, _) = watch::channel(None);
		Self { slot, policy }
	}
}

impl Default for InMemoryLocationStore {
	fn default() -> Self {
		Self::new(StaleWritePolicy::default())
	}
}

impl LocationStore for InMemoryLocationStore {
	fn record_fix(&self, fix: LocationFix) -> Result<(), ErrorType> {
		let mut rejected = false;
		self.slot.send_if_modified(|current| {
			if self.policy == StaleWritePolicy::RejectOlder {
				if let Some(stored) = current {
					if fix.timestamp < stored.timestamp {
						rejected = true;
						return false;
					}
				}
			}
			*current = Some(fix.clone());
			true
		});

		if rejected {
			debug!("Refusing fix captured at {}", fix.timestamp);
			return Err(ErrorType::StaleLocationFix);
		}
		trace!("Stored fix at ({}, {})", fix.lat, fix.lng);
		Ok(())
	}

	fn current_fix(&self) -> Option<LocationFix> {
		self.slot.borrow().clone()
	}

	fn subscribe(&self) -> watch::Receiver<Option<LocationFix>> {
		self.slot.subscribe()
	}
}
