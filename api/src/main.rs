#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! The API server for the sleigh tracker. It holds the single latest location
//! fix reported by the driver and hands it out to every map viewer, either on
//! request or over a websocket as new fixes arrive.

/// All items related to the global state of the server and running it
mod app;
/// All the routes served by the API
mod routes;
/// Where the latest location fix is kept
mod store;
/// Tests that drive the server through its HTTP routes
#[cfg(test)]
mod test;
/// Utilities such as the config parser, the logger and router helpers
mod utils;

/// A prelude that re-exports commonly used items.
pub mod prelude {
	pub use models::prelude::*;
	pub use tracing::{debug, error, info, instrument, trace, warn};

	pub use crate::{
		app::AppState,
		store::{InMemoryLocationStore, LocationStore},
		utils::{config::*, RouterExt},
	};
}

use crate::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let config = utils::config::parse_config()?;
	utils::logger::initialize(&config)?;
	info!(
		"Configuration read. Running environment set to {}",
		config.environment
	);

	let state = AppState::new(config);
	debug!("Location store initialized");

	app::start_server(state).await
}
