use std::sync::Arc;

use tokio::net::TcpListener;

use crate::{prelude::*, routes};

/// The global state of the application. This contains the configuration and
/// the store holding the sleigh's latest location. It is cloned into every
/// request handler.
#[derive(Clone)]
pub struct AppState {
	/// The application configuration.
	pub config: AppConfig,
	/// The single slot holding the last recorded fix. Kept behind a trait so
	/// tests can swap in their own store.
	pub location_store: Arc<dyn LocationStore>,
}

impl AppState {
	/// Creates the state with an in-memory store that follows the configured
	/// stale write policy.
	pub fn new(config: AppConfig) -> Self {
		let location_store = Arc::new(InMemoryLocationStore::new(
			config.location.stale_write_policy,
		));
		Self::with_store(config, location_store)
	}

	/// Creates the state around an existing store.
	pub fn with_store(config: AppConfig, location_store: Arc<dyn LocationStore>) -> Self {
		Self {
			config,
			location_store,
		}
	}
}

/// Binds to the configured address and serves the API until the process is
/// asked to exit.
#[instrument(skip(state))]
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
	let tcp_listener = TcpListener::bind(state.config.bind_address).await?;
	info!(
		"Listening for connections on {}",
		tcp_listener.local_addr()?
	);

	axum::serve(tcp_listener, routes::setup_routes(&state).await)
		.with_graceful_shutdown(exit_signal())
		.await?;

	info!("Server exited");
	Ok(())
}

/// Resolves once the process receives Ctrl+C or SIGTERM.
async fn exit_signal() {
	let ctrl_c = async {
		if let Err(err) = tokio::signal::ctrl_c().await {
			error!("Failed to listen for SIGINT: {}", err);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(err) => {
				error!("Failed to install SIGTERM handler: {}", err);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => (),
		_ = terminate => (),
	}
	info!("Shutdown signal received, shutting down server gracefully");
}
