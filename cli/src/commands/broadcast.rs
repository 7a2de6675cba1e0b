use std::{path::PathBuf, time::Duration};

use clap::Args;
use tokio::sync::mpsc;
use tracker::prelude::{
	GeolocationError,
	JsonLinesGeolocation,
	NoopWakeLock,
	Producer,
	ProducerControl,
	TrackingError,
	TrackingState,
	WatchOptions,
};

use crate::prelude::*;

/// Arguments for broadcasting the sleigh's position.
#[derive(Debug, Clone, Args)]
pub struct BroadcastArgs {
	/// A file of device positions, one JSON object per line with `lat`, `lng`,
	/// `accuracy` and an optional RFC 3339 `timestamp`. Reads stdin if not
	/// given or `-`.
	#[arg(short, long, default_value = "-")]
	pub source: PathBuf,
	/// How many seconds to wait for each position before reporting that the
	/// device is taking too long
	#[arg(long, default_value_t = 5)]
	pub fix_timeout: u64,
}

/// Broadcasts every accurate enough position from the source until the
/// source ends, the device fails or the driver presses Ctrl+C.
pub(super) async fn execute(
	args: BroadcastArgs,
	_global_args: GlobalArgs,
	client: ApiClient,
) -> Result<CommandOutput, ApiErrorResponse> {
	let geolocation = if args.source.as_os_str() == "-" {
		JsonLinesGeolocation::stdin()
	} else {
		JsonLinesGeolocation::open(&args.source).await.map_err(|err| {
			ApiErrorResponse::error_with_message(
				ErrorType::WrongParameters,
				format!("Cannot read `{}`: {}", args.source.display(), err),
			)
		})?
	};

	if !client.is_secure_context() {
		warn!(
			"{} is neither HTTPS nor local, so broadcasting will be refused",
			client.base_url()
		);
	}

	let producer = Producer::new(
		geolocation,
		NoopWakeLock,
		client.clone(),
		client.is_secure_context(),
	)
	.with_watch_options(
		WatchOptions::builder()
			.timeout(Duration::from_secs(args.fix_timeout))
			.build(),
	);

	let (controls, control_rx) = mpsc::channel(1);
	controls
		.send(ProducerControl::Start)
		.await
		.map_err(|err| ApiErrorResponse::internal_server_error(err.to_string()))?;

	let mut state = producer.state();
	let reporter = tokio::spawn(async move {
		let mut last_fix = None;
		loop {
			tokio::select! {
				_ = tokio::signal::ctrl_c() => {
					info!("Stopping the broadcast");
					_ = controls.send(ProducerControl::Stop).await;
					break;
				}
				changed = state.changed() => {
					if changed.is_err() {
						break;
					}
					let current = state.borrow_and_update().clone();
					info!("{}", current);
					match current {
						TrackingState::Broadcasting { last_fix: fix, .. } => last_fix = Some(fix),
						TrackingState::Error(_) | TrackingState::Stopped => break,
						_ => (),
					}
				}
			}
		}
		// Closing the controls ends the run
		drop(controls);
		last_fix
	});

	let final_state = producer.run(control_rx).await;
	let last_fix = reporter.await.ok().flatten();
	check_outcome(&final_state, last_fix.is_some())?;

	CommandOutput {
		text: format!("Broadcast ended. {}", final_state),
		json: serde_json::json!({
			"state": final_state.to_string(),
			"lastFix": last_fix.map(|fix| {
				serde_json::json!({
					"lat": fix.point.lat,
					"lng": fix.point.lng,
					"accuracy": fix.accuracy,
				})
			}),
		}),
	}
	.into_result()
}

/// Fails the command if the broadcast was refused or the device gave up. The
/// source running dry after something was sent is the normal way for a
/// broadcast to end.
fn check_outcome(final_state: &TrackingState, broadcast_any: bool) -> Result<(), ApiErrorResponse> {
	match final_state {
		TrackingState::Error(TrackingError::Geolocation(GeolocationError::Unavailable(_)))
			if broadcast_any =>
		{
			Ok(())
		}
		TrackingState::Error(err) => Err(ApiErrorResponse::error_with_message(
			ErrorType::WrongParameters,
			format!("Broadcast failed: {}", err),
		)),
		_ => Ok(()),
	}
}
