use tracing::{level_filters::LevelFilter, Dispatch};
use tracing_subscriber::{
	fmt::{format::FmtSpan, Layer as FmtLayer},
	layer::SubscriberExt,
	Layer,
};

use crate::prelude::*;

/// Logs to stderr so stdout stays clean for command output. Progress is shown
/// at INFO, and each `-v` lowers the level by one.
pub fn initialize(verbosity: u8) -> anyhow::Result<()> {
	let level = match verbosity {
		0 => LevelFilter::INFO,
		1 => LevelFilter::DEBUG,
		_ => LevelFilter::TRACE,
	};

	tracing::dispatcher::set_global_default(Dispatch::new(
		tracing_subscriber::registry().with(
			FmtLayer::new()
				.with_writer(std::io::stderr)
				.with_span_events(FmtSpan::NONE)
				.event_format(
					tracing_subscriber::fmt::format()
						.with_ansi(true)
						.with_file(false)
						.with_target(verbosity > 0)
						.without_time()
						.compact(),
				)
				.with_filter(
					tracing_subscriber::filter::Targets::new()
						.with_target(env!("CARGO_CRATE_NAME"), LevelFilter::TRACE)
						.with_target("tracker", LevelFilter::TRACE)
						.with_target("models", LevelFilter::TRACE),
				)
				.with_filter(level),
		),
	))?;

	trace!("Logger initialized");
	Ok(())
}
