use tracing::{level_filters::LevelFilter, Dispatch, Level};
use tracing_subscriber::{
	fmt::{format::FmtSpan, Layer as FmtLayer},
	layer::SubscriberExt,
	Layer,
};

use crate::prelude::*;

/// Installs the global tracing subscriber. Everything from this crate and
/// `models` is logged along with the request spans from `tower_http`, capped
/// at TRACE in development and DEBUG in production.
pub fn initialize(config: &AppConfig) -> anyhow::Result<()> {
	tracing::dispatcher::set_global_default(Dispatch::new(
		tracing_subscriber::registry().with(
			FmtLayer::new()
				.with_span_events(FmtSpan::NONE)
				.event_format(
					tracing_subscriber::fmt::format()
						.with_ansi(true)
						.with_file(false)
						.without_time()
						.compact(),
				)
				.with_filter(
					tracing_subscriber::filter::Targets::new()
						.with_target(env!("CARGO_PKG_NAME"), LevelFilter::TRACE)
						.with_target("models", LevelFilter::TRACE)
						.with_target("tower_http", LevelFilter::DEBUG),
				)
				.with_filter(LevelFilter::from_level(
					if config.environment == RunningEnvironment::Development {
						Level::TRACE
					} else {
						Level::DEBUG
					},
				)),
		),
	))?;

	trace!("Logger initialized");
	Ok(())
}
