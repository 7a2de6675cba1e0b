use std::{future::Future, time::Duration};

use futures::StreamExt;
use tokio::{
	net::TcpStream,
	time::{Instant, Interval, MissedTickBehavior},
};
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::prelude::*;

/// How often the polling feed asks for the sleigh's location
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How long the streaming feed waits before reconnecting
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Something that can read the sleigh's latest fix. [`ApiClient`] reads it
/// from the server.
pub trait LocationSource: Send + Sync + 'static {
	/// The latest fix, or `None` if nothing has been recorded yet.
	fn current_fix(
		&self,
	) -> impl Future<Output = Result<Option<LocationFix>, ApiErrorResponse>> + Send;
}

/// One piece of news about the sleigh.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
	/// The sleigh's latest fix
	Fix(LocationFix),
	/// The server has no fix yet
	NoSignal,
	/// The server could not be reached. The feed will try again by itself.
	Unreachable(String),
}

/// A source of [`FeedUpdate`]s, either polled or pushed.
pub trait LocationFeed: Send + 'static {
	/// Waits for the next update.
	fn next_update(&mut self) -> impl Future<Output = FeedUpdate> + Send;
}

/// Asks a [`LocationSource`] for the latest fix on a fixed interval. The first
/// request goes out immediately.
pub struct PollingFeed<S> {
	/// Where fixes are read from
	source: S,
	/// Ticks once per poll
	interval: Interval,
}

impl<S> PollingFeed<S>
where
	S: LocationSource,
{
	/// Polls `source` every [`POLL_INTERVAL`].
	pub fn new(source: S) -> Self {
		Self::with_interval(source, POLL_INTERVAL)
	}

	/// Polls `source` every `period`.
	pub fn with_interval(source: S, period: Duration) -> Self {
		let mut interval = tokio::time::interval(period);
		// A slow response pushes the next poll back instead of bunching them up
		interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
		Self { source, interval }
	}
}

impl<S> LocationFeed for PollingFeed<S>
where
	S: LocationSource,
{
	async fn next_update(&mut self) -> FeedUpdate {
		self.interval.tick().await;
		match self.source.current_fix().await {
			Ok(Some(fix)) => FeedUpdate::Fix(fix),
			Ok(None) => FeedUpdate::NoSignal,
			Err(err) => FeedUpdate::Unreachable(err.to_string()),
		}
	}
}

/// Follows the websocket that pushes every new fix, reconnecting after
/// [`RECONNECT_DELAY`] whenever the connection drops.
pub struct StreamingFeed {
	/// The websocket URL
	url: Url,
	/// The open connection, if any
	socket: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
	/// How long to wait between connection attempts
	retry_delay: Duration,
	/// When the next connection attempt may be made
	retry_at: Option<Instant>,
}

impl StreamingFeed {
	/// Follows the websocket at `url`. Nothing is connected until the first
	/// update is asked for.
	pub fn new(url: Url) -> Self {
		Self {
			url,
			socket: None,
			retry_delay: RECONNECT_DELAY,
			retry_at: None,
		}
	}

	/// Waits `retry_delay` between connection attempts.
	pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
		self.retry_delay = retry_delay;
		self
	}

	/// Drops the connection and schedules the next attempt.
	fn disconnected(&mut self, reason: String) -> FeedUpdate {
		self.socket = None;
		self.retry_at = Some(Instant::now() + self.retry_delay);
		warn!("Location stream lost: {}", reason);
		FeedUpdate::Unreachable(reason)
	}
}

impl LocationFeed for StreamingFeed {
	async fn next_update(&mut self) -> FeedUpdate {
		loop {
			if self.socket.is_none() {
				if let Some(retry_at) = self.retry_at.take() {
					tokio::time::sleep_until(retry_at).await;
				}
				match tokio_tungstenite::connect_async(self.url.as_str()).await {
					Ok((socket, _)) => {
						info!("Connected to {}", self.url);
						self.socket = Some(socket);
					}
					Err(err) => return self.disconnected(err.to_string()),
				}
			}

			let Some(socket) = self.socket.as_mut() else {
				continue;
			};
			let message = socket.next().await;

			match message {
				Some(Ok(Message::Text(text))) => {
					match serde_json::from_str::<GetLocationResponse>(&text) {
						Ok(GetLocationResponse { fix: Some(fix) }) => return FeedUpdate::Fix(fix),
						Ok(GetLocationResponse { fix: None }) => return FeedUpdate::NoSignal,
						Err(err) => warn!("Ignoring unreadable location `{}`: {}", text, err),
					}
				}
				Some(Ok(Message::Close(_))) | None => {
					return self.disconnected("the server closed the connection".into());
				}
				Some(Err(err)) => return self.disconnected(err.to_string()),
				Some(Ok(_)) => (),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	};

	use ::time::macros::datetime;

	use super::*;

	/// Reports no fix for the first poll, then a fix, then an outage.
	#[derive(Clone, Default)]
	struct ScriptedSource {
		/// How many times the source was asked
		polls: Arc<AtomicUsize>,
	}

	fn fix() -> LocationFix {
		LocationFix {
			lat: 51.28,
			lng: -0.08,
			accuracy: 10.0,
			timestamp: datetime!(2025-12-20 18:30:00 UTC),
			active: true,
		}
	}

	impl LocationSource for ScriptedSource {
		async fn current_fix(&self) -> Result<Option<LocationFix>, ApiErrorResponse> {
			match self.polls.fetch_add(1, Ordering::SeqCst) {
				0 => Ok(None),
				1 => Ok(Some(fix())),
				_ => Err(ApiErrorResponse::internal_server_error("connection refused")),
			}
		}
	}

	#[tokio::test(start_paused = true)]
	async fn polls_immediately_then_every_interval() {
		let source = ScriptedSource::default();
		let mut feed = PollingFeed::new(source.clone());
		let started = Instant::now();

		assert_eq!(feed.next_update().await, FeedUpdate::NoSignal);
		assert_eq!(started.elapsed(), Duration::ZERO);

		assert_eq!(feed.next_update().await, FeedUpdate::Fix(fix()));
		assert_eq!(started.elapsed(), POLL_INTERVAL);

		assert!(matches!(
			feed.next_update().await,
			FeedUpdate::Unreachable(_)
		));
		assert_eq!(started.elapsed(), POLL_INTERVAL * 2);
		assert_eq!(source.polls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn unreachable_stream_waits_before_reconnecting() {
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let address = listener.local_addr().unwrap();
		drop(listener);

		let mut feed =
			StreamingFeed::new(format!("ws://{address}/api/santa-tour/location/stream").parse().unwrap())
				.with_retry_delay(Duration::from_secs(3));

		assert!(matches!(
			feed.next_update().await,
			FeedUpdate::Unreachable(_)
		));
		let failed_at = Instant::now();
		assert!(matches!(
			feed.next_update().await,
			FeedUpdate::Unreachable(_)
		));
		assert!(failed_at.elapsed() >= Duration::from_secs(3));
	}
}
