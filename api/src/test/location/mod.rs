use std::sync::Arc;

use axum::http::{Method, StatusCode};
use futures::StreamExt;
use serde_json::{json, Value};
use time::macros::datetime;
use tokio::{net::TcpListener, sync::watch};
use tokio_tungstenite::tungstenite::Message;

use super::{send, test_config, test_router, test_state};
use crate::prelude::*;

const LOCATION: &str = RecordLocationEndpoint::PATH;

#[tokio::test]
async fn location_is_null_before_anything_is_recorded() {
	let router = test_router(&test_state(StaleWritePolicy::LastWriterWins)).await;

	let (status, body) = send(&router, Method::GET, LOCATION, None).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn recorded_fix_is_returned_to_viewers() {
	let router = test_router(&test_state(StaleWritePolicy::LastWriterWins)).await;

	let (status, body) = send(
		&router,
		Method::POST,
		LOCATION,
		Some(r#"{"lat":51.28,"lng":-0.08,"accuracy":12,"active":true}"#),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({ "message": "Location updated" }));

	let (status, body) = send(&router, Method::GET, LOCATION, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["lat"], 51.28);
	assert_eq!(body["lng"], -0.08);
	assert_eq!(body["accuracy"], 12.0);
	assert_eq!(body["active"], true);
	assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn later_write_replaces_earlier_one() {
	let router = test_router(&test_state(StaleWritePolicy::LastWriterWins)).await;

	for lat in [51.28, 51.29] {
		let body = json!({ "lat": lat, "lng": -0.08, "accuracy": 8, "active": true }).to_string();
		let (status, _) = send(&router, Method::POST, LOCATION, Some(body.as_str())).await;
		assert_eq!(status, StatusCode::OK);
	}

	let (_, body) = send(&router, Method::GET, LOCATION, None).await;
	assert_eq!(body["lat"], 51.29);
}

#[tokio::test]
async fn capture_time_from_the_device_is_kept() {
	let router = test_router(&test_state(StaleWritePolicy::LastWriterWins)).await;

	send(
		&router,
		Method::POST,
		LOCATION,
		Some(
			r#"{"lat":51.28,"lng":-0.08,"accuracy":12,"active":true,"capturedAt":"2025-12-20T18:30:00Z"}"#,
		),
	)
	.await;

	let (_, body) = send(&router, Method::GET, LOCATION, None).await;
	assert_eq!(body["timestamp"], "2025-12-20T18:30:00Z");
}

#[tokio::test]
async fn impossible_coordinates_are_rejected() {
	let state = test_state(StaleWritePolicy::LastWriterWins);
	let router = test_router(&state).await;

	let (status, body) = send(
		&router,
		Method::POST,
		LOCATION,
		Some(r#"{"lat":95.0,"lng":-0.08,"accuracy":12,"active":true}"#),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["success"], false);
	assert_eq!(body["error"], "wrongParameters");
	assert_eq!(state.location_store.current_fix(), None);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
	let router = test_router(&test_state(StaleWritePolicy::LastWriterWins)).await;

	let (status, body) = send(&router, Method::POST, LOCATION, Some(r#"{"lat":"north"}"#)).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "wrongParameters");
}

#[tokio::test]
async fn older_fix_is_refused_when_configured() {
	let router = test_router(&test_state(StaleWritePolicy::RejectOlder)).await;

	let newer = r#"{"lat":51.28,"lng":-0.08,"accuracy":5,"active":true,"capturedAt":"2025-12-20T18:30:10Z"}"#;
	let older = r#"{"lat":51.30,"lng":-0.08,"accuracy":5,"active":true,"capturedAt":"2025-12-20T18:30:00Z"}"#;

	let (status, _) = send(&router, Method::POST, LOCATION, Some(newer)).await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = send(&router, Method::POST, LOCATION, Some(older)).await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["error"], "staleLocationFix");

	let (_, body) = send(&router, Method::GET, LOCATION, None).await;
	assert_eq!(body["lat"], 51.28);
}

#[tokio::test]
async fn stream_pushes_current_and_new_fixes() {
	let state = test_state(StaleWritePolicy::LastWriterWins);
	let router = test_router(&state).await;

	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let address = listener.local_addr().unwrap();
	tokio::spawn(async move { axum::serve(listener, router).await });

	let (mut socket, _) = tokio_tungstenite::connect_async(format!(
		"ws://{address}{}",
		StreamLocationEndpoint::PATH
	))
	.await
	.unwrap();

	let Some(Ok(Message::Text(first))) = socket.next().await else {
		panic!("expected the current location on connect");
	};
	assert_eq!(first, "null");

	let fix = LocationFix {
		lat: 51.28,
		lng: -0.08,
		accuracy: 9.0,
		timestamp: datetime!(2025-12-20 18:30:00 UTC),
		active: true,
	};
	state.location_store.record_fix(fix.clone()).unwrap();

	let Some(Ok(Message::Text(update))) = socket.next().await else {
		panic!("expected a pushed update");
	};
	let update: GetLocationResponse = serde_json::from_str(&update).unwrap();
	assert_eq!(update.fix, Some(fix));
}

/// A store that already holds a fix and refuses every write.
struct FrozenStore {
	/// The fix it always holds
	slot: watch::Sender<Option<LocationFix>>,
}

impl LocationStore for FrozenStore {
	fn record_fix(&self, _: LocationFix) -> Result<(), ErrorType> {
		Err(ErrorType::StaleLocationFix)
	}

	fn current_fix(&self) -> Option<LocationFix> {
		self.slot.borrow().clone()
	}

	fn subscribe(&self) -> watch::Receiver<Option<LocationFix>> {
		self.slot.subscribe()
	}
}

#[tokio::test]
async fn routes_read_and_write_through_the_injected_store() {
	let fix = LocationFix {
		lat: 51.5,
		lng: -0.12,
		accuracy: 7.0,
		timestamp: datetime!(2025-12-24 22:00:00 UTC),
		active: true,
	};
	let (slot, _) = watch::channel(Some(fix));
	let state = AppState::with_store(
		test_config(StaleWritePolicy::LastWriterWins),
		Arc::new(FrozenStore { slot }),
	);
	let router = test_router(&state).await;

	let (status, body) = send(&router, Method::GET, LOCATION, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["lat"], 51.5);
	assert_eq!(body["timestamp"], "2025-12-24T22:00:00Z");

	let (status, body) = send(
		&router,
		Method::POST,
		LOCATION,
		Some(r#"{"lat":51.28,"lng":-0.08,"accuracy":12,"active":true}"#),
	)
	.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["error"], "staleLocationFix");

	let (_, body) = send(&router, Method::GET, LOCATION, None).await;
	assert_eq!(body["lat"], 51.5);
}
