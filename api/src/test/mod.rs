use axum::{
	body::{to_bytes, Body},
	http::{header::CONTENT_TYPE, Method, Request, StatusCode},
	Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::{prelude::*, routes};

/// Tests for recording, reading and streaming the sleigh's location
mod location;

/// The configuration every test server runs with.
fn test_config(stale_write_policy: StaleWritePolicy) -> AppConfig {
	AppConfig {
		bind_address: "127.0.0.1:0".parse().unwrap(),
		environment: RunningEnvironment::Development,
		allowed_origins: Vec::new(),
		location: LocationConfig { stale_write_policy },
	}
}

/// Builds the state for a fresh server with an empty store.
fn test_state(stale_write_policy: StaleWritePolicy) -> AppState {
	AppState::new(test_config(stale_write_policy))
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
	let router = test_router(&test_state(StaleWritePolicy::default())).await;

	let (status, body) = send(&router, Method::GET, "/api/santa-tour/reindeer", None).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["success"], false);
	assert_eq!(body["error"], "resourceDoesNotExist");
}

/// Builds the router for the given state.
async fn test_router(state: &AppState) -> Router {
	routes::setup_routes(state).await
}

/// Sends a request through the router and returns the status along with the
/// parsed JSON body (or `Value::Null` when the body is empty).
async fn send(router: &Router, method: Method, path: &str, body: Option<&str>) -> (StatusCode, Value) {
	let mut request = Request::builder().method(method).uri(path);
	if body.is_some() {
		request = request.header(CONTENT_TYPE, "application/json");
	}
	let request = request
		.body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
		.unwrap();

	let response = router.clone().oneshot(request).await.unwrap();
	let status = response.status();
	let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	let body = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).unwrap()
	};
	(status, body)
}
