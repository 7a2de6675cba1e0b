use axum::{
	extract::{
		rejection::JsonRejection,
		ws::{Message, WebSocket, WebSocketUpgrade},
		State,
	},
	response::Response,
	Json,
	Router,
};
use time::OffsetDateTime;
use tokio::sync::watch;

use crate::prelude::*;

/// Sets up the endpoints for recording and reading the sleigh's location.
#[instrument(skip(state))]
pub async fn setup_routes(state: &AppState) -> Router<AppState> {
	debug!(
		"Location writes use the {:?} policy",
		state.config.location.stale_write_policy
	);
	Router::<AppState>::new()
		.mount_endpoint::<RecordLocationEndpoint, _, _>(record_location)
		.mount_endpoint::<GetLocationEndpoint, _, _>(get_location)
		.mount_endpoint::<StreamLocationEndpoint, _, _>(stream_location)
}

/// Replaces the stored fix with the one sent by the driver.
async fn record_location(
	State(state): State<AppState>,
	body: Result<Json<RecordLocationRequest>, JsonRejection>,
) -> Result<Json<RecordLocationResponse>, ApiErrorResponse> {
	let Json(request) = body.map_err(|rejection| {
		debug!("Rejecting malformed location: {}", rejection.body_text());
		ApiErrorResponse::error_with_message(ErrorType::WrongParameters, rejection.body_text())
	})?;
	request.validate().map_err(|error| {
		debug!(
			"Rejecting impossible location ({}, {}) with accuracy {}",
			request.lat, request.lng, request.accuracy
		);
		ApiErrorResponse::error(error)
	})?;

	let fix = request.into_fix(OffsetDateTime::now_utc());
	state
		.location_store
		.record_fix(fix)
		.map_err(ApiErrorResponse::error)?;

	Ok(Json(RecordLocationResponse::updated()))
}

/// Returns the stored fix, or `null` if nothing has been recorded.
async fn get_location(State(state): State<AppState>) -> Json<GetLocationResponse> {
	Json(GetLocationResponse {
		fix: state.location_store.current_fix(),
	})
}

/// Upgrades to a websocket that pushes every new fix as it is stored.
async fn stream_location(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
	let receiver = state.location_store.subscribe();
	ws.on_upgrade(move |socket| forward_fixes(socket, receiver))
}

/// Sends the current fix, then the new one each time the store changes, until
/// the viewer goes away.
async fn forward_fixes(mut socket: WebSocket, mut receiver: watch::Receiver<Option<LocationFix>>) {
	trace!("Viewer subscribed to location updates");
	'send: loop {
		let fix = receiver.borrow_and_update().clone();
		let payload = match serde_json::to_string(&GetLocationResponse { fix }) {
			Ok(payload) => payload,
			Err(err) => {
				error!("Failed to serialize location fix: {}", err);
				break;
			}
		};
		if let Err(err) = socket.send(Message::Text(payload)).await {
			debug!("Viewer connection dropped: {}", err);
			break;
		}

		loop {
			tokio::select! {
				changed = receiver.changed() => {
					if changed.is_err() {
						break 'send;
					}
					continue 'send;
				}
				message = socket.recv() => match message {
					Some(Ok(Message::Close(_))) | None => break 'send,
					Some(Err(err)) => {
						debug!("Viewer connection errored: {}", err);
						break 'send;
					}
					// Pings are answered by the websocket itself
					Some(Ok(_)) => (),
				}
			}
		}
	}
	trace!("Viewer unsubscribed from location updates");
}
