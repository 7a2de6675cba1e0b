use axum::Router;

use crate::prelude::*;

/// Recording and distributing the sleigh's location
mod location;

/// Sets up the routes under `/api/santa-tour`.
#[instrument(skip(state))]
pub async fn setup_routes(state: &AppState) -> Router<AppState> {
	location::setup_routes(state).await
}
