use std::time::Duration;

use axum::{
	http::{header::CONTENT_TYPE, HeaderValue, Method},
	Router,
};
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	trace::TraceLayer,
};

use crate::prelude::*;

/// The routes used during the Santa tour
mod santa_tour;

/// Sets up all the routes for the API.
#[instrument(skip(state))]
pub async fn setup_routes(state: &AppState) -> Router {
	santa_tour::setup_routes(state)
		.await
		.fallback(unknown_route)
		.layer(cors_layer(&state.config.allowed_origins))
		.layer(TraceLayer::new_for_http())
		.with_state(state.clone())
}

/// Answers any path the API doesn't serve.
async fn unknown_route() -> ApiErrorResponse {
	ApiErrorResponse::error(ErrorType::ResourceDoesNotExist)
}

/// Browsers call the API from the tour's map page, which may be served from a
/// different origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
	let layer = CorsLayer::new()
		.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
		.allow_headers([CONTENT_TYPE])
		.max_age(Duration::from_secs(60 * 60));

	if allowed_origins.is_empty() {
		return layer.allow_origin(Any);
	}

	let origins = allowed_origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(err) => {
				warn!("Ignoring invalid allowed origin `{}`: {}", origin, err);
				None
			}
		})
		.collect::<Vec<_>>();
	layer.allow_origin(AllowOrigin::list(origins))
}
