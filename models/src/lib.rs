#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Wire types shared by the sleigh tracker's API server and its clients.
//!
//! Everything that crosses the network lives here: the [`LocationFix`] that
//! the driver's device reports, the endpoint declarations that both sides
//! route and request against, and the error body returned on failures.
//!
//! [`LocationFix`]: api::santa_tour::location::LocationFix

/// All the endpoints exposed by the API, grouped by the area they belong to
pub mod api;
/// Utility types used across the models
pub mod utils;

/// A prelude that re-exports the commonly used items of this crate.
pub mod prelude {
	pub use crate::{
		api::santa_tour::location::*,
		utils::GeoPoint,
		ApiEndpoint,
		ApiErrorResponse,
		ApiErrorResponseBody,
		ErrorType,
	};
}

mod endpoint;
mod error;
mod response;

pub use self::{endpoint::*, error::*, response::*};
