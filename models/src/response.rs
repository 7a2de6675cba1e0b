use std::fmt::{Display, Formatter};

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::ErrorType;

/// This struct represents an error response from the API. It contains the
/// status code and the body of the response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiErrorResponse {
	/// The status code of the error response. Ideally in the 4xx or 5xx range.
	pub status_code: StatusCode,
	/// The body of the error response. This is a JSON object that contains the
	/// error message.
	pub body: ApiErrorResponseBody,
}

impl ApiErrorResponse {
	/// Creates a new [`ApiErrorResponse`] with the given [`ErrorType`], using
	/// the default status code.
	pub fn error(error: ErrorType) -> Self {
		Self {
			status_code: error.default_status_code(),
			body: ApiErrorResponseBody {
				success: false,
				message: error.message().into(),
				error,
			},
		}
	}

	/// Creates a new [`ApiErrorResponse`] with the given [`ErrorType`] and the
	/// given message, using the default status code.
	pub fn error_with_message(error: ErrorType, message: impl Into<String>) -> Self {
		Self {
			status_code: error.default_status_code(),
			body: ApiErrorResponseBody {
				success: false,
				error,
				message: message.into(),
			},
		}
	}

	/// Creates an internal server error response carrying the given message.
	/// Clients use this to report failures that never reached the server, such
	/// as a dropped connection.
	pub fn internal_server_error(message: impl Into<String>) -> Self {
		let message = message.into();
		Self::error_with_message(ErrorType::server_error(&message), message)
	}
}

impl Display for ApiErrorResponse {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} ({})", self.body.message, self.status_code)
	}
}

impl std::error::Error for ApiErrorResponse {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ApiErrorResponse {
	fn into_response(self) -> axum::response::Response {
		(self.status_code, axum::Json(self.body)).into_response()
	}
}

/// This struct represents the JSON body of an error response from the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponseBody {
	/// Whether the request was successful or not. This is always false.
	pub success: bool,
	/// The error type of the response.
	pub error: ErrorType,
	/// A user-friendly message describing the error.
	pub message: String,
}
