use std::{
	error::Error as StdError,
	fmt::{Display, Formatter},
	mem,
};

use http::StatusCode;
use serde::{de::Error, Deserialize, Serialize};

/// A list of all the possible errors that can be returned by the API
#[derive(Debug)]
pub enum ErrorType {
	/// The parameters sent with the request is invalid. This would ideally not
	/// happen unless there is a bug in the client
	WrongParameters,
	/// The location fix sent was captured before the one currently stored, and
	/// the server is configured to reject out-of-order writes
	StaleLocationFix,
	/// The resource that the user is trying to access does not exist.
	ResourceDoesNotExist,
	/// An internal server error occurred. This should not happen unless there
	/// is a bug in the server
	InternalServerError(anyhow::Error),
}

impl ErrorType {
	/// Returns the status code that should be used for this error. Note that
	/// this is only the default status code and specific endpoints can override
	/// this if needed
	pub fn default_status_code(&self) -> StatusCode {
		match self {
			Self::WrongParameters => StatusCode::BAD_REQUEST,
			Self::StaleLocationFix => StatusCode::CONFLICT,
			Self::ResourceDoesNotExist => StatusCode::NOT_FOUND,
			Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Returns the message that should be used for this error. This is the
	/// message that is user-friendly and can be shown to the user
	pub fn message(&self) -> impl Into<String> {
		match self {
			Self::WrongParameters => "The parameters sent with that request is invalid",
			Self::StaleLocationFix => "A newer location has already been recorded",
			Self::ResourceDoesNotExist => "The resource you are trying to access does not exist",
			Self::InternalServerError(_) => "An internal server error has occured",
		}
	}

	/// Creates an [`ErrorType::InternalServerError`] with the given message
	pub fn server_error(message: impl Display) -> Self {
		Self::InternalServerError(anyhow::anyhow!(message.to_string()))
	}
}

impl PartialEq for ErrorType {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::InternalServerError(_), Self::InternalServerError(_)) => true,
			_ => mem::discriminant(self) == mem::discriminant(other),
		}
	}
}

impl Eq for ErrorType {}

impl<Error> From<Error> for ErrorType
where
	Error: StdError + Send + Sync + 'static,
{
	fn from(error: Error) -> Self {
		Self::InternalServerError(error.into())
	}
}

impl Clone for ErrorType {
	fn clone(&self) -> Self {
		match self {
			Self::WrongParameters => Self::WrongParameters,
			Self::StaleLocationFix => Self::StaleLocationFix,
			Self::ResourceDoesNotExist => Self::ResourceDoesNotExist,
			Self::InternalServerError(error) => {
				Self::InternalServerError(anyhow::anyhow!(error.to_string()))
			}
		}
	}
}

impl Display for ErrorType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.message().into())
	}
}

impl Serialize for ErrorType {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		match self {
			Self::WrongParameters => serializer.serialize_str("wrongParameters"),
			Self::StaleLocationFix => serializer.serialize_str("staleLocationFix"),
			Self::ResourceDoesNotExist => serializer.serialize_str("resourceDoesNotExist"),
			Self::InternalServerError(_) => serializer.serialize_str("internalServerError"),
		}
	}
}

impl<'de> Deserialize<'de> for ErrorType {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let string = String::deserialize(deserializer)?;
		Ok(match string.as_str() {
			"wrongParameters" => Self::WrongParameters,
			"staleLocationFix" => Self::StaleLocationFix,
			"resourceDoesNotExist" => Self::ResourceDoesNotExist,
			"internalServerError" => {
				Self::InternalServerError(anyhow::anyhow!("Internal Server Error"))
			}
			unknown => return Err(Error::custom(format!("unknown variant: {unknown}"))),
		})
	}
}
