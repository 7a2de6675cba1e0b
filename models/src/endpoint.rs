use std::fmt::Debug;

use http::Method;
use serde::{de::DeserializeOwned, Serialize};

/// A trait that defines an API endpoint. This is used to mount the routes on
/// the server, as well as to build requests on the client, so that both sides
/// agree on the method, path, request body and response body of a route.
///
/// Ideally, this trait would contain all the information needed to define the
/// functionality of a route
pub trait ApiEndpoint
where
	Self: Sized + Clone + Send + 'static,
{
	/// The HTTP method that should be used for this endpoint
	const METHOD: Method;
	/// The path that should be used for this endpoint. This is the path as
	/// axum routes it, starting with a `/`.
	const PATH: &'static str;

	/// The request body that should be used for this endpoint. Any request
	/// should be of JSON type. Endpoints that don't take a body use `()`,
	/// which is not sent at all.
	type RequestBody: Serialize + DeserializeOwned + Debug + Clone + Send + Sync + 'static;
	/// The response body that should be used for this endpoint. For stream
	/// endpoints, this is the type of each message sent over the stream.
	type ResponseBody: Serialize + DeserializeOwned + Debug + Send + Sync + 'static;
}
