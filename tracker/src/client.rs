use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{consumer::LocationSource, prelude::*, producer::LocationSink, secure_context};

/// How long a single request may take before it is treated as a network
/// failure
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A client for the location API at a given base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
	/// The reqwest client. Cloning it shares the connection pool.
	client: Client,
	/// Where the API is served, e.g. `http://localhost:3000`
	base_url: Url,
}

impl ApiClient {
	/// Creates a client for the API served at `base_url`. A path on the base
	/// URL is kept, so the API can be served under a prefix.
	pub fn new(mut base_url: Url) -> Result<Self, reqwest::Error> {
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());
			base_url.set_path(&path);
		}
		let client = Client::builder()
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.timeout(REQUEST_TIMEOUT)
			.build()?;
		Ok(Self { client, base_url })
	}

	/// The URL the API is served at.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Whether the API can be trusted with the device's position.
	pub fn is_secure_context(&self) -> bool {
		secure_context::is_secure_origin(&self.base_url)
	}

	/// Where `path` lives under the base URL.
	fn endpoint_url(&self, path: &str) -> Result<Url, url::ParseError> {
		self.base_url.join(path.trim_start_matches('/'))
	}

	/// The websocket URL that pushes location updates.
	pub fn stream_url(&self) -> Result<Url, url::ParseError> {
		let mut url = self.endpoint_url(StreamLocationEndpoint::PATH)?;
		let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
		if url.set_scheme(scheme).is_err() {
			warn!("Cannot use `{}` as a websocket URL", url);
		}
		Ok(url)
	}

	/// Make an API request to an endpoint. Failures that never reached the
	/// server are reported as internal server errors.
	#[instrument(skip(self, body), fields(path = E::PATH))]
	pub async fn make_request<E>(&self, body: E::RequestBody) -> Result<E::ResponseBody, ApiErrorResponse>
	where
		E: ApiEndpoint,
	{
		let body = serde_json::to_value(&body)
			.map_err(|err| ApiErrorResponse::internal_server_error(err.to_string()))?;
		let url = self
			.endpoint_url(E::PATH)
			.map_err(|err| ApiErrorResponse::internal_server_error(err.to_string()))?;

		let builder = self.client.request(E::METHOD, url);
		let response = if body.is_null() {
			builder
		} else {
			builder.json(&body)
		}
		.send()
		.await
		.map_err(|err| ApiErrorResponse::internal_server_error(err.to_string()))?;

		let status_code = response.status();
		trace!("API responded with {}", status_code);
		if status_code.is_success() {
			return response
				.json::<E::ResponseBody>()
				.await
				.map_err(|err| ApiErrorResponse::internal_server_error(err.to_string()));
		}

		match response.json::<ApiErrorResponseBody>().await {
			Ok(body) => Err(ApiErrorResponse { status_code, body }),
			Err(err) => {
				let message = format!("unexpected {} response: {}", status_code, err);
				Err(ApiErrorResponse {
					status_code,
					body: ApiErrorResponseBody {
						success: false,
						error: ErrorType::server_error(&message),
						message,
					},
				})
			}
		}
	}
}

impl LocationSink for ApiClient {
	async fn record_fix(&self, request: RecordLocationRequest) -> Result<(), ApiErrorResponse> {
		self.make_request::<RecordLocationEndpoint>(request)
			.await
			.map(|_| ())
	}
}

impl LocationSource for ApiClient {
	async fn current_fix(&self) -> Result<Option<LocationFix>, ApiErrorResponse> {
		self.make_request::<GetLocationEndpoint>(())
			.await
			.map(|response| response.fix)
	}
}
