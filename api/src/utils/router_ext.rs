use axum::{
	handler::Handler,
	routing::{MethodFilter, MethodRouter},
	Router,
};
use models::ApiEndpoint;

/// Extension trait for axum Router to mount an API endpoint at the path and
/// method declared by its [`ApiEndpoint`] implementation, so the server and the
/// clients can never disagree on where an endpoint lives.
pub trait RouterExt<S>
where
	S: Clone + Send + Sync + 'static,
{
	/// Mount the handler for the endpoint `E`.
	#[track_caller]
	fn mount_endpoint<E, H, T>(self, handler: H) -> Self
	where
		E: ApiEndpoint,
		H: Handler<T, S>,
		T: 'static;
}

impl<S> RouterExt<S> for Router<S>
where
	S: Clone + Send + Sync + 'static,
{
	#[track_caller]
	fn mount_endpoint<E, H, T>(self, handler: H) -> Self
	where
		E: ApiEndpoint,
		H: Handler<T, S>,
		T: 'static,
	{
		let Ok(filter) = MethodFilter::try_from(E::METHOD) else {
			panic!("unsupported method {} for {}", E::METHOD, E::PATH);
		};
		self.route(E::PATH, MethodRouter::new().on(filter, handler))
	}
}
