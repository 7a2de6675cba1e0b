/// The configuration for the API, read from config files and the environment
pub mod config;
/// Sets up the global tracing subscriber
pub mod logger;
/// An extension trait to mount [`models::ApiEndpoint`]s on a router
mod router_ext;

pub use self::router_ext::*;
