use std::{
	env,
	fmt::{Display, Formatter},
	net::{Ipv4Addr, SocketAddr},
};

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Reads the configuration from `config/dev` or `config/prod` (depending on
/// how the binary was built and `APP_ENV`) and overlays any `APP_`-prefixed
/// environment variables on top.
#[instrument]
pub fn parse_config() -> Result<AppConfig, ConfigError> {
	trace!("Reading config data...");

	let env = if cfg!(debug_assertions) {
		"dev".to_string()
	} else {
		env::var("APP_ENV").unwrap_or_else(|_| "prod".into())
	};

	let builder = match env.as_ref() {
		"prod" | "production" => Config::builder()
			.add_source(File::with_name("config/prod").required(false))
			.set_default("environment", "production")?,
		"dev" | "development" => Config::builder()
			.add_source(File::with_name("config/dev").required(false))
			.set_default("environment", "development")?,
		unknown => {
			return Err(ConfigError::Message(format!(
				"unknown running environment `{unknown}`"
			)));
		}
	};

	from_builder(builder.add_source(Environment::with_prefix("APP").separator("_")))
}

/// Builds the merged sources into an [`AppConfig`].
fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
	builder.build()?.try_deserialize()
}

/// The configuration of the API server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
	/// The address to listen for connections on
	#[serde(alias = "bindaddress", default = "default_bind_address")]
	pub bind_address: SocketAddr,
	/// The environment the server is running in
	pub environment: RunningEnvironment,
	/// Origins allowed to call the API from a browser. Any origin is allowed
	/// when this is empty.
	#[serde(alias = "allowedorigins", default)]
	pub allowed_origins: Vec<String>,
	/// How the location store treats incoming fixes
	#[serde(default)]
	pub location: LocationConfig,
}

/// The address used when none is configured
fn default_bind_address() -> SocketAddr {
	SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000))
}

/// The environment the server is running in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RunningEnvironment {
	/// Running locally, logs everything
	Development,
	/// Deployed, logs from debug up
	Production,
}

impl Display for RunningEnvironment {
	fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			formatter,
			"{}",
			match self {
				RunningEnvironment::Development => "Development",
				RunningEnvironment::Production => "Production",
			}
		)
	}
}

/// Settings for the single-slot location store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationConfig {
	/// What to do with a fix captured before the one already stored
	#[serde(alias = "stalewritepolicy", default)]
	pub stale_write_policy: StaleWritePolicy,
}

/// What to do with a fix that was captured before the one already stored
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StaleWritePolicy {
	/// Every write replaces the stored fix, regardless of its timestamp
	#[default]
	#[serde(alias = "lastwriterwins")]
	LastWriterWins,
	/// Writes older than the stored fix are refused with a conflict
	#[serde(alias = "rejectolder")]
	RejectOlder,
}
