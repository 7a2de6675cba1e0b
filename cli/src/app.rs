use std::{
	fmt::{Display, Formatter},
	future::Future,
};

use clap::ValueEnum;

use crate::prelude::*;

/// A command the CLI can run.
pub trait CommandExecutor {
	/// Runs the command against the API at `client`.
	fn execute(
		self,
		global_args: GlobalArgs,
		client: ApiClient,
	) -> impl Future<Output = Result<CommandOutput, ApiErrorResponse>>;
}

/// What a command produced, in both of the forms it can be printed in.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
	/// For a person reading the terminal
	pub text: String,
	/// For a script reading stdout
	pub json: serde_json::Value,
}

impl CommandOutput {
	/// Wraps the output in an `Ok` for the end of a command.
	pub fn into_result(self) -> Result<Self, ApiErrorResponse> {
		Ok(self)
	}
}

/// How the output of a command is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputType {
	/// Tables and sentences
	Text,
	/// Compact JSON on one line
	Json,
	/// Indented JSON
	PrettyJson,
}

impl Display for OutputType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Text => write!(f, "text"),
			Self::Json => write!(f, "json"),
			Self::PrettyJson => write!(f, "pretty-json"),
		}
	}
}
