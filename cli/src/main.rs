#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! The `sleigh` command line tool. Broadcasts the sleigh's position from the
//! driver's device and follows it from anywhere else.

use clap::Parser;

use crate::prelude::*;

/// The output of a command and the trait every command implements
mod app;
/// All the commands the CLI accepts
mod commands;
/// Utilities shared between commands
mod utils;

/// A prelude that re-exports commonly used items.
pub mod prelude {
	pub use models::prelude::*;
	pub use tracing::{debug, error, info, trace, warn};
	pub use tracker::prelude::ApiClient;

	pub use crate::{
		app::{CommandExecutor, CommandOutput, OutputType},
		commands::{AppArgs, GlobalArgs, GlobalCommands},
		utils::constants,
	};
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let AppArgs {
		global_args,
		command,
	} = AppArgs::parse();

	utils::logger::initialize(global_args.verbose)?;

	let client = ApiClient::new(global_args.api_url.clone())?;
	let output_type = global_args.output;
	let output = command.execute(global_args, client).await?;

	match output_type {
		OutputType::Text => println!("{}", output.text),
		OutputType::Json => println!("{}", serde_json::to_string(&output.json)?),
		OutputType::PrettyJson => println!("{}", serde_json::to_string_pretty(&output.json)?),
	}

	Ok(())
}
