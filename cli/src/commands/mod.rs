use clap::{ArgAction, Args, Parser, Subcommand};
use url::Url;

use crate::prelude::*;

/// Broadcasts the sleigh's position
mod broadcast;
/// Prints the sleigh's current position
mod location;
/// Follows the sleigh and rings when it gets close
mod watch;

pub use self::{broadcast::BroadcastArgs, watch::WatchArgs};

/// Follow Santa's sleigh on its tour, or broadcast it if you're driving.
#[derive(Debug, Clone, Parser)]
#[command(name = "sleigh", version, about, long_about = None)]
pub struct AppArgs {
	/// The global arguments
	#[command(flatten)]
	pub global_args: GlobalArgs,
	/// The command to run
	#[command(subcommand)]
	pub command: GlobalCommands,
}

/// Arguments that apply to every command.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
	/// How the output should be printed
	#[arg(short = 'o', long, global = true, default_value_t = OutputType::Text)]
	pub output: OutputType,
	/// Where the location API lives
	#[arg(
		long,
		global = true,
		env = constants::API_URL_ENV,
		default_value = constants::DEFAULT_API_URL
	)]
	pub api_url: Url,
	/// Log more. Can be repeated.
	#[arg(short, long, global = true, action = ArgAction::Count)]
	pub verbose: u8,
}

/// Everything the CLI can do.
#[derive(Debug, Clone, Subcommand)]
pub enum GlobalCommands {
	/// Broadcast the sleigh's position from a stream of device positions.
	/// Meant to be run on the driver's device.
	Broadcast(BroadcastArgs),
	/// Follow the sleigh live and ring the bell when it is close
	Watch(WatchArgs),
	/// Print where the sleigh was last seen
	Location,
}

impl CommandExecutor for GlobalCommands {
	async fn execute(
		self,
		global_args: GlobalArgs,
		client: ApiClient,
	) -> Result<CommandOutput, ApiErrorResponse> {
		match self {
			Self::Broadcast(args) => broadcast::execute(args, global_args, client).await,
			Self::Watch(args) => watch::execute(args, global_args, client).await,
			Self::Location => location::execute(global_args, client).await,
		}
	}
}
