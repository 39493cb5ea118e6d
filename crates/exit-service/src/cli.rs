//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bpt-exit")]
#[command(about = "Quote and submit exact-BPT-in pool exits", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "EXIT_CONFIG", default_value = "config/exit.toml")]
	pub config: PathBuf,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(short, long, env = "LOG_LEVEL")]
	pub log_level: Option<String>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Compute expected outputs and price impact without submitting
	Quote {
		/// JSON file with exit parameters
		#[arg(short, long)]
		params: PathBuf,
	},

	/// Recompute the exit and submit it
	Exit {
		/// JSON file with exit parameters
		#[arg(short, long)]
		params: PathBuf,

		/// Confirmations to wait for; overrides `service.confirmations`
		#[arg(long)]
		confirmations: Option<u64>,
	},

	/// Validate the configuration file and exit
	Validate,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_exit_command() {
		let args = Args::try_parse_from([
			"bpt-exit",
			"--config",
			"custom.toml",
			"exit",
			"--params",
			"params.json",
			"--confirmations",
			"2",
		])
		.unwrap();

		assert_eq!(args.config, PathBuf::from("custom.toml"));
		match args.command {
			Command::Exit {
				params,
				confirmations,
			} => {
				assert_eq!(params, PathBuf::from("params.json"));
				assert_eq!(confirmations, Some(2));
			}
			other => panic!("unexpected command: {:?}", other),
		}
	}

	#[test]
	fn test_quote_requires_params() {
		assert!(Args::try_parse_from(["bpt-exit", "quote"]).is_err());
	}
}
