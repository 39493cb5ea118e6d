use anyhow::{Context, Result};
use clap::Parser;
use exit_config::{ConfigLoader, ExitConfig};
use exit_core::ExitHandler;
use exit_delivery::DeliveryService;
use exit_monitoring::{init_tracing, TracingConfig, TracingExceptionSink};
use exit_pool::PoolService;
use exit_types::ExitParams;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

mod cli;
mod implementations;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	let config = ConfigLoader::new()
		.load(&args.config)
		.with_context(|| format!("Failed to load configuration from {:?}", args.config))?;

	let log_level = args
		.log_level
		.clone()
		.unwrap_or_else(|| config.service.log_level.clone());
	init_tracing(
		TracingConfig::new()
			.with_level(log_level)
			.with_json_format(config.service.json_logs),
	)?;

	implementations::validate_implementations(&config)?;

	match args.command {
		Command::Validate => {
			info!(
				pool = %config.pool.implementation,
				delivery = %config.delivery.implementation,
				"Configuration is valid"
			);
			Ok(())
		}
		Command::Quote { params } => {
			let handler = build_handler(&config)?;
			let params = load_params(&params).await?;
			let quote = handler.query_exit(&params).await?;
			println!("{}", serde_json::to_string_pretty(&quote.output)?);
			Ok(())
		}
		Command::Exit {
			params,
			confirmations,
		} => {
			let handler = build_handler(&config)?;
			let params = load_params(&params).await?;
			let response = handler.exit(&params).await?;
			println!("{}", serde_json::to_string_pretty(&response)?);

			let confirmations = confirmations.unwrap_or(config.service.confirmations);
			if confirmations > 0 {
				let receipt = handler
					.wait_for_confirmation(&response.hash, confirmations)
					.await?;
				println!("{}", serde_json::to_string_pretty(&receipt)?);
			}
			Ok(())
		}
	}
}

fn build_handler(config: &ExitConfig) -> Result<ExitHandler> {
	let registry = implementations::create_registry(&config.pool)?;
	let delivery = implementations::create_delivery(&config.delivery)?;

	Ok(ExitHandler::new(
		PoolService::new(registry),
		DeliveryService::new(delivery),
		Arc::new(TracingExceptionSink),
		config.chain.clone(),
	))
}

async fn load_params(path: &Path) -> Result<ExitParams> {
	let contents = tokio::fs::read_to_string(path)
		.await
		.with_context(|| format!("Failed to read exit parameters from {:?}", path))?;
	serde_json::from_str(&contents).context("Failed to parse exit parameters")
}
