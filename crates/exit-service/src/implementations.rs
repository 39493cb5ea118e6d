//! Maps configured implementation names to concrete backends.

use anyhow::{bail, Context, Result};
use exit_config::{ExitConfig, ImplementationConfig};
use exit_delivery::implementations::rpc::{self, AlloyDeliverySchema};
use exit_delivery::DeliveryInterface;
use exit_pool::implementations::http::{self, HttpPoolRegistrySchema};
use exit_pool::PoolRegistryInterface;
use exit_types::ConfigSchema;

fn pool_schema(name: &str) -> Result<Box<dyn ConfigSchema>> {
	match name {
		"http" => Ok(Box::new(HttpPoolRegistrySchema)),
		other => bail!("Unknown pool implementation: {}", other),
	}
}

fn delivery_schema(name: &str) -> Result<Box<dyn ConfigSchema>> {
	match name {
		"rpc" => Ok(Box::new(AlloyDeliverySchema)),
		other => bail!("Unknown delivery implementation: {}", other),
	}
}

/// Checks every implementation table against its schema.
pub fn validate_implementations(config: &ExitConfig) -> Result<()> {
	pool_schema(&config.pool.implementation)?
		.validate(&config.pool.config)
		.context("Invalid [pool.config]")?;
	delivery_schema(&config.delivery.implementation)?
		.validate(&config.delivery.config)
		.context("Invalid [delivery.config]")?;
	Ok(())
}

pub fn create_registry(config: &ImplementationConfig) -> Result<Box<dyn PoolRegistryInterface>> {
	match config.implementation.as_str() {
		"http" => http::create_registry(&config.config).context("Failed to create pool registry"),
		other => bail!("Unknown pool implementation: {}", other),
	}
}

pub fn create_delivery(config: &ImplementationConfig) -> Result<Box<dyn DeliveryInterface>> {
	match config.implementation.as_str() {
		"rpc" => rpc::create_delivery(&config.config).context("Failed to create delivery"),
		other => bail!("Unknown delivery implementation: {}", other),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const CONFIG: &str = r#"
[chain]
chain_id = 1
wrapped_native_asset = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"

[pool]
implementation = "http"
[pool.config]
base_url = "http://localhost:8080"

[delivery]
implementation = "rpc"
[delivery.config]
rpc_url = "http://localhost:8545"
chain_id = 1
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
"#;

	fn config() -> ExitConfig {
		exit_config::ConfigLoader::new().from_toml(CONFIG).unwrap()
	}

	#[test]
	fn test_valid_implementations() {
		assert!(validate_implementations(&config()).is_ok());
	}

	#[test]
	fn test_unknown_implementation() {
		let mut config = config();
		config.delivery.implementation = "relayer".to_string();

		let err = validate_implementations(&config).unwrap_err();
		assert!(err.to_string().contains("relayer"));
		assert!(create_delivery(&config.delivery).is_err());
	}

	#[test]
	fn test_invalid_table_is_reported() {
		let mut config = config();
		config.pool.set("base_url", "localhost:8080");

		assert!(validate_implementations(&config).is_err());
	}
}
