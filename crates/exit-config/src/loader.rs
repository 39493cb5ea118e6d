//! Configuration loading from files and environment.

use crate::types::ExitConfig;
use crate::ConfigError;
use regex::Regex;
use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Configuration loader with `${VAR}` substitution and environment overrides.
pub struct ConfigLoader {
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			env_prefix: "EXIT_".to_string(),
		}
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Load, override and validate configuration from a TOML file
	pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<ExitConfig, ConfigError> {
		let path = path.as_ref();
		info!("Loading configuration from {:?}", path);

		let contents = std::fs::read_to_string(path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				ConfigError::FileNotFound(path.display().to_string())
			} else {
				ConfigError::Io(e)
			}
		})?;

		let mut config = self.from_toml(&contents)?;
		self.apply_env_overrides(&mut config);
		validate_config(&config)?;
		Ok(config)
	}

	/// Parse a TOML document after substituting `${VAR}` references
	pub fn from_toml(&self, contents: &str) -> Result<ExitConfig, ConfigError> {
		let substituted = substitute_env_vars(contents)?;
		toml::from_str(&substituted).map_err(|e| ConfigError::Parse(e.to_string()))
	}

	fn apply_env_overrides(&self, config: &mut ExitConfig) {
		if let Ok(log_level) = env::var(format!("{}LOG_LEVEL", self.env_prefix)) {
			debug!("Overriding log level from environment");
			config.service.log_level = log_level;
		}

		if let Ok(rpc_url) = env::var(format!("{}RPC_URL", self.env_prefix)) {
			debug!("Overriding RPC URL from environment");
			config.delivery.set("rpc_url", rpc_url);
		}

		if let Ok(key) = env::var(format!("{}PRIVATE_KEY", self.env_prefix)) {
			debug!("Overriding private key from environment");
			config.delivery.set("private_key", key);
		}
	}
}

fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
		.map_err(|e| ConfigError::Parse(e.to_string()))?;

	let mut result = String::with_capacity(content.len());
	let mut last = 0;
	for cap in re.captures_iter(content) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = env::var(var_name.as_str())
			.map_err(|_| ConfigError::EnvVarNotFound(var_name.as_str().to_string()))?;

		result.push_str(&content[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&content[last..]);

	Ok(result)
}

/// Validate cross-section constraints
pub fn validate_config(config: &ExitConfig) -> Result<(), ConfigError> {
	if config.chain.native_asset == config.chain.wrapped_native_asset {
		return Err(ConfigError::Validation(
			"native_asset and wrapped_native_asset must differ".to_string(),
		));
	}

	if config.pool.implementation.is_empty() {
		return Err(ConfigError::Validation(
			"pool.implementation must be set".to_string(),
		));
	}

	if config.delivery.implementation.is_empty() {
		return Err(ConfigError::Validation(
			"delivery.implementation must be set".to_string(),
		));
	}

	if let Some(chain_id) = config.delivery.config.get("chain_id").and_then(|v| v.as_integer()) {
		if chain_id as u64 != config.chain.chain_id {
			return Err(ConfigError::Validation(format!(
				"delivery chain_id {} does not match chain.chain_id {}",
				chain_id, config.chain.chain_id
			)));
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const CONFIG: &str = r#"
[service]
log_level = "debug"

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
private_key = "${EXIT_TEST_LOADER_KEY}"
"#;

	#[test]
	fn test_toml_parsing_and_substitution() {
		env::set_var("EXIT_TEST_LOADER_KEY", "0xabc");
		let config = ConfigLoader::new().from_toml(CONFIG).unwrap();

		assert_eq!(config.service.log_level, "debug");
		assert!(!config.service.json_logs);
		assert_eq!(config.chain.native_asset, exit_types::Address::ZERO);
		assert_eq!(config.pool.implementation, "http");
		assert_eq!(
			config.delivery.config.get("private_key").and_then(|v| v.as_str()),
			Some("0xabc")
		);
		assert!(validate_config(&config).is_ok());
	}

	#[test]
	fn test_missing_env_var() {
		let err = ConfigLoader::new()
			.from_toml("value = \"${EXIT_TEST_DEFINITELY_UNSET}\"")
			.unwrap_err();
		assert!(matches!(err, ConfigError::EnvVarNotFound(var) if var == "EXIT_TEST_DEFINITELY_UNSET"));
	}

	#[test]
	fn test_load_from_file_with_overrides() {
		env::set_var("EXIT_TEST_LOADER_KEY", "0xabc");
		env::set_var("LOADERTEST_RPC_URL", "http://rpc.example:8545");

		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(CONFIG.as_bytes()).unwrap();

		let config = ConfigLoader::new()
			.with_env_prefix("LOADERTEST_")
			.load(file.path())
			.unwrap();

		assert_eq!(
			config.delivery.config.get("rpc_url").and_then(|v| v.as_str()),
			Some("http://rpc.example:8545")
		);
	}

	#[test]
	fn test_chain_id_mismatch_is_rejected() {
		env::set_var("EXIT_TEST_LOADER_KEY", "0xabc");
		let mut config = ConfigLoader::new().from_toml(CONFIG).unwrap();
		config.chain.chain_id = 10;

		assert!(matches!(
			validate_config(&config),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_missing_file() {
		let err = ConfigLoader::new().load("/nonexistent/exit.toml").unwrap_err();
		assert!(matches!(err, ConfigError::FileNotFound(_)));
	}
}
