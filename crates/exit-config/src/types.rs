//! Configuration types for the exit service.

use exit_types::ChainAssets;
use serde::{Deserialize, Serialize};

/// Complete service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExitConfig {
	#[serde(default)]
	pub service: ServiceSettings,
	/// Native and wrapped native asset of the target chain
	pub chain: ChainAssets,
	/// Pool registry backend
	pub pool: ImplementationConfig,
	/// Transaction delivery backend
	pub delivery: ImplementationConfig,
}

/// Process-level settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceSettings {
	#[serde(default = "default_log_level")]
	pub log_level: String,
	#[serde(default)]
	pub json_logs: bool,
	/// Confirmations to wait for after submitting an exit. Zero skips waiting.
	#[serde(default)]
	pub confirmations: u64,
}

impl Default for ServiceSettings {
	fn default() -> Self {
		Self {
			log_level: default_log_level(),
			json_logs: false,
			confirmations: 0,
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

/// Selects a pluggable implementation and carries its raw settings.
///
/// The `config` table is validated by the implementation's own schema.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImplementationConfig {
	pub implementation: String,
	#[serde(default = "empty_table")]
	pub config: toml::Value,
}

fn empty_table() -> toml::Value {
	toml::Value::Table(toml::Table::new())
}

impl ImplementationConfig {
	/// Sets a string entry in the implementation table.
	pub fn set(&mut self, key: &str, value: impl Into<String>) {
		if !self.config.is_table() {
			self.config = empty_table();
		}
		if let Some(table) = self.config.as_table_mut() {
			table.insert(key.to_string(), toml::Value::String(value.into()));
		}
	}
}
