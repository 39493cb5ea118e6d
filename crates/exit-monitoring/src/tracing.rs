//! Tracing subscriber setup.

use thiserror::Error;
use tracing_subscriber::{
	fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

#[derive(Debug, Error)]
pub enum TracingError {
	#[error("Invalid log filter '{0}': {1}")]
	InvalidFilter(String, String),
	#[error("Failed to initialize tracing: {0}")]
	Init(String),
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
	/// Default filter directive, overridden by `RUST_LOG` when set.
	pub level: String,
	pub with_target: bool,
	pub with_file_and_line: bool,
	pub with_span_events: FmtSpan,
	pub json_format: bool,
}

impl Default for TracingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			with_target: true,
			with_file_and_line: false,
			with_span_events: FmtSpan::NONE,
			json_format: false,
		}
	}
}

impl TracingConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_level(mut self, level: impl Into<String>) -> Self {
		self.level = level.into();
		self
	}

	pub fn with_json_format(mut self, json: bool) -> Self {
		self.json_format = json;
		self
	}

	fn env_filter(&self) -> Result<EnvFilter, TracingError> {
		match EnvFilter::try_from_default_env() {
			Ok(filter) => Ok(filter),
			Err(_) => EnvFilter::try_new(&self.level)
				.map_err(|e| TracingError::InvalidFilter(self.level.clone(), e.to_string())),
		}
	}
}

/// Initialize tracing with the given configuration
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
	let filter = config.env_filter()?;
	let registry = tracing_subscriber::registry().with(filter);

	if config.json_format {
		let json_layer = tracing_subscriber::fmt::layer()
			.json()
			.with_span_events(config.with_span_events.clone())
			.with_file(config.with_file_and_line)
			.with_line_number(config.with_file_and_line)
			.with_target(config.with_target);

		registry
			.with(json_layer)
			.try_init()
			.map_err(|e| TracingError::Init(e.to_string()))?;
	} else {
		let fmt_layer = tracing_subscriber::fmt::layer()
			.with_span_events(config.with_span_events.clone())
			.with_file(config.with_file_and_line)
			.with_line_number(config.with_file_and_line)
			.with_target(config.with_target);

		registry
			.with(fmt_layer)
			.try_init()
			.map_err(|e| TracingError::Init(e.to_string()))?;
	}

	::tracing::debug!(level = %config.level, json = config.json_format, "Tracing initialized");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_invalid_filter_is_rejected() {
		let config = TracingConfig::new().with_level("exit_core=loudest");
		if std::env::var("RUST_LOG").is_err() {
			assert!(matches!(
				config.env_filter(),
				Err(TracingError::InvalidFilter(..))
			));
		}
	}

	#[test]
	fn test_builder_overrides_defaults() {
		let config = TracingConfig::new()
			.with_level("exit_core=debug")
			.with_json_format(true);

		assert_eq!(config.level, "exit_core=debug");
		assert!(config.json_format);
		assert!(config.with_target);
	}
}
