//! Configuration for the exit service.

use thiserror::Error;

pub mod loader;
pub mod types;

pub use loader::{validate_config, ConfigLoader};
pub use types::{ExitConfig, ImplementationConfig, ServiceSettings};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("Validation error: {0}")]
	Validation(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}
