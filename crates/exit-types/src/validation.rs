//! Configuration validation for pluggable implementations.
//!
//! Every pool registry and delivery implementation publishes a [`Schema`]
//! describing the TOML table it is created from, so configuration errors
//! surface at load time instead of inside a factory.

use alloy::primitives::Address;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
	/// Error that occurs when a required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// Error that occurs when a field has an invalid value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// Error that occurs when field type is incorrect.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

impl ValidationError {
	fn nested(self, parent: &str) -> Self {
		match self {
			ValidationError::MissingField(f) => {
				ValidationError::MissingField(format!("{}.{}", parent, f))
			}
			ValidationError::InvalidValue { field, message } => ValidationError::InvalidValue {
				field: format!("{}.{}", parent, field),
				message,
			},
			ValidationError::TypeMismatch {
				field,
				expected,
				actual,
			} => ValidationError::TypeMismatch {
				field: format!("{}.{}", parent, field),
				expected,
				actual,
			},
		}
	}
}

/// Type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	Integer { min: Option<i64>, max: Option<i64> },
	Boolean,
	/// A string holding a 20-byte hex address.
	Address,
	/// A string holding an `http://` or `https://` URL.
	HttpUrl,
	Table(Schema),
}

impl FieldType {
	fn name(&self) -> &'static str {
		match self {
			FieldType::String | FieldType::Address | FieldType::HttpUrl => "string",
			FieldType::Integer { .. } => "integer",
			FieldType::Boolean => "boolean",
			FieldType::Table(_) => "table",
		}
	}
}

/// Type alias for field validator functions.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A field definition with name and type.
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Adds a custom validator, run after the type check passes.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, value: &toml::Value) -> Result<(), ValidationError> {
		validate_field_type(&self.name, value, &self.field_type)?;

		if let Some(validator) = &self.validator {
			validator(value).map_err(|message| ValidationError::InvalidValue {
				field: self.name.clone(),
				message,
			})?;
		}

		Ok(())
	}
}

/// Schema definition with required and optional fields.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			field.check(value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.check(value)?;
			}
		}

		Ok(())
	}
}

fn mismatch(field_name: &str, expected: &FieldType, value: &toml::Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field_name.to_string(),
		expected: expected.name().to_string(),
		actual: value.type_str().to_string(),
	}
}

fn invalid(field_name: &str, message: impl Into<String>) -> ValidationError {
	ValidationError::InvalidValue {
		field: field_name.to_string(),
		message: message.into(),
	}
}

fn validate_field_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::String => {
			value
				.as_str()
				.ok_or_else(|| mismatch(field_name, expected_type, value))?;
		}
		FieldType::Address => {
			let s = value
				.as_str()
				.ok_or_else(|| mismatch(field_name, expected_type, value))?;
			s.parse::<Address>()
				.map_err(|e| invalid(field_name, format!("Invalid address '{}': {}", s, e)))?;
		}
		FieldType::HttpUrl => {
			let s = value
				.as_str()
				.ok_or_else(|| mismatch(field_name, expected_type, value))?;
			if !(s.starts_with("http://") || s.starts_with("https://")) {
				return Err(invalid(
					field_name,
					"URL must start with http:// or https://",
				));
			}
		}
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| mismatch(field_name, expected_type, value))?;

			if let Some(min_val) = min {
				if int_val < *min_val {
					return Err(invalid(
						field_name,
						format!("Value {} is less than minimum {}", int_val, min_val),
					));
				}
			}

			if let Some(max_val) = max {
				if int_val > *max_val {
					return Err(invalid(
						field_name,
						format!("Value {} is greater than maximum {}", int_val, max_val),
					));
				}
			}
		}
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(mismatch(field_name, expected_type, value));
			}
		}
		FieldType::Table(schema) => {
			schema.validate(value).map_err(|e| e.nested(field_name))?;
		}
	}

	Ok(())
}

/// Implemented by each pluggable backend to describe its configuration table.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

/// Validates a hex private key of 32 bytes, with or without `0x`.
pub fn validate_private_key(value: &toml::Value) -> Result<(), String> {
	let key = value.as_str().unwrap_or_default();
	let key_without_prefix = key.strip_prefix("0x").unwrap_or(key);

	if key_without_prefix.len() != 64 {
		return Err("Private key must be 64 hex characters (32 bytes)".to_string());
	}

	if !key_without_prefix.chars().all(|c| c.is_ascii_hexdigit()) {
		return Err("Private key must be valid hexadecimal".to_string());
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn delivery_schema() -> Schema {
		Schema::new(
			vec![
				Field::new("rpc_url", FieldType::HttpUrl),
				Field::new(
					"chain_id",
					FieldType::Integer {
						min: Some(1),
						max: None,
					},
				),
			],
			vec![Field::new("private_key", FieldType::String)
				.with_validator(validate_private_key)],
		)
	}

	fn parse(s: &str) -> toml::Value {
		toml::Value::Table(toml::from_str::<toml::Table>(s).unwrap())
	}

	#[test]
	fn test_valid_config() {
		let config = parse(
			r#"
rpc_url = "http://localhost:8545"
chain_id = 1
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
"#,
		);
		assert_eq!(delivery_schema().validate(&config), Ok(()));
	}

	#[test]
	fn test_missing_required_field() {
		let config = parse(r#"rpc_url = "http://localhost:8545""#);
		assert_eq!(
			delivery_schema().validate(&config),
			Err(ValidationError::MissingField("chain_id".to_string()))
		);
	}

	#[test]
	fn test_invalid_values() {
		let config = parse(
			r#"
rpc_url = "ws://localhost:8545"
chain_id = 1
"#,
		);
		assert!(matches!(
			delivery_schema().validate(&config),
			Err(ValidationError::InvalidValue { field, .. }) if field == "rpc_url"
		));

		let config = parse(
			r#"
rpc_url = "http://localhost:8545"
chain_id = 1
private_key = "0x1234"
"#,
		);
		assert!(matches!(
			delivery_schema().validate(&config),
			Err(ValidationError::InvalidValue { field, .. }) if field == "private_key"
		));
	}

	#[test]
	fn test_nested_table_errors_are_prefixed() {
		let schema = Schema::new(
			vec![Field::new(
				"chain",
				FieldType::Table(Schema::new(
					vec![Field::new("wrapped_native_asset", FieldType::Address)],
					vec![],
				)),
			)],
			vec![],
		);

		let config = parse(
			r#"
[chain]
wrapped_native_asset = "not-an-address"
"#,
		);
		assert!(matches!(
			schema.validate(&config),
			Err(ValidationError::InvalidValue { field, .. }) if field == "chain.wrapped_native_asset"
		));
	}
}
