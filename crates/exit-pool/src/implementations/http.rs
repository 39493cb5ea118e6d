//! HTTP adapter for a pool SDK exposed as a JSON service.
//!
//! Endpoints, relative to `base_url`:
//! - `GET  /pools/{id}` returns the pool descriptor, 404 if unknown
//! - `POST /pools/{id}/exit` builds an exact-BPT-in exit
//! - `POST /pools/{id}/price-impact` prices a set of amounts

use crate::{ExitRequest, PoolError, PoolHandle, PoolRegistryInterface};
use async_trait::async_trait;
use exit_types::{Address, BuiltExit, ConfigSchema, Field, FieldType, Schema, U256};
use reqwest::{Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Pool description returned by the SDK service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolDescriptor {
	pub id: String,
	pub address: Address,
	/// Non-BPT tokens in pool order.
	pub tokens: Vec<Address>,
}

#[derive(Debug, Serialize)]
struct PriceImpactRequest<'a> {
	amounts_in: &'a [U256],
	min_out: U256,
	is_join: bool,
}

#[derive(Debug, Deserialize)]
struct PriceImpactResponse {
	price_impact: U256,
}

/// Registry that resolves pools through the SDK service.
pub struct HttpPoolRegistry {
	client: Client,
	base_url: Url,
}

impl HttpPoolRegistry {
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PoolError> {
		let client = Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| PoolError::Config(format!("Failed to build HTTP client: {}", e)))?;

		let base_url = Url::parse(base_url)
			.map_err(|e| PoolError::Config(format!("Invalid base_url '{}': {}", base_url, e)))?;

		Ok(Self { client, base_url })
	}
}

/// Appends path segments to `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, PoolError> {
	let mut url = base.clone();
	url.path_segments_mut()
		.map_err(|_| PoolError::Config(format!("base_url cannot carry a path: {}", base)))?
		.pop_if_empty()
		.extend(segments);
	Ok(url)
}

/// Configuration schema for the HTTP pool registry.
pub struct HttpPoolRegistrySchema;

impl ConfigSchema for HttpPoolRegistrySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), exit_types::ValidationError> {
		let schema = Schema::new(
			vec![Field::new("base_url", FieldType::HttpUrl)],
			vec![Field::new(
				"timeout_secs",
				FieldType::Integer {
					min: Some(1),
					max: Some(300),
				},
			)],
		);

		schema.validate(config)
	}
}

#[async_trait]
impl PoolRegistryInterface for HttpPoolRegistry {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpPoolRegistrySchema)
	}

	async fn find(&self, pool_id: &str) -> Result<Option<Arc<dyn PoolHandle>>, PoolError> {
		let url = endpoint(&self.base_url, &["pools", pool_id])?;
		debug!(%url, "Fetching pool descriptor");

		let response = self
			.client
			.get(url.clone())
			.send()
			.await
			.map_err(|e| PoolError::Network(format!("Failed to fetch pool: {}", e)))?;

		if response.status() == StatusCode::NOT_FOUND {
			return Ok(None);
		}

		let descriptor: PoolDescriptor = decode(response).await?;
		Ok(Some(Arc::new(HttpPoolHandle {
			client: self.client.clone(),
			pool_url: url,
			descriptor,
		})))
	}
}

/// Pool handle whose operations are served by the SDK service.
pub struct HttpPoolHandle {
	client: Client,
	pool_url: Url,
	descriptor: PoolDescriptor,
}

impl HttpPoolHandle {
	pub fn descriptor(&self) -> &PoolDescriptor {
		&self.descriptor
	}

	async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
		&self,
		path: &str,
		body: &B,
	) -> Result<T, PoolError> {
		let url = endpoint(&self.pool_url, &[path])?;
		let response = self
			.client
			.post(url.clone())
			.json(body)
			.send()
			.await
			.map_err(|e| PoolError::Network(format!("Request to {} failed: {}", url, e)))?;

		decode(response).await
	}
}

#[async_trait]
impl PoolHandle for HttpPoolHandle {
	fn id(&self) -> &str {
		&self.descriptor.id
	}

	fn tokens(&self) -> &[Address] {
		&self.descriptor.tokens
	}

	async fn build_exit_exact_bpt_in(&self, request: &ExitRequest) -> Result<BuiltExit, PoolError> {
		let built: BuiltExit = self.post("exit", request).await?;

		if built.expected_amounts_out.len() != self.descriptor.tokens.len() {
			return Err(PoolError::InvalidResponse(format!(
				"Expected {} output amounts, got {}",
				self.descriptor.tokens.len(),
				built.expected_amounts_out.len()
			)));
		}

		Ok(built)
	}

	async fn calc_price_impact(
		&self,
		amounts_in: &[U256],
		min_out: U256,
		is_join: bool,
	) -> Result<U256, PoolError> {
		let body = PriceImpactRequest {
			amounts_in,
			min_out,
			is_join,
		};
		let response: PriceImpactResponse = self.post("price-impact", &body).await?;
		Ok(response.price_impact)
	}
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PoolError> {
	let status = response.status();
	if !status.is_success() {
		let body = response.text().await.unwrap_or_default();
		return Err(PoolError::Sdk(format!("{}: {}", status, body)));
	}

	response
		.json::<T>()
		.await
		.map_err(|e| PoolError::InvalidResponse(e.to_string()))
}

/// Factory function to create the HTTP registry from configuration.
///
/// Configuration parameters:
/// - `base_url`: SDK service URL
/// - `timeout_secs`: request timeout (default: 10)
pub fn create_registry(config: &toml::Value) -> Result<Box<dyn PoolRegistryInterface>, PoolError> {
	HttpPoolRegistrySchema
		.validate(config)
		.map_err(|e| PoolError::Config(e.to_string()))?;

	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| PoolError::Config("base_url is required".to_string()))?;

	let timeout_secs = config
		.get("timeout_secs")
		.and_then(|v| v.as_integer())
		.map(|v| v as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECS);

	Ok(Box::new(HttpPoolRegistry::new(
		base_url,
		Duration::from_secs(timeout_secs),
	)?))
}
