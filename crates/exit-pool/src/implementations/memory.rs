//! In-memory pool registry.
//!
//! Holds a fixed set of pool handles registered up front. Useful when the
//! embedding application already owns SDK pool objects.

use crate::{PoolError, PoolHandle, PoolRegistryInterface};
use async_trait::async_trait;
use exit_types::{ConfigSchema, Schema, ValidationError};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry backed by a map of pool id to handle.
#[derive(Default)]
pub struct MemoryPoolRegistry {
	pools: HashMap<String, Arc<dyn PoolHandle>>,
}

impl MemoryPoolRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a pool under its own id.
	pub fn with_pool(mut self, pool: Arc<dyn PoolHandle>) -> Self {
		self.insert(pool);
		self
	}

	pub fn insert(&mut self, pool: Arc<dyn PoolHandle>) {
		self.pools.insert(pool.id().to_lowercase(), pool);
	}
}

/// The memory registry takes no configuration.
pub struct MemoryPoolRegistrySchema;

impl ConfigSchema for MemoryPoolRegistrySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

#[async_trait]
impl PoolRegistryInterface for MemoryPoolRegistry {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryPoolRegistrySchema)
	}

	async fn find(&self, pool_id: &str) -> Result<Option<Arc<dyn PoolHandle>>, PoolError> {
		Ok(self.pools.get(&pool_id.to_lowercase()).cloned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ExitRequest;
	use exit_types::{Address, BuiltExit, U256};

	struct StubPool {
		id: String,
		tokens: Vec<Address>,
	}

	#[async_trait]
	impl PoolHandle for StubPool {
		fn id(&self) -> &str {
			&self.id
		}

		fn tokens(&self) -> &[Address] {
			&self.tokens
		}

		async fn build_exit_exact_bpt_in(
			&self,
			_request: &ExitRequest,
		) -> Result<BuiltExit, PoolError> {
			Err(PoolError::Sdk("not used".to_string()))
		}

		async fn calc_price_impact(
			&self,
			_amounts_in: &[U256],
			_min_out: U256,
			_is_join: bool,
		) -> Result<U256, PoolError> {
			Ok(U256::ZERO)
		}
	}

	#[tokio::test]
	async fn test_find_is_case_insensitive() {
		let registry = MemoryPoolRegistry::new().with_pool(Arc::new(StubPool {
			id: "0xABCDEF".to_string(),
			tokens: vec![Address::repeat_byte(0x11)],
		}));

		let pool = registry.find("0xabcdef").await.unwrap().unwrap();
		assert_eq!(pool.id(), "0xABCDEF");
		assert!(registry.find("0x123456").await.unwrap().is_none());
	}
}
