//! Pool registry module for the exit service.
//!
//! The pool SDK is an external collaborator: it knows how to encode exit
//! calls and how to price them. This crate abstracts it behind two traits,
//! a registry that resolves pool identifiers and a handle exposing the
//! operations an exit needs, so the exit handler never depends on a
//! concrete SDK or network.

use async_trait::async_trait;
use exit_types::{Address, BuiltExit, ConfigSchema, U256};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod memory;
}

/// Errors that can occur while talking to the pool SDK.
#[derive(Debug, Error)]
pub enum PoolError {
	/// Error that occurs when the SDK cannot be reached.
	#[error("Network error: {0}")]
	Network(String),
	/// Error reported by the SDK itself.
	#[error("SDK error: {0}")]
	Sdk(String),
	/// Error that occurs when an SDK response cannot be decoded.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// Error that occurs when an implementation is misconfigured.
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Arguments for building an exact-BPT-in exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRequest {
	/// Account redeeming the pool-share tokens.
	pub exiter: Address,
	/// BPT amount in 18-decimal fixed point.
	pub bpt_in: U256,
	/// Slippage tolerance in basis points.
	pub slippage_bps: u32,
	/// Whether the wrapped native token should be paid out as the native asset.
	pub unwrap_native: bool,
	/// Target token for a single-token exit; `None` means proportional.
	pub single_token_out: Option<Address>,
}

/// Operations the pool SDK exposes for a single pool.
#[async_trait]
pub trait PoolHandle: Send + Sync {
	/// Pool identifier.
	fn id(&self) -> &str;

	/// The pool's tokens excluding its own BPT, in pool order.
	///
	/// `BuiltExit::expected_amounts_out` is indexed the same way.
	fn tokens(&self) -> &[Address];

	/// Builds the calldata for redeeming an exact amount of BPT.
	async fn build_exit_exact_bpt_in(&self, request: &ExitRequest) -> Result<BuiltExit, PoolError>;

	/// Computes price impact as an 18-decimal fixed-point ratio.
	///
	/// For exits the expected outputs are passed as `amounts_in` and the BPT
	/// amount as `min_out`, with `is_join` false.
	async fn calc_price_impact(
		&self,
		amounts_in: &[U256],
		min_out: U256,
		is_join: bool,
	) -> Result<U256, PoolError>;
}

/// Trait defining the interface for pool registries.
#[async_trait]
pub trait PoolRegistryInterface: Send + Sync {
	/// Returns the configuration schema for this registry implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Resolves a pool by identifier. `Ok(None)` means the pool does not exist.
	async fn find(&self, pool_id: &str) -> Result<Option<Arc<dyn PoolHandle>>, PoolError>;
}

/// Service wrapping the configured pool registry.
pub struct PoolService {
	registry: Box<dyn PoolRegistryInterface>,
}

impl PoolService {
	pub fn new(registry: Box<dyn PoolRegistryInterface>) -> Self {
		Self { registry }
	}

	/// Resolves a pool handle, logging the outcome.
	pub async fn find(&self, pool_id: &str) -> Result<Option<Arc<dyn PoolHandle>>, PoolError> {
		let pool = self.registry.find(pool_id).await?;
		match &pool {
			Some(handle) => {
				tracing::debug!(pool_id, tokens = handle.tokens().len(), "Resolved pool")
			}
			None => tracing::debug!(pool_id, "Pool not found in registry"),
		}
		Ok(pool)
	}
}
