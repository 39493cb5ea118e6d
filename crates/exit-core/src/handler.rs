//! Exact-BPT-in exit handler.

use crate::ExitError;
use exit_delivery::DeliveryService;
use exit_monitoring::{CaptureContext, ExceptionSink};
use exit_pool::{ExitRequest, PoolHandle, PoolService};
use exit_types::{
	format_amount, parse_amount, price_impact_ratio, Address, BuiltExit, ChainAssets, ExitParams,
	ExitQuote, PendingExit, QueryOutput, TransactionReceipt, TransactionResponse, TxHash, U256,
	BPT_DECIMALS, DEFAULT_TOKEN_DECIMALS,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Upper bound for slippage tolerance, 100% in basis points.
pub const MAX_SLIPPAGE_BPS: u32 = 10_000;

const POOL_REGISTRY: &str = "pool-registry";
const POOL_SDK: &str = "pool-sdk";

/// Quotes and submits exits that redeem an exact amount of BPT.
///
/// The handler keeps no state between calls. A quote carries the pending
/// exit it was computed from; `exit` always recomputes before submitting.
pub struct ExitHandler {
	pools: PoolService,
	delivery: DeliveryService,
	exceptions: Arc<dyn ExceptionSink>,
	chain: ChainAssets,
}

impl ExitHandler {
	pub fn new(
		pools: PoolService,
		delivery: DeliveryService,
		exceptions: Arc<dyn ExceptionSink>,
		chain: ChainAssets,
	) -> Self {
		Self {
			pools,
			delivery,
			exceptions,
			chain,
		}
	}

	/// Computes expected outputs and price impact for an exit.
	#[instrument(skip_all, fields(pool_id = %params.pool_id))]
	pub async fn query_exit(&self, params: &ExitParams) -> Result<ExitQuote, ExitError> {
		let pool = self.resolve_pool(&params.pool_id).await?;

		if params.amounts_out.is_empty() {
			return Err(ExitError::NoOutputs);
		}
		for requested in &params.amounts_out {
			if !params.tokens.contains_key(&requested.address) {
				return Err(ExitError::TokenNotFound(requested.address));
			}
		}

		if params.slippage_bps > MAX_SLIPPAGE_BPS {
			return Err(ExitError::InvalidSlippage(params.slippage_bps));
		}

		let bpt_in = parse_amount(&params.bpt_in, BPT_DECIMALS)?;
		let single_token_out = params.single_token_out();
		let unwrap_native = params
			.amounts_out
			.iter()
			.any(|token| self.chain.is_native(&token.address));

		let request = ExitRequest {
			exiter: params.exiter,
			bpt_in,
			slippage_bps: params.slippage_bps,
			unwrap_native,
			single_token_out,
		};
		debug!(
			bpt_in = %bpt_in,
			single = single_token_out.is_some(),
			unwrap_native,
			"Building exit"
		);

		let built = self
			.build_exit(pool.as_ref(), &request)
			.await
			.ok_or_else(|| ExitError::ExitConstructionFailed(params.pool_id.clone()))?;

		let raw_impact = match pool
			.calc_price_impact(&built.expected_amounts_out, bpt_in, false)
			.await
		{
			Ok(raw) => raw,
			Err(e) => {
				self.exceptions.capture(
					&e,
					&CaptureContext::new(POOL_SDK, "calc_price_impact")
						.with_extra("pool_id", pool.id()),
				);
				return Err(ExitError::PriceImpactUnavailable(e.to_string()));
			}
		};
		let price_impact = price_impact_ratio(raw_impact)
			.map_err(|e| ExitError::PriceImpactUnavailable(e.to_string()))?;

		let expected =
			self.expected_amounts(pool.tokens(), &built, single_token_out, unwrap_native)?;

		let mut amounts_out = HashMap::with_capacity(expected.len());
		for (address, raw) in &expected {
			let decimals = params
				.tokens
				.get(address)
				.map(|token| token.decimals_or_default())
				.unwrap_or(DEFAULT_TOKEN_DECIMALS);
			let amount =
				format_amount(*raw, decimals).map_err(|e| ExitError::InvalidTokenDecimals {
					token: *address,
					reason: e.to_string(),
				})?;
			amounts_out.insert(address.to_checksum(None), amount);
		}

		info!(outputs = amounts_out.len(), price_impact, "Exit quoted");

		Ok(ExitQuote {
			output: QueryOutput {
				amounts_out,
				price_impact,
				tx_ready: true,
			},
			pending: PendingExit {
				pool_id: params.pool_id.clone(),
				to: built.to,
				data: built.data,
				attributes: built.attributes,
				expected_amounts_out: expected,
			},
		})
	}

	/// Recomputes the exit and submits it.
	#[instrument(skip_all, fields(pool_id = %params.pool_id))]
	pub async fn exit(&self, params: &ExitParams) -> Result<TransactionResponse, ExitError> {
		let quote = match self.query_exit(params).await {
			Ok(quote) => quote,
			Err(ExitError::ExitConstructionFailed(_)) => return Err(ExitError::NoExitConstructed),
			Err(e) => return Err(e),
		};

		self.submit(&quote.pending).await
	}

	/// Submits a previously quoted exit.
	pub async fn submit(&self, pending: &PendingExit) -> Result<TransactionResponse, ExitError> {
		let response = self.delivery.deliver(&pending.transaction()).await?;
		info!(pool_id = %pending.pool_id, tx_hash = %response.hash, "Exit submitted");
		Ok(response)
	}

	/// Waits for a submitted exit to be confirmed.
	pub async fn wait_for_confirmation(
		&self,
		hash: &TxHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, ExitError> {
		Ok(self.delivery.confirm(hash, confirmations).await?)
	}

	async fn resolve_pool(&self, pool_id: &str) -> Result<Arc<dyn PoolHandle>, ExitError> {
		match self.pools.find(pool_id).await {
			Ok(Some(pool)) => Ok(pool),
			Ok(None) => {
				let e = ExitError::PoolNotFound(pool_id.to_string());
				self.exceptions.capture(
					&e,
					&CaptureContext::new(POOL_REGISTRY, "find").with_extra("pool_id", pool_id),
				);
				Err(e)
			}
			Err(e) => {
				self.exceptions.capture(
					&e,
					&CaptureContext::new(POOL_REGISTRY, "find").with_extra("pool_id", pool_id),
				);
				Err(ExitError::PoolNotFound(pool_id.to_string()))
			}
		}
	}

	/// Calls the SDK builder. Failures are reported and yield `None`.
	async fn build_exit(&self, pool: &dyn PoolHandle, request: &ExitRequest) -> Option<BuiltExit> {
		let context = || {
			CaptureContext::new(POOL_SDK, "build_exit_exact_bpt_in")
				.with_extra("pool_id", pool.id())
				.with_extra("exiter", request.exiter)
		};

		let built = match pool.build_exit_exact_bpt_in(request).await {
			Ok(built) => built,
			Err(e) => {
				self.exceptions.capture(&e, &context());
				return None;
			}
		};

		if built.expected_amounts_out.len() != pool.tokens().len() {
			let e = exit_pool::PoolError::InvalidResponse(format!(
				"Expected {} output amounts, got {}",
				pool.tokens().len(),
				built.expected_amounts_out.len()
			));
			self.exceptions.capture(&e, &context());
			return None;
		}

		Some(built)
	}

	/// Keys the SDK's raw amounts by the addresses reported to the caller.
	fn expected_amounts(
		&self,
		pool_tokens: &[Address],
		built: &BuiltExit,
		single_token_out: Option<Address>,
		unwrap_native: bool,
	) -> Result<HashMap<Address, U256>, ExitError> {
		if let Some(token) = single_token_out {
			let pool_token = self.chain.to_pool_token(&token);
			let index = pool_tokens
				.iter()
				.position(|t| *t == pool_token)
				.ok_or(ExitError::TokenNotInPool(token))?;
			return Ok(HashMap::from([(token, built.expected_amounts_out[index])]));
		}

		Ok(pool_tokens
			.iter()
			.zip(&built.expected_amounts_out)
			.map(|(token, amount)| {
				let key = if unwrap_native && *token == self.chain.wrapped_native_asset {
					self.chain.native_asset
				} else {
					*token
				};
				(key, *amount)
			})
			.collect())
	}
}
