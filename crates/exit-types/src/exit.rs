//! Exit request and quote types.
//!
//! An exit redeems pool-share tokens (BPT) for the pool's underlying tokens.
//! The types here describe what the caller asks for, what the pool SDK
//! builds, and what is handed back to the caller as a quote.

use crate::delivery::ExitTransaction;
use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Decimal precision of pool-share tokens.
pub const BPT_DECIMALS: u8 = 18;

/// Decimal precision assumed for tokens whose metadata has none.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Metadata for a token known to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
	pub address: Address,
	#[serde(default)]
	pub symbol: Option<String>,
	/// On-chain decimals. Falls back to [`DEFAULT_TOKEN_DECIMALS`] when absent.
	#[serde(default)]
	pub decimals: Option<u8>,
}

impl TokenInfo {
	pub fn decimals_or_default(&self) -> u8 {
		self.decimals.unwrap_or(DEFAULT_TOKEN_DECIMALS)
	}
}

/// A token address paired with a human-readable amount.
///
/// For requested outputs the amount is a placeholder; the quote fills in
/// the real value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
	pub address: Address,
	#[serde(default)]
	pub amount: String,
}

/// Parameters for a single exact-BPT-in exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitParams {
	/// Account redeeming the pool-share tokens.
	pub exiter: Address,
	/// Pool identifier as known to the pool registry.
	pub pool_id: String,
	/// Known token metadata, keyed by address.
	pub tokens: HashMap<Address, TokenInfo>,
	/// BPT to redeem, as a decimal string.
	pub bpt_in: String,
	/// Maximum tolerated slippage in basis points.
	pub slippage_bps: u32,
	/// Requested output tokens. One entry means a single-token exit.
	pub amounts_out: Vec<TokenAmount>,
}

impl ExitParams {
	/// Returns the single output token if exactly one was requested.
	pub fn single_token_out(&self) -> Option<Address> {
		match self.amounts_out.as_slice() {
			[only] => Some(only.address),
			_ => None,
		}
	}
}

/// Free-form attributes the pool SDK attaches to a built exit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitAttributes {
	#[serde(default)]
	pub pool_id: String,
	#[serde(default)]
	pub sender: Option<Address>,
	#[serde(default)]
	pub recipient: Option<Address>,
	/// Encoded exit request payload, when the SDK exposes it.
	#[serde(default)]
	pub exit_pool_request: Option<Bytes>,
}

/// Exit transaction as returned by the pool SDK.
///
/// `expected_amounts_out` is ordered like the pool's non-BPT tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltExit {
	pub to: Address,
	pub data: Bytes,
	#[serde(default)]
	pub attributes: ExitAttributes,
	pub expected_amounts_out: Vec<U256>,
}

/// A constructed exit ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExit {
	pub pool_id: String,
	pub to: Address,
	pub data: Bytes,
	pub attributes: ExitAttributes,
	/// Raw expected amounts, keyed by the address reported to the caller.
	pub expected_amounts_out: HashMap<Address, U256>,
}

impl PendingExit {
	/// The `{to, data}` pair sent to the delivery layer.
	pub fn transaction(&self) -> ExitTransaction {
		ExitTransaction {
			to: self.to,
			data: self.data.clone(),
		}
	}
}

/// Normalized result of an exit query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
	/// Human-decimal output amounts keyed by checksummed token address.
	pub amounts_out: HashMap<String, String>,
	pub price_impact: f64,
	pub tx_ready: bool,
}

/// Query output together with the exit it was computed from.
#[derive(Debug, Clone)]
pub struct ExitQuote {
	pub output: QueryOutput,
	pub pending: PendingExit,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn params(outputs: Vec<Address>) -> ExitParams {
		ExitParams {
			exiter: Address::repeat_byte(0x01),
			pool_id: "pool".to_string(),
			tokens: HashMap::new(),
			bpt_in: "1.0".to_string(),
			slippage_bps: 50,
			amounts_out: outputs
				.into_iter()
				.map(|address| TokenAmount {
					address,
					amount: String::new(),
				})
				.collect(),
		}
	}

	#[test]
	fn test_single_token_out() {
		let token = Address::repeat_byte(0xaa);
		assert_eq!(params(vec![token]).single_token_out(), Some(token));
		assert_eq!(
			params(vec![token, Address::repeat_byte(0xbb)]).single_token_out(),
			None
		);
		assert_eq!(params(vec![]).single_token_out(), None);
	}

	#[test]
	fn test_params_deserialize_without_placeholders() {
		let json = r#"{
			"exiter": "0x0101010101010101010101010101010101010101",
			"pool_id": "0xabc",
			"tokens": {
				"0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48": {
					"address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
					"symbol": "USDC",
					"decimals": 6
				}
			},
			"bpt_in": "10.0",
			"slippage_bps": 100,
			"amounts_out": [{ "address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48" }]
		}"#;

		let params: ExitParams = serde_json::from_str(json).unwrap();
		let token = params.single_token_out().unwrap();
		assert_eq!(params.tokens[&token].decimals_or_default(), 6);
		assert!(params.amounts_out[0].amount.is_empty());
	}
}
