//! Error types for exit handling.

use exit_delivery::DeliveryError;
use exit_types::{Address, UnitsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExitError {
	#[error("Pool not found: {0}")]
	PoolNotFound(String),

	#[error("Token not found: {0}")]
	TokenNotFound(Address),

	#[error("Token {0} is not part of the pool")]
	TokenNotInPool(Address),

	#[error("No output tokens requested")]
	NoOutputs,

	#[error("Invalid amount: {0}")]
	InvalidAmount(#[from] UnitsError),

	#[error("Invalid decimals for token {token}: {reason}")]
	InvalidTokenDecimals { token: Address, reason: String },

	#[error("Slippage of {0} bps exceeds 100%")]
	InvalidSlippage(u32),

	#[error("Exit construction failed for pool {0}")]
	ExitConstructionFailed(String),

	#[error("Price impact unavailable: {0}")]
	PriceImpactUnavailable(String),

	#[error("No exit constructed")]
	NoExitConstructed,

	#[error("Delivery failed: {0}")]
	Delivery(#[from] DeliveryError),
}
