//! Conversion between human-decimal strings and on-chain fixed-point integers.

use alloy::primitives::utils::{format_units, parse_units, ParseUnits};
use alloy::primitives::U256;
use thiserror::Error;

/// Precision of the raw price impact returned by pool SDKs.
pub const PRICE_IMPACT_DECIMALS: u8 = 18;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
	#[error("Invalid amount '{amount}': {reason}")]
	InvalidAmount { amount: String, reason: String },
	#[error("Negative amount '{0}'")]
	Negative(String),
	#[error("Cannot format amount: {0}")]
	Format(String),
}

/// Parses a decimal string such as `"10.5"` into its fixed-point form.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
	let trimmed = amount.trim();
	let parsed = parse_units(trimmed, decimals).map_err(|e| UnitsError::InvalidAmount {
		amount: amount.to_string(),
		reason: e.to_string(),
	})?;

	match parsed {
		ParseUnits::U256(value) => Ok(value),
		ParseUnits::I256(_) => Err(UnitsError::Negative(amount.to_string())),
	}
}

/// Formats a fixed-point integer as a human-decimal string.
///
/// Trailing zeros are dropped but one fractional digit is always kept, so
/// `5_000_000` at 6 decimals becomes `"5.0"`.
pub fn format_amount(raw: U256, decimals: u8) -> Result<String, UnitsError> {
	let formatted = format_units(raw, decimals).map_err(|e| UnitsError::Format(e.to_string()))?;
	Ok(trim_fraction(&formatted))
}

/// Converts an 18-decimal raw price impact into a ratio.
pub fn price_impact_ratio(raw: U256) -> Result<f64, UnitsError> {
	let formatted = format_amount(raw, PRICE_IMPACT_DECIMALS)?;
	formatted
		.parse::<f64>()
		.map_err(|e| UnitsError::Format(e.to_string()))
}

fn trim_fraction(formatted: &str) -> String {
	match formatted.split_once('.') {
		Some((whole, fraction)) => {
			let fraction = fraction.trim_end_matches('0');
			if fraction.is_empty() {
				format!("{}.0", whole)
			} else {
				format!("{}.{}", whole, fraction)
			}
		}
		None => format!("{}.0", formatted),
	}
}
