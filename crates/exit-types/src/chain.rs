//! Chain-level asset configuration.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Addresses of the chain's native asset and its wrapped ERC-20 form.
///
/// Pools only ever hold the wrapped token. When a caller asks for the native
/// asset the exit is built with unwrapping enabled and the wrapped token's
/// output is reported under the native address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAssets {
	/// Chain ID the assets live on.
	pub chain_id: u64,
	/// Sentinel address used for the native asset.
	#[serde(default)]
	pub native_asset: Address,
	/// Wrapped native token held by pools.
	pub wrapped_native_asset: Address,
}

impl ChainAssets {
	pub fn new(chain_id: u64, native_asset: Address, wrapped_native_asset: Address) -> Self {
		Self {
			chain_id,
			native_asset,
			wrapped_native_asset,
		}
	}

	/// Returns true if the address is the native asset sentinel.
	pub fn is_native(&self, address: &Address) -> bool {
		*address == self.native_asset
	}

	/// Maps the native asset onto the wrapped token a pool actually holds.
	pub fn to_pool_token(&self, address: &Address) -> Address {
		if self.is_native(address) {
			self.wrapped_native_asset
		} else {
			*address
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::address;

	#[test]
	fn test_native_maps_to_wrapped() {
		let weth = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
		let assets = ChainAssets::new(1, Address::ZERO, weth);

		assert!(assets.is_native(&Address::ZERO));
		assert!(!assets.is_native(&weth));
		assert_eq!(assets.to_pool_token(&Address::ZERO), weth);
		assert_eq!(assets.to_pool_token(&weth), weth);
	}
}
