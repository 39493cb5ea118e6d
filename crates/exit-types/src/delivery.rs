//! Transaction delivery types.
//!
//! This module defines the minimal transaction shape handed to the delivery
//! layer and the handles it returns once the transaction is on its way.

use alloy::primitives::{Address, Bytes, TxHash};
use serde::{Deserialize, Serialize};

/// Target and calldata of an exit transaction.
///
/// Gas, nonce and fees are filled in by the delivery implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitTransaction {
	pub to: Address,
	pub data: Bytes,
}

/// Handle returned once a transaction has been accepted by the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
	/// Hash of the submitted transaction.
	pub hash: TxHash,
	/// Account that sent the transaction.
	pub from: Address,
	/// Chain the transaction was sent to.
	pub chain_id: u64,
}

/// Transaction receipt containing execution details.
///
/// Provides information about a transaction after it has been included in a block,
/// including its success status and block number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TxHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}

/// Shortens a transaction hash for log output.
pub fn truncate_hash(hash: &TxHash) -> String {
	let hash_str = hash.to_string();
	if hash_str.len() <= 10 {
		hash_str
	} else {
		format!("{}..", &hash_str[..10])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_hash() {
		let hash = TxHash::repeat_byte(0xab);
		assert_eq!(truncate_hash(&hash), "0xabababab..");
	}
}
