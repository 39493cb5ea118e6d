//! Transaction delivery module for the exit service.
//!
//! Submitting a transaction (signing, fee estimation, broadcast) is owned
//! by an external provider. This crate defines the interface the exit
//! handler submits through and a service that adds logging around it.

use async_trait::async_trait;
use exit_types::{
	truncate_hash, ConfigSchema, ExitTransaction, TransactionReceipt, TransactionResponse, TxHash,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod rpc;
}

/// Errors that can occur during transaction delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when the provider rejects the transaction.
	#[error("Transaction rejected: {0}")]
	Rejected(String),
	/// Error that occurs when no confirmation arrives in time.
	#[error("Timed out waiting for {confirmations} confirmations after {seconds}s")]
	Timeout { confirmations: u64, seconds: u64 },
	/// Error that occurs when an implementation is misconfigured.
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Trait defining the interface for transaction submission.
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	/// Returns the configuration schema for this delivery implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Signs and sends a transaction, returning once it has been accepted.
	async fn send_transaction(
		&self,
		tx: &ExitTransaction,
	) -> Result<TransactionResponse, DeliveryError>;

	/// Waits until the transaction has the requested number of confirmations.
	async fn wait_for_confirmation(
		&self,
		hash: &TxHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError>;
}

/// Service wrapping the configured delivery implementation.
pub struct DeliveryService {
	provider: Box<dyn DeliveryInterface>,
}

impl DeliveryService {
	pub fn new(provider: Box<dyn DeliveryInterface>) -> Self {
		Self { provider }
	}

	pub async fn deliver(&self, tx: &ExitTransaction) -> Result<TransactionResponse, DeliveryError> {
		tracing::debug!(to = %tx.to, data_len = tx.data.len(), "Submitting transaction");

		match self.provider.send_transaction(tx).await {
			Ok(response) => {
				tracing::info!(tx_hash = %truncate_hash(&response.hash), "Transaction submitted");
				Ok(response)
			}
			Err(e) => {
				tracing::error!(error = %e, "Transaction submission failed");
				Err(e)
			}
		}
	}

	pub async fn confirm(
		&self,
		hash: &TxHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		self.provider.wait_for_confirmation(hash, confirmations).await
	}
}
