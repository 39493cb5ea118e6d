//! JSON-RPC delivery using the Alloy provider stack.
//!
//! Transactions are signed with a local key and sent through an HTTP
//! provider whose fillers take care of nonce, gas and fees.

use crate::{DeliveryError, DeliveryInterface};
use alloy::network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use exit_types::{
	truncate_hash, validate_private_key, ConfigSchema, ExitTransaction, Field, FieldType, Schema,
	TransactionReceipt, TransactionResponse, TxHash,
};
use std::time::Duration;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 4;
const SECONDS_PER_CONFIRMATION: u64 = 20;
const MAX_CONFIRMATION_WAIT_SECS: u64 = 3600;

/// Alloy-based EVM delivery implementation.
pub struct AlloyDelivery {
	provider: DynProvider,
	/// Address of the signing key.
	from: Address,
	chain_id: u64,
	poll_interval: Duration,
}

impl AlloyDelivery {
	/// Creates a provider for `rpc_url` that signs with `signer` on `chain_id`.
	pub fn new(
		rpc_url: &str,
		chain_id: u64,
		signer: PrivateKeySigner,
	) -> Result<Self, DeliveryError> {
		let url = rpc_url
			.parse()
			.map_err(|e| DeliveryError::Config(format!("Invalid RPC URL: {}", e)))?;

		let signer = signer.with_chain_id(Some(chain_id));
		let from = signer.address();
		let wallet = EthereumWallet::from(signer);

		let provider = ProviderBuilder::new()
			.wallet(wallet)
			.connect_http(url)
			.erased();

		Ok(Self {
			provider,
			from,
			chain_id,
			poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
		})
	}

	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	/// Address transactions are sent from.
	pub fn address(&self) -> Address {
		self.from
	}
}

/// Configuration schema for the RPC delivery provider.
pub struct AlloyDeliverySchema;

impl ConfigSchema for AlloyDeliverySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), exit_types::ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("rpc_url", FieldType::HttpUrl),
				Field::new("private_key", FieldType::String).with_validator(validate_private_key),
				Field::new(
					"chain_id",
					FieldType::Integer {
						min: Some(1),
						max: None,
					},
				),
			],
			vec![Field::new(
				"poll_interval_secs",
				FieldType::Integer {
					min: Some(1),
					max: Some(60),
				},
			)],
		);

		schema.validate(config)
	}
}

#[async_trait]
impl DeliveryInterface for AlloyDelivery {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AlloyDeliverySchema)
	}

	async fn send_transaction(
		&self,
		tx: &ExitTransaction,
	) -> Result<TransactionResponse, DeliveryError> {
		let request = TransactionRequest::default()
			.with_from(self.from)
			.with_to(tx.to)
			.with_input(tx.data.clone())
			.with_chain_id(self.chain_id);

		let pending = self.provider.send_transaction(request).await.map_err(|e| {
			if e.is_error_resp() {
				DeliveryError::Rejected(e.to_string())
			} else {
				DeliveryError::Network(format!("Failed to send transaction: {}", e))
			}
		})?;

		let hash = *pending.tx_hash();
		tracing::info!(tx_hash = %truncate_hash(&hash), "Sent transaction");

		Ok(TransactionResponse {
			hash,
			from: self.from,
			chain_id: self.chain_id,
		})
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TxHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		let timeout_seconds = confirmations
			.saturating_mul(SECONDS_PER_CONFIRMATION)
			.max(SECONDS_PER_CONFIRMATION)
			.min(MAX_CONFIRMATION_WAIT_SECS);
		let max_wait_time = Duration::from_secs(timeout_seconds);
		let start_time = tokio::time::Instant::now();

		tracing::info!(
			tx_hash = %truncate_hash(hash),
			"Waiting for {} confirmations (timeout: {}s)",
			confirmations,
			timeout_seconds
		);

		loop {
			if start_time.elapsed() > max_wait_time {
				return Err(DeliveryError::Timeout {
					confirmations,
					seconds: timeout_seconds,
				});
			}

			let receipt = match self.provider.get_transaction_receipt(*hash).await {
				Ok(Some(receipt)) => receipt,
				Ok(None) => {
					tokio::time::sleep(self.poll_interval).await;
					continue;
				}
				Err(e) => {
					return Err(DeliveryError::Network(format!(
						"Failed to get receipt: {}",
						e
					)));
				}
			};

			let current_block = self.provider.get_block_number().await.map_err(|e| {
				DeliveryError::Network(format!("Failed to get block number: {}", e))
			})?;

			// The inclusion block counts as the first confirmation.
			let tx_block = receipt.block_number.unwrap_or(current_block);
			let current_confirmations = current_block.saturating_sub(tx_block) + 1;

			if current_confirmations >= confirmations {
				return Ok(TransactionReceipt {
					hash: receipt.transaction_hash,
					block_number: tx_block,
					success: receipt.status(),
				});
			}

			tracing::debug!(
				"Waiting for {} more confirmations...",
				confirmations - current_confirmations
			);
			tokio::time::sleep(self.poll_interval).await;
		}
	}
}

/// Factory function to create an RPC delivery provider from configuration.
///
/// Required configuration parameters:
/// - `rpc_url`: The HTTP RPC endpoint URL
/// - `chain_id`: The blockchain network chain ID
/// - `private_key`: The private key for transaction signing
pub fn create_delivery(config: &toml::Value) -> Result<Box<dyn DeliveryInterface>, DeliveryError> {
	AlloyDeliverySchema
		.validate(config)
		.map_err(|e| DeliveryError::Config(e.to_string()))?;

	let rpc_url = config
		.get("rpc_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| DeliveryError::Config("rpc_url is required".to_string()))?;

	let chain_id = config
		.get("chain_id")
		.and_then(|v| v.as_integer())
		.ok_or_else(|| DeliveryError::Config("chain_id is required".to_string()))? as u64;

	let signer: PrivateKeySigner = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.ok_or_else(|| DeliveryError::Config("private_key is required".to_string()))?
		.parse()
		.map_err(|e| DeliveryError::Config(format!("Invalid private key: {}", e)))?;

	let mut delivery = AlloyDelivery::new(rpc_url, chain_id, signer)?;
	if let Some(secs) = config.get("poll_interval_secs").and_then(|v| v.as_integer()) {
		delivery = delivery.with_poll_interval(Duration::from_secs(secs as u64));
	}

	Ok(Box::new(delivery))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::DeliveryService;
	use alloy::primitives::{address, Bytes};
	use serde_json::{json, Value};
	use std::collections::HashMap;
	use wiremock::matchers::method;
	use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

	const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	const SENT_HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

	/// Answers JSON-RPC calls by method name, echoing the request id.
	struct JsonRpc {
		results: HashMap<&'static str, Value>,
		errors: HashMap<&'static str, &'static str>,
	}

	impl JsonRpc {
		fn node() -> Self {
			let results = HashMap::from([
				("eth_chainId", json!("0x7a69")),
				("eth_getTransactionCount", json!("0x0")),
				("eth_estimateGas", json!("0x5208")),
				("eth_gasPrice", json!("0x3b9aca00")),
				("eth_maxPriorityFeePerGas", json!("0x3b9aca00")),
				("eth_blockNumber", json!("0x10")),
				(
					"eth_feeHistory",
					json!({
						"oldestBlock": "0x1",
						"baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"],
						"gasUsedRatio": [0.5],
						"reward": [["0x3b9aca00"]]
					}),
				),
				("eth_sendRawTransaction", json!(SENT_HASH)),
			]);
			Self {
				results,
				errors: HashMap::new(),
			}
		}

		fn failing(mut self, method: &'static str, message: &'static str) -> Self {
			self.results.remove(method);
			self.errors.insert(method, message);
			self
		}
	}

	impl Respond for JsonRpc {
		fn respond(&self, request: &Request) -> ResponseTemplate {
			let body: Value = serde_json::from_slice(&request.body).unwrap();
			let method = body["method"].as_str().unwrap_or_default();

			let payload = match (self.results.get(method), self.errors.get(method)) {
				(Some(result), _) => json!({"jsonrpc": "2.0", "id": body["id"], "result": result}),
				(None, Some(message)) => json!({
					"jsonrpc": "2.0",
					"id": body["id"],
					"error": {"code": -32000, "message": message}
				}),
				(None, None) => json!({
					"jsonrpc": "2.0",
					"id": body["id"],
					"error": {"code": -32601, "message": format!("method {} not found", method)}
				}),
			};
			ResponseTemplate::new(200).set_body_json(payload)
		}
	}

	async fn node(rpc: JsonRpc) -> MockServer {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(rpc)
			.mount(&server)
			.await;
		server
	}

	fn delivery(url: &str) -> AlloyDelivery {
		let signer: PrivateKeySigner = ANVIL_KEY.parse().unwrap();
		AlloyDelivery::new(url, 31337, signer).unwrap()
	}

	fn exit_tx() -> ExitTransaction {
		ExitTransaction {
			to: address!("ba12222222228d8ba445958a75a0704d566bf2c8"),
			data: Bytes::from(vec![0x8b, 0xdb, 0x39, 0x13]),
		}
	}

	#[tokio::test]
	async fn test_send_transaction_returns_node_hash() {
		let server = node(JsonRpc::node()).await;
		let service = DeliveryService::new(Box::new(delivery(&server.uri())));

		let response = service.deliver(&exit_tx()).await.unwrap();

		assert_eq!(response.hash, SENT_HASH.parse::<TxHash>().unwrap());
		assert_eq!(
			response.from,
			address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);
		assert_eq!(response.chain_id, 31337);

		let requests = server.received_requests().await.unwrap();
		assert!(requests.iter().any(|r| {
			serde_json::from_slice::<Value>(&r.body).unwrap()["method"] == "eth_sendRawTransaction"
		}));
	}

	#[tokio::test]
	async fn test_send_transaction_maps_node_error_to_rejected() {
		let server = node(
			JsonRpc::node().failing("eth_sendRawTransaction", "insufficient funds for gas"),
		)
		.await;

		let err = delivery(&server.uri())
			.send_transaction(&exit_tx())
			.await
			.unwrap_err();

		assert!(matches!(err, DeliveryError::Rejected(msg) if msg.contains("insufficient funds")));
	}

	#[tokio::test]
	async fn test_confirmation_timeout_saturates() {
		let delivery = delivery("http://127.0.0.1:1");

		let err = delivery
			.wait_for_confirmation(&TxHash::ZERO, u64::MAX)
			.await
			.unwrap_err();

		assert!(matches!(err, DeliveryError::Network(_)));
	}

	fn config(s: &str) -> toml::Value {
		toml::Value::Table(toml::from_str::<toml::Table>(s).unwrap())
	}

	#[test]
	fn test_delivery_uses_signer_address() {
		let signer: PrivateKeySigner = ANVIL_KEY.parse().unwrap();
		let delivery = AlloyDelivery::new("http://localhost:8545", 31337, signer).unwrap();
		assert_eq!(
			delivery.address(),
			address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);
	}

	#[test]
	fn test_create_delivery_rejects_bad_key() {
		let config = config(
			r#"
rpc_url = "http://localhost:8545"
chain_id = 1
private_key = "0xnothex"
"#,
		);
		assert!(matches!(
			create_delivery(&config),
			Err(DeliveryError::Config(_))
		));
	}

	#[test]
	fn test_create_delivery_from_config() {
		let config = config(&format!(
			r#"
rpc_url = "http://localhost:8545"
chain_id = 31337
private_key = "{}"
poll_interval_secs = 1
"#,
			ANVIL_KEY
		));
		assert!(create_delivery(&config).is_ok());
	}
}
