//! EVM JSON-RPC client.

use crate::rpc::JsonRpcClient;
use crate::utils::truncate_hash;
use crate::{Result, RpcError};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// The fields of a receipt needed to decide finality.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
	pub transaction_hash: String,
	/// Hex quantity
	pub block_number: Option<String>,
	/// `0x1` on success, `0x0` on revert
	pub status: Option<String>,
	#[serde(default)]
	pub gas_used: Option<String>,
}

impl TransactionReceipt {
	pub fn succeeded(&self) -> bool {
		self.status.as_deref() == Some("0x1")
	}

	pub fn block(&self) -> Option<u64> {
		self.block_number.as_deref().and_then(|b| parse_quantity(b).ok())
	}
}

/// Parses a hex quantity such as `0x1b4`.
pub fn parse_quantity(value: &str) -> Result<u64> {
	let digits = value.trim_start_matches("0x");
	u64::from_str_radix(digits, 16)
		.map_err(|e| RpcError::Decode(format!("Invalid hex quantity '{}': {}", value, e)))
}

/// Access to one EVM chain.
#[derive(Debug)]
pub struct EvmRpcClient {
	rpc: JsonRpcClient,
	chain_id: u64,
}

impl EvmRpcClient {
	pub fn new(url: impl Into<String>, chain_id: u64) -> Result<Self> {
		Ok(Self {
			rpc: JsonRpcClient::new(url)?,
			chain_id,
		})
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	/// Broadcasts a signed, 0x-hex encoded transaction. Returns its hash.
	pub async fn send_raw_transaction(&self, raw: &str) -> Result<String> {
		let hash: String = self.rpc.request("eth_sendRawTransaction", json!([raw])).await?;
		debug!(
			chain_id = self.chain_id,
			tx_hash = %truncate_hash(&hash),
			"Transaction accepted by EVM node"
		);
		Ok(hash)
	}

	/// Receipt of a mined transaction, `None` while pending.
	pub async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<TransactionReceipt>> {
		self.rpc
			.request_with_retry("eth_getTransactionReceipt", json!([hash]))
			.await
	}

	pub async fn block_number(&self) -> Result<u64> {
		let block: String = self
			.rpc
			.request_with_retry("eth_blockNumber", json!([]))
			.await?;
		parse_quantity(&block)
	}
}
