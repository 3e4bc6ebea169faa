//! Solana JSON-RPC client.

use crate::rpc::JsonRpcClient;
use crate::utils::truncate_hash;
use crate::{Result, RpcError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Options for `sendTransaction`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionConfig {
	pub encoding: &'static str,
	pub skip_preflight: bool,
	pub preflight_commitment: String,
	/// Node-side rebroadcast attempts.
	pub max_retries: u32,
}

/// Status of one signature as returned by `getSignatureStatuses`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
	pub slot: u64,
	pub confirmations: Option<u64>,
	/// Transaction error, `null` on success.
	pub err: Option<serde_json::Value>,
	pub confirmation_status: Option<String>,
}

impl SignatureStatus {
	/// Whether the status has reached `commitment`.
	pub fn reached(&self, commitment: &str) -> bool {
		let rank = |level: &str| match level {
			"processed" => 0,
			"confirmed" => 1,
			"finalized" => 2,
			_ => 0,
		};
		match &self.confirmation_status {
			Some(status) => rank(status) >= rank(commitment),
			// Older nodes report only a confirmation count; `None` means rooted
			None => self.confirmations.is_none(),
		}
	}
}

#[derive(Debug, Deserialize)]
struct RpcResponseWithContext<T> {
	value: T,
}

/// Read and broadcast access to a Solana node.
#[derive(Debug)]
pub struct SolanaRpcClient {
	rpc: JsonRpcClient,
	commitment: String,
}

impl SolanaRpcClient {
	pub fn new(url: impl Into<String>, commitment: impl Into<String>) -> Result<Self> {
		Ok(Self {
			rpc: JsonRpcClient::new(url)?,
			commitment: commitment.into(),
		})
	}

	pub fn from_rpc(rpc: JsonRpcClient, commitment: impl Into<String>) -> Self {
		Self {
			rpc,
			commitment: commitment.into(),
		}
	}

	pub fn url(&self) -> &str {
		self.rpc.url()
	}

	pub fn commitment(&self) -> &str {
		&self.commitment
	}

	pub fn send_config(&self, skip_preflight: bool, max_retries: u32) -> SendTransactionConfig {
		SendTransactionConfig {
			encoding: "base64",
			skip_preflight,
			preflight_commitment: self.commitment.clone(),
			max_retries,
		}
	}

	/// Broadcasts a signed, base64-encoded transaction. Returns its signature.
	pub async fn send_transaction(
		&self,
		transaction: &str,
		config: &SendTransactionConfig,
	) -> Result<String> {
		let signature: String = self
			.rpc
			.request("sendTransaction", json!([transaction, config]))
			.await?;
		debug!(signature = %truncate_hash(&signature), "Transaction accepted by Solana node");
		Ok(signature)
	}

	/// Status of a signature, `None` while the node has not seen it.
	pub async fn get_signature_status(&self, signature: &str) -> Result<Option<SignatureStatus>> {
		let response: RpcResponseWithContext<Vec<Option<SignatureStatus>>> = self
			.rpc
			.request_with_retry(
				"getSignatureStatuses",
				json!([[signature], {"searchTransactionHistory": true}]),
			)
			.await?;

		response
			.value
			.into_iter()
			.next()
			.ok_or_else(|| RpcError::Decode("getSignatureStatuses returned no entries".to_string()))
	}

	pub async fn get_slot(&self) -> Result<u64> {
		self.rpc
			.request_with_retry("getSlot", json!([{"commitment": self.commitment}]))
			.await
	}
}
