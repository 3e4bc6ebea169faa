//! NEAR JSON-RPC client.

use crate::rpc::JsonRpcClient;
use crate::utils::truncate_hash;
use crate::{Result, RpcError};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Final outcome of a NEAR transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum NearTxOutcome {
	Success,
	Failure(String),
}

#[derive(Debug, Deserialize)]
struct FinalExecutionOutcome {
	status: serde_json::Value,
}

/// Access to a NEAR node.
#[derive(Debug)]
pub struct NearRpcClient {
	rpc: JsonRpcClient,
}

impl NearRpcClient {
	pub fn new(url: impl Into<String>) -> Result<Self> {
		Ok(Self {
			rpc: JsonRpcClient::new(url)?,
		})
	}

	/// Broadcasts a signed, base64-encoded transaction without waiting for
	/// execution. Returns the transaction hash.
	pub async fn broadcast_tx_async(&self, signed: &str) -> Result<String> {
		let hash: String = self.rpc.request("broadcast_tx_async", json!([signed])).await?;
		debug!(tx_hash = %truncate_hash(&hash), "Transaction accepted by NEAR node");
		Ok(hash)
	}

	/// Final execution outcome, `None` while the node does not know the
	/// transaction yet or it is still executing.
	pub async fn tx_status(&self, hash: &str, sender_id: &str) -> Result<Option<NearTxOutcome>> {
		let outcome: FinalExecutionOutcome = match self
			.rpc
			.request_with_retry("tx", json!([hash, sender_id]))
			.await
		{
			Ok(outcome) => outcome,
			Err(RpcError::Rpc { cause: Some(cause), .. })
				if cause == "UNKNOWN_TRANSACTION" || cause == "TIMEOUT_ERROR" =>
			{
				return Ok(None)
			}
			Err(e) => return Err(e),
		};

		Ok(parse_status(&outcome.status))
	}
}

fn parse_status(status: &serde_json::Value) -> Option<NearTxOutcome> {
	if let Some(failure) = status.get("Failure") {
		return Some(NearTxOutcome::Failure(failure.to_string()));
	}
	if status.get("SuccessValue").is_some() || status.get("SuccessReceiptId").is_some() {
		return Some(NearTxOutcome::Success);
	}
	// "NotStarted" / "Started"
	None
}
