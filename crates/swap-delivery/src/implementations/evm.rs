use crate::{DeliveryError, DeliveryInterface};
use async_trait::async_trait;
use swap_chains::{truncate_hash, EvmRpcClient};
use swap_types::{
	ChainKey, ConfirmationResult, Result, SignedPayload, SignedTransaction, SubmitOptions,
	SwapError, TransactionId,
};
use tracing::{debug, info};

/// Submits raw transactions and waits for a receipt buried under
/// `confirmations` blocks.
pub struct EvmDelivery {
	chain: ChainKey,
	rpc: EvmRpcClient,
	/// Blocks, counting the receipt's own, before the swap is final
	confirmations: u64,
}

impl EvmDelivery {
	pub fn new(chain: ChainKey, rpc: EvmRpcClient, confirmations: u64) -> Self {
		Self {
			chain,
			rpc,
			confirmations: confirmations.max(1),
		}
	}
}

#[async_trait]
impl DeliveryInterface for EvmDelivery {
	fn chain(&self) -> &ChainKey {
		&self.chain
	}

	// `max_retries` and `skip_preflight` have no EVM equivalent.
	async fn submit(
		&self,
		transaction: SignedTransaction,
		_options: &SubmitOptions,
	) -> Result<TransactionId> {
		let raw = match transaction.payload {
			SignedPayload::Hex(raw) => raw,
			SignedPayload::Base64(_) => {
				return Err(SwapError::SubmissionFailed {
					chain: self.chain.clone(),
					message: "EVM transactions must be 0x-hex encoded".to_string(),
				})
			}
		};

		let hash = self
			.rpc
			.send_raw_transaction(&raw)
			.await
			.map_err(|e| SwapError::SubmissionFailed {
				chain: self.chain.clone(),
				message: e.to_string(),
			})?;

		if let Some(expected) = &transaction.precomputed_id {
			if !expected.as_str().eq_ignore_ascii_case(&hash) {
				debug!(
					expected = %truncate_hash(expected.as_str()),
					reported = %truncate_hash(&hash),
					"Node reported a different hash than the signer"
				);
			}
		}

		info!(
			chain = %self.chain,
			chain_id = self.rpc.chain_id(),
			tx_hash = %truncate_hash(&hash),
			"Submitted transaction"
		);
		Ok(TransactionId::new(hash))
	}

	async fn check_confirmation(
		&self,
		tx_id: &TransactionId,
		_signer: &str,
	) -> std::result::Result<Option<ConfirmationResult>, DeliveryError> {
		let receipt = match self.rpc.get_transaction_receipt(tx_id.as_str()).await? {
			Some(receipt) => receipt,
			None => return Ok(None),
		};
		let Some(mined_in) = receipt.block() else {
			return Ok(None);
		};

		if !receipt.succeeded() {
			return Ok(Some(ConfirmationResult::failed(format!(
				"Reverted in block {}",
				mined_in
			))));
		}

		if self.confirmations > 1 {
			let head = self.rpc.block_number().await?;
			let depth = head.saturating_sub(mined_in) + 1;
			if depth < self.confirmations {
				debug!(
					tx_hash = %truncate_hash(tx_id.as_str()),
					depth,
					required = self.confirmations,
					"Waiting for confirmations"
				);
				return Ok(None);
			}
		}

		Ok(Some(ConfirmationResult::succeeded()))
	}
}
