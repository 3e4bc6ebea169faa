use crate::{DeliveryError, DeliveryInterface};
use async_trait::async_trait;
use std::sync::Arc;
use swap_chains::{truncate_hash, SolanaRpcClient};
use swap_types::{
	ChainKey, ConfirmationResult, Result, SignedPayload, SignedTransaction, SubmitOptions,
	SwapError, TransactionId,
};
use tracing::info;

/// Submits through `sendTransaction` and confirms at the client's
/// commitment level.
pub struct SolanaDelivery {
	chain: ChainKey,
	/// Connection shared with the Jupiter venue
	rpc: Arc<SolanaRpcClient>,
}

impl SolanaDelivery {
	pub fn new(chain: ChainKey, rpc: Arc<SolanaRpcClient>) -> Self {
		Self { chain, rpc }
	}
}

#[async_trait]
impl DeliveryInterface for SolanaDelivery {
	fn chain(&self) -> &ChainKey {
		&self.chain
	}

	async fn submit(
		&self,
		transaction: SignedTransaction,
		options: &SubmitOptions,
	) -> Result<TransactionId> {
		let encoded = match transaction.payload {
			SignedPayload::Base64(encoded) => encoded,
			SignedPayload::Hex(_) => {
				return Err(SwapError::SubmissionFailed {
					chain: self.chain.clone(),
					message: "Solana transactions must be base64 encoded".to_string(),
				})
			}
		};

		let config = self
			.rpc
			.send_config(options.skip_preflight, options.max_retries);
		let signature = self
			.rpc
			.send_transaction(&encoded, &config)
			.await
			.map_err(|e| SwapError::SubmissionFailed {
				chain: self.chain.clone(),
				message: e.to_string(),
			})?;

		info!(
			chain = %self.chain,
			tx_hash = %truncate_hash(&signature),
			"Submitted transaction"
		);
		Ok(TransactionId::new(signature))
	}

	async fn check_confirmation(
		&self,
		tx_id: &TransactionId,
		_signer: &str,
	) -> std::result::Result<Option<ConfirmationResult>, DeliveryError> {
		let status = match self.rpc.get_signature_status(tx_id.as_str()).await? {
			Some(status) => status,
			None => return Ok(None),
		};

		if let Some(err) = &status.err {
			return Ok(Some(ConfirmationResult::failed(err.to_string())));
		}
		if status.reached(self.rpc.commitment()) {
			return Ok(Some(ConfirmationResult::succeeded()));
		}
		Ok(None)
	}
}
