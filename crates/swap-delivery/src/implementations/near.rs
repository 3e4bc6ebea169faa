use crate::{DeliveryError, DeliveryInterface};
use async_trait::async_trait;
use swap_chains::{truncate_hash, NearRpcClient, NearTxOutcome};
use swap_types::{
	ChainKey, ConfirmationResult, Result, SignedPayload, SignedTransaction, SubmitOptions,
	SwapError, TransactionId,
};
use tracing::info;

/// Submits with `broadcast_tx_async` and confirms through the final
/// execution outcome.
pub struct NearDelivery {
	chain: ChainKey,
	rpc: NearRpcClient,
}

impl NearDelivery {
	pub fn new(chain: ChainKey, rpc: NearRpcClient) -> Self {
		Self { chain, rpc }
	}
}

#[async_trait]
impl DeliveryInterface for NearDelivery {
	fn chain(&self) -> &ChainKey {
		&self.chain
	}

	async fn submit(
		&self,
		transaction: SignedTransaction,
		_options: &SubmitOptions,
	) -> Result<TransactionId> {
		let encoded = match transaction.payload {
			SignedPayload::Base64(encoded) => encoded,
			SignedPayload::Hex(_) => {
				return Err(SwapError::SubmissionFailed {
					chain: self.chain.clone(),
					message: "NEAR transactions must be base64 encoded".to_string(),
				})
			}
		};

		let hash = self
			.rpc
			.broadcast_tx_async(&encoded)
			.await
			.map_err(|e| SwapError::SubmissionFailed {
				chain: self.chain.clone(),
				message: e.to_string(),
			})?;

		info!(
			chain = %self.chain,
			signer = %transaction.signer,
			tx_hash = %truncate_hash(&hash),
			"Submitted transaction"
		);
		Ok(TransactionId::new(hash))
	}

	async fn check_confirmation(
		&self,
		tx_id: &TransactionId,
		signer: &str,
	) -> std::result::Result<Option<ConfirmationResult>, DeliveryError> {
		if signer.is_empty() {
			return Err(DeliveryError::InvalidRequest(
				"NEAR status lookups need the sender account".to_string(),
			));
		}

		let outcome = self.rpc.tx_status(tx_id.as_str(), signer).await?;
		Ok(outcome.map(|outcome| match outcome {
			NearTxOutcome::Success => ConfirmationResult::succeeded(),
			NearTxOutcome::Failure(detail) => ConfirmationResult::failed(detail),
		}))
	}
}
