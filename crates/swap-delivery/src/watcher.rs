//! Confirmation polling.

use crate::DeliveryInterface;
use std::time::Duration;
use swap_chains::truncate_hash;
use swap_config::ExecutionConfig;
use swap_types::{ConfirmationResult, Result, SwapError, TransactionId};
use tracing::{debug, info, warn};

/// Polls a chain until a submitted transaction is final.
#[derive(Debug, Clone)]
pub struct ConfirmationWatcher {
	poll_interval: Duration,
}

impl ConfirmationWatcher {
	pub fn new(poll_interval: Duration) -> Self {
		Self { poll_interval }
	}

	pub fn from_config(config: &ExecutionConfig) -> Self {
		Self::new(Duration::from_millis(config.poll_interval_ms))
	}

	/// Resolves with the transaction's outcome, including on-chain failure,
	/// or fails with `ConfirmationTimeout` once `timeout` elapses.
	///
	/// Errors while polling never end the wait early.
	pub async fn await_finality(
		&self,
		delivery: &dyn DeliveryInterface,
		tx_id: &TransactionId,
		signer: &str,
		timeout: Duration,
	) -> Result<ConfirmationResult> {
		let chain = delivery.chain().clone();
		let poll = async {
			let mut attempts: u64 = 0;
			loop {
				attempts += 1;
				match delivery.check_confirmation(tx_id, signer).await {
					Ok(Some(result)) => return result,
					Ok(None) => {
						debug!(
							chain = %chain,
							tx_hash = %truncate_hash(tx_id.as_str()),
							attempts,
							"Transaction not final yet"
						);
					}
					Err(e) if e.is_transient() => {
						debug!(chain = %chain, error = %e, "Transient error while polling");
					}
					Err(e) => {
						warn!(chain = %chain, error = %e, "Error while polling confirmation");
					}
				}
				tokio::time::sleep(self.poll_interval).await;
			}
		};

		match tokio::time::timeout(timeout, poll).await {
			Ok(result) => {
				info!(
					chain = %chain,
					tx_hash = %truncate_hash(tx_id.as_str()),
					success = result.success,
					"Transaction final"
				);
				Ok(result)
			}
			Err(_) => {
				warn!(
					chain = %chain,
					tx_hash = %truncate_hash(tx_id.as_str()),
					timeout_ms = timeout.as_millis() as u64,
					"Gave up waiting for confirmation"
				);
				Err(SwapError::ConfirmationTimeout {
					tx_id: tx_id.to_string(),
					timeout_ms: timeout.as_millis() as u64,
				})
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{DeliveryError, RpcError};
	use async_trait::async_trait;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use swap_types::{ChainKey, SignedTransaction, SubmitOptions};

	/// Final after `pending` polls; the first poll fails with a transport error.
	struct SlowChain {
		chain: ChainKey,
		pending: usize,
		polls: AtomicUsize,
	}

	#[async_trait]
	impl DeliveryInterface for SlowChain {
		fn chain(&self) -> &ChainKey {
			&self.chain
		}

		async fn submit(
			&self,
			_transaction: SignedTransaction,
			_options: &SubmitOptions,
		) -> Result<TransactionId> {
			Ok(TransactionId::new("tx"))
		}

		async fn check_confirmation(
			&self,
			_tx_id: &TransactionId,
			_signer: &str,
		) -> std::result::Result<Option<ConfirmationResult>, DeliveryError> {
			let poll = self.polls.fetch_add(1, Ordering::SeqCst);
			if poll == 0 {
				return Err(DeliveryError::Rpc(RpcError::Transport("connection reset".into())));
			}
			if poll < self.pending {
				return Ok(None);
			}
			Ok(Some(ConfirmationResult::succeeded()))
		}
	}

	fn slow_chain(pending: usize) -> SlowChain {
		SlowChain {
			chain: ChainKey::solana(),
			pending,
			polls: AtomicUsize::new(0),
		}
	}

	#[tokio::test]
	async fn test_polls_through_transient_errors() {
		let watcher = ConfirmationWatcher::new(Duration::from_millis(5));
		let chain = slow_chain(3);

		let result = watcher
			.await_finality(&chain, &TransactionId::new("5sig"), "owner", Duration::from_secs(2))
			.await
			.unwrap();

		assert!(result.success);
		assert_eq!(chain.polls.load(Ordering::SeqCst), 4);
	}

	#[tokio::test]
	async fn test_timeout() {
		let watcher = ConfirmationWatcher::new(Duration::from_millis(5));
		let chain = slow_chain(usize::MAX);

		let err = watcher
			.await_finality(&chain, &TransactionId::new("5sig"), "owner", Duration::from_millis(40))
			.await
			.unwrap_err();

		assert_eq!(
			err,
			SwapError::ConfirmationTimeout {
				tx_id: "5sig".into(),
				timeout_ms: 40,
			}
		);
	}
}
