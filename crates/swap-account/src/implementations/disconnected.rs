use crate::{SignerError, WalletAccount, WalletSigner};
use async_trait::async_trait;
use swap_types::{SignedTransaction, UnsignedTransaction};

/// Stand-in used when no wallet is attached, such as read-only CLI runs.
///
/// Planning works; anything that needs a signature fails with
/// `NotConnected` before a transaction is built.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedSigner;

#[async_trait]
impl WalletSigner for DisconnectedSigner {
	async fn accounts(&self) -> Vec<WalletAccount> {
		Vec::new()
	}

	async fn is_connected(&self) -> bool {
		false
	}

	async fn sign(
		&self,
		_transaction: UnsignedTransaction,
	) -> Result<SignedTransaction, SignerError> {
		Err(SignerError::Unavailable("No wallet connected".to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::SignerService;
	use std::sync::Arc;
	use swap_types::{ChainFamily, SwapError};

	#[tokio::test]
	async fn test_disconnected_has_no_accounts() {
		let service = SignerService::new(Arc::new(DisconnectedSigner));
		assert!(!service.is_connected().await);
		assert!(matches!(
			service.account_for(ChainFamily::Near).await,
			Err(SwapError::NotConnected(_))
		));
	}
}
