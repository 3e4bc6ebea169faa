//! Wallet signing boundary.
//!
//! Key material never enters this workspace. A [`WalletSigner`] stands for
//! the user's connected wallet; [`SignerService`] wraps it, resolves which
//! account signs for a chain family and keeps signing requests for one
//! account from overlapping when the wallet cannot handle that.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use swap_types::{ChainFamily, Result, SignedTransaction, SwapError, UnsignedTransaction};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub mod implementations;

pub use implementations::disconnected::DisconnectedSigner;

/// Errors reported by a wallet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
	#[error("Request rejected: {0}")]
	Rejected(String),
	#[error("Wallet unavailable: {0}")]
	Unavailable(String),
	#[error("Unsupported payload: {0}")]
	UnsupportedPayload(String),
}

impl From<SignerError> for SwapError {
	fn from(error: SignerError) -> Self {
		match error {
			SignerError::Rejected(message) => SwapError::UserRejected(message),
			SignerError::Unavailable(message) => SwapError::SignerUnavailable(message),
			SignerError::UnsupportedPayload(kind) => {
				SwapError::SignerUnavailable(format!("Wallet cannot sign {} payloads", kind))
			}
		}
	}
}

/// An account exposed by the connected wallet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletAccount {
	pub family: ChainFamily,
	pub address: String,
}

impl WalletAccount {
	pub fn new(family: ChainFamily, address: impl Into<String>) -> Self {
		Self {
			family,
			address: address.into(),
		}
	}

	/// EVM addresses compare case-insensitively; other chains are exact.
	pub fn matches(&self, address: &str) -> bool {
		match self.family {
			ChainFamily::Evm => self.address.eq_ignore_ascii_case(address),
			_ => self.address == address,
		}
	}
}

/// Capability of the external wallet.
#[async_trait]
pub trait WalletSigner: Send + Sync {
	/// Accounts the user has connected, in the wallet's preferred order.
	async fn accounts(&self) -> Vec<WalletAccount>;

	async fn is_connected(&self) -> bool;

	/// Signs `transaction`. The unsigned transaction is consumed.
	async fn sign(
		&self,
		transaction: UnsignedTransaction,
	) -> std::result::Result<SignedTransaction, SignerError>;

	/// Whether the wallet accepts overlapping requests for one account.
	fn is_reentrant(&self) -> bool {
		false
	}
}

/// Signing front for the orchestrator.
pub struct SignerService {
	signer: Arc<dyn WalletSigner>,
	locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SignerService {
	pub fn new(signer: Arc<dyn WalletSigner>) -> Self {
		Self {
			signer,
			locks: DashMap::new(),
		}
	}

	pub async fn is_connected(&self) -> bool {
		self.signer.is_connected().await
	}

	/// First connected account able to sign for `family`.
	pub async fn account_for(&self, family: ChainFamily) -> Result<String> {
		if !self.signer.is_connected().await {
			return Err(SwapError::NotConnected("No wallet connected".to_string()));
		}

		self.signer
			.accounts()
			.await
			.into_iter()
			.find(|account| account.family == family)
			.map(|account| account.address)
			.ok_or_else(|| SwapError::NotConnected(format!("No {} account connected", family)))
	}

	/// Signs `transaction` with the account it names.
	///
	/// Requests for the same account are queued unless the wallet is
	/// reentrant.
	pub async fn sign(&self, transaction: UnsignedTransaction) -> Result<SignedTransaction> {
		if !self.signer.is_connected().await {
			return Err(SwapError::SignerUnavailable(
				"Wallet disconnected".to_string(),
			));
		}

		let family = transaction.payload.family();
		let known = self
			.signer
			.accounts()
			.await
			.iter()
			.any(|account| account.family == family && account.matches(&transaction.signer));
		if !known {
			return Err(SwapError::SignerUnavailable(format!(
				"Account {} is not connected",
				transaction.signer
			)));
		}

		if self.signer.is_reentrant() {
			return self.sign_now(transaction).await;
		}

		let lock = self
			.locks
			.entry(transaction.signer.to_ascii_lowercase())
			.or_default()
			.clone();
		let _guard = lock.lock().await;
		self.sign_now(transaction).await
	}

	async fn sign_now(&self, transaction: UnsignedTransaction) -> Result<SignedTransaction> {
		let chain = transaction.chain.clone();
		let account = transaction.signer.clone();
		debug!(
			chain = %chain,
			account = %account,
			payload = transaction.payload.kind(),
			"Requesting signature"
		);

		let signed = self.signer.sign(transaction).await?;
		info!(chain = %chain, account = %account, "Transaction signed");
		Ok(signed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;
	use swap_types::{ChainKey, SignedPayload, SubmissionHints, TransactionPayload, VenueId};

	const OWNER: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

	struct FakeWallet {
		reentrant: bool,
		reject: bool,
		in_flight: AtomicUsize,
		max_in_flight: AtomicUsize,
	}

	impl FakeWallet {
		fn new(reentrant: bool) -> Self {
			Self {
				reentrant,
				reject: false,
				in_flight: AtomicUsize::new(0),
				max_in_flight: AtomicUsize::new(0),
			}
		}
	}

	#[async_trait]
	impl WalletSigner for FakeWallet {
		async fn accounts(&self) -> Vec<WalletAccount> {
			vec![WalletAccount::new(ChainFamily::Solana, OWNER)]
		}

		async fn is_connected(&self) -> bool {
			true
		}

		async fn sign(
			&self,
			transaction: UnsignedTransaction,
		) -> std::result::Result<SignedTransaction, SignerError> {
			if self.reject {
				return Err(SignerError::Rejected("user closed the popup".into()));
			}
			let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
			self.max_in_flight.fetch_max(now, Ordering::SeqCst);
			tokio::time::sleep(Duration::from_millis(20)).await;
			self.in_flight.fetch_sub(1, Ordering::SeqCst);

			Ok(SignedTransaction::new(
				transaction.chain,
				transaction.signer,
				SignedPayload::Base64("c2lnbmVk".into()),
			)
			.with_hints(transaction.hints))
		}

		fn is_reentrant(&self) -> bool {
			self.reentrant
		}
	}

	fn unsigned(signer: &str) -> UnsignedTransaction {
		UnsignedTransaction {
			venue: VenueId::jupiter(),
			chain: ChainKey::solana(),
			signer: signer.to_string(),
			payload: TransactionPayload::SolanaVersioned {
				transaction: "AQAB".into(),
				last_valid_block_height: 279_000_000,
				prioritization_fee_lamports: None,
			},
			hints: SubmissionHints::default(),
			summary: None,
		}
	}

	#[tokio::test]
	async fn test_signing_is_serialized_per_account() {
		let wallet = Arc::new(FakeWallet::new(false));
		let service = Arc::new(SignerService::new(wallet.clone()));

		let a = tokio::spawn({
			let service = service.clone();
			async move { service.sign(unsigned(OWNER)).await }
		});
		let b = tokio::spawn({
			let service = service.clone();
			async move { service.sign(unsigned(OWNER)).await }
		});
		a.await.unwrap().unwrap();
		b.await.unwrap().unwrap();

		assert_eq!(wallet.max_in_flight.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_reentrant_wallet_is_not_queued() {
		let wallet = Arc::new(FakeWallet::new(true));
		let service = Arc::new(SignerService::new(wallet.clone()));

		let (a, b) = tokio::join!(service.sign(unsigned(OWNER)), service.sign(unsigned(OWNER)));
		a.unwrap();
		b.unwrap();

		assert_eq!(wallet.max_in_flight.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn test_rejection_and_unknown_account() {
		let wallet = Arc::new(FakeWallet {
			reject: true,
			..FakeWallet::new(false)
		});
		let service = SignerService::new(wallet);

		assert!(matches!(
			service.sign(unsigned(OWNER)).await,
			Err(SwapError::UserRejected(_))
		));
		assert!(matches!(
			service.sign(unsigned("SomeoneElse111111111111111111111111111111")).await,
			Err(SwapError::SignerUnavailable(_))
		));
	}

	#[tokio::test]
	async fn test_account_resolution() {
		let service = SignerService::new(Arc::new(FakeWallet::new(false)));
		assert_eq!(service.account_for(ChainFamily::Solana).await.unwrap(), OWNER);
		assert!(matches!(
			service.account_for(ChainFamily::Evm).await,
			Err(SwapError::NotConnected(_))
		));

		let evm = WalletAccount::new(ChainFamily::Evm, "0xAbC0000000000000000000000000000000000001");
		assert!(evm.matches("0xabc0000000000000000000000000000000000001"));
	}
}
