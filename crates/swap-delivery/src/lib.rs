//! Submission of signed transactions and confirmation tracking.
//!
//! Each chain family gets a [`DeliveryInterface`] implementation backed by
//! that chain's JSON-RPC client. [`DeliveryService`] routes signed
//! transactions to the right implementation by chain key and hands
//! confirmation polling to the [`ConfirmationWatcher`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use swap_chains::{EvmRpcClient, NearRpcClient, SolanaRpcClient};
use swap_config::SwapConfig;
use swap_types::{
	ChainKey, ConfirmationResult, Result, SignedTransaction, SubmitOptions, SwapError,
	TransactionId,
};
use thiserror::Error;
use tracing::info;

pub mod implementations;
pub mod watcher;

pub use implementations::{evm::EvmDelivery, near::NearDelivery, solana::SolanaDelivery};
pub use swap_chains::RpcError;
pub use watcher::ConfirmationWatcher;

/// Errors observed while checking on a submitted transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
	#[error("Invalid confirmation request: {0}")]
	InvalidRequest(String),
	#[error(transparent)]
	Rpc(#[from] RpcError),
}

impl DeliveryError {
	/// Whether the next poll may succeed.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::InvalidRequest(_) => false,
			Self::Rpc(e) => e.is_transient(),
		}
	}
}

/// Broadcast and finality access for one chain.
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	fn chain(&self) -> &ChainKey;

	/// Broadcasts `transaction`. A returned id means the node accepted it,
	/// not that it executed.
	async fn submit(
		&self,
		transaction: SignedTransaction,
		options: &SubmitOptions,
	) -> Result<TransactionId>;

	/// Terminal outcome of `tx_id`, `None` while not yet final.
	async fn check_confirmation(
		&self,
		tx_id: &TransactionId,
		signer: &str,
	) -> std::result::Result<Option<ConfirmationResult>, DeliveryError>;
}

/// Delivery implementations indexed by chain.
pub struct DeliveryService {
	deliveries: HashMap<ChainKey, Arc<dyn DeliveryInterface>>,
	watcher: ConfirmationWatcher,
}

impl DeliveryService {
	/// Creates a service with no deliveries, confirming through `watcher`.
	pub fn new(watcher: ConfirmationWatcher) -> Self {
		Self {
			deliveries: HashMap::new(),
			watcher,
		}
	}

	/// Builds Solana, every configured EVM chain and NEAR.
	///
	/// `solana` is the connection the Solana venue already holds.
	pub fn from_config(config: &SwapConfig, solana: Arc<SolanaRpcClient>) -> Result<Self> {
		let mut service = Self::new(ConfirmationWatcher::from_config(&config.execution));

		service.register(Arc::new(SolanaDelivery::new(ChainKey::solana(), solana)));

		for (chain, chain_config) in &config.evm.chains {
			let rpc = EvmRpcClient::new(&chain_config.rpc_url, chain_config.chain_id)
				.map_err(|e| SwapError::Config(format!("RPC client for {}: {}", chain, e)))?;
			service.register(Arc::new(EvmDelivery::new(
				chain.clone(),
				rpc,
				chain_config.confirmations,
			)));
		}

		let near = NearRpcClient::new(&config.network.node_url)
			.map_err(|e| SwapError::Config(format!("RPC client for near: {}", e)))?;
		service.register(Arc::new(NearDelivery::new(ChainKey::near(), near)));

		Ok(service)
	}

	/// Registers `delivery` for its chain, replacing any previous one.
	pub fn register(&mut self, delivery: Arc<dyn DeliveryInterface>) {
		info!("Registering delivery for chain {}", delivery.chain());
		self.deliveries.insert(delivery.chain().clone(), delivery);
	}

	pub fn get(&self, chain: &ChainKey) -> Option<Arc<dyn DeliveryInterface>> {
		self.deliveries.get(chain).cloned()
	}

	/// Like [`get`](Self::get), but an unknown chain is `UnsupportedRoute`.
	pub fn get_required(&self, chain: &ChainKey) -> Result<Arc<dyn DeliveryInterface>> {
		self.get(chain).ok_or_else(|| {
			SwapError::UnsupportedRoute(format!("No delivery configured for {}", chain))
		})
	}

	/// Chains with a registered delivery, sorted.
	pub fn chains(&self) -> Vec<ChainKey> {
		let mut chains: Vec<_> = self.deliveries.keys().cloned().collect();
		chains.sort();
		chains
	}

	/// Submits to the chain named by the transaction.
	pub async fn submit(
		&self,
		transaction: SignedTransaction,
		options: &SubmitOptions,
	) -> Result<TransactionId> {
		let delivery = self.get_required(&transaction.chain)?;
		delivery.submit(transaction, options).await
	}

	/// Waits until `tx_id` on `chain` is final or `timeout` elapses.
	pub async fn await_finality(
		&self,
		chain: &ChainKey,
		tx_id: &TransactionId,
		signer: &str,
		timeout: Duration,
	) -> Result<ConfirmationResult> {
		let delivery = self.get_required(chain)?;
		self.watcher
			.await_finality(delivery.as_ref(), tx_id, signer, timeout)
			.await
	}
}
