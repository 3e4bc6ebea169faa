//! JSON-RPC clients for the chains swaps settle on.
//!
//! Each client is a thin typed wrapper over [`rpc::JsonRpcClient`]. Reads
//! (status, receipts, heights) retry transport failures with exponential
//! backoff. Broadcasts are sent exactly once; retrying a broadcast is left to
//! the node through its own `maxRetries` parameter.
//!
//! - `solana`: `sendTransaction`, `getSignatureStatuses`, `getSlot`
//! - `evm`: `eth_sendRawTransaction`, `eth_getTransactionReceipt`, `eth_blockNumber`
//! - `near`: `broadcast_tx_async`, `tx`

use thiserror::Error;

pub mod evm;
pub mod near;
pub mod rpc;
pub mod solana;
pub mod utils;

pub use evm::{EvmRpcClient, TransactionReceipt};
pub use near::{NearRpcClient, NearTxOutcome};
pub use rpc::JsonRpcClient;
pub use solana::{SendTransactionConfig, SignatureStatus, SolanaRpcClient};
pub use utils::truncate_hash;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
	#[error("Transport error: {0}")]
	Transport(String),

	#[error("HTTP {status}: {body}")]
	Http { status: u16, body: String },

	#[error("RPC error {code}: {message}")]
	Rpc {
		code: i64,
		message: String,
		/// Structured cause name, as reported by NEAR nodes
		cause: Option<String>,
	},

	#[error("Invalid response: {0}")]
	Decode(String),
}

impl RpcError {
	/// Whether repeating the same read may succeed.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Transport(_) => true,
			Self::Http { status, .. } => *status == 429 || *status >= 500,
			_ => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, RpcError>;
