//! Configuration types for the swap orchestrator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use swap_types::{ChainFamily, ChainKey};

/// Complete configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SwapConfig {
	/// NEAR network the intent contract lives on
	#[serde(default)]
	pub network: NetworkConfig,
	/// Solana RPC and the Jupiter venue
	#[serde(default)]
	pub solana: SolanaConfig,
	/// EVM chains and the 1inch venue
	#[serde(default)]
	pub evm: EvmConfig,
	/// Cross-chain intent protocol
	#[serde(default)]
	pub intents: IntentsConfig,
	/// Submission and confirmation behaviour
	#[serde(default)]
	pub execution: ExecutionConfig,
	#[serde(default)]
	pub logging: LoggingConfig,
}

impl SwapConfig {
	/// Family of a configured chain, `None` for chains without a venue.
	pub fn chain_family(&self, chain: &ChainKey) -> Option<ChainFamily> {
		if chain.as_str() == ChainKey::SOLANA {
			Some(ChainFamily::Solana)
		} else if self.evm.chains.contains_key(chain) {
			Some(ChainFamily::Evm)
		} else if chain.as_str() == ChainKey::NEAR {
			Some(ChainFamily::Near)
		} else {
			None
		}
	}
}

/// NEAR network settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkConfig {
	pub network_id: String,
	pub node_url: String,
	pub wallet_url: String,
	pub helper_url: String,
	pub explorer_url: String,
	/// Account of the intent settlement contract
	pub contract_id: String,
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			network_id: "testnet".to_string(),
			node_url: "https://rpc.testnet.near.org".to_string(),
			wallet_url: "https://testnet.mynearwallet.com".to_string(),
			helper_url: "https://helper.testnet.near.org".to_string(),
			explorer_url: "https://testnet.nearblocks.io".to_string(),
			contract_id: "intents.testnet".to_string(),
		}
	}
}

/// Longest a venue quote may be kept before it must be refreshed.
pub const MAX_QUOTE_TTL_SECS: u64 = 3_600;

/// Solana settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolanaConfig {
	pub rpc_url: String,
	pub jupiter_api_url: String,
	pub token_list_url: String,
	/// Commitment level used for preflight and confirmation
	pub commitment: String,
	/// Fixed priority fee; Jupiter picks one when unset
	pub priority_fee_micro_lamports: Option<u64>,
	pub wrap_and_unwrap_sol: bool,
	/// How long a quote may be used to build a transaction
	pub quote_ttl_secs: u64,
}

impl Default for SolanaConfig {
	fn default() -> Self {
		Self {
			rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
			jupiter_api_url: "https://quote-api.jup.ag/v6".to_string(),
			token_list_url: "https://token.jup.ag/strict".to_string(),
			commitment: "confirmed".to_string(),
			priority_fee_micro_lamports: None,
			wrap_and_unwrap_sol: true,
			quote_ttl_secs: 30,
		}
	}
}

/// EVM settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EvmConfig {
	pub oneinch_api_url: String,
	/// Bearer token for the 1inch API
	pub api_key: Option<String>,
	/// Slippage sent to 1inch when the intent does not specify one, percent
	pub default_slippage_percent: f64,
	pub quote_ttl_secs: u64,
	/// Chains keyed by name
	pub chains: HashMap<ChainKey, EvmChainConfig>,
}

impl Default for EvmConfig {
	fn default() -> Self {
		let chains = [
			(ChainKey::ETHEREUM, 1, "https://eth.llamarpc.com", 12),
			(ChainKey::POLYGON, 137, "https://polygon-rpc.com", 64),
			(ChainKey::ARBITRUM, 42161, "https://arb1.arbitrum.io/rpc", 1),
			(ChainKey::OPTIMISM, 10, "https://mainnet.optimism.io", 1),
			(ChainKey::SEPOLIA, 11155111, "https://rpc.sepolia.org", 3),
		]
		.into_iter()
		.map(|(key, chain_id, rpc_url, confirmations)| {
			(
				ChainKey::new(key),
				EvmChainConfig {
					chain_id,
					rpc_url: rpc_url.to_string(),
					confirmations,
				},
			)
		})
		.collect();

		Self {
			oneinch_api_url: "https://api.1inch.dev/swap/v6.0".to_string(),
			api_key: None,
			default_slippage_percent: 1.0,
			quote_ttl_secs: 30,
			chains,
		}
	}
}

/// One EVM chain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EvmChainConfig {
	pub chain_id: u64,
	pub rpc_url: String,
	/// Blocks on top of the receipt before a swap counts as final
	#[serde(default = "default_confirmations")]
	pub confirmations: u64,
}

fn default_confirmations() -> u64 {
	1
}

/// Intent protocol settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IntentsConfig {
	/// Whether the settlement contract is deployed and usable
	pub enabled: bool,
	/// Overrides `network.contract_id`
	pub contract_id: Option<String>,
	pub gas: u64,
	pub deposit: String,
	/// Chains the protocol settles between
	pub supported_chains: Vec<ChainKey>,
}

impl Default for IntentsConfig {
	fn default() -> Self {
		Self {
			enabled: false,
			contract_id: None,
			// 300 TGas
			gas: 300_000_000_000_000,
			deposit: "0".to_string(),
			supported_chains: vec![
				ChainKey::new(ChainKey::ETHEREUM),
				ChainKey::new(ChainKey::SOLANA),
				ChainKey::new(ChainKey::POLYGON),
				ChainKey::new(ChainKey::NEAR),
			],
		}
	}
}

/// Submission and confirmation behaviour
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutionConfig {
	pub confirmation_timeout_ms: u64,
	pub poll_interval_ms: u64,
	/// Passed to the node with each broadcast
	pub max_retries: u32,
	pub skip_preflight: bool,
}

impl Default for ExecutionConfig {
	fn default() -> Self {
		Self {
			confirmation_timeout_ms: 60_000,
			poll_interval_ms: 2_000,
			max_retries: 2,
			skip_preflight: false,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
	pub level: String,
	/// "pretty" or "json"
	pub format: String,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: "pretty".to_string(),
		}
	}
}
