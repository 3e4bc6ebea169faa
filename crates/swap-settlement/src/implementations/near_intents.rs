//! NEAR intents settlement contract.
//!
//! The contract is not deployed on every network yet. Calls are shaped as
//! the contract expects them, and availability is decided by configuration.
//! Execution plans cannot be read back; that needs a view call the contract
//! does not expose yet.

use crate::{ContractCall, IntentProtocol};
use async_trait::async_trait;
use serde_json::json;
use swap_config::SwapConfig;
use swap_types::{
	ChainFamily, ChainKey, ExecutionPlan, IntentId, Result, SwapError, SwapIntent,
	TransactionPayload, UnsignedTransaction, VenueId,
};
use tracing::{debug, warn};

const CREATE_SWAP_INTENT: &str = "create_swap_intent";
const EXECUTE_INTENT: &str = "execute_intent";

/// Intent settlement through a NEAR contract.
///
/// The deployed contract is a placeholder: calls are built and submitted,
/// but it exposes no view for the execution plan it computes.
pub struct NearIntentsProtocol {
	chain: ChainKey,
	/// Account the settlement contract is deployed to
	contract_id: String,
	/// Whether intents may be planned against the contract
	enabled: bool,
	/// Gas attached to each call, in gas units
	gas: u64,
	/// Deposit attached to each call, in yoctoNEAR
	deposit: u128,
	/// Chains the contract settles between
	supported_chains: Vec<ChainKey>,
}

impl NearIntentsProtocol {
	/// An enabled protocol with 300 TGas per call and no deposit.
	pub fn new(contract_id: impl Into<String>, supported_chains: Vec<ChainKey>) -> Self {
		Self {
			chain: ChainKey::near(),
			contract_id: contract_id.into(),
			enabled: true,
			gas: 300_000_000_000_000,
			deposit: 0,
			supported_chains,
		}
	}

	/// Uses `intents.contract_id` when set, `network.contract_id` otherwise.
	pub fn from_config(config: &SwapConfig) -> Result<Self> {
		let intents = &config.intents;
		let contract_id = intents
			.contract_id
			.clone()
			.filter(|id| !id.trim().is_empty())
			.unwrap_or_else(|| config.network.contract_id.clone());
		let deposit = intents.deposit.trim().parse::<u128>().map_err(|e| {
			SwapError::Config(format!("Invalid intent deposit '{}': {}", intents.deposit, e))
		})?;

		Ok(Self {
			chain: ChainKey::near(),
			contract_id,
			enabled: intents.enabled,
			gas: intents.gas,
			deposit,
			supported_chains: intents.supported_chains.clone(),
		})
	}

	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;
		self
	}

	pub fn contract_id(&self) -> &str {
		&self.contract_id
	}
}

#[async_trait]
impl IntentProtocol for NearIntentsProtocol {
	fn id(&self) -> VenueId {
		VenueId::near_intents()
	}

	fn settlement_chain(&self) -> &ChainKey {
		&self.chain
	}

	fn settlement_family(&self) -> ChainFamily {
		ChainFamily::Near
	}

	fn supports_route(&self, source: &ChainKey, dest: &ChainKey) -> bool {
		self.supported_chains.contains(source) && self.supported_chains.contains(dest)
	}

	fn is_available(&self) -> bool {
		self.enabled
	}

	fn gas_per_call(&self) -> u64 {
		self.gas
	}

	fn estimated_time_secs(&self) -> u64 {
		120
	}

	fn create_intent_call(&self, intent: &SwapIntent, intent_id: &IntentId) -> ContractCall {
		ContractCall::new(
			CREATE_SWAP_INTENT,
			json!({
				"action": "private_swap",
				"intentId": intent_id.to_string(),
				"sourceChain": intent.source_chain,
				"destChain": intent.dest_chain,
				"tokenIn": intent.token_in,
				"tokenOut": intent.token_out,
				"amountIn": intent.amount_in.to_string(),
				"minAmountOut": intent.min_amount_out.to_string(),
				"privacyLevel": intent.privacy_level,
			}),
		)
	}

	fn execute_intent_call(&self, intent_id: &IntentId) -> ContractCall {
		ContractCall::new(EXECUTE_INTENT, json!({ "intent_id": intent_id.to_string() }))
	}

	fn build_transaction(&self, call: ContractCall, signer: &str) -> Result<UnsignedTransaction> {
		if !self.enabled {
			return Err(SwapError::IntentProtocolUnavailable(format!(
				"Intent contract {} is not enabled",
				self.contract_id
			)));
		}

		warn!(
			contract = %self.contract_id,
			method = %call.method_name,
			"Intent contract is a placeholder deployment"
		);
		debug!(signer = %signer, args = %call.args, "Building intent call");

		Ok(UnsignedTransaction {
			venue: self.id(),
			chain: self.chain.clone(),
			signer: signer.to_string(),
			payload: TransactionPayload::NearFunctionCall {
				receiver_id: self.contract_id.clone(),
				method_name: call.method_name,
				args: call.args,
				gas: self.gas,
				deposit: self.deposit,
			},
			hints: Default::default(),
			summary: None,
		})
	}

	async fn fetch_execution_plan(&self, intent_id: &IntentId) -> Result<ExecutionPlan> {
		debug!(intent_id = %intent_id, "Execution plan requested from intent contract");
		Err(SwapError::IntentProtocolUnavailable(format!(
			"View function not yet implemented for {}",
			self.contract_id
		)))
	}
}
