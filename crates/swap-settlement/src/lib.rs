//! Cross-chain intent settlement.
//!
//! Swaps whose source and destination chains differ are not routed through a
//! venue. They are recorded as an intent on a settlement contract, which
//! executes them through its own solvers. The orchestrator only sees the
//! narrow [`IntentProtocol`] interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use swap_types::{
	ChainFamily, ChainKey, ExecutionPlan, IntentId, Result, StepPayload, SwapIntent,
	UnsignedTransaction, VenueId,
};

pub mod implementations;

pub use implementations::near_intents::NearIntentsProtocol;

/// A contract method invocation, before it is wrapped into a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractCall {
	pub method_name: String,
	pub args: serde_json::Value,
}

impl ContractCall {
	pub fn new(method_name: impl Into<String>, args: serde_json::Value) -> Self {
		Self {
			method_name: method_name.into(),
			args,
		}
	}

	pub fn into_payload(self) -> StepPayload {
		StepPayload::IntentCall {
			method_name: self.method_name,
			args: self.args,
		}
	}
}

#[async_trait]
pub trait IntentProtocol: Send + Sync {
	fn id(&self) -> VenueId;

	/// Chain the settlement contract lives on; intent steps are signed and
	/// submitted there.
	fn settlement_chain(&self) -> &ChainKey;

	/// Account family that signs intent calls.
	fn settlement_family(&self) -> ChainFamily;

	fn supports_route(&self, source: &ChainKey, dest: &ChainKey) -> bool;

	/// Whether the contract is deployed and accepting intents.
	fn is_available(&self) -> bool;

	/// Gas attached to each call, in the settlement chain's units.
	fn gas_per_call(&self) -> u64;

	fn estimated_time_secs(&self) -> u64;

	/// Call that records `intent` under `intent_id`.
	fn create_intent_call(&self, intent: &SwapIntent, intent_id: &IntentId) -> ContractCall;

	/// Call that asks the contract to execute a recorded intent.
	fn execute_intent_call(&self, intent_id: &IntentId) -> ContractCall;

	/// Wraps `call` into a transaction for `signer`.
	fn build_transaction(&self, call: ContractCall, signer: &str) -> Result<UnsignedTransaction>;

	/// Execution plan the contract computed for a recorded intent.
	async fn fetch_execution_plan(&self, intent_id: &IntentId) -> Result<ExecutionPlan>;
}
