//! Swap intents and the execution plans derived from them.

use crate::serde_helpers::u128_string;
use crate::{ChainKey, Quote, SwapError, VenueId, MAX_SLIPPAGE_BPS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

fn default_slippage_bps() -> u16 {
	50
}

/// Identifier of one orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(pub Uuid);

impl IntentId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for IntentId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for IntentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Execution-mode preference declared by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
	#[default]
	Standard,
	Maximum,
}

/// A user-declared swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapIntent {
	pub source_chain: ChainKey,
	pub dest_chain: ChainKey,
	pub token_in: String,
	pub token_out: String,
	#[serde(with = "u128_string")]
	pub amount_in: u128,
	#[serde(with = "u128_string")]
	pub min_amount_out: u128,
	#[serde(default)]
	pub privacy_level: PrivacyLevel,
	#[serde(default = "default_slippage_bps")]
	pub slippage_bps: u16,
}

impl SwapIntent {
	pub fn new(
		source_chain: impl Into<ChainKey>,
		dest_chain: impl Into<ChainKey>,
		token_in: impl Into<String>,
		token_out: impl Into<String>,
		amount_in: u128,
		min_amount_out: u128,
	) -> Self {
		Self {
			source_chain: source_chain.into(),
			dest_chain: dest_chain.into(),
			token_in: token_in.into(),
			token_out: token_out.into(),
			amount_in,
			min_amount_out,
			privacy_level: PrivacyLevel::default(),
			slippage_bps: default_slippage_bps(),
		}
	}

	pub fn with_slippage_bps(mut self, slippage_bps: u16) -> Self {
		self.slippage_bps = slippage_bps;
		self
	}

	pub fn with_privacy(mut self, privacy_level: PrivacyLevel) -> Self {
		self.privacy_level = privacy_level;
		self
	}

	pub fn is_cross_chain(&self) -> bool {
		self.source_chain != self.dest_chain
	}

	/// Checks that need no network access.
	pub fn validate(&self) -> Result<(), SwapError> {
		if self.amount_in == 0 {
			return Err(SwapError::InvalidAmount(
				"Input amount must be greater than zero".to_string(),
			));
		}
		if self.slippage_bps > MAX_SLIPPAGE_BPS {
			return Err(SwapError::InvalidAmount(format!(
				"Slippage tolerance {} bps exceeds {} bps",
				self.slippage_bps, MAX_SLIPPAGE_BPS
			)));
		}
		if self.token_in.trim().is_empty() || self.token_out.trim().is_empty() {
			return Err(SwapError::InvalidAmount(
				"Input and output tokens are required".to_string(),
			));
		}
		Ok(())
	}
}

/// What an execution step does on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
	/// ERC-20 allowance for the venue's router.
	Approve,
	Swap,
	CreateIntent,
	ExecuteIntent,
}

impl fmt::Display for StepAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Approve => write!(f, "approve"),
			Self::Swap => write!(f, "swap"),
			Self::CreateIntent => write!(f, "create_intent"),
			Self::ExecuteIntent => write!(f, "execute_intent"),
		}
	}
}

/// Step-specific input consumed when the step is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepPayload {
	Quote(Box<Quote>),
	Approval {
		token: String,
		#[serde(with = "u128_string")]
		amount: u128,
	},
	IntentCall {
		method_name: String,
		args: serde_json::Value,
	},
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
	pub index: usize,
	pub chain: ChainKey,
	pub action: StepAction,
	pub venue: VenueId,
	pub payload: StepPayload,
}

/// Ordered steps that fulfil one intent. Read-only once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
	pub intent_id: IntentId,
	pub intent: SwapIntent,
	pub steps: Vec<ExecutionStep>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub estimated_gas: Option<u64>,
	pub estimated_time_secs: u64,
	pub created_at: DateTime<Utc>,
}

impl ExecutionPlan {
	/// The swap quote backing this plan, if any.
	pub fn quote(&self) -> Option<&Quote> {
		self.steps.iter().find_map(|step| match &step.payload {
			StepPayload::Quote(quote) => Some(quote.as_ref()),
			_ => None,
		})
	}
}
