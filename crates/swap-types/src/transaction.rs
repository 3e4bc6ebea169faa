//! Transaction types passed between venues, the signer and delivery.
//!
//! An [`UnsignedTransaction`] is produced by a venue and moved into the
//! signer; the resulting [`SignedTransaction`] is moved into delivery. Neither
//! is `Clone`-able past that boundary in a way that would allow submitting one
//! signed payload twice.

use crate::serde_helpers::{option_u128_string, u128_string};
use crate::{ChainFamily, ChainKey, VenueId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain-native identifier of a submitted transaction (signature or hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl TransactionId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TransactionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Submission hints carried from the venue to delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionHints {
	pub max_retries: u32,
	pub skip_preflight: bool,
	/// Priority fee in the chain's smallest unit, when the venue reports one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub priority_fee: Option<u64>,
}

impl Default for SubmissionHints {
	fn default() -> Self {
		Self {
			max_retries: 2,
			skip_preflight: false,
			priority_fee: None,
		}
	}
}

/// Chain-specific transaction body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionPayload {
	/// Serialized versioned transaction, base64, awaiting the user's signature.
	SolanaVersioned {
		transaction: String,
		last_valid_block_height: u64,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		prioritization_fee_lamports: Option<u64>,
	},
	/// EVM call, hex encoded fields as returned by the venue.
	Evm {
		from: String,
		to: String,
		data: String,
		#[serde(with = "u128_string")]
		value: u128,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		gas: Option<u64>,
		#[serde(default, with = "option_u128_string", skip_serializing_if = "Option::is_none")]
		gas_price: Option<u128>,
		chain_id: u64,
	},
	/// Function call against a NEAR contract.
	NearFunctionCall {
		receiver_id: String,
		method_name: String,
		args: serde_json::Value,
		gas: u64,
		#[serde(with = "u128_string")]
		deposit: u128,
	},
}

impl TransactionPayload {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::SolanaVersioned { .. } => "solana_versioned",
			Self::Evm { .. } => "evm",
			Self::NearFunctionCall { .. } => "near_function_call",
		}
	}

	/// Family whose accounts can sign this payload.
	pub fn family(&self) -> ChainFamily {
		match self {
			Self::SolanaVersioned { .. } => ChainFamily::Solana,
			Self::Evm { .. } => ChainFamily::Evm,
			Self::NearFunctionCall { .. } => ChainFamily::Near,
		}
	}
}

/// Links a built transaction back to the quote it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSummary {
	pub input_token: String,
	pub output_token: String,
	#[serde(with = "u128_string")]
	pub in_amount: u128,
	/// Worst acceptable output encoded into the transaction.
	#[serde(with = "u128_string")]
	pub min_out_amount: u128,
}

/// A transaction ready for signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
	pub venue: VenueId,
	pub chain: ChainKey,
	/// Account expected to sign.
	pub signer: String,
	pub payload: TransactionPayload,
	#[serde(default)]
	pub hints: SubmissionHints,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub summary: Option<SwapSummary>,
}

/// Signed transaction bytes in the encoding the chain's RPC expects.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "data", rename_all = "snake_case")]
pub enum SignedPayload {
	Base64(String),
	/// 0x-prefixed hex.
	Hex(String),
}

/// A signed transaction. Consumed by submission.
#[derive(Debug, PartialEq, Eq)]
pub struct SignedTransaction {
	pub chain: ChainKey,
	pub signer: String,
	pub payload: SignedPayload,
	pub hints: SubmissionHints,
	/// Hash known before broadcast, for chains where the signer computes it.
	pub precomputed_id: Option<TransactionId>,
}

impl SignedTransaction {
	pub fn new(chain: ChainKey, signer: impl Into<String>, payload: SignedPayload) -> Self {
		Self {
			chain,
			signer: signer.into(),
			payload,
			hints: SubmissionHints::default(),
			precomputed_id: None,
		}
	}

	pub fn with_hints(mut self, hints: SubmissionHints) -> Self {
		self.hints = hints;
		self
	}

	pub fn with_precomputed_id(mut self, id: TransactionId) -> Self {
		self.precomputed_id = Some(id);
		self
	}
}

/// Options for broadcasting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOptions {
	pub skip_preflight: bool,
	pub max_retries: u32,
}

impl Default for SubmitOptions {
	fn default() -> Self {
		Self {
			skip_preflight: false,
			max_retries: 2,
		}
	}
}

impl From<&SubmissionHints> for SubmitOptions {
	fn from(hints: &SubmissionHints) -> Self {
		Self {
			skip_preflight: hints.skip_preflight,
			max_retries: hints.max_retries,
		}
	}
}

/// Terminal outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResult {
	pub success: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_detail: Option<String>,
	pub finalized_at: DateTime<Utc>,
}

impl ConfirmationResult {
	pub fn succeeded() -> Self {
		Self {
			success: true,
			error_detail: None,
			finalized_at: Utc::now(),
		}
	}

	pub fn failed(detail: impl Into<String>) -> Self {
		Self {
			success: false,
			error_detail: Some(detail.into()),
			finalized_at: Utc::now(),
		}
	}
}
