//! Execution status of an intent step.

use crate::{ErrorKind, SwapError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a step failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
	pub kind: ErrorKind,
	pub message: String,
}

impl FailureReason {
	pub fn is_timeout(&self) -> bool {
		self.kind == ErrorKind::ConfirmationTimeout
	}
}

impl From<&SwapError> for FailureReason {
	fn from(error: &SwapError) -> Self {
		Self {
			kind: error.kind(),
			message: error.reason(),
		}
	}
}

/// Lifecycle of one step. Moves forward only; `Failed` and `Confirmed` are
/// terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionStatus {
	Created,
	Quoted,
	Built,
	Signed,
	Submitted,
	Confirmed,
	Failed(FailureReason),
}

impl ExecutionStatus {
	pub fn failed(error: &SwapError) -> Self {
		Self::Failed(FailureReason::from(error))
	}

	/// Position in the forward order. `Failed` ranks above everything.
	pub fn rank(&self) -> u8 {
		match self {
			Self::Created => 0,
			Self::Quoted => 1,
			Self::Built => 2,
			Self::Signed => 3,
			Self::Submitted => 4,
			Self::Confirmed => 5,
			Self::Failed(_) => 6,
		}
	}

	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Confirmed | Self::Failed(_))
	}

	pub fn is_failed(&self) -> bool {
		matches!(self, Self::Failed(_))
	}

	pub fn can_transition_to(&self, next: &ExecutionStatus) -> bool {
		if self.is_terminal() {
			return false;
		}
		match next {
			Self::Failed(_) => true,
			_ => next.rank() > self.rank(),
		}
	}
}

impl fmt::Display for ExecutionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Created => write!(f, "created"),
			Self::Quoted => write!(f, "quoted"),
			Self::Built => write!(f, "built"),
			Self::Signed => write!(f, "signed"),
			Self::Submitted => write!(f, "submitted"),
			Self::Confirmed => write!(f, "confirmed"),
			Self::Failed(reason) => write!(f, "failed({})", reason.kind),
		}
	}
}
