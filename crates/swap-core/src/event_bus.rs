//! Broadcast channel for orchestration events.

use serde::Serialize;
use swap_types::{ChainKey, ExecutionStatus, IntentId, StepAction, TransactionId};
use tokio::sync::broadcast;

/// Observable progress of an intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SwapEvent {
	/// A plan was registered with every step at its initial status.
	IntentPlanned {
		intent_id: IntentId,
		steps: usize,
	},
	/// A step moved forward or failed.
	StepStatusChanged {
		intent_id: IntentId,
		step: usize,
		action: StepAction,
		status: ExecutionStatus,
	},
	/// A chain accepted a step's transaction. Not a finality signal.
	TransactionSubmitted {
		intent_id: IntentId,
		step: usize,
		chain: ChainKey,
		tx_id: TransactionId,
	},
}

impl SwapEvent {
	pub fn intent_id(&self) -> IntentId {
		match self {
			Self::IntentPlanned { intent_id, .. }
			| Self::StepStatusChanged { intent_id, .. }
			| Self::TransactionSubmitted { intent_id, .. } => *intent_id,
		}
	}
}

/// Fan-out of [`SwapEvent`]s to any number of subscribers.
///
/// Slow subscribers lose the oldest events once `capacity` is exceeded.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<SwapEvent>,
}

impl EventBus {
	/// Creates a bus buffering up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Receives every event published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<SwapEvent> {
		self.sender.subscribe()
	}

	/// Publishes to current subscribers. Having none is not an error.
	pub fn publish(&self, event: SwapEvent) {
		let _ = self.sender.send(event);
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1000)
	}
}
