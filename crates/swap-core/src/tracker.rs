//! In-memory status of planned intents.
//!
//! Nothing here touches the network; reads are served from the map as last
//! written by the orchestrator.

use crate::event_bus::{EventBus, SwapEvent};
use dashmap::DashMap;
use swap_types::{
	ChainKey, ExecutionPlan, ExecutionStatus, IntentId, Result, StepAction, SwapError,
	TransactionId,
};
use tracing::{info, warn};

/// Last observed state of one plan step.
#[derive(Debug, Clone)]
struct StepRecord {
	/// Chain the step's transaction is submitted to
	chain: ChainKey,
	action: StepAction,
	status: ExecutionStatus,
	/// Set once the chain accepted the step's transaction
	submission: Option<Submission>,
}

#[derive(Debug)]
struct IntentRecord {
	/// Plan as returned from planning; executions must match it exactly
	plan: ExecutionPlan,
	/// One record per plan step, in plan order
	steps: Vec<StepRecord>,
	/// Guards against executing the plan twice
	started: bool,
}

/// A step whose transaction was accepted by its chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
	/// Index of the step in its plan
	pub step: usize,
	pub chain: ChainKey,
	pub tx_id: TransactionId,
	/// Account that signed; some chains need it to look the transaction up
	pub signer: String,
}

/// Per-intent, per-step execution status.
pub struct StatusTracker {
	records: DashMap<IntentId, IntentRecord>,
	events: EventBus,
}

impl StatusTracker {
	/// Creates an empty tracker publishing every change to `events`.
	pub fn new(events: EventBus) -> Self {
		Self {
			records: DashMap::new(),
			events,
		}
	}

	/// Starts tracking `plan` with every step at `initial`.
	pub fn register(&self, plan: &ExecutionPlan, initial: ExecutionStatus) {
		let steps = plan
			.steps
			.iter()
			.map(|step| StepRecord {
				chain: step.chain.clone(),
				action: step.action,
				status: initial.clone(),
				submission: None,
			})
			.collect();

		self.records.insert(
			plan.intent_id,
			IntentRecord {
				plan: plan.clone(),
				steps,
				started: false,
			},
		);
		self.events.publish(SwapEvent::IntentPlanned {
			intent_id: plan.intent_id,
			steps: plan.steps.len(),
		});
	}

	/// The plan as registered.
	pub fn plan(&self, intent_id: &IntentId) -> Option<ExecutionPlan> {
		self.records.get(intent_id).map(|record| record.plan.clone())
	}

	/// Marks the intent as executing. Fails if it already was.
	pub fn begin_execution(&self, intent_id: &IntentId) -> Result<()> {
		let mut record = self
			.records
			.get_mut(intent_id)
			.ok_or_else(|| SwapError::InvalidState(format!("Unknown intent {}", intent_id)))?;
		if record.started {
			return Err(SwapError::InvalidState(format!(
				"Intent {} has already been executed",
				intent_id
			)));
		}
		record.started = true;
		Ok(())
	}

	/// Moves one step forward, or into `Failed`.
	pub fn transition(&self, intent_id: &IntentId, step: usize, next: ExecutionStatus) -> Result<()> {
		let action = {
			let mut record = self
				.records
				.get_mut(intent_id)
				.ok_or_else(|| SwapError::InvalidState(format!("Unknown intent {}", intent_id)))?;
			let entry = record.steps.get_mut(step).ok_or_else(|| {
				SwapError::InvalidState(format!("Intent {} has no step {}", intent_id, step))
			})?;

			if !entry.status.can_transition_to(&next) {
				warn!(
					intent_id = %intent_id,
					step,
					from = %entry.status,
					to = %next,
					"Rejected status transition"
				);
				return Err(SwapError::InvalidState(format!(
					"Step {} cannot move from {} to {}",
					step, entry.status, next
				)));
			}
			entry.status = next.clone();
			entry.action
		};

		info!(intent_id = %intent_id, step, %action, status = %next, "Step status changed");
		self.events.publish(SwapEvent::StepStatusChanged {
			intent_id: *intent_id,
			step,
			action,
			status: next,
		});
		Ok(())
	}

	/// Records a broadcast transaction and moves the step to `Submitted`.
	pub fn record_submission(
		&self,
		intent_id: &IntentId,
		step: usize,
		tx_id: TransactionId,
		signer: &str,
	) -> Result<()> {
		self.transition(intent_id, step, ExecutionStatus::Submitted)?;

		let chain = {
			let mut record = self
				.records
				.get_mut(intent_id)
				.ok_or_else(|| SwapError::InvalidState(format!("Unknown intent {}", intent_id)))?;
			let entry = record.steps.get_mut(step).ok_or_else(|| {
				SwapError::InvalidState(format!("Intent {} has no step {}", intent_id, step))
			})?;
			entry.submission = Some(Submission {
				step,
				chain: entry.chain.clone(),
				tx_id: tx_id.clone(),
				signer: signer.to_string(),
			});
			entry.chain.clone()
		};

		self.events.publish(SwapEvent::TransactionSubmitted {
			intent_id: *intent_id,
			step,
			chain,
			tx_id,
		});
		Ok(())
	}

	/// Intent-level status: the first failure, otherwise the least advanced
	/// step.
	pub fn status(&self, intent_id: &IntentId) -> Option<ExecutionStatus> {
		let record = self.records.get(intent_id)?;
		if let Some(failed) = record.steps.iter().find(|step| step.status.is_failed()) {
			return Some(failed.status.clone());
		}
		record
			.steps
			.iter()
			.map(|step| step.status.clone())
			.min_by_key(|status| status.rank())
	}

	pub fn step_statuses(&self, intent_id: &IntentId) -> Option<Vec<ExecutionStatus>> {
		self.records.get(intent_id).map(|record| {
			record
				.steps
				.iter()
				.map(|step| step.status.clone())
				.collect()
		})
	}

	pub fn step_status(&self, intent_id: &IntentId, step: usize) -> Option<ExecutionStatus> {
		self.records
			.get(intent_id)
			.and_then(|record| record.steps.get(step).map(|step| step.status.clone()))
	}

	/// Submitted steps, in plan order.
	pub fn submissions(&self, intent_id: &IntentId) -> Vec<Submission> {
		self.records
			.get(intent_id)
			.map(|record| {
				record
					.steps
					.iter()
					.filter_map(|step| step.submission.clone())
					.collect()
			})
			.unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use swap_types::{ExecutionStep, StepPayload, SwapIntent, VenueId};

	fn two_step_plan() -> ExecutionPlan {
		let intent = SwapIntent::new("ethereum", "solana", "USDC", "USDC", 10, 9);
		let step = |index, action| ExecutionStep {
			index,
			chain: ChainKey::near(),
			action,
			venue: VenueId::near_intents(),
			payload: StepPayload::IntentCall {
				method_name: "m".into(),
				args: serde_json::json!({}),
			},
		};
		ExecutionPlan {
			intent_id: IntentId::new(),
			intent,
			steps: vec![step(0, StepAction::CreateIntent), step(1, StepAction::ExecuteIntent)],
			estimated_gas: None,
			estimated_time_secs: 120,
			created_at: Utc::now(),
		}
	}

	#[test]
	fn test_aggregate_status_is_least_advanced() {
		let tracker = StatusTracker::new(EventBus::default());
		let plan = two_step_plan();
		tracker.register(&plan, ExecutionStatus::Created);
		let id = plan.intent_id;

		tracker.transition(&id, 0, ExecutionStatus::Built).unwrap();
		tracker
			.record_submission(&id, 0, TransactionId::new("h1"), "alice.testnet")
			.unwrap();
		assert_eq!(tracker.status(&id), Some(ExecutionStatus::Created));

		tracker.transition(&id, 1, ExecutionStatus::Signed).unwrap();
		assert_eq!(tracker.status(&id), Some(ExecutionStatus::Signed));

		let timeout = SwapError::ConfirmationTimeout {
			tx_id: "h1".into(),
			timeout_ms: 10,
		};
		tracker.transition(&id, 0, ExecutionStatus::failed(&timeout)).unwrap();
		assert!(tracker.status(&id).unwrap().is_failed());
		assert_eq!(tracker.submissions(&id).len(), 1);
	}

	#[test]
	fn test_backward_and_repeated_execution_rejected() {
		let tracker = StatusTracker::new(EventBus::default());
		let plan = two_step_plan();
		tracker.register(&plan, ExecutionStatus::Quoted);
		let id = plan.intent_id;

		tracker.transition(&id, 0, ExecutionStatus::Signed).unwrap();
		assert!(matches!(
			tracker.transition(&id, 0, ExecutionStatus::Built),
			Err(SwapError::InvalidState(_))
		));

		tracker.begin_execution(&id).unwrap();
		assert!(matches!(
			tracker.begin_execution(&id),
			Err(SwapError::InvalidState(_))
		));
		assert!(matches!(
			tracker.begin_execution(&IntentId::new()),
			Err(SwapError::InvalidState(_))
		));
	}

	#[tokio::test]
	async fn test_events_published() {
		let bus = EventBus::default();
		let mut events = bus.subscribe();
		let tracker = StatusTracker::new(bus);
		let plan = two_step_plan();
		tracker.register(&plan, ExecutionStatus::Created);
		tracker
			.transition(&plan.intent_id, 1, ExecutionStatus::Built)
			.unwrap();

		assert!(matches!(
			events.recv().await.unwrap(),
			SwapEvent::IntentPlanned { steps: 2, .. }
		));
		match events.recv().await.unwrap() {
			SwapEvent::StepStatusChanged { step, status, .. } => {
				assert_eq!(step, 1);
				assert_eq!(status, ExecutionStatus::Built);
			}
			other => panic!("unexpected event {:?}", other),
		}
	}
}
