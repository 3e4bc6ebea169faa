//! The intent state machine.

use crate::event_bus::{EventBus, SwapEvent};
use crate::planner;
use crate::tracker::StatusTracker;
use std::sync::Arc;
use std::time::Duration;
use swap_account::SignerService;
use swap_config::ExecutionConfig;
use swap_delivery::DeliveryService;
use swap_settlement::{ContractCall, IntentProtocol};
use swap_types::{
	ChainFamily, ChainKey, ConfirmationResult, ExecutionPlan, ExecutionStatus, ExecutionStep,
	IntentId, Quote, QuoteRequest, Result, StepPayload, SubmitOptions, SwapError, SwapIntent,
	Token, TransactionId,
};
use swap_venues::{BuildOptions, VenueRegistry};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Plans and drives swap intents.
///
/// Each intent moves `Created -> Quoted -> Built -> Signed -> Submitted ->
/// Confirmed`, or into `Failed` from any non-terminal state. Steps of one
/// plan run strictly in order; separate intents may run concurrently.
pub struct SwapOrchestrator {
	pub(crate) venues: Arc<VenueRegistry>,
	pub(crate) intents: Option<Arc<dyn IntentProtocol>>,
	pub(crate) signer: Arc<SignerService>,
	pub(crate) delivery: Arc<DeliveryService>,
	pub(crate) tracker: Arc<StatusTracker>,
	pub(crate) events: EventBus,
	pub(crate) execution: ExecutionConfig,
	pub(crate) build_options: BuildOptions,
}

impl SwapOrchestrator {
	/// Resolves the venue or intent protocol for `intent`, quotes same-chain
	/// swaps and returns the ordered steps.
	///
	/// Only the quote request touches the network.
	pub async fn plan_execution(&self, intent: &SwapIntent) -> Result<ExecutionPlan> {
		intent.validate()?;
		let intent_id = IntentId::new();

		let (plan, initial) = if intent.is_cross_chain() {
			let plan = planner::plan_cross_chain(
				&self.venues,
				self.intents.as_deref(),
				intent,
				intent_id,
			)?;
			(plan, ExecutionStatus::Created)
		} else {
			let venue = self.venues.get_required(&intent.source_chain)?;
			let plan = planner::plan_same_chain(venue.as_ref(), intent, intent_id).await?;
			(plan, ExecutionStatus::Quoted)
		};

		self.tracker.register(&plan, initial);
		Ok(plan)
	}

	/// Builds, signs and submits every step of `plan` in order.
	///
	/// Returns the last step's transaction id as soon as the chain accepts
	/// it, without waiting for finality. A plan runs at most once.
	pub async fn execute(&self, plan: &ExecutionPlan) -> Result<TransactionId> {
		let mut accounts = Vec::with_capacity(plan.steps.len());
		for step in &plan.steps {
			let family = self.family_of(step)?;
			accounts.push(self.signer.account_for(family).await?);
		}

		let registered = self.tracker.plan(&plan.intent_id).ok_or_else(|| {
			SwapError::InvalidState(format!("Unknown intent {}", plan.intent_id))
		})?;
		if registered != *plan {
			return Err(SwapError::InvalidState(format!(
				"Plan for intent {} was modified after planning",
				plan.intent_id
			)));
		}
		self.tracker.begin_execution(&plan.intent_id)?;
		info!(intent_id = %plan.intent_id, steps = plan.steps.len(), "Executing plan");

		let mut last = None;
		for (step, account) in plan.steps.iter().zip(&accounts) {
			match self.execute_step(plan, step, account).await {
				Ok(Some(tx_id)) => last = Some(tx_id),
				Ok(None) => {}
				Err(e) => {
					error!(
						intent_id = %plan.intent_id,
						step = step.index,
						action = %step.action,
						error = %e,
						"Step failed"
					);
					self.fail_step(&plan.intent_id, step.index, &e);
					return Err(e);
				}
			}
		}

		last.ok_or_else(|| {
			SwapError::InvalidState(format!(
				"Plan for intent {} submitted no transaction",
				plan.intent_id
			))
		})
	}

	async fn execute_step(
		&self,
		plan: &ExecutionPlan,
		step: &ExecutionStep,
		account: &str,
	) -> Result<Option<TransactionId>> {
		let intent_id = &plan.intent_id;

		let unsigned = match &step.payload {
			StepPayload::Quote(quote) => {
				let venue = self.venues.get_required(&step.chain)?;
				if venue.is_expired(quote) {
					return Err(SwapError::QuoteExpired {
						venue: quote.venue.clone(),
						message: format!("Quote fetched at {} is no longer valid", quote.fetched_at),
					});
				}
				planner::check_quote(&plan.intent, quote)?;
				let unsigned = venue
					.build_transaction(quote, account, &self.build_options)
					.await?;
				planner::check_built(&plan.intent, &unsigned)?;
				unsigned
			}
			StepPayload::Approval { token, amount } => {
				let venue = self.venues.get_required(&step.chain)?;
				match venue.build_approval(token, *amount, account).await? {
					Some(unsigned) => unsigned,
					None => {
						info!(intent_id = %intent_id, token = %token, "No allowance required");
						self.tracker
							.transition(intent_id, step.index, ExecutionStatus::Confirmed)?;
						return Ok(None);
					}
				}
			}
			StepPayload::IntentCall { method_name, args } => {
				let call = ContractCall::new(method_name.clone(), args.clone());
				self.protocol()?.build_transaction(call, account)?
			}
		};
		self.tracker
			.transition(intent_id, step.index, ExecutionStatus::Built)?;

		let options = SubmitOptions::from(&unsigned.hints);
		let signed = self.signer.sign(unsigned).await?;
		self.tracker
			.transition(intent_id, step.index, ExecutionStatus::Signed)?;

		let tx_id = self.delivery.submit(signed, &options).await?;
		self.tracker
			.record_submission(intent_id, step.index, tx_id.clone(), account)?;

		Ok(Some(tx_id))
	}

	/// Waits for every submitted step of the intent to reach finality.
	///
	/// `timeout` bounds the whole wait and defaults to
	/// `execution.confirmation_timeout_ms`. On timeout the intent is left
	/// `Failed(timeout)` even though the transaction may still land.
	pub async fn await_confirmation(
		&self,
		intent_id: &IntentId,
		timeout: Option<Duration>,
	) -> Result<ConfirmationResult> {
		let timeout = timeout.unwrap_or_else(|| self.confirmation_timeout());
		let submissions = self.tracker.submissions(intent_id);
		if submissions.is_empty() {
			return Err(SwapError::InvalidState(format!(
				"Intent {} has no submitted transactions",
				intent_id
			)));
		}

		let deadline = Instant::now() + timeout;
		let mut last = None;
		for submission in submissions {
			match self.tracker.step_status(intent_id, submission.step) {
				Some(ExecutionStatus::Confirmed) => continue,
				Some(ExecutionStatus::Failed(reason)) => {
					return Err(SwapError::InvalidState(format!(
						"Intent {} already failed: {}",
						intent_id, reason.message
					)));
				}
				_ => {}
			}

			let remaining = deadline.saturating_duration_since(Instant::now());
			let outcome = self
				.delivery
				.await_finality(
					&submission.chain,
					&submission.tx_id,
					&submission.signer,
					remaining,
				)
				.await;

			match outcome {
				Ok(result) if result.success => {
					self.tracker
						.transition(intent_id, submission.step, ExecutionStatus::Confirmed)?;
					last = Some(result);
				}
				Ok(result) => {
					let failure = SwapError::TransactionFailed {
						tx_id: submission.tx_id.to_string(),
						message: result
							.error_detail
							.clone()
							.unwrap_or_else(|| "execution failed".to_string()),
					};
					warn!(intent_id = %intent_id, error = %failure, "Transaction failed on-chain");
					self.fail_step(intent_id, submission.step, &failure);
					return Ok(result);
				}
				Err(e) => {
					self.fail_step(intent_id, submission.step, &e);
					return Err(e);
				}
			}
		}

		Ok(last.unwrap_or_else(ConfirmationResult::succeeded))
	}

	/// Last recorded status. Never touches the network.
	pub fn get_status(&self, intent_id: &IntentId) -> Option<ExecutionStatus> {
		self.tracker.status(intent_id)
	}

	pub fn step_statuses(&self, intent_id: &IntentId) -> Option<Vec<ExecutionStatus>> {
		self.tracker.step_statuses(intent_id)
	}

	/// Transactions submitted for the intent, in plan order.
	pub fn transaction_ids(&self, intent_id: &IntentId) -> Vec<TransactionId> {
		self.tracker
			.submissions(intent_id)
			.into_iter()
			.map(|submission| submission.tx_id)
			.collect()
	}

	pub fn subscribe(&self) -> broadcast::Receiver<SwapEvent> {
		self.events.subscribe()
	}

	/// Plan the intent protocol computed for a recorded intent.
	pub async fn remote_execution_plan(&self, intent_id: &IntentId) -> Result<ExecutionPlan> {
		self.protocol()?.fetch_execution_plan(intent_id).await
	}

	/// Quotes directly against the venue serving `chain`.
	pub async fn quote(&self, chain: &ChainKey, request: &QuoteRequest) -> Result<Quote> {
		self.venues.get_required(chain)?.get_quote(request).await
	}

	pub async fn list_tokens(&self, chain: &ChainKey) -> Result<Vec<Token>> {
		self.venues.get_required(chain)?.list_tokens().await
	}

	/// Chains with a configured venue.
	pub fn chains(&self) -> Vec<ChainKey> {
		self.venues.chains()
	}

	/// Confirmation timeout from configuration.
	pub fn confirmation_timeout(&self) -> Duration {
		Duration::from_millis(self.execution.confirmation_timeout_ms)
	}

	fn protocol(&self) -> Result<&Arc<dyn IntentProtocol>> {
		self.intents.as_ref().ok_or_else(|| {
			SwapError::IntentProtocolUnavailable("No intent protocol configured".to_string())
		})
	}

	fn family_of(&self, step: &ExecutionStep) -> Result<ChainFamily> {
		if let StepPayload::IntentCall { .. } = step.payload {
			return Ok(self.protocol()?.settlement_family());
		}
		Ok(self.venues.get_required(&step.chain)?.family())
	}

	fn fail_step(&self, intent_id: &IntentId, step: usize, error: &SwapError) {
		if let Err(e) = self
			.tracker
			.transition(intent_id, step, ExecutionStatus::failed(error))
		{
			warn!(intent_id = %intent_id, step, error = %e, "Could not record failure");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builder::OrchestratorBuilder;
	use crate::test_support::*;
	use std::sync::atomic::Ordering;
	use swap_settlement::NearIntentsProtocol;
	use swap_types::{ErrorKind, StepAction, VenueId, SOL_MINT, USDC_MINT};
	use swap_venues::VenueClient;

	const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
	const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";

	struct Harness {
		orchestrator: SwapOrchestrator,
		log: CallLog,
		venue: Arc<FakeVenue>,
		delivery: Arc<FakeDelivery>,
	}

	fn harness(
		venue: FakeVenue,
		outcome: Option<ConfirmationResult>,
		log: CallLog,
		connected: bool,
	) -> Harness {
		let venue = Arc::new(venue);
		let delivery = Arc::new(FakeDelivery::new(venue.chain().clone(), outcome, log.clone()));
		let mut builder = OrchestratorBuilder::new(test_config())
			.with_venue(venue.clone())
			.with_delivery(delivery.clone());
		if connected {
			builder = builder.with_signer(Arc::new(FakeWallet::connected(log.clone())));
		}
		Harness {
			orchestrator: builder.build().unwrap(),
			log,
			venue,
			delivery,
		}
	}

	fn solana(out_amount: u128, outcome: Option<ConfirmationResult>) -> Harness {
		let log = CallLog::default();
		harness(FakeVenue::solana(out_amount, log.clone()), outcome, log, true)
	}

	fn sol_to_usdc() -> SwapIntent {
		SwapIntent::new("solana", "solana", SOL_MINT, USDC_MINT, 1_000_000_000, 20_000_000)
	}

	fn near_intents() -> Arc<dyn IntentProtocol> {
		Arc::new(NearIntentsProtocol::new(
			"intents.testnet",
			vec![ChainKey::solana(), ChainKey::ethereum(), ChainKey::near()],
		))
	}

	#[tokio::test]
	async fn test_same_chain_swap_runs_to_confirmation() {
		let h = solana(25_000_000, Some(ConfirmationResult::succeeded()));

		let plan = h.orchestrator.plan_execution(&sol_to_usdc()).await.unwrap();
		assert_eq!(plan.steps.len(), 1);
		assert_eq!(plan.steps[0].venue, VenueId::jupiter());
		assert_eq!(plan.steps[0].action, StepAction::Swap);
		assert!(plan.quote().unwrap().out_amount >= 20_000_000);
		assert_eq!(
			h.orchestrator.get_status(&plan.intent_id),
			Some(ExecutionStatus::Quoted)
		);

		let tx_id = h.orchestrator.execute(&plan).await.unwrap();
		assert_eq!(tx_id.as_str(), "solana-tx0");
		assert_eq!(
			h.orchestrator.get_status(&plan.intent_id),
			Some(ExecutionStatus::Submitted)
		);
		assert_eq!(h.log.entries(), ["quote", "build:swap", "sign", "submit:0"]);

		let result = h
			.orchestrator
			.await_confirmation(&plan.intent_id, Some(Duration::from_millis(200)))
			.await
			.unwrap();
		assert!(result.success);
		assert_eq!(
			h.orchestrator.get_status(&plan.intent_id),
			Some(ExecutionStatus::Confirmed)
		);
	}

	#[tokio::test]
	async fn test_quote_below_minimum_is_slippage_exceeded() {
		let h = solana(19_000_000, None);

		let err = h.orchestrator.plan_execution(&sol_to_usdc()).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::SlippageExceeded);
		assert_eq!(h.log.entries(), ["quote"]);
	}

	#[tokio::test]
	async fn test_zero_amount_rejected_before_quoting() {
		let h = solana(25_000_000, None);
		let intent = SwapIntent::new("solana", "solana", SOL_MINT, USDC_MINT, 0, 1);

		let err = h.orchestrator.plan_execution(&intent).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::InvalidAmount);
		assert_eq!(h.venue.quotes.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_unknown_destination_is_unsupported_route() {
		let log = CallLog::default();
		let venue = Arc::new(FakeVenue::evm("ethereum", 1_000, log.clone()));
		let orchestrator = OrchestratorBuilder::new(test_config())
			.with_venue(venue)
			.with_intent_protocol(near_intents())
			.build()
			.unwrap();

		let intent = SwapIntent::new("ethereum", "zcash", WETH, "ZEC", 1_000_000, 1);
		let err = orchestrator.plan_execution(&intent).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::UnsupportedRoute);
		assert!(log.entries().is_empty());
	}

	#[tokio::test]
	async fn test_cross_chain_without_available_protocol() {
		let log = CallLog::default();
		let protocol = NearIntentsProtocol::new(
			"intents.testnet",
			vec![ChainKey::solana(), ChainKey::ethereum()],
		)
		.with_enabled(false);
		let orchestrator = OrchestratorBuilder::new(test_config())
			.with_venue(Arc::new(FakeVenue::evm("ethereum", 1_000, log.clone())))
			.with_venue(Arc::new(FakeVenue::solana(1_000, log.clone())))
			.with_intent_protocol(Arc::new(protocol))
			.build()
			.unwrap();

		let intent = SwapIntent::new("ethereum", "solana", WETH, USDC_MINT, 1_000_000, 1);
		let err = orchestrator.plan_execution(&intent).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::IntentProtocolUnavailable);

		let bare = OrchestratorBuilder::new(test_config())
			.with_venue(Arc::new(FakeVenue::evm("ethereum", 1_000, log.clone())))
			.with_venue(Arc::new(FakeVenue::solana(1_000, log.clone())))
			.build()
			.unwrap();
		let err = bare.plan_execution(&intent).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::IntentProtocolUnavailable);
		assert!(log.entries().is_empty());
	}

	#[tokio::test]
	async fn test_cross_chain_intent_submits_contract_calls() {
		let log = CallLog::default();
		let delivery = Arc::new(FakeDelivery::new(
			ChainKey::near(),
			Some(ConfirmationResult::succeeded()),
			log.clone(),
		));
		let orchestrator = OrchestratorBuilder::new(test_config())
			.with_venue(Arc::new(FakeVenue::evm("ethereum", 1_000, log.clone())))
			.with_venue(Arc::new(FakeVenue::solana(1_000, log.clone())))
			.with_intent_protocol(near_intents())
			.with_delivery(delivery)
			.with_signer(Arc::new(FakeWallet::connected(log.clone())))
			.build()
			.unwrap();

		let intent = SwapIntent::new("ethereum", "solana", WETH, USDC_MINT, 1_000_000, 1);
		let plan = orchestrator.plan_execution(&intent).await.unwrap();
		let actions: Vec<_> = plan.steps.iter().map(|step| step.action).collect();
		assert_eq!(actions, [StepAction::CreateIntent, StepAction::ExecuteIntent]);
		assert!(plan.steps.iter().all(|step| step.chain == ChainKey::near()));
		assert_eq!(
			orchestrator.get_status(&plan.intent_id),
			Some(ExecutionStatus::Created)
		);

		let tx_id = orchestrator.execute(&plan).await.unwrap();
		assert_eq!(tx_id.as_str(), "near-tx1");
		assert_eq!(log.entries(), ["sign", "submit:0", "sign", "submit:1"]);

		orchestrator
			.await_confirmation(&plan.intent_id, Some(Duration::from_millis(200)))
			.await
			.unwrap();
		assert_eq!(
			orchestrator.get_status(&plan.intent_id),
			Some(ExecutionStatus::Confirmed)
		);
	}

	#[tokio::test]
	async fn test_remote_plan_is_not_available_yet() {
		let orchestrator = OrchestratorBuilder::new(test_config())
			.with_intent_protocol(near_intents())
			.build()
			.unwrap();

		let err = orchestrator
			.remote_execution_plan(&IntentId::new())
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::IntentProtocolUnavailable);
	}

	#[tokio::test]
	async fn test_execute_without_wallet_has_no_side_effects() {
		let log = CallLog::default();
		let h = harness(FakeVenue::solana(25_000_000, log.clone()), None, log, false);

		let plan = h.orchestrator.plan_execution(&sol_to_usdc()).await.unwrap();
		let err = h.orchestrator.execute(&plan).await.unwrap_err();

		assert_eq!(err.kind(), ErrorKind::NotConnected);
		assert_eq!(h.venue.quotes.load(Ordering::SeqCst), 1);
		assert_eq!(h.log.entries(), ["quote"]);
		assert_eq!(h.delivery.submitted.load(Ordering::SeqCst), 0);
		assert_eq!(
			h.orchestrator.get_status(&plan.intent_id),
			Some(ExecutionStatus::Quoted)
		);
	}

	#[tokio::test]
	async fn test_finality_timeout_marks_intent_failed() {
		let h = solana(25_000_000, None);

		let plan = h.orchestrator.plan_execution(&sol_to_usdc()).await.unwrap();
		h.orchestrator.execute(&plan).await.unwrap();

		let err = h
			.orchestrator
			.await_confirmation(&plan.intent_id, Some(Duration::from_millis(50)))
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::ConfirmationTimeout);
		assert!(h.delivery.polls.load(Ordering::SeqCst) >= 1);

		for _ in 0..2 {
			match h.orchestrator.get_status(&plan.intent_id) {
				Some(ExecutionStatus::Failed(reason)) => assert!(reason.is_timeout()),
				other => panic!("expected failed(timeout), got {:?}", other),
			}
		}
	}

	#[tokio::test]
	async fn test_configured_timeout_applies_by_default() {
		let h = solana(25_000_000, None);
		assert_eq!(h.orchestrator.confirmation_timeout(), Duration::from_millis(200));

		let plan = h.orchestrator.plan_execution(&sol_to_usdc()).await.unwrap();
		h.orchestrator.execute(&plan).await.unwrap();

		let started = Instant::now();
		let err = h
			.orchestrator
			.await_confirmation(&plan.intent_id, None)
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::ConfirmationTimeout);
		assert!(started.elapsed() >= Duration::from_millis(150));
	}

	#[tokio::test]
	async fn test_on_chain_failure_is_reported() {
		let h = solana(
			25_000_000,
			Some(ConfirmationResult::failed("custom program error: 0x1771")),
		);

		let plan = h.orchestrator.plan_execution(&sol_to_usdc()).await.unwrap();
		h.orchestrator.execute(&plan).await.unwrap();

		let result = h
			.orchestrator
			.await_confirmation(&plan.intent_id, Some(Duration::from_millis(200)))
			.await
			.unwrap();
		assert!(!result.success);
		match h.orchestrator.get_status(&plan.intent_id) {
			Some(ExecutionStatus::Failed(reason)) => {
				assert_eq!(reason.kind, ErrorKind::TransactionFailed)
			}
			other => panic!("expected failed, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_approval_is_submitted_before_swap_is_built() {
		let log = CallLog::default();
		let h = harness(
			FakeVenue::evm("ethereum", 990_000, log.clone()),
			Some(ConfirmationResult::succeeded()),
			log,
			true,
		);
		let intent = SwapIntent::new("ethereum", "ethereum", WETH, DAI, 1_000_000, 900_000);

		let plan = h.orchestrator.plan_execution(&intent).await.unwrap();
		let actions: Vec<_> = plan.steps.iter().map(|step| step.action).collect();
		assert_eq!(actions, [StepAction::Approve, StepAction::Swap]);

		h.orchestrator.execute(&plan).await.unwrap();
		assert_eq!(
			h.log.entries(),
			[
				"quote",
				"build:approve",
				"sign",
				"submit:0",
				"build:swap",
				"sign",
				"submit:1"
			]
		);
		assert_eq!(h.orchestrator.transaction_ids(&plan.intent_id).len(), 2);

		h.orchestrator
			.await_confirmation(&plan.intent_id, Some(Duration::from_millis(200)))
			.await
			.unwrap();
		assert_eq!(
			h.orchestrator.step_statuses(&plan.intent_id).unwrap(),
			[ExecutionStatus::Confirmed, ExecutionStatus::Confirmed]
		);
	}

	#[tokio::test]
	async fn test_get_status_is_local_and_repeatable() {
		let h = solana(25_000_000, None);
		let plan = h.orchestrator.plan_execution(&sol_to_usdc()).await.unwrap();
		h.orchestrator.execute(&plan).await.unwrap();

		let first = h.orchestrator.get_status(&plan.intent_id);
		let second = h.orchestrator.get_status(&plan.intent_id);
		assert_eq!(first, second);
		assert_eq!(h.venue.quotes.load(Ordering::SeqCst), 1);
		assert_eq!(h.delivery.polls.load(Ordering::SeqCst), 0);
		assert_eq!(h.orchestrator.get_status(&IntentId::new()), None);
	}

	#[tokio::test]
	async fn test_plan_runs_at_most_once() {
		let h = solana(25_000_000, None);
		let plan = h.orchestrator.plan_execution(&sol_to_usdc()).await.unwrap();

		h.orchestrator.execute(&plan).await.unwrap();
		let err = h.orchestrator.execute(&plan).await.unwrap_err();

		assert_eq!(err.kind(), ErrorKind::InvalidState);
		assert_eq!(h.delivery.submitted.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_modified_plan_is_refused() {
		let h = solana(25_000_000, None);
		let mut plan = h.orchestrator.plan_execution(&sol_to_usdc()).await.unwrap();
		plan.intent.min_amount_out = 1;

		let err = h.orchestrator.execute(&plan).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::InvalidState);
		assert!(!h.log.entries().contains(&"sign".to_string()));
	}

	#[tokio::test]
	async fn test_expired_quote_fails_before_signing() {
		let log = CallLog::default();
		let venue = FakeVenue::solana(25_000_000, log.clone())
			.with_ttl(chrono::Duration::seconds(-1));
		let h = harness(venue, None, log, true);

		let plan = h.orchestrator.plan_execution(&sol_to_usdc()).await.unwrap();
		let err = h.orchestrator.execute(&plan).await.unwrap_err();

		assert_eq!(err.kind(), ErrorKind::QuoteExpired);
		assert_eq!(h.log.entries(), ["quote"]);
		assert!(h
			.orchestrator
			.get_status(&plan.intent_id)
			.is_some_and(|status| status.is_failed()));
	}

	#[tokio::test]
	async fn test_built_swap_below_intent_minimum_is_not_signed() {
		let log = CallLog::default();
		let venue = FakeVenue::solana(25_000_000, log.clone()).with_built_min_out(19_500_000);
		let h = harness(venue, None, log, true);

		let plan = h.orchestrator.plan_execution(&sol_to_usdc()).await.unwrap();
		let err = h.orchestrator.execute(&plan).await.unwrap_err();

		assert_eq!(
			err,
			SwapError::SlippageExceeded {
				minimum: 20_000_000,
				offered: 19_500_000,
			}
		);
		assert_eq!(h.log.entries(), ["quote", "build:swap"]);
		assert_eq!(h.delivery.submitted.load(Ordering::SeqCst), 0);
		assert!(h
			.orchestrator
			.get_status(&plan.intent_id)
			.is_some_and(|status| status.is_failed()));
	}

	#[tokio::test]
	async fn test_events_follow_execution() {
		let h = solana(25_000_000, None);
		let mut events = h.orchestrator.subscribe();

		let plan = h.orchestrator.plan_execution(&sol_to_usdc()).await.unwrap();
		h.orchestrator.execute(&plan).await.unwrap();

		let mut received = Vec::new();
		while let Ok(event) = events.try_recv() {
			assert_eq!(event.intent_id(), plan.intent_id);
			received.push(event);
		}
		assert!(matches!(received.first(), Some(SwapEvent::IntentPlanned { steps: 1, .. })));
		assert!(received
			.iter()
			.any(|event| matches!(event, SwapEvent::TransactionSubmitted { .. })));
	}
}
