//! Route selection and plan assembly.

use chrono::Utc;
use swap_settlement::IntentProtocol;
use swap_types::{
	is_evm_native, ChainFamily, ExecutionPlan, ExecutionStep, IntentId, Quote, QuoteRequest,
	Result, StepAction, StepPayload, SwapError, SwapIntent, UnsignedTransaction,
};
use swap_venues::{VenueClient, VenueRegistry};
use tracing::{debug, info};

/// Rough wall-clock time for one step to reach finality.
fn step_time_secs(family: ChainFamily) -> u64 {
	match family {
		ChainFamily::Solana => 15,
		ChainFamily::Evm => 30,
		ChainFamily::Near => 5,
	}
}

/// Rejects a quote that does not honour the intent.
pub fn check_quote(intent: &SwapIntent, quote: &Quote) -> Result<()> {
	if !quote.matches_pair(&intent.token_in, &intent.token_out) {
		return Err(SwapError::QuoteUnavailable {
			venue: quote.venue.clone(),
			message: format!(
				"Quote is for {} -> {}, intent is {} -> {}",
				quote.input_token, quote.output_token, intent.token_in, intent.token_out
			),
		});
	}
	if quote.in_amount != intent.amount_in {
		return Err(SwapError::QuoteUnavailable {
			venue: quote.venue.clone(),
			message: format!(
				"Quote prices {} units, intent sells {}",
				quote.in_amount, intent.amount_in
			),
		});
	}
	if quote.out_amount < intent.min_amount_out {
		return Err(SwapError::SlippageExceeded {
			minimum: intent.min_amount_out,
			offered: quote.out_amount,
		});
	}
	if quote.min_out_amount < intent.min_amount_out {
		return Err(SwapError::SlippageExceeded {
			minimum: intent.min_amount_out,
			offered: quote.min_out_amount,
		});
	}
	Ok(())
}

/// Rejects a built swap whose encoded minimum output is below the intent's.
pub fn check_built(intent: &SwapIntent, unsigned: &UnsignedTransaction) -> Result<()> {
	match &unsigned.summary {
		Some(summary) if summary.min_out_amount < intent.min_amount_out => {
			Err(SwapError::SlippageExceeded {
				minimum: intent.min_amount_out,
				offered: summary.min_out_amount,
			})
		}
		_ => Ok(()),
	}
}

/// Quotes a swap on the intent's only chain and lays out its steps.
///
/// ERC-20 input on an EVM chain gets an allowance step before the swap.
pub async fn plan_same_chain(
	venue: &dyn VenueClient,
	intent: &SwapIntent,
	intent_id: IntentId,
) -> Result<ExecutionPlan> {
	let request = QuoteRequest::new(
		intent.token_in.clone(),
		intent.token_out.clone(),
		intent.amount_in,
		intent.slippage_bps,
	);
	let quote = venue.get_quote(&request).await?;
	debug!(
		intent_id = %intent_id,
		venue = %quote.venue,
		out_amount = %quote.out_amount,
		min_out_amount = %quote.min_out_amount,
		"Quote received"
	);
	check_quote(intent, &quote)?;

	let chain = intent.source_chain.clone();
	let family = venue.family();
	let mut steps = Vec::new();

	if family == ChainFamily::Evm && !is_evm_native(&intent.token_in) {
		steps.push(ExecutionStep {
			index: steps.len(),
			chain: chain.clone(),
			action: StepAction::Approve,
			venue: venue.id(),
			payload: StepPayload::Approval {
				token: intent.token_in.clone(),
				amount: intent.amount_in,
			},
		});
	}

	let estimated_gas = quote.estimated_gas;
	steps.push(ExecutionStep {
		index: steps.len(),
		chain,
		action: StepAction::Swap,
		venue: venue.id(),
		payload: StepPayload::Quote(Box::new(quote)),
	});

	info!(
		intent_id = %intent_id,
		venue = %venue.id(),
		steps = steps.len(),
		"Planned same-chain swap"
	);

	Ok(ExecutionPlan {
		intent_id,
		intent: intent.clone(),
		estimated_time_secs: step_time_secs(family) * steps.len() as u64,
		steps,
		estimated_gas,
		created_at: Utc::now(),
	})
}

/// Lays out the intent-protocol calls for a swap between two chains.
///
/// A pair of chains the protocol does not settle is `UnsupportedRoute` when
/// either chain is unknown, `IntentProtocolUnavailable` otherwise.
pub fn plan_cross_chain(
	venues: &VenueRegistry,
	protocol: Option<&dyn IntentProtocol>,
	intent: &SwapIntent,
	intent_id: IntentId,
) -> Result<ExecutionPlan> {
	let source = &intent.source_chain;
	let dest = &intent.dest_chain;

	let protocol = match protocol {
		Some(protocol) if protocol.supports_route(source, dest) => protocol,
		_ => {
			if venues.contains(source) && venues.contains(dest) {
				return Err(SwapError::IntentProtocolUnavailable(format!(
					"No intent protocol settles {} -> {}",
					source, dest
				)));
			}
			return Err(SwapError::UnsupportedRoute(format!(
				"No route from {} to {}",
				source, dest
			)));
		}
	};

	if !protocol.is_available() {
		return Err(SwapError::IntentProtocolUnavailable(format!(
			"{} is not available for {} -> {}",
			protocol.id(),
			source,
			dest
		)));
	}

	let chain = protocol.settlement_chain().clone();
	let calls = [
		(StepAction::CreateIntent, protocol.create_intent_call(intent, &intent_id)),
		(StepAction::ExecuteIntent, protocol.execute_intent_call(&intent_id)),
	];
	let steps: Vec<ExecutionStep> = calls
		.into_iter()
		.enumerate()
		.map(|(index, (action, call))| ExecutionStep {
			index,
			chain: chain.clone(),
			action,
			venue: protocol.id(),
			payload: call.into_payload(),
		})
		.collect();

	info!(
		intent_id = %intent_id,
		protocol = %protocol.id(),
		source = %source,
		dest = %dest,
		"Planned cross-chain intent"
	);

	Ok(ExecutionPlan {
		intent_id,
		intent: intent.clone(),
		estimated_gas: Some(protocol.gas_per_call().saturating_mul(steps.len() as u64)),
		estimated_time_secs: protocol.estimated_time_secs(),
		steps,
		created_at: Utc::now(),
	})
}
