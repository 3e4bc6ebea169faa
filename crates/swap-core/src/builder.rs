//! Assembly of a [`SwapOrchestrator`] from configuration or parts.

use crate::event_bus::EventBus;
use crate::orchestrator::SwapOrchestrator;
use crate::tracker::StatusTracker;
use std::sync::Arc;
use swap_account::{DisconnectedSigner, SignerService, WalletSigner};
use swap_config::SwapConfig;
use swap_delivery::{ConfirmationWatcher, DeliveryInterface, DeliveryService};
use swap_settlement::{IntentProtocol, NearIntentsProtocol};
use swap_types::{Result, SubmissionHints};
use swap_venues::{BuildOptions, JupiterClient, OneInchClient, VenueClient, VenueRegistry};
use tracing::info;

/// Builder for [`SwapOrchestrator`].
///
/// Starts either empty ([`new`](Self::new)) or with every component the
/// configuration describes ([`from_config`](Self::from_config)); the `with_*`
/// methods add or replace components before [`build`](Self::build).
pub struct OrchestratorBuilder {
	config: SwapConfig,
	/// Venues registered by chain on build
	venues: Vec<Arc<dyn VenueClient>>,
	delivery: DeliveryService,
	intents: Option<Arc<dyn IntentProtocol>>,
	/// Wallet; a disconnected signer is used when none is given
	signer: Option<Arc<dyn WalletSigner>>,
	/// Buffer of the status event channel
	event_capacity: usize,
}

impl OrchestratorBuilder {
	/// A builder with no venues, deliveries or intent protocol.
	pub fn new(config: SwapConfig) -> Self {
		let watcher = ConfirmationWatcher::from_config(&config.execution);
		Self {
			config,
			venues: Vec::new(),
			delivery: DeliveryService::new(watcher),
			intents: None,
			signer: None,
			event_capacity: 1000,
		}
	}

	/// Jupiter on Solana, 1inch on every configured EVM chain, chain RPC
	/// delivery for all of them and the NEAR intents protocol.
	pub fn from_config(config: SwapConfig) -> Result<Self> {
		let jupiter = JupiterClient::from_config(&config.solana)?;
		let delivery = DeliveryService::from_config(&config, jupiter.connection())?;

		let mut venues: Vec<Arc<dyn VenueClient>> = vec![Arc::new(jupiter)];
		let mut evm_chains: Vec<_> = config.evm.chains.keys().cloned().collect();
		evm_chains.sort();
		for chain in &evm_chains {
			venues.push(Arc::new(OneInchClient::from_config(&config.evm, chain)?));
		}

		let intents: Arc<dyn IntentProtocol> = Arc::new(NearIntentsProtocol::from_config(&config)?);

		Ok(Self {
			venues,
			delivery,
			intents: Some(intents),
			signer: None,
			event_capacity: 1000,
			config,
		})
	}

	/// Adds a venue. Registering two venues for one chain fails on build.
	pub fn with_venue(mut self, venue: Arc<dyn VenueClient>) -> Self {
		self.venues.push(venue);
		self
	}

	/// Adds or replaces the delivery for the delivery's chain.
	pub fn with_delivery(mut self, delivery: Arc<dyn DeliveryInterface>) -> Self {
		self.delivery.register(delivery);
		self
	}

	pub fn with_intent_protocol(mut self, protocol: Arc<dyn IntentProtocol>) -> Self {
		self.intents = Some(protocol);
		self
	}

	pub fn with_signer(mut self, signer: Arc<dyn WalletSigner>) -> Self {
		self.signer = Some(signer);
		self
	}

	pub fn with_event_capacity(mut self, capacity: usize) -> Self {
		self.event_capacity = capacity.max(1);
		self
	}

	pub fn config(&self) -> &SwapConfig {
		&self.config
	}

	/// Registers the venues and wires the services together. Fails when two
	/// venues claim the same chain.
	pub fn build(self) -> Result<SwapOrchestrator> {
		let mut registry = VenueRegistry::new();
		for venue in self.venues {
			registry.register(venue)?;
		}

		let signer = self
			.signer
			.unwrap_or_else(|| Arc::new(DisconnectedSigner) as Arc<dyn WalletSigner>);

		let execution = self.config.execution.clone();
		let build_options = BuildOptions {
			priority_fee: self.config.solana.priority_fee_micro_lamports,
			hints: SubmissionHints {
				max_retries: execution.max_retries,
				skip_preflight: execution.skip_preflight,
				priority_fee: None,
			},
		};

		let events = EventBus::new(self.event_capacity);
		info!(
			venues = registry.chains().len(),
			deliveries = self.delivery.chains().len(),
			intents = self.intents.is_some(),
			"Swap orchestrator ready"
		);

		Ok(SwapOrchestrator {
			venues: Arc::new(registry),
			intents: self.intents,
			signer: Arc::new(SignerService::new(signer)),
			delivery: Arc::new(self.delivery),
			tracker: Arc::new(StatusTracker::new(events.clone())),
			events,
			execution,
			build_options,
		})
	}
}
