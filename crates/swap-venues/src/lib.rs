//! Venue quote clients.
//!
//! A venue is a remote DEX aggregator that prices a token pair and builds the
//! swap transaction for one chain. Venues are interchangeable behind
//! [`VenueClient`] and are looked up by chain through [`VenueRegistry`]; the
//! orchestrator never names a concrete venue.

use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use swap_types::{
	ChainFamily, ChainKey, Quote, QuoteRequest, Result, SubmissionHints, SwapError, Token,
	UnsignedTransaction, VenueId,
};
use tracing::info;

mod http;
pub mod jupiter;
pub mod oneinch;

pub use jupiter::JupiterClient;
pub use oneinch::OneInchClient;

/// Quote lifetime from configured seconds.
pub(crate) fn quote_ttl(secs: u64) -> Result<Duration> {
	i64::try_from(secs)
		.ok()
		.and_then(Duration::try_seconds)
		.ok_or_else(|| SwapError::Config(format!("Quote TTL of {} seconds is out of range", secs)))
}

/// Caller-supplied knobs for transaction building.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
	/// Overrides the venue's configured priority fee, in micro-lamports per
	/// compute unit on Solana.
	pub priority_fee: Option<u64>,
	/// Submission hints copied onto the built transaction.
	pub hints: SubmissionHints,
}

/// Quote and build capability of one venue on one chain.
#[async_trait]
pub trait VenueClient: Send + Sync {
	fn id(&self) -> VenueId;

	fn chain(&self) -> &ChainKey;

	fn family(&self) -> ChainFamily;

	/// Prices `request`. Read-only; rejects a zero amount before any request
	/// is made.
	async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote>;

	/// Builds the unsigned swap transaction for a previously fetched quote.
	async fn build_transaction(
		&self,
		quote: &Quote,
		signer: &str,
		options: &BuildOptions,
	) -> Result<UnsignedTransaction>;

	/// Tokens the venue can route.
	async fn list_tokens(&self) -> Result<Vec<Token>>;

	/// Allowance transaction required before swapping `token`, if any.
	async fn build_approval(
		&self,
		_token: &str,
		_amount: u128,
		_owner: &str,
	) -> Result<Option<UnsignedTransaction>> {
		Ok(None)
	}

	/// Whether `quote` may still be used to build a transaction.
	fn is_expired(&self, quote: &Quote) -> bool {
		quote.is_expired()
	}
}

/// Venues indexed by the chain they serve.
#[derive(Default)]
pub struct VenueRegistry {
	venues: HashMap<ChainKey, Arc<dyn VenueClient>>,
}

impl VenueRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a venue. A chain is served by at most one venue.
	pub fn register(&mut self, venue: Arc<dyn VenueClient>) -> Result<()> {
		let chain = venue.chain().clone();
		if let Some(existing) = self.venues.get(&chain) {
			return Err(SwapError::Config(format!(
				"Chain {} already served by {}",
				chain,
				existing.id()
			)));
		}

		info!("Registering venue {} for chain {}", venue.id(), chain);
		self.venues.insert(chain, venue);
		Ok(())
	}

	pub fn get(&self, chain: &ChainKey) -> Option<Arc<dyn VenueClient>> {
		self.venues.get(chain).cloned()
	}

	pub fn get_required(&self, chain: &ChainKey) -> Result<Arc<dyn VenueClient>> {
		self.get(chain)
			.ok_or_else(|| SwapError::UnsupportedRoute(format!("No venue configured for {}", chain)))
	}

	pub fn contains(&self, chain: &ChainKey) -> bool {
		self.venues.contains_key(chain)
	}

	/// Registered chains, sorted.
	pub fn chains(&self) -> Vec<ChainKey> {
		let mut chains: Vec<_> = self.venues.keys().cloned().collect();
		chains.sort();
		chains
	}
}
