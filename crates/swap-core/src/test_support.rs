//! In-process stand-ins for venues, wallets and chains.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use swap_account::{SignerError, WalletAccount, WalletSigner};
use swap_config::SwapConfig;
use swap_delivery::{DeliveryError, DeliveryInterface};
use swap_types::{
	apply_slippage, ChainFamily, ChainKey, ConfirmationResult, Quote, QuoteRequest, Result,
	SignedPayload, SignedTransaction, SubmitOptions, SwapSummary, Token, TransactionId,
	TransactionPayload, UnsignedTransaction, VenueId,
};
use swap_venues::{BuildOptions, VenueClient};

pub const SOLANA_OWNER: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
pub const EVM_OWNER: &str = "0x8ba1f109551bD432803012645Ac136ddd64DBA72";
pub const NEAR_OWNER: &str = "alice.testnet";

/// Ordered record of side effects across fakes.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
	pub fn push(&self, entry: impl Into<String>) {
		self.0.lock().unwrap().push(entry.into());
	}

	pub fn entries(&self) -> Vec<String> {
		self.0.lock().unwrap().clone()
	}
}

pub fn test_config() -> SwapConfig {
	let mut config = SwapConfig::default();
	config.execution.poll_interval_ms = 5;
	config.execution.confirmation_timeout_ms = 200;
	config
}

pub struct FakeVenue {
	chain: ChainKey,
	family: ChainFamily,
	out_amount: u128,
	ttl: Option<ChronoDuration>,
	built_min_out: Option<u128>,
	log: CallLog,
	pub quotes: AtomicUsize,
}

impl FakeVenue {
	pub fn solana(out_amount: u128, log: CallLog) -> Self {
		Self {
			chain: ChainKey::solana(),
			family: ChainFamily::Solana,
			out_amount,
			ttl: Some(ChronoDuration::seconds(30)),
			built_min_out: None,
			log,
			quotes: AtomicUsize::new(0),
		}
	}

	pub fn evm(chain: &str, out_amount: u128, log: CallLog) -> Self {
		Self {
			chain: ChainKey::new(chain),
			family: ChainFamily::Evm,
			out_amount,
			ttl: Some(ChronoDuration::seconds(30)),
			built_min_out: None,
			log,
			quotes: AtomicUsize::new(0),
		}
	}

	pub fn with_ttl(mut self, ttl: ChronoDuration) -> Self {
		self.ttl = Some(ttl);
		self
	}

	/// Encodes `min_out` into built swaps instead of the quote's bound.
	pub fn with_built_min_out(mut self, min_out: u128) -> Self {
		self.built_min_out = Some(min_out);
		self
	}

	fn payload(&self, signer: &str) -> TransactionPayload {
		match self.family {
			ChainFamily::Evm => TransactionPayload::Evm {
				from: signer.to_string(),
				to: "0x111111125421ca6dc452d289314280a0f8842a65".into(),
				data: "0x07ed2379".into(),
				value: 0,
				gas: Some(180_000),
				gas_price: None,
				chain_id: 1,
			},
			_ => TransactionPayload::SolanaVersioned {
				transaction: "AQAB".into(),
				last_valid_block_height: 279_000_000,
				prioritization_fee_lamports: None,
			},
		}
	}
}

#[async_trait]
impl VenueClient for FakeVenue {
	fn id(&self) -> VenueId {
		match self.family {
			ChainFamily::Evm => VenueId::oneinch(),
			_ => VenueId::jupiter(),
		}
	}

	fn chain(&self) -> &ChainKey {
		&self.chain
	}

	fn family(&self) -> ChainFamily {
		self.family
	}

	async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote> {
		request.validate()?;
		self.quotes.fetch_add(1, Ordering::SeqCst);
		self.log.push("quote");

		let now = Utc::now();
		Ok(Quote {
			venue: self.id(),
			chain: self.chain.clone(),
			input_token: request.input_token.clone(),
			output_token: request.output_token.clone(),
			in_amount: request.amount,
			out_amount: self.out_amount,
			min_out_amount: apply_slippage(self.out_amount, request.slippage_bps),
			slippage_bps: request.slippage_bps,
			route: Vec::new(),
			price_impact_pct: None,
			fees: Vec::new(),
			estimated_gas: Some(180_000),
			context_slot: None,
			expires_at: self.ttl.map(|ttl| now + ttl),
			fetched_at: now,
			raw: serde_json::json!({}),
		})
	}

	async fn build_transaction(
		&self,
		quote: &Quote,
		signer: &str,
		options: &BuildOptions,
	) -> Result<UnsignedTransaction> {
		self.log.push("build:swap");
		Ok(UnsignedTransaction {
			venue: self.id(),
			chain: self.chain.clone(),
			signer: signer.to_string(),
			payload: self.payload(signer),
			hints: options.hints.clone(),
			summary: Some(SwapSummary {
				input_token: quote.input_token.clone(),
				output_token: quote.output_token.clone(),
				in_amount: quote.in_amount,
				min_out_amount: self.built_min_out.unwrap_or(quote.min_out_amount),
			}),
		})
	}

	async fn list_tokens(&self) -> Result<Vec<Token>> {
		Ok(Vec::new())
	}

	async fn build_approval(
		&self,
		_token: &str,
		_amount: u128,
		owner: &str,
	) -> Result<Option<UnsignedTransaction>> {
		self.log.push("build:approve");
		Ok(Some(UnsignedTransaction {
			venue: self.id(),
			chain: self.chain.clone(),
			signer: owner.to_string(),
			payload: self.payload(owner),
			hints: Default::default(),
			summary: None,
		}))
	}
}

pub struct FakeWallet {
	accounts: Vec<WalletAccount>,
	log: CallLog,
}

impl FakeWallet {
	pub fn connected(log: CallLog) -> Self {
		Self {
			accounts: vec![
				WalletAccount::new(ChainFamily::Solana, SOLANA_OWNER),
				WalletAccount::new(ChainFamily::Evm, EVM_OWNER),
				WalletAccount::new(ChainFamily::Near, NEAR_OWNER),
			],
			log,
		}
	}
}

#[async_trait]
impl WalletSigner for FakeWallet {
	async fn accounts(&self) -> Vec<WalletAccount> {
		self.accounts.clone()
	}

	async fn is_connected(&self) -> bool {
		!self.accounts.is_empty()
	}

	async fn sign(
		&self,
		transaction: UnsignedTransaction,
	) -> std::result::Result<SignedTransaction, SignerError> {
		self.log.push("sign");
		let payload = match transaction.payload {
			TransactionPayload::Evm { .. } => SignedPayload::Hex("0x02f8b1".into()),
			_ => SignedPayload::Base64("AQAB".into()),
		};
		Ok(
			SignedTransaction::new(transaction.chain, transaction.signer, payload)
				.with_hints(transaction.hints),
		)
	}
}

/// Accepts every broadcast; reports `outcome` on every poll.
pub struct FakeDelivery {
	chain: ChainKey,
	outcome: Option<ConfirmationResult>,
	log: CallLog,
	pub submitted: AtomicUsize,
	pub polls: AtomicUsize,
}

impl FakeDelivery {
	pub fn new(chain: ChainKey, outcome: Option<ConfirmationResult>, log: CallLog) -> Self {
		Self {
			chain,
			outcome,
			log,
			submitted: AtomicUsize::new(0),
			polls: AtomicUsize::new(0),
		}
	}
}

#[async_trait]
impl DeliveryInterface for FakeDelivery {
	fn chain(&self) -> &ChainKey {
		&self.chain
	}

	async fn submit(
		&self,
		_transaction: SignedTransaction,
		_options: &SubmitOptions,
	) -> Result<TransactionId> {
		let n = self.submitted.fetch_add(1, Ordering::SeqCst);
		self.log.push(format!("submit:{}", n));
		Ok(TransactionId::new(format!("{}-tx{}", self.chain, n)))
	}

	async fn check_confirmation(
		&self,
		_tx_id: &TransactionId,
		_signer: &str,
	) -> std::result::Result<Option<ConfirmationResult>, DeliveryError> {
		self.polls.fetch_add(1, Ordering::SeqCst);
		Ok(self.outcome.clone())
	}
}
