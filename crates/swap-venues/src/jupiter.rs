//! Jupiter aggregator client for Solana.

use crate::http::VenueHttp;
use crate::{quote_ttl, BuildOptions, VenueClient};
use async_trait::async_trait;
use base64::Engine;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use swap_chains::SolanaRpcClient;
use swap_config::SolanaConfig;
use swap_types::serde_helpers::u128_string;
use swap_types::{
	ChainFamily, ChainKey, FeeComponent, Quote, QuoteRequest, Result, RouteHop, SubmissionHints,
	SwapError, SwapSummary, Token, TransactionPayload, UnsignedTransaction, VenueId,
};
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JupiterQuote {
	input_mint: String,
	#[serde(with = "u128_string")]
	in_amount: u128,
	output_mint: String,
	#[serde(with = "u128_string")]
	out_amount: u128,
	/// Minimum output after slippage for ExactIn swaps
	#[serde(with = "u128_string")]
	other_amount_threshold: u128,
	slippage_bps: u16,
	#[serde(default)]
	platform_fee: Option<PlatformFee>,
	#[serde(default)]
	price_impact_pct: Option<String>,
	#[serde(default)]
	route_plan: Vec<RoutePlanStep>,
	#[serde(default)]
	context_slot: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlatformFee {
	#[serde(with = "u128_string")]
	amount: u128,
	fee_bps: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutePlanStep {
	swap_info: SwapInfo,
	percent: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapInfo {
	amm_key: String,
	#[serde(default)]
	label: Option<String>,
	input_mint: String,
	output_mint: String,
	#[serde(with = "u128_string")]
	in_amount: u128,
	#[serde(with = "u128_string")]
	out_amount: u128,
	#[serde(with = "u128_string")]
	fee_amount: u128,
	fee_mint: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapRequest<'a> {
	quote_response: &'a serde_json::Value,
	user_public_key: &'a str,
	wrap_and_unwrap_sol: bool,
	compute_unit_price_micro_lamports: serde_json::Value,
	as_legacy_transaction: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
	swap_transaction: String,
	last_valid_block_height: u64,
	#[serde(default)]
	prioritization_fee_lamports: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedToken {
	address: String,
	symbol: String,
	name: String,
	decimals: u8,
	#[serde(default, rename = "logoURI")]
	logo_uri: Option<String>,
}

/// Jupiter client.
///
/// Holds the Solana connection used to confirm what it builds, so delivery
/// and confirmation share one node.
pub struct JupiterClient {
	http: VenueHttp,
	token_list_url: String,
	connection: Arc<SolanaRpcClient>,
	chain: ChainKey,
	priority_fee: Option<u64>,
	wrap_and_unwrap_sol: bool,
	quote_ttl: Duration,
}

impl JupiterClient {
	pub fn new(api_url: impl Into<String>, connection: Arc<SolanaRpcClient>) -> Result<Self> {
		let defaults = SolanaConfig::default();
		Ok(Self {
			http: VenueHttp::new(api_url, None, &VenueId::jupiter())?,
			token_list_url: defaults.token_list_url,
			connection,
			chain: ChainKey::solana(),
			priority_fee: None,
			wrap_and_unwrap_sol: defaults.wrap_and_unwrap_sol,
			quote_ttl: quote_ttl(defaults.quote_ttl_secs)?,
		})
	}

	pub fn from_config(config: &SolanaConfig) -> Result<Self> {
		let connection = SolanaRpcClient::new(&config.rpc_url, &config.commitment)
			.map_err(|e| SwapError::Config(format!("Solana RPC: {}", e)))?;

		info!("Jupiter client initialized with RPC {}", config.rpc_url);

		Ok(Self {
			http: VenueHttp::new(&config.jupiter_api_url, None, &VenueId::jupiter())?,
			token_list_url: config.token_list_url.clone(),
			connection: Arc::new(connection),
			chain: ChainKey::solana(),
			priority_fee: config.priority_fee_micro_lamports,
			wrap_and_unwrap_sol: config.wrap_and_unwrap_sol,
			quote_ttl: quote_ttl(config.quote_ttl_secs)?,
		})
	}

	pub fn with_priority_fee(mut self, micro_lamports: u64) -> Self {
		self.priority_fee = Some(micro_lamports);
		self
	}

	pub fn with_token_list_url(mut self, url: impl Into<String>) -> Self {
		self.token_list_url = url.into();
		self
	}

	pub fn with_quote_ttl(mut self, ttl: Duration) -> Self {
		self.quote_ttl = ttl;
		self
	}

	/// Read-only connection for confirmation polling.
	pub fn connection(&self) -> Arc<SolanaRpcClient> {
		self.connection.clone()
	}

	fn to_quote(&self, raw: serde_json::Value) -> Result<Quote> {
		let venue = self.id();
		let parsed: JupiterQuote =
			serde_json::from_value(raw.clone()).map_err(|e| SwapError::QuoteUnavailable {
				venue: venue.clone(),
				message: format!("Malformed quote: {}", e),
			})?;

		let route = parsed
			.route_plan
			.iter()
			.map(|step| RouteHop {
				label: step
					.swap_info
					.label
					.clone()
					.unwrap_or_else(|| "unknown".to_string()),
				pool: Some(step.swap_info.amm_key.clone()),
				input_token: step.swap_info.input_mint.clone(),
				output_token: step.swap_info.output_mint.clone(),
				in_amount: step.swap_info.in_amount,
				out_amount: step.swap_info.out_amount,
				percent: step.percent,
			})
			.collect();

		let mut fees: Vec<FeeComponent> = parsed
			.route_plan
			.iter()
			.filter(|step| step.swap_info.fee_amount > 0)
			.map(|step| FeeComponent {
				label: step
					.swap_info
					.label
					.clone()
					.unwrap_or_else(|| step.swap_info.amm_key.clone()),
				amount: step.swap_info.fee_amount,
				token: Some(step.swap_info.fee_mint.clone()),
				bps: None,
			})
			.collect();
		if let Some(platform) = &parsed.platform_fee {
			fees.push(FeeComponent {
				label: "platform".to_string(),
				amount: platform.amount,
				token: Some(parsed.output_mint.clone()),
				bps: Some(platform.fee_bps),
			});
		}

		let fetched_at = Utc::now();
		Ok(Quote {
			venue,
			chain: self.chain.clone(),
			input_token: parsed.input_mint,
			output_token: parsed.output_mint,
			in_amount: parsed.in_amount,
			out_amount: parsed.out_amount,
			min_out_amount: parsed.other_amount_threshold,
			slippage_bps: parsed.slippage_bps,
			route,
			price_impact_pct: parsed
				.price_impact_pct
				.as_deref()
				.and_then(|pct| Decimal::from_str(pct).ok()),
			fees,
			estimated_gas: None,
			context_slot: parsed.context_slot,
			expires_at: Some(fetched_at + self.quote_ttl),
			fetched_at,
			raw,
		})
	}
}

#[async_trait]
impl VenueClient for JupiterClient {
	fn id(&self) -> VenueId {
		VenueId::jupiter()
	}

	fn chain(&self) -> &ChainKey {
		&self.chain
	}

	fn family(&self) -> ChainFamily {
		ChainFamily::Solana
	}

	async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote> {
		request.validate()?;

		let query = [
			("inputMint", request.input_token.clone()),
			("outputMint", request.output_token.clone()),
			("amount", request.amount.to_string()),
			("slippageBps", request.slippage_bps.to_string()),
			("onlyDirectRoutes", "false".to_string()),
			("asLegacyTransaction", "false".to_string()),
		];

		let raw: serde_json::Value = self
			.http
			.get_json("quote", &query)
			.await
			.map_err(|e| e.into_quote_error(&self.id()))?;

		let quote = self.to_quote(raw)?;
		debug!(
			in_amount = %quote.in_amount,
			out_amount = %quote.out_amount,
			hops = quote.route.len(),
			"Jupiter quote received"
		);
		Ok(quote)
	}

	async fn build_transaction(
		&self,
		quote: &Quote,
		signer: &str,
		options: &BuildOptions,
	) -> Result<UnsignedTransaction> {
		if quote.venue != self.id() || quote.raw.is_null() {
			return Err(SwapError::TransactionBuildFailed {
				venue: self.id(),
				message: format!("Quote from {} cannot be built by Jupiter", quote.venue),
			});
		}
		if self.is_expired(quote) {
			return Err(SwapError::QuoteExpired {
				venue: self.id(),
				message: format!("Quote fetched at {} is stale", quote.fetched_at),
			});
		}

		let compute_unit_price = match options.priority_fee.or(self.priority_fee) {
			Some(fee) => json!(fee),
			None => json!("auto"),
		};
		let body = SwapRequest {
			quote_response: &quote.raw,
			user_public_key: signer,
			wrap_and_unwrap_sol: self.wrap_and_unwrap_sol,
			compute_unit_price_micro_lamports: compute_unit_price,
			as_legacy_transaction: false,
		};

		let response: SwapResponse = self
			.http
			.post_json("swap", &body)
			.await
			.map_err(|e| e.into_build_error(&self.id()))?;

		if base64::engine::general_purpose::STANDARD
			.decode(&response.swap_transaction)
			.is_err()
		{
			return Err(SwapError::TransactionBuildFailed {
				venue: self.id(),
				message: "Swap transaction is not valid base64".to_string(),
			});
		}

		Ok(UnsignedTransaction {
			venue: self.id(),
			chain: self.chain.clone(),
			signer: signer.to_string(),
			payload: TransactionPayload::SolanaVersioned {
				transaction: response.swap_transaction,
				last_valid_block_height: response.last_valid_block_height,
				prioritization_fee_lamports: response.prioritization_fee_lamports,
			},
			hints: SubmissionHints {
				priority_fee: response.prioritization_fee_lamports,
				..options.hints.clone()
			},
			summary: Some(SwapSummary {
				input_token: quote.input_token.clone(),
				output_token: quote.output_token.clone(),
				in_amount: quote.in_amount,
				min_out_amount: quote.min_out_amount,
			}),
		})
	}

	async fn list_tokens(&self) -> Result<Vec<Token>> {
		let listed: Vec<ListedToken> = self
			.http
			.get_absolute(&self.token_list_url)
			.await
			.map_err(|e| e.into_read_error(&self.id()))?;

		Ok(listed
			.into_iter()
			.map(|t| {
				let token = Token::new(t.address, t.symbol, t.name, t.decimals, self.chain.clone());
				match t.logo_uri {
					Some(uri) => token.with_logo(uri),
					None => token,
				}
			})
			.collect())
	}
}
