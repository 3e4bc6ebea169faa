//! 1inch aggregator client for EVM chains.
//!
//! One client per chain; every request is scoped to `/{chain_id}`.

use crate::http::VenueHttp;
use crate::{quote_ttl, BuildOptions, VenueClient};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use swap_config::EvmConfig;
use swap_types::serde_helpers::{option_u128_string, u128_string};
use swap_types::{
	apply_slippage, is_evm_native, ChainFamily, ChainKey, Quote, QuoteRequest, Result, RouteHop,
	SwapError, SwapSummary, Token, TransactionPayload, UnsignedTransaction, VenueId,
};
use tracing::debug;

/// `approve(address,uint256)`
const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
	#[serde(with = "u128_string")]
	dst_amount: u128,
	#[serde(default, with = "option_u128_string")]
	src_amount: Option<u128>,
	#[serde(default)]
	protocols: Vec<Vec<Vec<ProtocolPart>>>,
	#[serde(default, alias = "gas")]
	estimated_gas: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProtocolPart {
	name: String,
	part: f64,
	from_token_address: String,
	to_token_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
	#[serde(with = "u128_string")]
	dst_amount: u128,
	tx: SwapTx,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapTx {
	from: String,
	to: String,
	data: String,
	#[serde(with = "u128_string")]
	value: u128,
	#[serde(default)]
	gas: Option<serde_json::Value>,
	#[serde(default, with = "option_u128_string")]
	gas_price: Option<u128>,
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
	tokens: HashMap<String, ListedToken>,
}

#[derive(Debug, Deserialize)]
struct ListedToken {
	address: String,
	symbol: String,
	name: String,
	decimals: u8,
	#[serde(default, rename = "logoURI")]
	logo_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpenderResponse {
	address: String,
}

/// Gas figures arrive as numbers or decimal strings.
fn gas_value(value: &Option<serde_json::Value>) -> Option<u64> {
	match value {
		Some(serde_json::Value::Number(n)) => n.as_u64(),
		Some(serde_json::Value::String(s)) => s.parse().ok(),
		_ => None,
	}
}

/// Slippage in percent as 1inch expects it, e.g. 50 bps -> "0.5".
fn slippage_percent(slippage_bps: u16) -> String {
	Decimal::new(slippage_bps as i64, 2).normalize().to_string()
}

/// ABI-encodes `approve(spender, amount)`.
fn approve_calldata(spender: &str, amount: u128) -> std::result::Result<String, String> {
	let spender_bytes = hex::decode(spender.trim_start_matches("0x"))
		.map_err(|e| format!("Invalid spender address '{}': {}", spender, e))?;
	if spender_bytes.len() != 20 {
		return Err(format!("Invalid spender address length: {}", spender));
	}

	let mut data = Vec::with_capacity(4 + 64);
	data.extend_from_slice(&APPROVE_SELECTOR);
	data.extend_from_slice(&[0u8; 12]);
	data.extend_from_slice(&spender_bytes);
	data.extend_from_slice(&[0u8; 16]);
	data.extend_from_slice(&amount.to_be_bytes());
	Ok(format!("0x{}", hex::encode(data)))
}

/// 1inch client bound to one chain.
pub struct OneInchClient {
	http: VenueHttp,
	chain: ChainKey,
	chain_id: u64,
	quote_ttl: Duration,
}

impl OneInchClient {
	pub fn new(
		api_url: &str,
		chain: ChainKey,
		chain_id: u64,
		api_key: Option<String>,
	) -> Result<Self> {
		let base = format!("{}/{}", api_url.trim_end_matches('/'), chain_id);
		Ok(Self {
			http: VenueHttp::new(base, api_key, &VenueId::oneinch())?,
			chain,
			chain_id,
			quote_ttl: quote_ttl(EvmConfig::default().quote_ttl_secs)?,
		})
	}

	pub fn from_config(config: &EvmConfig, chain: &ChainKey) -> Result<Self> {
		let chain_config = config
			.chains
			.get(chain)
			.ok_or_else(|| SwapError::Config(format!("EVM chain {} is not configured", chain)))?;

		Ok(Self::new(
			&config.oneinch_api_url,
			chain.clone(),
			chain_config.chain_id,
			config.api_key.clone(),
		)?
		.with_quote_ttl(quote_ttl(config.quote_ttl_secs)?))
	}

	pub fn with_quote_ttl(mut self, ttl: Duration) -> Self {
		self.quote_ttl = ttl;
		self
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	/// Router address that needs an ERC-20 allowance.
	pub async fn spender(&self) -> Result<String> {
		let response: SpenderResponse = self
			.http
			.get_json("approve/spender", &[] as &[(&str, &str)])
			.await
			.map_err(|e| e.into_build_error(&self.id()))?;
		Ok(response.address)
	}
}

#[async_trait]
impl VenueClient for OneInchClient {
	fn id(&self) -> VenueId {
		VenueId::oneinch()
	}

	fn chain(&self) -> &ChainKey {
		&self.chain
	}

	fn family(&self) -> ChainFamily {
		ChainFamily::Evm
	}

	async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote> {
		request.validate()?;

		let query = [
			("src", request.input_token.clone()),
			("dst", request.output_token.clone()),
			("amount", request.amount.to_string()),
			("includeProtocols", "true".to_string()),
			("includeGas", "true".to_string()),
		];

		let raw: serde_json::Value = self
			.http
			.get_json("quote", &query)
			.await
			.map_err(|e| e.into_quote_error(&self.id()))?;
		let parsed: QuoteResponse =
			serde_json::from_value(raw.clone()).map_err(|e| SwapError::QuoteUnavailable {
				venue: self.id(),
				message: format!("Malformed quote: {}", e),
			})?;

		if parsed.dst_amount == 0 {
			return Err(SwapError::QuoteUnavailable {
				venue: self.id(),
				message: "Venue returned a zero output amount".to_string(),
			});
		}

		let route = parsed
			.protocols
			.iter()
			.flatten()
			.flatten()
			.map(|part| RouteHop {
				label: part.name.clone(),
				pool: None,
				input_token: part.from_token_address.clone(),
				output_token: part.to_token_address.clone(),
				in_amount: 0,
				out_amount: 0,
				percent: part.part.clamp(0.0, 100.0).round() as u8,
			})
			.collect();

		let fetched_at = Utc::now();
		let quote = Quote {
			venue: self.id(),
			chain: self.chain.clone(),
			input_token: request.input_token.clone(),
			output_token: request.output_token.clone(),
			in_amount: parsed.src_amount.unwrap_or(request.amount),
			out_amount: parsed.dst_amount,
			min_out_amount: apply_slippage(parsed.dst_amount, request.slippage_bps),
			slippage_bps: request.slippage_bps,
			route,
			price_impact_pct: None,
			fees: Vec::new(),
			estimated_gas: gas_value(&parsed.estimated_gas),
			context_slot: None,
			expires_at: Some(fetched_at + self.quote_ttl),
			fetched_at,
			raw,
		};

		debug!(
			chain_id = self.chain_id,
			out_amount = %quote.out_amount,
			"1inch quote received"
		);
		Ok(quote)
	}

	async fn build_transaction(
		&self,
		quote: &Quote,
		signer: &str,
		options: &BuildOptions,
	) -> Result<UnsignedTransaction> {
		if quote.venue != self.id() || quote.chain != self.chain {
			return Err(SwapError::TransactionBuildFailed {
				venue: self.id(),
				message: format!(
					"Quote from {} on {} cannot be built on {}",
					quote.venue, quote.chain, self.chain
				),
			});
		}
		if self.is_expired(quote) {
			return Err(SwapError::QuoteExpired {
				venue: self.id(),
				message: format!("Quote fetched at {} is stale", quote.fetched_at),
			});
		}

		let query = [
			("src", quote.input_token.clone()),
			("dst", quote.output_token.clone()),
			("amount", quote.in_amount.to_string()),
			("from", signer.to_string()),
			("slippage", slippage_percent(quote.slippage_bps)),
			("disableEstimate", "true".to_string()),
			("allowPartialFill", "false".to_string()),
		];

		let response: SwapResponse = self
			.http
			.get_json("swap", &query)
			.await
			.map_err(|e| e.into_build_error(&self.id()))?;

		// The swap is re-priced on build and 1inch derives the on-chain minimum
		// from the new amount; that minimum must still honour the quote's bound
		let min_out_amount = apply_slippage(response.dst_amount, quote.slippage_bps);
		if min_out_amount < quote.min_out_amount {
			return Err(SwapError::SlippageExceeded {
				minimum: quote.min_out_amount,
				offered: min_out_amount,
			});
		}

		Ok(UnsignedTransaction {
			venue: self.id(),
			chain: self.chain.clone(),
			signer: signer.to_string(),
			payload: TransactionPayload::Evm {
				from: response.tx.from,
				to: response.tx.to,
				data: response.tx.data,
				value: response.tx.value,
				gas: gas_value(&response.tx.gas).filter(|gas| *gas > 0),
				gas_price: response.tx.gas_price,
				chain_id: self.chain_id,
			},
			hints: options.hints.clone(),
			summary: Some(SwapSummary {
				input_token: quote.input_token.clone(),
				output_token: quote.output_token.clone(),
				in_amount: quote.in_amount,
				min_out_amount,
			}),
		})
	}

	async fn list_tokens(&self) -> Result<Vec<Token>> {
		let response: TokensResponse = self
			.http
			.get_json("tokens", &[] as &[(&str, &str)])
			.await
			.map_err(|e| e.into_read_error(&self.id()))?;

		let mut tokens: Vec<Token> = response
			.tokens
			.into_values()
			.map(|t| {
				let token = Token::new(t.address, t.symbol, t.name, t.decimals, self.chain.clone())
					.with_chain_id(self.chain_id);
				match t.logo_uri {
					Some(uri) => token.with_logo(uri),
					None => token,
				}
			})
			.collect();
		tokens.sort_by(|a, b| a.symbol.cmp(&b.symbol));
		Ok(tokens)
	}

	async fn build_approval(
		&self,
		token: &str,
		amount: u128,
		owner: &str,
	) -> Result<Option<UnsignedTransaction>> {
		if is_evm_native(token) {
			return Ok(None);
		}

		let spender = self.spender().await?;
		let data = approve_calldata(&spender, amount).map_err(|message| {
			SwapError::TransactionBuildFailed {
				venue: self.id(),
				message,
			}
		})?;

		Ok(Some(UnsignedTransaction {
			venue: self.id(),
			chain: self.chain.clone(),
			signer: owner.to_string(),
			payload: TransactionPayload::Evm {
				from: owner.to_string(),
				to: token.to_string(),
				data,
				value: 0,
				gas: None,
				gas_price: None,
				chain_id: self.chain_id,
			},
			hints: Default::default(),
			summary: None,
		}))
	}
}
