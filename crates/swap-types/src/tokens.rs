//! Token reference data and a small built-in registry of well-known tokens.

use crate::ChainKey;
use serde::{Deserialize, Serialize};

/// Native SOL (wrapped mint used by aggregators).
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const USDT_MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";
pub const BONK_MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
pub const WIF_MINT: &str = "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm";

/// Placeholder address for the native asset of an EVM chain.
pub const EVM_NATIVE_ZERO: &str = "0x0000000000000000000000000000000000000000";
/// Native asset marker used by EVM aggregators.
pub const EVM_NATIVE_EEEE: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";
/// MATIC system contract on Polygon.
pub const POLYGON_NATIVE: &str = "0x0000000000000000000000000000000000001010";

/// Token reference data. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Chain-scoped address or mint.
	pub address: String,
	pub symbol: String,
	pub name: String,
	pub decimals: u8,
	pub chain: ChainKey,
	/// Numeric chain id for EVM chains.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chain_id: Option<u64>,
	#[serde(default, rename = "logoURI", skip_serializing_if = "Option::is_none")]
	pub logo_uri: Option<String>,
}

impl Token {
	pub fn new(
		address: impl Into<String>,
		symbol: impl Into<String>,
		name: impl Into<String>,
		decimals: u8,
		chain: ChainKey,
	) -> Self {
		Self {
			address: address.into(),
			symbol: symbol.into(),
			name: name.into(),
			decimals,
			chain,
			chain_id: None,
			logo_uri: None,
		}
	}

	pub fn with_chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = Some(chain_id);
		self
	}

	pub fn with_logo(mut self, uri: impl Into<String>) -> Self {
		self.logo_uri = Some(uri.into());
		self
	}
}

/// Returns true for addresses that denote a chain's native asset on EVM
/// chains. Native assets need no ERC-20 allowance.
pub fn is_evm_native(address: &str) -> bool {
	[EVM_NATIVE_ZERO, EVM_NATIVE_EEEE, POLYGON_NATIVE]
		.iter()
		.any(|native| native.eq_ignore_ascii_case(address))
}

/// Compares two token identifiers. EVM addresses are case-insensitive
/// (checksum casing), base58 mints are not.
pub fn same_token(a: &str, b: &str) -> bool {
	if a.starts_with("0x") && b.starts_with("0x") {
		a.eq_ignore_ascii_case(b)
	} else {
		a == b
	}
}

/// Display metadata of a chain offered to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
	pub id: ChainKey,
	pub name: String,
	pub logo: String,
}

/// Chains presented to users. Presence here does not imply a configured
/// venue; routing is decided by the orchestrator.
pub fn supported_chains() -> Vec<ChainInfo> {
	[
		(
			ChainKey::ETHEREUM,
			"Ethereum",
			"https://assets.coingecko.com/coins/images/279/small/ethereum.png",
		),
		(
			ChainKey::SOLANA,
			"Solana",
			"https://assets.coingecko.com/coins/images/4128/small/solana.png",
		),
		(
			ChainKey::POLYGON,
			"Polygon",
			"https://assets.coingecko.com/coins/images/4713/small/matic-token-icon.png",
		),
		(
			ChainKey::ZCASH,
			"Zcash",
			"https://assets.coingecko.com/coins/images/486/small/circle-zcash-color.png",
		),
	]
	.into_iter()
	.map(|(id, name, logo)| ChainInfo {
		id: ChainKey::new(id),
		name: name.to_string(),
		logo: logo.to_string(),
	})
	.collect()
}

/// Lookup table of well-known tokens.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
	tokens: Vec<Token>,
}

impl TokenRegistry {
	pub fn new(tokens: Vec<Token>) -> Self {
		Self { tokens }
	}

	pub fn tokens(&self) -> &[Token] {
		&self.tokens
	}

	pub fn by_chain<'a>(&'a self, chain: &'a ChainKey) -> impl Iterator<Item = &'a Token> + 'a {
		self.tokens.iter().filter(move |t| &t.chain == chain)
	}

	/// Resolves a symbol (case-insensitive) or an address on the given chain.
	pub fn resolve(&self, chain: &ChainKey, symbol_or_address: &str) -> Option<&Token> {
		self.tokens.iter().find(|t| {
			&t.chain == chain
				&& (t.symbol.eq_ignore_ascii_case(symbol_or_address)
					|| same_token(&t.address, symbol_or_address))
		})
	}

	pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) {
		self.tokens.extend(tokens);
	}
}

impl Default for TokenRegistry {
	fn default() -> Self {
		let ethereum = ChainKey::ethereum();
		let solana = ChainKey::solana();
		let polygon = ChainKey::new(ChainKey::POLYGON);
		let usdc_logo = "https://assets.coingecko.com/coins/images/6319/small/USD_Coin_icon.png";
		let usdt_logo = "https://assets.coingecko.com/coins/images/325/small/Tether.png";

		Self::new(vec![
			Token::new(EVM_NATIVE_ZERO, "ETH", "Ethereum", 18, ethereum.clone())
				.with_chain_id(1)
				.with_logo("https://assets.coingecko.com/coins/images/279/small/ethereum.png"),
			Token::new(
				"0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
				"USDC",
				"USD Coin",
				6,
				ethereum.clone(),
			)
			.with_chain_id(1)
			.with_logo(usdc_logo),
			Token::new(
				"0xdAC17F958D2ee523a2206206994597C13D831ec7",
				"USDT",
				"Tether USD",
				6,
				ethereum,
			)
			.with_chain_id(1)
			.with_logo(usdt_logo),
			Token::new(SOL_MINT, "SOL", "Solana", 9, solana.clone())
				.with_logo("https://assets.coingecko.com/coins/images/4128/small/solana.png"),
			Token::new(USDC_MINT, "USDC", "USD Coin", 6, solana.clone()).with_logo(usdc_logo),
			Token::new(USDT_MINT, "USDT", "Tether USD", 6, solana.clone()).with_logo(usdt_logo),
			Token::new(BONK_MINT, "BONK", "Bonk", 5, solana.clone()),
			Token::new(WIF_MINT, "WIF", "dogwifhat", 6, solana),
			Token::new(POLYGON_NATIVE, "MATIC", "Polygon", 18, polygon.clone())
				.with_chain_id(137)
				.with_logo(
					"https://assets.coingecko.com/coins/images/4713/small/matic-token-icon.png",
				),
			Token::new(
				"0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174",
				"USDC",
				"USD Coin",
				6,
				polygon,
			)
			.with_chain_id(137)
			.with_logo(usdc_logo),
		])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_resolve_by_symbol_and_address() {
		let registry = TokenRegistry::default();
		let solana = ChainKey::solana();

		let usdc = registry.resolve(&solana, "usdc").unwrap();
		assert_eq!(usdc.address, USDC_MINT);
		assert_eq!(usdc.decimals, 6);

		let sol = registry.resolve(&solana, SOL_MINT).unwrap();
		assert_eq!(sol.symbol, "SOL");

		// Checksum casing does not matter for EVM addresses
		let ethereum = ChainKey::ethereum();
		let usdt = registry
			.resolve(&ethereum, "0xdac17f958d2ee523a2206206994597c13d831ec7")
			.unwrap();
		assert_eq!(usdt.symbol, "USDT");

		// Same symbol on another chain is not returned
		assert!(registry.resolve(&ChainKey::new("zcash"), "USDC").is_none());
	}

	#[test]
	fn test_native_detection() {
		assert!(is_evm_native(EVM_NATIVE_ZERO));
		assert!(is_evm_native("0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"));
		assert!(!is_evm_native("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));
		assert!(!same_token(SOL_MINT, &SOL_MINT.to_lowercase()));
	}
}
