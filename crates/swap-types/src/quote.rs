//! Quote types returned by venues.

use crate::serde_helpers::u128_string;
use crate::{same_token, ChainKey, SwapError, VenueId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound for slippage tolerance, 100%.
pub const MAX_SLIPPAGE_BPS: u16 = 10_000;

/// A request for a price quote from one venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
	pub input_token: String,
	pub output_token: String,
	#[serde(with = "u128_string")]
	pub amount: u128,
	pub slippage_bps: u16,
}

impl QuoteRequest {
	pub fn new(
		input_token: impl Into<String>,
		output_token: impl Into<String>,
		amount: u128,
		slippage_bps: u16,
	) -> Self {
		Self {
			input_token: input_token.into(),
			output_token: output_token.into(),
			amount,
			slippage_bps,
		}
	}

	/// Local validation, performed before any network call.
	pub fn validate(&self) -> Result<(), SwapError> {
		if self.amount == 0 {
			return Err(SwapError::InvalidAmount(
				"Quote amount must be greater than zero".to_string(),
			));
		}
		if self.slippage_bps > MAX_SLIPPAGE_BPS {
			return Err(SwapError::InvalidAmount(format!(
				"Slippage tolerance {} bps exceeds {} bps",
				self.slippage_bps, MAX_SLIPPAGE_BPS
			)));
		}
		Ok(())
	}
}

/// One venue-internal hop of a route. Opaque to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteHop {
	/// Venue-reported label of the pool or protocol.
	pub label: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pool: Option<String>,
	pub input_token: String,
	pub output_token: String,
	#[serde(with = "u128_string")]
	pub in_amount: u128,
	#[serde(with = "u128_string")]
	pub out_amount: u128,
	/// Share of the input routed through this hop.
	pub percent: u8,
}

/// A fee charged along the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeComponent {
	pub label: String,
	#[serde(with = "u128_string")]
	pub amount: u128,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bps: Option<u16>,
}

/// A venue's proposed exchange for a token pair and amount.
///
/// Immutable once returned. A stale quote must be re-requested before a
/// transaction is built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
	pub venue: VenueId,
	pub chain: ChainKey,
	pub input_token: String,
	pub output_token: String,
	#[serde(with = "u128_string")]
	pub in_amount: u128,
	/// Expected output amount.
	#[serde(with = "u128_string")]
	pub out_amount: u128,
	/// Worst acceptable output after slippage.
	#[serde(with = "u128_string")]
	pub min_out_amount: u128,
	pub slippage_bps: u16,
	pub route: Vec<RouteHop>,
	/// Price impact in percent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub price_impact_pct: Option<Decimal>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub fees: Vec<FeeComponent>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub estimated_gas: Option<u64>,
	/// Slot or block the venue priced against.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub context_slot: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<DateTime<Utc>>,
	pub fetched_at: DateTime<Utc>,
	/// Venue response as received; some venues build from the full payload.
	#[serde(default)]
	pub raw: serde_json::Value,
}

impl Quote {
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		self.expires_at.is_some_and(|expiry| now >= expiry)
	}

	pub fn is_expired(&self) -> bool {
		self.is_expired_at(Utc::now())
	}

	pub fn matches_pair(&self, input_token: &str, output_token: &str) -> bool {
		same_token(&self.input_token, input_token) && same_token(&self.output_token, output_token)
	}
}

/// Applies a slippage tolerance to an amount, rounding down.
pub fn apply_slippage(amount: u128, slippage_bps: u16) -> u128 {
	let keep = (MAX_SLIPPAGE_BPS.saturating_sub(slippage_bps)) as u128;
	let scale = MAX_SLIPPAGE_BPS as u128;
	// Split to avoid overflowing on very large amounts
	(amount / scale) * keep + (amount % scale) * keep / scale
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;

	fn quote(expires_at: Option<DateTime<Utc>>) -> Quote {
		Quote {
			venue: VenueId::jupiter(),
			chain: ChainKey::solana(),
			input_token: crate::SOL_MINT.to_string(),
			output_token: crate::USDC_MINT.to_string(),
			in_amount: 1_000_000_000,
			out_amount: 25_000_000,
			min_out_amount: 24_875_000,
			slippage_bps: 50,
			route: vec![],
			price_impact_pct: None,
			fees: vec![],
			estimated_gas: None,
			context_slot: Some(300_000_000),
			expires_at,
			fetched_at: Utc::now(),
			raw: serde_json::Value::Null,
		}
	}

	#[test]
	fn test_quote_request_validation() {
		let zero = QuoteRequest::new("a", "b", 0, 50);
		assert!(matches!(zero.validate(), Err(SwapError::InvalidAmount(_))));

		let wild = QuoteRequest::new("a", "b", 10, 10_001);
		assert!(matches!(wild.validate(), Err(SwapError::InvalidAmount(_))));

		assert!(QuoteRequest::new("a", "b", 1, 50).validate().is_ok());
	}

	#[test]
	fn test_expiry() {
		let now = Utc::now();
		assert!(!quote(None).is_expired_at(now));
		assert!(!quote(Some(now + Duration::seconds(10))).is_expired_at(now));
		assert!(quote(Some(now - Duration::seconds(1))).is_expired_at(now));
	}

	#[test]
	fn test_apply_slippage() {
		assert_eq!(apply_slippage(25_000_000, 50), 24_875_000);
		assert_eq!(apply_slippage(1_000, 0), 1_000);
		assert_eq!(apply_slippage(1_000, 10_000), 0);
		assert_eq!(apply_slippage(u128::MAX, 0), u128::MAX);
	}

	#[test]
	fn test_matches_pair() {
		let q = quote(None);
		assert!(q.matches_pair(crate::SOL_MINT, crate::USDC_MINT));
		assert!(!q.matches_pair(crate::USDC_MINT, crate::SOL_MINT));
	}
}
