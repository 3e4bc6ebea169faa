//! Venue identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a remote venue (aggregator or intent protocol).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(String);

impl VenueId {
	pub const JUPITER: &'static str = "jupiter";
	pub const ONEINCH: &'static str = "1inch";
	pub const NEAR_INTENTS: &'static str = "near-intents";

	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn jupiter() -> Self {
		Self::new(Self::JUPITER)
	}

	pub fn oneinch() -> Self {
		Self::new(Self::ONEINCH)
	}

	pub fn near_intents() -> Self {
		Self::new(Self::NEAR_INTENTS)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for VenueId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
