//! Chain identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chain key such as `solana`, `ethereum` or `polygon`.
///
/// Keys are normalized to trimmed lowercase so that user input and
/// configuration files compare equal regardless of casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ChainKey(String);

impl ChainKey {
	pub const SOLANA: &'static str = "solana";
	pub const ETHEREUM: &'static str = "ethereum";
	pub const POLYGON: &'static str = "polygon";
	pub const ARBITRUM: &'static str = "arbitrum";
	pub const OPTIMISM: &'static str = "optimism";
	pub const SEPOLIA: &'static str = "sepolia";
	pub const NEAR: &'static str = "near";
	pub const ZCASH: &'static str = "zcash";

	pub fn new(key: impl AsRef<str>) -> Self {
		Self(key.as_ref().trim().to_ascii_lowercase())
	}

	pub fn solana() -> Self {
		Self::new(Self::SOLANA)
	}

	pub fn ethereum() -> Self {
		Self::new(Self::ETHEREUM)
	}

	pub fn near() -> Self {
		Self::new(Self::NEAR)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<String> for ChainKey {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for ChainKey {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<ChainKey> for String {
	fn from(value: ChainKey) -> Self {
		value.0
	}
}

impl FromStr for ChainKey {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::new(s))
	}
}

impl fmt::Display for ChainKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Execution environment family of a chain.
///
/// Determines which venue client, payload encoding and finality rule apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
	Solana,
	Evm,
	Near,
}

impl fmt::Display for ChainFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Solana => write!(f, "solana"),
			Self::Evm => write!(f, "evm"),
			Self::Near => write!(f, "near"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_chain_key_normalization() {
		assert_eq!(ChainKey::new("  Solana "), ChainKey::solana());
		assert_eq!(ChainKey::from("ETHEREUM").as_str(), "ethereum");

		let parsed: ChainKey = serde_json::from_str("\"Polygon\"").unwrap();
		assert_eq!(parsed.as_str(), ChainKey::POLYGON);
		assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"polygon\"");
	}
}
