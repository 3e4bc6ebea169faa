//! Serde helpers for token amounts.
//!
//! Amounts are base-unit integers that routinely exceed what JSON numbers
//! carry safely, so they travel as decimal strings. Deserialization also
//! accepts plain numbers because some venues return them.

use serde::{de, Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
	String(String),
	Number(u64),
}

fn parse_amount<E: de::Error>(raw: StringOrNumber) -> Result<u128, E> {
	match raw {
		StringOrNumber::String(s) => s
			.trim()
			.parse::<u128>()
			.map_err(|_| E::custom(format!("Invalid amount: {}", s))),
		StringOrNumber::Number(n) => Ok(n as u128),
	}
}

/// (De)serializes a `u128` as a decimal string.
pub mod u128_string {
	use super::*;

	pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
	where
		D: Deserializer<'de>,
	{
		parse_amount(StringOrNumber::deserialize(deserializer)?)
	}
}

/// (De)serializes an `Option<u128>` as an optional decimal string.
pub mod option_u128_string {
	use super::*;

	pub fn serialize<S>(value: &Option<u128>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match value {
			Some(v) => serializer.serialize_some(&v.to_string()),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u128>, D::Error>
	where
		D: Deserializer<'de>,
	{
		Option::<StringOrNumber>::deserialize(deserializer)?
			.map(parse_amount)
			.transpose()
	}
}
