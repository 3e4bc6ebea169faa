//! Shared helpers for chain clients.

use backoff::ExponentialBackoff;
use std::time::Duration;

/// Shortens a transaction hash or signature for log output.
pub fn truncate_hash(hash: &str) -> String {
	if hash.len() <= 12 || !hash.is_ascii() {
		hash.to_string()
	} else {
		format!("{}...{}", &hash[..6], &hash[hash.len() - 4..])
	}
}

/// Retry settings for read-only RPC calls.
///
/// Bounded both by attempt count and by total elapsed time, whichever is
/// reached first.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
	pub max_retries: u32,
	pub initial_interval: Duration,
	pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_retries: 3,
			initial_interval: Duration::from_millis(250),
			max_elapsed: Duration::from_secs(30),
		}
	}
}

impl RetryPolicy {
	/// A policy that never retries.
	pub fn none() -> Self {
		Self {
			max_retries: 0,
			..Default::default()
		}
	}

	pub fn backoff(&self) -> ExponentialBackoff {
		ExponentialBackoff {
			initial_interval: self.initial_interval,
			max_elapsed_time: Some(self.max_elapsed),
			..Default::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_hash() {
		assert_eq!(truncate_hash("0x1234"), "0x1234");
		assert_eq!(
			truncate_hash("0x1234567890abcdef1234567890abcdef"),
			"0x1234...cdef"
		);
	}

	#[test]
	fn test_retry_policy_defaults() {
		let policy = RetryPolicy::default();
		assert_eq!(policy.max_retries, 3);
		assert_eq!(
			policy.backoff().max_elapsed_time,
			Some(Duration::from_secs(30))
		);
		assert_eq!(RetryPolicy::none().max_retries, 0);
	}
}
