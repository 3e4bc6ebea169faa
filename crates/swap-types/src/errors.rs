//! Error taxonomy for the swap orchestration layer.
//!
//! Every failure carries enough context to tell the caller whether there was
//! no route, the quote expired, the user rejected the request or a
//! network/venue error occurred, and therefore whether to retry, re-quote or
//! abort.

use crate::{ChainKey, VenueId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SwapError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
	#[error("Invalid amount: {0}")]
	InvalidAmount(String),

	#[error("No route available from {venue}: {message}")]
	QuoteUnavailable { venue: VenueId, message: String },

	#[error("Quote from {venue} expired: {message}")]
	QuoteExpired { venue: VenueId, message: String },

	#[error("Slippage exceeded: intent requires at least {minimum}, quote guarantees {offered}")]
	SlippageExceeded { minimum: u128, offered: u128 },

	#[error("Venue {venue} unreachable: {message}")]
	VenueUnreachable { venue: VenueId, message: String },

	#[error("Transaction build failed at {venue}: {message}")]
	TransactionBuildFailed { venue: VenueId, message: String },

	#[error("Signer unavailable: {0}")]
	SignerUnavailable(String),

	#[error("Rejected by user: {0}")]
	UserRejected(String),

	#[error("Submission to {chain} failed: {message}")]
	SubmissionFailed { chain: ChainKey, message: String },

	#[error("Confirmation of {tx_id} timed out after {timeout_ms}ms")]
	ConfirmationTimeout { tx_id: String, timeout_ms: u64 },

	#[error("Transaction {tx_id} failed on-chain: {message}")]
	TransactionFailed { tx_id: String, message: String },

	#[error("Unsupported route: {0}")]
	UnsupportedRoute(String),

	#[error("Intent protocol unavailable: {0}")]
	IntentProtocolUnavailable(String),

	#[error("Not connected: {0}")]
	NotConnected(String),

	#[error("Invalid state: {0}")]
	InvalidState(String),

	#[error("Configuration error: {0}")]
	Config(String),
}

/// Discriminant of [`SwapError`] without its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	InvalidAmount,
	QuoteUnavailable,
	QuoteExpired,
	SlippageExceeded,
	VenueUnreachable,
	TransactionBuildFailed,
	SignerUnavailable,
	UserRejected,
	SubmissionFailed,
	ConfirmationTimeout,
	TransactionFailed,
	UnsupportedRoute,
	IntentProtocolUnavailable,
	NotConnected,
	InvalidState,
	Config,
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::InvalidAmount => "invalid_amount",
			Self::QuoteUnavailable => "quote_unavailable",
			Self::QuoteExpired => "quote_expired",
			Self::SlippageExceeded => "slippage_exceeded",
			Self::VenueUnreachable => "venue_unreachable",
			Self::TransactionBuildFailed => "transaction_build_failed",
			Self::SignerUnavailable => "signer_unavailable",
			Self::UserRejected => "user_rejected",
			Self::SubmissionFailed => "submission_failed",
			Self::ConfirmationTimeout => "timeout",
			Self::TransactionFailed => "transaction_failed",
			Self::UnsupportedRoute => "unsupported_route",
			Self::IntentProtocolUnavailable => "intent_protocol_unavailable",
			Self::NotConnected => "not_connected",
			Self::InvalidState => "invalid_state",
			Self::Config => "config",
		};
		f.write_str(label)
	}
}

/// User-facing grouping of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
	NoRoute,
	ExpiredQuote,
	SlippageExceeded,
	RejectedByUser,
	WalletNotConnected,
	NetworkError,
	InvalidRequest,
	Timeout,
	FailedOnChain,
}

impl fmt::Display for ErrorCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::NoRoute => "no route",
			Self::ExpiredQuote => "expired quote",
			Self::SlippageExceeded => "slippage exceeded",
			Self::RejectedByUser => "rejected by user",
			Self::WalletNotConnected => "wallet not connected",
			Self::NetworkError => "network/venue error",
			Self::InvalidRequest => "invalid request",
			Self::Timeout => "timeout",
			Self::FailedOnChain => "failed on-chain",
		};
		f.write_str(label)
	}
}

/// What a caller should do after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryAdvice {
	/// The same request may succeed if repeated.
	Retry,
	/// A fresh quote (and a fresh transaction) is required.
	Requote,
	/// Repeating the request will not help, or may duplicate a swap.
	Abort,
}

impl SwapError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::InvalidAmount(_) => ErrorKind::InvalidAmount,
			Self::QuoteUnavailable { .. } => ErrorKind::QuoteUnavailable,
			Self::QuoteExpired { .. } => ErrorKind::QuoteExpired,
			Self::SlippageExceeded { .. } => ErrorKind::SlippageExceeded,
			Self::VenueUnreachable { .. } => ErrorKind::VenueUnreachable,
			Self::TransactionBuildFailed { .. } => ErrorKind::TransactionBuildFailed,
			Self::SignerUnavailable(_) => ErrorKind::SignerUnavailable,
			Self::UserRejected(_) => ErrorKind::UserRejected,
			Self::SubmissionFailed { .. } => ErrorKind::SubmissionFailed,
			Self::ConfirmationTimeout { .. } => ErrorKind::ConfirmationTimeout,
			Self::TransactionFailed { .. } => ErrorKind::TransactionFailed,
			Self::UnsupportedRoute(_) => ErrorKind::UnsupportedRoute,
			Self::IntentProtocolUnavailable(_) => ErrorKind::IntentProtocolUnavailable,
			Self::NotConnected(_) => ErrorKind::NotConnected,
			Self::InvalidState(_) => ErrorKind::InvalidState,
			Self::Config(_) => ErrorKind::Config,
		}
	}

	pub fn category(&self) -> ErrorCategory {
		match self.kind() {
			ErrorKind::QuoteUnavailable
			| ErrorKind::UnsupportedRoute
			| ErrorKind::IntentProtocolUnavailable => ErrorCategory::NoRoute,
			ErrorKind::QuoteExpired => ErrorCategory::ExpiredQuote,
			ErrorKind::SlippageExceeded => ErrorCategory::SlippageExceeded,
			ErrorKind::UserRejected => ErrorCategory::RejectedByUser,
			ErrorKind::SignerUnavailable | ErrorKind::NotConnected => {
				ErrorCategory::WalletNotConnected
			}
			ErrorKind::VenueUnreachable
			| ErrorKind::TransactionBuildFailed
			| ErrorKind::SubmissionFailed => ErrorCategory::NetworkError,
			ErrorKind::InvalidAmount | ErrorKind::InvalidState | ErrorKind::Config => {
				ErrorCategory::InvalidRequest
			}
			ErrorKind::ConfirmationTimeout => ErrorCategory::Timeout,
			ErrorKind::TransactionFailed => ErrorCategory::FailedOnChain,
		}
	}

	/// A timed-out confirmation is never retried automatically: the
	/// transaction may still land, and re-submitting risks a duplicate swap.
	pub fn retry_advice(&self) -> RetryAdvice {
		match self.kind() {
			ErrorKind::VenueUnreachable => RetryAdvice::Retry,
			ErrorKind::QuoteExpired
			| ErrorKind::SlippageExceeded
			| ErrorKind::TransactionBuildFailed
			| ErrorKind::SubmissionFailed => RetryAdvice::Requote,
			_ => RetryAdvice::Abort,
		}
	}

	/// Human-readable reason prefixed with the failure category.
	pub fn reason(&self) -> String {
		format!("{}: {}", self.category(), self)
	}
}
