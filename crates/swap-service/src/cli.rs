//! Command-line surface of `swapctl`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use swap_types::{ChainKey, PrivacyLevel, QuoteRequest, SwapIntent};

#[derive(Parser)]
#[command(name = "swapctl")]
#[command(about = "Quote and plan swaps across Solana, EVM chains and NEAR intents", long_about = None)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Commands,

	/// Configuration file; testnet defaults when omitted
	#[arg(short, long, value_name = "FILE", env = "SWAP_CONFIG")]
	pub config: Option<PathBuf>,

	/// Overrides `logging.level` from the configuration
	#[arg(long, env = "SWAP_LOG_LEVEL")]
	pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Fetch a quote from the venue serving a chain
	Quote(QuoteArgs),
	/// Quote and lay out the execution steps for a swap intent
	Plan(PlanArgs),
	/// List the tokens a chain's venue trades
	Tokens {
		#[arg(long)]
		chain: String,
	},
	/// Validate the configuration and the components built from it
	Validate,
}

#[derive(Args)]
pub struct QuoteArgs {
	#[arg(long)]
	pub chain: String,
	/// Input token address or mint
	#[arg(long = "in")]
	pub token_in: String,
	/// Output token address or mint
	#[arg(long = "out")]
	pub token_out: String,
	/// Amount in the input token's smallest unit
	#[arg(long)]
	pub amount: u128,
	#[arg(long, default_value_t = 50)]
	pub slippage_bps: u16,
}

impl QuoteArgs {
	pub fn chain(&self) -> ChainKey {
		ChainKey::new(self.chain.as_str())
	}

	pub fn request(&self) -> QuoteRequest {
		QuoteRequest::new(
			self.token_in.clone(),
			self.token_out.clone(),
			self.amount,
			self.slippage_bps,
		)
	}
}

#[derive(Args)]
pub struct PlanArgs {
	#[arg(long)]
	pub from_chain: String,
	/// Destination chain; same as the source when omitted
	#[arg(long)]
	pub to_chain: Option<String>,
	#[arg(long = "in")]
	pub token_in: String,
	#[arg(long = "out")]
	pub token_out: String,
	#[arg(long)]
	pub amount: u128,
	/// Least acceptable output in the output token's smallest unit
	#[arg(long, default_value_t = 0)]
	pub min_out: u128,
	#[arg(long, default_value_t = 50)]
	pub slippage_bps: u16,
	/// Request maximum privacy from the intent protocol
	#[arg(long)]
	pub private: bool,
}

impl PlanArgs {
	pub fn intent(&self) -> SwapIntent {
		let dest = self.to_chain.as_deref().unwrap_or(&self.from_chain);
		let privacy = if self.private {
			PrivacyLevel::Maximum
		} else {
			PrivacyLevel::Standard
		};
		SwapIntent::new(
			self.from_chain.as_str(),
			dest,
			self.token_in.clone(),
			self.token_out.clone(),
			self.amount,
			self.min_out,
		)
		.with_slippage_bps(self.slippage_bps)
		.with_privacy(privacy)
	}
}
