use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use swap_config::{ConfigLoader, LoggingConfig, SwapConfig};
use swap_core::{OrchestratorBuilder, SwapOrchestrator};
use swap_types::ChainKey;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = load_config(cli.config.as_deref()).await?;
	setup_tracing(&config.logging, cli.log_level.as_deref())?;

	match cli.command {
		Commands::Quote(args) => {
			let orchestrator = build_orchestrator(config)?;
			let quote = orchestrator
				.quote(&args.chain(), &args.request())
				.await
				.context("Failed to fetch quote")?;
			print_json(&quote)
		}
		Commands::Plan(args) => {
			let orchestrator = build_orchestrator(config)?;
			let plan = orchestrator
				.plan_execution(&args.intent())
				.await
				.context("Failed to plan swap")?;
			print_json(&plan)
		}
		Commands::Tokens { chain } => {
			let orchestrator = build_orchestrator(config)?;
			let tokens = orchestrator
				.list_tokens(&ChainKey::new(chain))
				.await
				.context("Failed to list tokens")?;
			print_json(&tokens)
		}
		Commands::Validate => validate_config(config),
	}
}

async fn load_config(path: Option<&Path>) -> Result<SwapConfig> {
	let mut loader = ConfigLoader::new();
	if let Some(path) = path {
		loader = loader.with_file(path);
	}
	loader.load().await.context("Failed to load configuration")
}

fn build_orchestrator(config: SwapConfig) -> Result<SwapOrchestrator> {
	OrchestratorBuilder::from_config(config)
		.and_then(OrchestratorBuilder::build)
		.context("Failed to build orchestrator")
}

#[derive(Serialize)]
struct ValidationReport {
	valid: bool,
	network: String,
	chains: Vec<ChainKey>,
	intents_enabled: bool,
	confirmation_timeout_ms: u64,
}

fn validate_config(config: SwapConfig) -> Result<()> {
	let report = ValidationReport {
		valid: true,
		network: config.network.network_id.clone(),
		intents_enabled: config.intents.enabled,
		confirmation_timeout_ms: config.execution.confirmation_timeout_ms,
		chains: Vec::new(),
	};
	let orchestrator = build_orchestrator(config)?;
	let report = ValidationReport {
		chains: orchestrator.chains(),
		..report
	};
	info!(chains = report.chains.len(), "Configuration is valid");
	print_json(&report)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	let rendered = serde_json::to_string_pretty(value).context("Failed to encode output")?;
	println!("{}", rendered);
	Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn setup_tracing(logging: &LoggingConfig, level_override: Option<&str>) -> Result<()> {
	let level = level_override.unwrap_or(&logging.level);
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

	let registry = tracing_subscriber::registry().with(env_filter);
	let initialized = if logging.format.eq_ignore_ascii_case("json") {
		registry
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			)
			.try_init()
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.try_init()
	};
	initialized.context("Failed to initialize tracing")
}
