//! Configuration loading from files and environment.

use crate::types::*;
use crate::ConfigError;
use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};
use swap_types::ChainKey;
use tracing::{debug, info};

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "SWAP_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Loads the file (or defaults when none was given), applies environment
	/// overrides and validates the result.
	pub async fn load(&self) -> Result<SwapConfig, ConfigError> {
		let mut config = match &self.file_path {
			Some(path) => self.load_from_file(path).await?,
			None => {
				debug!("No configuration file given, using defaults");
				SwapConfig::default()
			}
		};

		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, path: &Path) -> Result<SwapConfig, ConfigError> {
		info!("Loading configuration from {:?}", path);

		if !path.exists() {
			return Err(ConfigError::FileNotFound(path.display().to_string()));
		}
		let content = tokio::fs::read_to_string(path).await?;
		let content = substitute_env_vars(&content)?;

		match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => from_toml(&content),
			Some("json") => from_json(&content),
			Some("yaml") | Some("yml") => from_yaml(&content),
			_ => Err(ConfigError::ParseError(format!(
				"Unsupported config format: {:?}",
				path
			))),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		env::var(format!("{}{}", self.env_prefix, name))
			.ok()
			.filter(|v| !v.is_empty())
	}

	fn apply_env_overrides(&self, config: &mut SwapConfig) -> Result<(), ConfigError> {
		if let Some(level) = self.var("LOG_LEVEL") {
			config.logging.level = level;
		}

		// NEAR network
		if let Some(network_id) = self.var("NEAR_NETWORK") {
			config.network.network_id = network_id;
		}
		if let Some(node_url) = self.var("NEAR_NODE_URL") {
			config.network.node_url = node_url;
		}
		if let Some(wallet_url) = self.var("NEAR_WALLET_URL") {
			config.network.wallet_url = wallet_url;
		}
		if let Some(helper_url) = self.var("NEAR_HELPER_URL") {
			config.network.helper_url = helper_url;
		}
		if let Some(contract_id) = self.var("NEAR_INTENTS_CONTRACT") {
			debug!("Overriding intents contract from environment");
			config.network.contract_id = contract_id;
		}
		if let Some(enabled) = self.var("INTENTS_ENABLED") {
			config.intents.enabled = enabled.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid INTENTS_ENABLED: {}", e))
			})?;
		}

		// Venues
		if let Some(rpc_url) = self.var("SOLANA_RPC_URL") {
			config.solana.rpc_url = rpc_url;
		}
		if let Some(url) = self.var("JUPITER_API_URL") {
			config.solana.jupiter_api_url = url;
		}
		if let Some(fee) = self.var("PRIORITY_FEE") {
			config.solana.priority_fee_micro_lamports = Some(fee.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid priority fee: {}", e))
			})?);
		}
		if let Some(url) = self.var("ONEINCH_API_URL") {
			config.evm.oneinch_api_url = url;
		}
		if let Some(key) = self.var("ONEINCH_API_KEY") {
			debug!("Overriding 1inch API key from environment");
			config.evm.api_key = Some(key);
		}

		// Per-chain RPC URLs, e.g. SWAP_RPC_URL_POLYGON
		let rpc_prefix = format!("{}RPC_URL_", self.env_prefix);
		for (name, url) in env::vars() {
			if let Some(chain) = name.strip_prefix(&rpc_prefix) {
				let chain = ChainKey::new(chain);
				if let Some(chain_config) = config.evm.chains.get_mut(&chain) {
					debug!("Overriding RPC URL for {} from environment", chain);
					chain_config.rpc_url = url;
				}
			}
		}

		Ok(())
	}
}

fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;
	let mut result = content.to_string();

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let value =
			env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
		result = result.replace(full_match, &value);
	}

	Ok(result)
}

/// Load from TOML string
pub fn from_toml(contents: &str) -> Result<SwapConfig, ConfigError> {
	toml::from_str(contents).map_err(|e| ConfigError::ParseError(format!("TOML: {}", e)))
}

/// Load from JSON string
pub fn from_json(contents: &str) -> Result<SwapConfig, ConfigError> {
	serde_json::from_str(contents).map_err(|e| ConfigError::ParseError(format!("JSON: {}", e)))
}

/// Load from YAML string
pub fn from_yaml(contents: &str) -> Result<SwapConfig, ConfigError> {
	serde_yaml::from_str(contents).map_err(|e| ConfigError::ParseError(format!("YAML: {}", e)))
}

pub fn validate_config(config: &SwapConfig) -> Result<(), ConfigError> {
	let urls = [
		("network.node_url", &config.network.node_url),
		("solana.rpc_url", &config.solana.rpc_url),
		("solana.jupiter_api_url", &config.solana.jupiter_api_url),
		("evm.oneinch_api_url", &config.evm.oneinch_api_url),
	];
	for (field, url) in urls {
		if !url.starts_with("http://") && !url.starts_with("https://") {
			return Err(ConfigError::ValidationError(format!(
				"{} must be an http(s) URL, got '{}'",
				field, url
			)));
		}
	}

	for (chain, chain_config) in &config.evm.chains {
		if chain_config.chain_id == 0 {
			return Err(ConfigError::ValidationError(format!(
				"Chain {} has no chain_id",
				chain
			)));
		}
	}

	if config.network.contract_id.trim().is_empty() {
		return Err(ConfigError::ValidationError(
			"network.contract_id must not be empty".to_string(),
		));
	}

	if !matches!(
		config.solana.commitment.as_str(),
		"processed" | "confirmed" | "finalized"
	) {
		return Err(ConfigError::ValidationError(format!(
			"Unknown Solana commitment '{}'",
			config.solana.commitment
		)));
	}

	let ttls = [
		("solana.quote_ttl_secs", config.solana.quote_ttl_secs),
		("evm.quote_ttl_secs", config.evm.quote_ttl_secs),
	];
	for (field, ttl) in ttls {
		if ttl == 0 || ttl > MAX_QUOTE_TTL_SECS {
			return Err(ConfigError::ValidationError(format!(
				"{} must be between 1 and {} seconds, got {}",
				field, MAX_QUOTE_TTL_SECS, ttl
			)));
		}
	}

	if config.execution.poll_interval_ms == 0 {
		return Err(ConfigError::ValidationError(
			"execution.poll_interval_ms must be greater than zero".to_string(),
		));
	}
	if config.execution.poll_interval_ms > config.execution.confirmation_timeout_ms {
		return Err(ConfigError::ValidationError(
			"execution.poll_interval_ms exceeds the confirmation timeout".to_string(),
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_default_config() {
		let config = SwapConfig::default();
		assert_eq!(config.network.network_id, "testnet");
		assert_eq!(config.network.contract_id, "intents.testnet");
		assert_eq!(config.solana.commitment, "confirmed");
		assert_eq!(config.evm.chains[&ChainKey::ethereum()].chain_id, 1);
		assert!(!config.intents.enabled);
		assert!(validate_config(&config).is_ok());
	}

	#[test]
	fn test_toml_parsing() {
		let toml = r#"
[network]
network_id = "mainnet"
node_url = "https://rpc.mainnet.near.org"
wallet_url = "https://app.mynearwallet.com"
helper_url = "https://helper.mainnet.near.org"
explorer_url = "https://nearblocks.io"
contract_id = "intents.near"

[solana]
rpc_url = "https://solana.example.com"
priority_fee_micro_lamports = 5000

[evm]
api_key = "test_key"

[evm.chains.ethereum]
chain_id = 1
rpc_url = "https://eth.example.com"
confirmations = 3

[evm.chains.Arbitrum]
chain_id = 42161
rpc_url = "https://arb.example.com"

[intents]
enabled = true
"#;

		let config = from_toml(toml).unwrap();
		assert_eq!(config.network.contract_id, "intents.near");
		assert_eq!(config.solana.priority_fee_micro_lamports, Some(5000));
		// Unset fields keep their defaults
		assert_eq!(config.solana.jupiter_api_url, "https://quote-api.jup.ag/v6");
		assert_eq!(config.evm.chains.len(), 2);
		assert_eq!(config.evm.chains[&ChainKey::new("arbitrum")].confirmations, 1);
		assert_eq!(config.evm.api_key.as_deref(), Some("test_key"));
		assert!(config.intents.enabled);
		assert_eq!(config.intents.gas, 300_000_000_000_000);
	}

	#[test]
	fn test_json_and_yaml_parsing() {
		let json = r#"{"execution": {"confirmation_timeout_ms": 5000, "poll_interval_ms": 250}}"#;
		let config = from_json(json).unwrap();
		assert_eq!(config.execution.confirmation_timeout_ms, 5000);
		assert_eq!(config.execution.max_retries, 2);

		let yaml = "logging:\n  level: debug\n  format: json\n";
		let config = from_yaml(yaml).unwrap();
		assert_eq!(config.logging.level, "debug");
		assert_eq!(config.logging.format, "json");
	}

	#[test]
	fn test_chain_family() {
		let config = SwapConfig::default();
		assert_eq!(
			config.chain_family(&ChainKey::solana()),
			Some(swap_types::ChainFamily::Solana)
		);
		assert_eq!(
			config.chain_family(&ChainKey::new("polygon")),
			Some(swap_types::ChainFamily::Evm)
		);
		assert_eq!(config.chain_family(&ChainKey::new("zcash")), None);
	}

	#[test]
	fn test_validation_rejects_bad_values() {
		let mut config = SwapConfig::default();
		config.solana.commitment = "eventually".to_string();
		let err = validate_config(&config).unwrap_err();
		assert!(err.to_string().contains("commitment"));

		let mut config = SwapConfig::default();
		config.execution.poll_interval_ms = 0;
		assert!(validate_config(&config).is_err());

		let mut config = SwapConfig::default();
		config.network.node_url = "rpc.testnet.near.org".to_string();
		assert!(validate_config(&config).is_err());
	}

	#[test]
	fn test_validation_bounds_quote_ttl() {
		let mut config = SwapConfig::default();
		config.solana.quote_ttl_secs = 100_000_000_000_000_000;
		let err = validate_config(&config).unwrap_err();
		assert!(err.to_string().contains("solana.quote_ttl_secs"));

		let mut config = SwapConfig::default();
		config.evm.quote_ttl_secs = u64::MAX;
		let err = validate_config(&config).unwrap_err();
		assert!(err.to_string().contains("evm.quote_ttl_secs"));

		let mut config = SwapConfig::default();
		config.evm.quote_ttl_secs = 0;
		assert!(validate_config(&config).is_err());

		let mut config = SwapConfig::default();
		config.solana.quote_ttl_secs = MAX_QUOTE_TTL_SECS;
		assert!(validate_config(&config).is_ok());
	}

	#[tokio::test]
	async fn test_load_file_with_substitution_and_overrides() {
		std::env::set_var("SWAPTEST_SUB_KEY", "from-env");
		std::env::set_var("SWAPTEST_NEAR_INTENTS_CONTRACT", "intents.override.testnet");
		std::env::set_var("SWAPTEST_RPC_URL_POLYGON", "https://polygon.override.example");

		let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
		writeln!(file, "[evm]\napi_key = \"${{SWAPTEST_SUB_KEY}}\"").unwrap();

		let config = ConfigLoader::new()
			.with_file(file.path())
			.with_env_prefix("SWAPTEST_")
			.load()
			.await
			.unwrap();

		assert_eq!(config.evm.api_key.as_deref(), Some("from-env"));
		assert_eq!(config.network.contract_id, "intents.override.testnet");
		assert_eq!(
			config.evm.chains[&ChainKey::new("polygon")].rpc_url,
			"https://polygon.override.example"
		);
	}

	#[tokio::test]
	async fn test_missing_variable_and_file() {
		let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
		writeln!(file, "evm:\n  api_key: ${{SWAPTEST_DEFINITELY_UNSET_VAR}}").unwrap();

		let result = ConfigLoader::new().with_file(file.path()).load().await;
		assert!(matches!(result, Err(ConfigError::EnvVarNotFound(_))));

		let result = ConfigLoader::new()
			.with_file("/nonexistent/swap.toml")
			.load()
			.await;
		assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
	}
}
