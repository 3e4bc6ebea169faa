//! Configuration for the swap orchestrator.
//!
//! Files may be TOML, JSON or YAML. `${VAR}` references are substituted from
//! the environment before parsing, and `SWAP_*` variables override individual
//! settings afterwards. Without a file the defaults target the NEAR testnet.

use thiserror::Error;

pub mod loader;
pub mod types;

pub use loader::{from_json, from_toml, from_yaml, validate_config, ConfigLoader};
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

impl From<ConfigError> for swap_types::SwapError {
	fn from(error: ConfigError) -> Self {
		swap_types::SwapError::Config(error.to_string())
	}
}
