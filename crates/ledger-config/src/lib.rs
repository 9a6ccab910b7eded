//! Configuration module for the ledger transfer system.
//!
//! This module provides structures and utilities for managing the transfer
//! configuration. It loads TOML files, substitutes `${VAR}` and
//! `${VAR:-default}` references from the environment so that signing keys can
//! stay out of the file, and validates the result before anything connects.

use ledger_types::{NetworkConfig, SecretString, DEFAULT_MIN_GAS_PRICE_GWEI};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Ledger endpoint and chain id expectations.
	pub network: NetworkConfig,
	/// Gas pricing policy.
	#[serde(default)]
	pub gas: GasConfig,
	/// Receipt polling policy.
	#[serde(default)]
	pub transfer: TransferConfig,
	/// Default wallet used by the CLI.
	pub wallet: Option<WalletConfig>,
}

/// Gas pricing policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GasConfig {
	/// Minimum gas price in Gwei. The quoted price never goes below it.
	#[serde(default = "default_min_gas_price_gwei")]
	pub min_gas_price_gwei: u64,
}

impl Default for GasConfig {
	fn default() -> Self {
		Self {
			min_gas_price_gwei: default_min_gas_price_gwei(),
		}
	}
}

fn default_min_gas_price_gwei() -> u64 {
	DEFAULT_MIN_GAS_PRICE_GWEI
}

/// Receipt polling policy for submitted transfers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransferConfig {
	/// How long to wait for a receipt before reporting a timeout.
	/// Defaults to 60 seconds.
	#[serde(default = "default_receipt_timeout_seconds")]
	pub receipt_timeout_seconds: u64,
	/// Delay between receipt lookups. Defaults to 1000 ms.
	#[serde(default = "default_receipt_poll_interval_ms")]
	pub receipt_poll_interval_ms: u64,
}

impl TransferConfig {
	pub fn receipt_timeout(&self) -> Duration {
		Duration::from_secs(self.receipt_timeout_seconds)
	}

	pub fn receipt_poll_interval(&self) -> Duration {
		Duration::from_millis(self.receipt_poll_interval_ms)
	}
}

impl Default for TransferConfig {
	fn default() -> Self {
		Self {
			receipt_timeout_seconds: default_receipt_timeout_seconds(),
			receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
		}
	}
}

fn default_receipt_timeout_seconds() -> u64 {
	60
}

fn default_receipt_poll_interval_ms() -> u64 {
	1000
}

/// Wallet defaults for the CLI. Every field can be overridden per command.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WalletConfig {
	/// Signing key; usually `${XDC_PRIVATE_KEY}`.
	pub private_key: Option<SecretString>,
	/// Sender address.
	pub from_address: Option<String>,
	/// Default recipient address.
	pub to_address: Option<String>,
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Validates the configuration.
	///
	/// - The RPC URL must be an http(s) URL
	/// - The receipt timeout must be between 1 second and 1 hour
	/// - The poll interval must be positive and shorter than the timeout
	/// - Wallet keys, when present, must not be empty
	fn validate(&self) -> Result<(), ConfigError> {
		let rpc_url = self.network.rpc_url.trim();
		if rpc_url.is_empty() {
			return Err(ConfigError::Validation(
				"network.rpc_url cannot be empty".into(),
			));
		}
		if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
			return Err(ConfigError::Validation(format!(
				"network.rpc_url must be an http(s) URL, got '{}'",
				rpc_url
			)));
		}

		if self.transfer.receipt_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"transfer.receipt_timeout_seconds must be at least 1".into(),
			));
		}
		if self.transfer.receipt_timeout_seconds > 3600 {
			return Err(ConfigError::Validation(
				"transfer.receipt_timeout_seconds cannot exceed 3600 (1 hour)".into(),
			));
		}
		if self.transfer.receipt_poll_interval_ms == 0 {
			return Err(ConfigError::Validation(
				"transfer.receipt_poll_interval_ms must be greater than 0".into(),
			));
		}
		if self.transfer.receipt_poll_interval() >= self.transfer.receipt_timeout() {
			return Err(ConfigError::Validation(
				"transfer.receipt_poll_interval_ms must be shorter than the receipt timeout".into(),
			));
		}

		if let Some(wallet) = &self.wallet {
			if wallet.private_key.as_ref().is_some_and(|k| k.is_empty()) {
				return Err(ConfigError::Validation(
					"wallet.private_key is set but empty".into(),
				));
			}
		}

		Ok(())
	}
}

/// Parses a configuration from a TOML string, resolving environment
/// variables and validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

/// Builds configurations in tests without going through TOML.
#[cfg(feature = "testing")]
impl Config {
	pub fn for_endpoint(rpc_url: &str, expected_chain_id: u64) -> Self {
		Self {
			network: NetworkConfig::new(rpc_url, expected_chain_id),
			gas: GasConfig::default(),
			transfer: TransferConfig::default(),
			wallet: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const MINIMAL: &str = r#"
[network]
rpc_url = "https://erpc.apothem.network"
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("LEDGER_TEST_HOST", "localhost");
		std::env::set_var("LEDGER_TEST_PORT", "8545");

		let input = "rpc_url = \"http://${LEDGER_TEST_HOST}:${LEDGER_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "rpc_url = \"http://localhost:8545\"");

		std::env::remove_var("LEDGER_TEST_HOST");
		std::env::remove_var("LEDGER_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${LEDGER_MISSING_VAR:-fallback}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${LEDGER_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("LEDGER_MISSING_VAR"));
	}

	#[test]
	fn test_defaults_applied() {
		let config: Config = MINIMAL.parse().unwrap();

		assert_eq!(config.network.expected_chain_id, 51);
		assert!(!config.network.strict_chain_id);
		assert_eq!(config.network.native_symbol, "XDC");
		assert_eq!(config.gas.min_gas_price_gwei, 250);
		assert_eq!(config.transfer.receipt_timeout(), Duration::from_secs(60));
		assert_eq!(
			config.transfer.receipt_poll_interval(),
			Duration::from_millis(1000)
		);
		assert!(config.wallet.is_none());
	}

	#[test]
	fn test_wallet_key_from_environment() {
		std::env::set_var(
			"LEDGER_TEST_PRIVATE_KEY",
			"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
		);

		let config: Config = r#"
[network]
rpc_url = "http://localhost:8545"
expected_chain_id = 31337
strict_chain_id = true
native_symbol = "ETH"

[gas]
min_gas_price_gwei = 1

[transfer]
receipt_timeout_seconds = 30
receipt_poll_interval_ms = 250

[wallet]
private_key = "${LEDGER_TEST_PRIVATE_KEY}"
from_address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
"#
		.parse()
		.unwrap();

		std::env::remove_var("LEDGER_TEST_PRIVATE_KEY");

		assert_eq!(config.network.expected_chain_id, 31337);
		assert!(config.network.strict_chain_id);
		assert_eq!(config.gas.min_gas_price_gwei, 1);
		let wallet = config.wallet.unwrap();
		assert!(wallet.private_key.unwrap().with_exposed(|k| k.starts_with("0xac09")));
		assert!(wallet.to_address.is_none());
	}

	#[test]
	fn test_validation_errors() {
		let cases = [
			("[network]\nrpc_url = \"\"", "cannot be empty"),
			("[network]\nrpc_url = \"ws://localhost:8546\"", "http(s)"),
			(
				"[network]\nrpc_url = \"http://x\"\n[transfer]\nreceipt_timeout_seconds = 0",
				"at least 1",
			),
			(
				"[network]\nrpc_url = \"http://x\"\n[transfer]\nreceipt_timeout_seconds = 7200",
				"cannot exceed 3600",
			),
			(
				"[network]\nrpc_url = \"http://x\"\n[transfer]\nreceipt_poll_interval_ms = 0",
				"greater than 0",
			),
			(
				"[network]\nrpc_url = \"http://x\"\n[transfer]\nreceipt_timeout_seconds = 1\nreceipt_poll_interval_ms = 5000",
				"shorter than",
			),
			(
				"[network]\nrpc_url = \"http://x\"\n[wallet]\nprivate_key = \"  \"",
				"empty",
			),
		];

		for (input, expected) in cases {
			let err = input.parse::<Config>().unwrap_err();
			assert!(
				matches!(err, ConfigError::Validation(_)),
				"expected validation error for {input:?}, got {err}"
			);
			assert!(err.to_string().contains(expected), "{err}");
		}
	}

	#[test]
	fn test_missing_network_section() {
		let err = "[gas]\nmin_gas_price_gwei = 1".parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}

	#[tokio::test]
	async fn test_from_file() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("ledger.toml");
		fs::write(&config_path, MINIMAL).unwrap();

		let config = Config::from_file(&config_path).await.unwrap();
		assert_eq!(config.network.rpc_url, "https://erpc.apothem.network");
	}

	#[tokio::test]
	async fn test_from_missing_file() {
		let temp_dir = TempDir::new().unwrap();
		let result = Config::from_file(temp_dir.path().join("absent.toml")).await;
		assert!(matches!(result, Err(ConfigError::Io(_))));
	}
}
