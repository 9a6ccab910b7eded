//! Command handlers for the ledger CLI.
//!
//! Each handler takes an already connected [`NetworkHandle`] and returns the
//! text to print, so the binary only deals with argument parsing, logging
//! setup and exit codes.

use ledger_account::{AccountInterface, LocalAccount};
use ledger_config::{Config, ConfigError};
use ledger_delivery::{GasPriceAdvisor, NetworkHandle, TransferError, TransferSubmitter};
use ledger_types::{
	format_native_amount, to_checksum_address, wei_to_gwei_string, SecretString, TransactionReceipt,
	TransferRequest,
};
use rust_decimal::Decimal;
use thiserror::Error;

/// Places shown when printing native amounts.
pub const DISPLAY_DECIMALS: usize = 8;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum ServiceError {
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Transfer(#[from] TransferError),
	/// A required value was given neither on the command line nor in `[wallet]`.
	#[error("Missing {0}: pass it on the command line or set it in [wallet]")]
	MissingInput(&'static str),
}

impl ServiceError {
	/// Hint printed alongside the error, if any.
	pub fn hint(&self) -> Option<String> {
		match self {
			ServiceError::Transfer(TransferError::Timeout { hash, .. }) => Some(format!(
				"Transaction {} may still confirm; check it on a block explorer",
				hash
			)),
			ServiceError::Transfer(TransferError::BroadcastUnconfirmed { hash, .. }) => Some(format!(
				"Transaction {} may have reached the node; check it before sending again",
				hash
			)),
			ServiceError::Transfer(TransferError::OnChainRejection { receipt }) => {
				Some(format!("Transaction hash: {}", receipt.hash))
			},
			ServiceError::Transfer(TransferError::InsufficientFunds { .. }) => {
				Some("Fund the sender from a faucet and try again".to_string())
			},
			_ => None,
		}
	}
}

pub fn status(handle: &NetworkHandle, config: &Config) -> String {
	let mut out = format!(
		"Connected to {}\nChain id: {}",
		handle.endpoint(),
		handle.chain_id()
	);
	if handle.chain_id() != config.network.expected_chain_id {
		out.push_str(&format!(
			" (expected {})",
			config.network.expected_chain_id
		));
	}
	out
}

pub async fn balance(
	handle: &NetworkHandle,
	config: &Config,
	address: Option<String>,
) -> Result<String, ServiceError> {
	let address = match address {
		Some(address) => address,
		None => sender_address(config)?,
	};

	let (address, wei) = handle.balance_wei(&address).await?;
	Ok(format!(
		"Balance of {}: {} {}",
		to_checksum_address(&address),
		format_native_amount(wei, DISPLAY_DECIMALS),
		handle.native_symbol()
	))
}

pub async fn gas_price(handle: &NetworkHandle, config: &Config) -> Result<String, ServiceError> {
	let advisor = GasPriceAdvisor::new(config.gas.min_gas_price_gwei);
	let quote = advisor.quote_gas_price(handle).await?;

	let mut out = format!(
		"Network gas price: {} Gwei\nUsing: {} Gwei",
		wei_to_gwei_string(quote.network_price),
		wei_to_gwei_string(quote.price)
	);
	if quote.floor_applied() {
		out.push_str(&format!(
			" (floor {} Gwei)",
			config.gas.min_gas_price_gwei
		));
	}
	Ok(out)
}

/// Sends `amount` of the native unit and waits for the receipt.
///
/// `to` and `from` fall back to `[wallet]`; when neither names a sender, the
/// address controlled by the configured key is used.
pub async fn send(
	handle: &NetworkHandle,
	config: &Config,
	amount: Decimal,
	to: Option<String>,
	from: Option<String>,
) -> Result<TransactionReceipt, ServiceError> {
	let wallet = config.wallet.as_ref();
	let private_key = private_key(config)?;

	let to = to
		.or_else(|| wallet.and_then(|w| w.to_address.clone()))
		.ok_or(ServiceError::MissingInput("recipient address"))?;
	let from = match from {
		Some(from) => from,
		None => sender_address(config)?,
	};

	tracing::info!(
		from = %from,
		to = %to,
		amount = %amount,
		symbol = %handle.native_symbol(),
		"Sending transfer"
	);

	let submitter = TransferSubmitter::new(
		GasPriceAdvisor::new(config.gas.min_gas_price_gwei),
		config.transfer.receipt_timeout(),
		config.transfer.receipt_poll_interval(),
	);
	let request = TransferRequest::new(from, to, private_key.clone(), amount);

	Ok(submitter.submit_transfer(handle, &request).await?)
}

pub fn format_receipt(receipt: &TransactionReceipt) -> String {
	format!(
		"Transaction confirmed\nHash: {}\nBlock: {}\nGas used: {}",
		receipt.hash, receipt.block_number, receipt.gas_used
	)
}

fn private_key(config: &Config) -> Result<&SecretString, ServiceError> {
	config
		.wallet
		.as_ref()
		.and_then(|w| w.private_key.as_ref())
		.ok_or(ServiceError::MissingInput("private key"))
}

/// Configured sender, or the address of the configured key.
fn sender_address(config: &Config) -> Result<String, ServiceError> {
	if let Some(from) = config.wallet.as_ref().and_then(|w| w.from_address.clone()) {
		return Ok(from);
	}

	let key = private_key(config).map_err(|_| ServiceError::MissingInput("address"))?;
	let account = LocalAccount::from_secret(key)
		.map_err(|e| TransferError::InvalidCredentials(e.to_string()))?;
	Ok(to_checksum_address(&account.address()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use ledger_config::WalletConfig;
	use ledger_delivery::connect_with_ledger;
	use ledger_delivery::implementations::memory::{InMemoryLedger, ReceiptBehavior};
	use ledger_types::{gwei_to_wei, native_to_wei, normalize_address};
	use std::str::FromStr;
	use std::sync::Arc;

	const SENDER_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
	const RECIPIENT: &str = "xdc70997970c51812dc3a010c7d01b50e0d17dc79c8";

	fn dec(value: &str) -> Decimal {
		Decimal::from_str(value).unwrap()
	}

	fn config_with_wallet(from: Option<&str>) -> Config {
		let mut config = Config::for_endpoint("http://memory.local", 51);
		config.wallet = Some(WalletConfig {
			private_key: Some(SecretString::from(SENDER_KEY)),
			from_address: from.map(str::to_string),
			to_address: Some(RECIPIENT.to_string()),
		});
		config
	}

	async fn funded(balance: &str) -> (Arc<InMemoryLedger>, NetworkHandle) {
		let ledger = Arc::new(InMemoryLedger::new(51));
		ledger.set_gas_price(gwei_to_wei(10));
		ledger.set_balance(
			normalize_address(SENDER).unwrap(),
			native_to_wei(dec(balance)).unwrap(),
		);
		let config = Config::for_endpoint("http://memory.local", 51);
		let handle = connect_with_ledger(&config.network, ledger.clone())
			.await
			.unwrap();
		(ledger, handle)
	}

	#[tokio::test]
	async fn test_status_notes_unexpected_chain() {
		let (_, handle) = funded("0").await;
		let config = Config::for_endpoint("http://memory.local", 50);

		let out = status(&handle, &config);
		assert!(out.contains("Chain id: 51 (expected 50)"));
	}

	#[tokio::test]
	async fn test_balance_truncates_to_eight_places() {
		let (_, handle) = funded("12.123456789").await;
		let config = config_with_wallet(None);

		let out = balance(&handle, &config, Some(SENDER.to_string()))
			.await
			.unwrap();
		assert_eq!(out, format!("Balance of {}: 12.12345678 XDC", SENDER));
	}

	#[tokio::test]
	async fn test_balance_prints_checksummed_address() {
		let (_, handle) = funded("1").await;
		let config = config_with_wallet(None);
		let xdc_lower = format!("xdc{}", SENDER[2..].to_lowercase());

		let out = balance(&handle, &config, Some(xdc_lower)).await.unwrap();
		assert_eq!(out, format!("Balance of {}: 1.00000000 XDC", SENDER));
	}

	#[tokio::test]
	async fn test_balance_defaults_to_key_address() {
		let (_, handle) = funded("1").await;
		let config = config_with_wallet(None);

		let out = balance(&handle, &config, None).await.unwrap();
		assert!(out.starts_with(&format!("Balance of {}", SENDER)));
	}

	#[tokio::test]
	async fn test_gas_price_reports_floor() {
		let (_, handle) = funded("0").await;
		let config = config_with_wallet(None);

		let out = gas_price(&handle, &config).await.unwrap();
		assert!(out.contains("Network gas price: 10 Gwei"));
		assert!(out.contains("Using: 250 Gwei (floor 250 Gwei)"));
	}

	#[tokio::test]
	async fn test_send_uses_wallet_defaults() {
		let (ledger, handle) = funded("100").await;
		let config = config_with_wallet(Some(SENDER));

		let receipt = send(&handle, &config, dec("90"), None, None).await.unwrap();

		assert!(receipt.success);
		assert_eq!(ledger.broadcast_count(), 1);
		assert!(format_receipt(&receipt).contains(&receipt.hash.to_string()));
	}

	#[tokio::test]
	async fn test_send_without_key_fails_before_network() {
		let (ledger, handle) = funded("100").await;
		let config = Config::for_endpoint("http://memory.local", 51);

		let result = send(&handle, &config, dec("1"), Some(RECIPIENT.into()), None).await;
		assert!(matches!(result, Err(ServiceError::MissingInput("private key"))));
		assert_eq!(ledger.broadcast_count(), 0);
	}

	#[tokio::test]
	async fn test_send_insufficient_funds_has_hint() {
		let (ledger, handle) = funded("50").await;
		let config = config_with_wallet(None);

		let err = send(&handle, &config, dec("90"), None, None)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			ServiceError::Transfer(TransferError::InsufficientFunds { .. })
		));
		assert!(err.hint().is_some());
		assert_eq!(ledger.broadcast_count(), 0);
	}

	#[tokio::test]
	async fn test_reverted_send_hint_carries_hash() {
		let (ledger, handle) = funded("100").await;
		ledger.set_receipt_behavior(ReceiptBehavior::Reverted);
		let config = config_with_wallet(None);

		let err = send(&handle, &config, dec("1"), None, None)
			.await
			.unwrap_err();
		let hint = err.hint().unwrap();
		assert!(hint.starts_with("Transaction hash: 0x"));
	}
}
