//! Network connector and balance reader.
//!
//! `connect` resolves the endpoint's chain id once and hands back a
//! [`NetworkHandle`] that the gas advisor and transfer submitter share for
//! the rest of the process.

use crate::implementations::evm::alloy::AlloyLedger;
use crate::{LedgerInterface, TransferError};
use alloy::primitives::{Address, U256};
use ledger_types::{
	format_native_amount, normalize_address, to_checksum_address, wei_to_native, NetworkConfig,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Connection to a ledger endpoint with its resolved chain id.
#[derive(Clone)]
pub struct NetworkHandle {
	endpoint: String,
	chain_id: u64,
	native_symbol: String,
	ledger: Arc<dyn LedgerInterface>,
}

/// Connects to the endpoint named in `config` over HTTP.
///
/// Fails with `ConnectionUnavailable` when the URL is invalid or the chain id
/// cannot be read.
pub async fn connect(config: &NetworkConfig) -> Result<NetworkHandle, TransferError> {
	let ledger = AlloyLedger::new(&config.rpc_url).map_err(|e| {
		tracing::error!(rpc_url = %config.rpc_url, error = %e, "Cannot create ledger client");
		TransferError::ConnectionUnavailable(e.to_string())
	})?;

	connect_with_ledger(config, Arc::new(ledger)).await
}

/// Connects through an already constructed ledger client.
///
/// A chain id different from `config.expected_chain_id` is logged as a
/// warning, and only refused when `config.strict_chain_id` is set.
pub async fn connect_with_ledger(
	config: &NetworkConfig,
	ledger: Arc<dyn LedgerInterface>,
) -> Result<NetworkHandle, TransferError> {
	let chain_id = ledger.get_chain_id().await.map_err(|e| {
		tracing::error!(rpc_url = %config.rpc_url, error = %e, "Connection to ledger failed");
		TransferError::ConnectionUnavailable(e.to_string())
	})?;

	tracing::info!(
		rpc_url = %config.rpc_url,
		chain_id = chain_id,
		expected_chain_id = config.expected_chain_id,
		"Connected to ledger"
	);

	if chain_id != config.expected_chain_id {
		if config.strict_chain_id {
			tracing::error!(
				chain_id = chain_id,
				expected_chain_id = config.expected_chain_id,
				"Unexpected chain id, refusing connection"
			);
			return Err(TransferError::ChainMismatch {
				expected: config.expected_chain_id,
				actual: chain_id,
			});
		}
		tracing::warn!(
			chain_id = chain_id,
			expected_chain_id = config.expected_chain_id,
			"Unexpected chain id, make sure this is the intended network"
		);
	}

	Ok(NetworkHandle {
		endpoint: config.rpc_url.clone(),
		chain_id,
		native_symbol: config.native_symbol.clone(),
		ledger,
	})
}

impl NetworkHandle {
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	/// Chain id reported by the endpoint at connect time.
	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	pub fn native_symbol(&self) -> &str {
		&self.native_symbol
	}

	pub fn ledger(&self) -> &Arc<dyn LedgerInterface> {
		&self.ledger
	}

	/// Reads the balance of `address` in wei, returning the parsed address too.
	pub async fn balance_wei(&self, address: &str) -> Result<(Address, U256), TransferError> {
		let address = normalize_address(address)
			.map_err(|e| TransferError::BalanceLookupFailed(e.to_string()))?;

		let balance = self.ledger.get_balance(address).await.map_err(|e| {
			tracing::error!(
				address = %to_checksum_address(&address),
				error = %e,
				"Balance lookup failed"
			);
			TransferError::BalanceLookupFailed(e.to_string())
		})?;

		tracing::info!(
			address = %to_checksum_address(&address),
			balance = %format_native_amount(balance, 8),
			symbol = %self.native_symbol,
			"Balance"
		);

		Ok((address, balance))
	}

	/// Reads the balance of `address` in the native unit.
	///
	/// The address is accepted in `0x` or `xdc` form and checksummed before
	/// the lookup. Every failure is reported as `BalanceLookupFailed`.
	pub async fn get_balance(&self, address: &str) -> Result<Decimal, TransferError> {
		let (_, wei) = self.balance_wei(address).await?;
		wei_to_native(wei).map_err(|e| TransferError::BalanceLookupFailed(e.to_string()))
	}
}

impl std::fmt::Debug for NetworkHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NetworkHandle")
			.field("endpoint", &self.endpoint)
			.field("chain_id", &self.chain_id)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::implementations::memory::InMemoryLedger;
	use std::str::FromStr;
	use tracing_test::traced_test;

	const ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

	fn config(expected_chain_id: u64) -> NetworkConfig {
		NetworkConfig::new("http://memory.local", expected_chain_id)
	}

	#[tokio::test]
	async fn test_connect_resolves_chain_id() {
		let ledger = Arc::new(InMemoryLedger::new(51));
		let handle = connect_with_ledger(&config(51), ledger).await.unwrap();

		assert_eq!(handle.chain_id(), 51);
		assert_eq!(handle.endpoint(), "http://memory.local");
		assert_eq!(handle.native_symbol(), "XDC");
	}

	#[tokio::test]
	#[traced_test]
	async fn test_chain_mismatch_is_only_a_warning() {
		let ledger = Arc::new(InMemoryLedger::new(50));
		let handle = connect_with_ledger(&config(51), ledger).await.unwrap();

		assert_eq!(handle.chain_id(), 50);
		assert!(logs_contain("WARN"));
		assert!(logs_contain("Unexpected chain id, make sure this is the intended network"));
		assert!(logs_contain("expected_chain_id=51"));
	}

	#[tokio::test]
	#[traced_test]
	async fn test_matching_chain_logs_no_warning() {
		let ledger = Arc::new(InMemoryLedger::new(51));
		connect_with_ledger(&config(51), ledger).await.unwrap();

		assert!(logs_contain("Connected to ledger"));
		assert!(!logs_contain("Unexpected chain id"));
	}

	#[tokio::test]
	async fn test_chain_mismatch_refused_when_strict() {
		let ledger = Arc::new(InMemoryLedger::new(50));
		let mut config = config(51);
		config.strict_chain_id = true;

		let result = connect_with_ledger(&config, ledger).await;
		assert!(matches!(
			result,
			Err(TransferError::ChainMismatch {
				expected: 51,
				actual: 50
			})
		));
	}

	#[tokio::test]
	async fn test_unreachable_endpoint() {
		let ledger = Arc::new(InMemoryLedger::new(51));
		ledger.set_unreachable(true);

		let result = connect_with_ledger(&config(51), ledger).await;
		assert!(matches!(result, Err(TransferError::ConnectionUnavailable(_))));
	}

	#[tokio::test]
	async fn test_connect_with_invalid_url() {
		let result = connect(&NetworkConfig::new("::not-a-url::", 51)).await;
		assert!(matches!(result, Err(TransferError::ConnectionUnavailable(_))));
	}

	#[tokio::test]
	async fn test_balance_in_native_unit() {
		let ledger = Arc::new(InMemoryLedger::new(51));
		let address = normalize_address(ADDRESS).unwrap();
		ledger.set_balance(address, U256::from(100_500_000_000_000_000_000u128));

		let handle = connect_with_ledger(&config(51), ledger).await.unwrap();

		// Lowercase and xdc-prefixed forms resolve to the same account
		let lower = handle.get_balance(&ADDRESS.to_lowercase()).await.unwrap();
		let xdc = handle
			.get_balance(&format!("xdc{}", &ADDRESS[2..]))
			.await
			.unwrap();

		assert_eq!(lower, Decimal::from_str("100.5").unwrap());
		assert_eq!(xdc, lower);
	}

	#[tokio::test]
	async fn test_balance_failures() {
		let ledger = Arc::new(InMemoryLedger::new(51));
		let handle = connect_with_ledger(&config(51), ledger.clone()).await.unwrap();

		let bad_address = handle.get_balance("xdc-not-an-address").await;
		assert!(matches!(bad_address, Err(TransferError::BalanceLookupFailed(_))));

		ledger.set_balance_failure(true);
		let backend_down = handle.get_balance(ADDRESS).await;
		assert!(matches!(backend_down, Err(TransferError::BalanceLookupFailed(_))));
	}
}
