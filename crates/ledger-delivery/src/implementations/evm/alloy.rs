//! Alloy-based ledger client.
//!
//! Talks JSON-RPC over HTTP to any EVM-compatible endpoint. The client only
//! reads state and relays already-signed bytes; signing happens in the
//! account crate.

use crate::{DeliveryError, LedgerInterface};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use ledger_types::{TransactionHash, TransactionReceipt};
use std::sync::Arc;

/// Alloy-based ledger client for a single HTTP endpoint.
pub struct AlloyLedger {
	provider: Arc<dyn Provider + Send + Sync>,
	rpc_url: String,
}

impl AlloyLedger {
	/// Creates a client for the given endpoint.
	///
	/// No request is made here; reachability is checked by the first call.
	pub fn new(rpc_url: &str) -> Result<Self, DeliveryError> {
		let url = rpc_url
			.parse()
			.map_err(|e| DeliveryError::InvalidUrl(format!("{}: {}", rpc_url, e)))?;

		let provider = ProviderBuilder::new().connect_http(url);

		Ok(Self {
			provider: Arc::new(provider) as Arc<dyn Provider + Send + Sync>,
			rpc_url: rpc_url.to_string(),
		})
	}
}

impl std::fmt::Debug for AlloyLedger {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AlloyLedger")
			.field("rpc_url", &self.rpc_url)
			.finish()
	}
}

/// JSON-RPC error responses mean the node saw and refused the request;
/// anything else is a transport problem.
fn map_rpc_error(context: &str, e: RpcError<TransportErrorKind>) -> DeliveryError {
	match e.as_error_resp() {
		Some(payload) => DeliveryError::Rejected(payload.message.to_string()),
		None => DeliveryError::Network(format!("{}: {}", context, e)),
	}
}

#[async_trait]
impl LedgerInterface for AlloyLedger {
	async fn get_chain_id(&self) -> Result<u64, DeliveryError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| map_rpc_error("Failed to get chain id", e))
	}

	async fn get_gas_price(&self) -> Result<u128, DeliveryError> {
		self.provider
			.get_gas_price()
			.await
			.map_err(|e| map_rpc_error("Failed to get gas price", e))
	}

	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError> {
		self.provider
			.get_balance(address)
			.await
			.map_err(|e| map_rpc_error("Failed to get balance", e))
	}

	async fn get_nonce(&self, address: Address) -> Result<u64, DeliveryError> {
		self.provider
			.get_transaction_count(address)
			.await
			.map_err(|e| map_rpc_error("Failed to get nonce", e))
	}

	async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TransactionHash, DeliveryError> {
		let pending = self
			.provider
			.send_raw_transaction(raw)
			.await
			.map_err(|e| map_rpc_error("Failed to send transaction", e))?;

		Ok(TransactionHash::from(*pending.tx_hash()))
	}

	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		if hash.0.len() != 32 {
			return Err(DeliveryError::Network(format!(
				"Malformed transaction hash {}",
				hash
			)));
		}
		let tx_hash = B256::from_slice(&hash.0);

		let receipt = self
			.provider
			.get_transaction_receipt(tx_hash)
			.await
			.map_err(|e| map_rpc_error("Failed to get receipt", e))?;

		Ok(receipt.map(|receipt| TransactionReceipt {
			hash: TransactionHash::from(receipt.transaction_hash),
			block_number: receipt.block_number.unwrap_or(0),
			gas_used: receipt.gas_used,
			success: receipt.status(),
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_invalid_url_rejected() {
		let result = AlloyLedger::new("not a url");
		assert!(matches!(result, Err(DeliveryError::InvalidUrl(_))));
	}

	#[tokio::test]
	async fn test_client_creation_does_not_connect() {
		// Nothing listens on this port; creation must still succeed
		let ledger = AlloyLedger::new("http://127.0.0.1:1").unwrap();
		assert!(format!("{:?}", ledger).contains("http://127.0.0.1:1"));

		let result = ledger.get_chain_id().await;
		assert!(matches!(result, Err(DeliveryError::Network(_))));
	}
}
