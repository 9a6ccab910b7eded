//! Transaction delivery module for the ledger transfer system.
//!
//! This module handles everything between a transfer request and its
//! receipt: connecting to the ledger, reading balances, quoting a floored
//! gas price, preflighting funds, signing, broadcasting and polling for
//! confirmation. Every step runs sequentially; nothing is retried.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use ledger_types::{format_token_amount, TransactionHash, TransactionReceipt, NATIVE_DECIMALS};
use std::time::Duration;
use thiserror::Error;

pub mod connector;
pub mod gas;
pub mod submitter;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
	#[cfg(any(test, feature = "testing"))]
	pub mod memory;
}

pub use connector::{connect, connect_with_ledger, NetworkHandle};
pub use gas::GasPriceAdvisor;
pub use submitter::TransferSubmitter;

/// Errors raised by a ledger client.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// The endpoint could not be reached or returned a transport error.
	#[error("Network error: {0}")]
	Network(String),
	/// The node answered with a JSON-RPC error.
	#[error("Rejected by node: {0}")]
	Rejected(String),
	/// The endpoint URL could not be parsed.
	#[error("Invalid RPC URL: {0}")]
	InvalidUrl(String),
}

/// Terminal outcome of a failed connect, balance read, quote or transfer.
///
/// Local failures (`is_preflight() == true`) are reported before anything is
/// broadcast. The remaining variants happen during or after the broadcast;
/// the ones that happen after it carry the transaction hash, which stays
/// queryable on the ledger after the call returns.
#[derive(Debug, Error)]
pub enum TransferError {
	/// The ledger could not be reached.
	#[error("Connection unavailable: {0}")]
	ConnectionUnavailable(String),
	/// The endpoint reports an unexpected chain id and strict checking is on.
	#[error("Chain id mismatch: expected {expected}, endpoint reports {actual}")]
	ChainMismatch { expected: u64, actual: u64 },
	/// An address or amount in the request cannot be used.
	#[error("Invalid transfer request: {0}")]
	InvalidRequest(String),
	/// The sender balance could not be read.
	#[error("Balance lookup failed: {0}")]
	BalanceLookupFailed(String),
	/// Balance is below amount plus maximum fee.
	#[error(
		"Insufficient funds: required {}, available {}",
		native(.required),
		native(.available)
	)]
	InsufficientFunds { required: U256, available: U256 },
	/// The signing key is malformed or does not control the sender.
	#[error("Invalid credentials: {0}")]
	InvalidCredentials(String),
	/// The node refused the transaction because of its sequence number.
	#[error("Nonce conflict: {0}")]
	NonceConflict(String),
	/// The node refused the broadcast for another reason.
	#[error("Broadcast rejected: {0}")]
	BroadcastRejected(String),
	/// The connection failed while broadcasting; the node may still have the transaction.
	#[error("Broadcast of {hash} unconfirmed: {reason}")]
	BroadcastUnconfirmed { hash: TransactionHash, reason: String },
	/// The transaction was mined with a failure status.
	#[error("Transaction {} failed on-chain in block {}", .receipt.hash, .receipt.block_number)]
	OnChainRejection { receipt: TransactionReceipt },
	/// No receipt arrived in time; the transaction may still confirm later.
	#[error("No receipt for {hash} after {}s", .waited.as_secs())]
	Timeout { hash: TransactionHash, waited: Duration },
}

impl TransferError {
	/// Hash of the broadcast transaction, for failures that happen after the broadcast.
	pub fn transaction_hash(&self) -> Option<&TransactionHash> {
		match self {
			TransferError::OnChainRejection { receipt } => Some(&receipt.hash),
			TransferError::BroadcastUnconfirmed { hash, .. } => Some(hash),
			TransferError::Timeout { hash, .. } => Some(hash),
			_ => None,
		}
	}

	/// True for failures detected before any broadcast attempt.
	pub fn is_preflight(&self) -> bool {
		!matches!(
			self,
			TransferError::NonceConflict(_)
				| TransferError::BroadcastRejected(_)
				| TransferError::BroadcastUnconfirmed { .. }
				| TransferError::OnChainRejection { .. }
				| TransferError::Timeout { .. }
		)
	}
}

fn native(wei: &U256) -> String {
	format_token_amount(&wei.to_string(), NATIVE_DECIMALS)
}

/// Trait defining the read and broadcast operations the transfer core needs
/// from a ledger endpoint.
#[async_trait]
pub trait LedgerInterface: Send + Sync {
	/// Chain id reported by the endpoint.
	async fn get_chain_id(&self) -> Result<u64, DeliveryError>;

	/// Gas price the network currently suggests, in wei.
	async fn get_gas_price(&self) -> Result<u128, DeliveryError>;

	/// Native balance of an address, in wei.
	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError>;

	/// Next nonce for an address.
	async fn get_nonce(&self, address: Address) -> Result<u64, DeliveryError>;

	/// Broadcasts an encoded signed transaction and returns the hash the node reports.
	async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TransactionHash, DeliveryError>;

	/// Receipt of a transaction, or `None` while it is not mined.
	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError>;
}
