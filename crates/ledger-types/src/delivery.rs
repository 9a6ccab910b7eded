//! Transaction delivery types for the ledger transfer system.
//!
//! This module defines the types that cross the boundary between the transfer
//! submitter, the signing account and the ledger client: the unsigned payload,
//! its signed encoding, the transaction hash and the receipt.

use alloy::primitives::{Address, B256, U256};
use std::fmt;

/// Gas consumed by a plain value transfer. Protocol constant, not tunable.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Blockchain transaction hash representation.
///
/// Stores the hash as raw bytes; displays as a `0x`-prefixed lowercase hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TransactionHash(pub Vec<u8>);

impl TransactionHash {
	/// Returns the hash as a `0x`-prefixed hex string.
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(&self.0))
	}
}

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

impl From<B256> for TransactionHash {
	fn from(hash: B256) -> Self {
		Self(hash.0.to_vec())
	}
}

/// Transaction receipt containing execution details.
///
/// Created by the ledger once the transaction is included in a block; this
/// system only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Gas consumed by the transaction.
	pub gas_used: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}

/// Unsigned plain-value transfer, ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPayload {
	/// Sender's transaction sequence count.
	pub nonce: u64,
	/// Checksummed sender address.
	pub from: Address,
	/// Checksummed recipient address.
	pub to: Address,
	/// Value in wei.
	pub value: U256,
	/// Gas limit, always [`TRANSFER_GAS_LIMIT`] for plain transfers.
	pub gas_limit: u64,
	/// Gas price in wei.
	pub gas_price: u128,
	/// Chain id the signature is bound to.
	pub chain_id: u64,
}

impl TransferPayload {
	/// Maximum fee the sender can be charged, in wei.
	pub fn max_fee(&self) -> U256 {
		U256::from(self.gas_limit) * U256::from(self.gas_price)
	}

	/// Value plus maximum fee, in wei.
	pub fn total_cost(&self) -> U256 {
		self.value.saturating_add(self.max_fee())
	}
}

/// A signed transfer in its network encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
	/// EIP-2718 encoded transaction bytes.
	pub raw: Vec<u8>,
	/// Hash computed locally from the signed encoding.
	pub hash: TransactionHash,
}
