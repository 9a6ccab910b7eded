//! Account management module for the ledger transfer system.
//!
//! This module defines the signing seam of the transfer core: an account
//! knows its address and turns an unsigned [`TransferPayload`] into the
//! encoded, signed transaction that gets broadcast.

use alloy::primitives::Address;
use async_trait::async_trait;
use ledger_types::{SignedTransfer, TransferPayload};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

pub use implementations::local::LocalAccount;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

/// Trait defining the interface for account implementations.
///
/// Implementations hold a signing key and produce network-ready encodings
/// of transfer payloads.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Address controlled by this account.
	fn address(&self) -> Address;

	/// Signs a plain-value transfer.
	///
	/// Fails when the payload's sender is not this account's address.
	async fn sign_transfer(&self, payload: &TransferPayload)
		-> Result<SignedTransfer, AccountError>;
}
