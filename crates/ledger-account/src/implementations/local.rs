//! Local private key account.
//!
//! Signs legacy (gas-price) transfers in-process with a secp256k1 key held in
//! memory. XDC nodes do not accept EIP-1559 fee fields, so the payload is
//! always encoded as a legacy transaction with an EIP-155 chain id.

use crate::{AccountError, AccountInterface};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::Address;
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use ledger_types::{SecretString, SignedTransfer, TransactionHash, TransferPayload};

/// Account backed by a private key held in memory.
pub struct LocalAccount {
	signer: PrivateKeySigner,
}

impl LocalAccount {
	/// Parses a hex private key, with or without `0x` prefix.
	///
	/// The key is only exposed for the duration of the parse; parse errors
	/// never include the key material.
	pub fn from_secret(private_key: &SecretString) -> Result<Self, AccountError> {
		if private_key.is_empty() {
			return Err(AccountError::InvalidKey("private key is empty".to_string()));
		}

		let signer: PrivateKeySigner = private_key.with_exposed(|key| {
			key.parse()
				.map_err(|_| AccountError::InvalidKey("malformed private key".to_string()))
		})?;

		Ok(Self { signer })
	}
}

impl std::fmt::Debug for LocalAccount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LocalAccount")
			.field("address", &self.signer.address())
			.finish()
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	fn address(&self) -> Address {
		self.signer.address()
	}

	async fn sign_transfer(
		&self,
		payload: &TransferPayload,
	) -> Result<SignedTransfer, AccountError> {
		if payload.from != self.signer.address() {
			return Err(AccountError::InvalidKey(format!(
				"key controls {} but transfer is from {}",
				self.signer.address().to_checksum(None),
				payload.from.to_checksum(None)
			)));
		}

		let signer = self.signer.clone().with_chain_id(Some(payload.chain_id));
		let wallet = EthereumWallet::from(signer);

		let request = TransactionRequest::default()
			.with_from(payload.from)
			.with_to(payload.to)
			.with_value(payload.value)
			.with_nonce(payload.nonce)
			.with_gas_limit(payload.gas_limit)
			.with_gas_price(payload.gas_price)
			.with_chain_id(payload.chain_id);

		let envelope = request
			.build(&wallet)
			.await
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;

		let hash = TransactionHash::from(*envelope.tx_hash());
		tracing::debug!(tx_hash = %hash, nonce = payload.nonce, "Signed transfer");

		Ok(SignedTransfer {
			raw: envelope.encoded_2718(),
			hash,
		})
	}
}
