//! Transfer submitter.
//!
//! Drives one plain-value transfer through
//! `Prepared -> Signed -> Submitted -> Confirmed | Failed | TimedOut`.
//! The balance preflight is mandatory: a transfer that cannot pay for its
//! value plus maximum fee is never signed or broadcast. Every failure is
//! terminal for the call and nothing is retried or resubmitted.

use crate::{DeliveryError, GasPriceAdvisor, NetworkHandle, TransferError};
use ledger_account::{AccountInterface, LocalAccount};
use ledger_types::{
	format_native_amount, native_to_wei, normalize_address, to_checksum_address,
	wei_to_gwei_string, SignedTransfer, TransactionHash, TransactionReceipt, TransferPayload,
	TransferRequest, TRANSFER_GAS_LIMIT,
};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Lifecycle of a single transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
	Prepared,
	Signed,
	Submitted,
	Confirmed,
	Failed,
	TimedOut,
}

impl fmt::Display for TransferState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			TransferState::Prepared => "prepared",
			TransferState::Signed => "signed",
			TransferState::Submitted => "submitted",
			TransferState::Confirmed => "confirmed",
			TransferState::Failed => "failed",
			TransferState::TimedOut => "timed_out",
		};
		f.write_str(name)
	}
}

/// Submits transfers and waits for their receipts.
#[derive(Debug, Clone)]
pub struct TransferSubmitter {
	advisor: GasPriceAdvisor,
	receipt_timeout: Duration,
	poll_interval: Duration,
}

impl TransferSubmitter {
	pub fn new(advisor: GasPriceAdvisor, receipt_timeout: Duration, poll_interval: Duration) -> Self {
		Self {
			advisor,
			receipt_timeout,
			poll_interval,
		}
	}

	/// Submits a transfer and waits for its receipt.
	///
	/// Returns the receipt of a successfully mined transfer. After the
	/// broadcast, failures carry the transaction hash (see
	/// [`TransferError::transaction_hash`]).
	pub async fn submit_transfer(
		&self,
		handle: &NetworkHandle,
		request: &TransferRequest,
	) -> Result<TransactionReceipt, TransferError> {
		let payload = self.prepare(handle, request).await?;
		transition(TransferState::Prepared, &payload);

		self.preflight(handle, request, &payload).await?;

		let signed = sign(request, &payload).await?;
		transition(TransferState::Signed, &payload);

		let hash = broadcast(handle, &signed).await?;
		transition(TransferState::Submitted, &payload);

		self.await_receipt(handle, hash).await
	}

	/// Normalizes the request and collects nonce and gas price.
	async fn prepare(
		&self,
		handle: &NetworkHandle,
		request: &TransferRequest,
	) -> Result<TransferPayload, TransferError> {
		let from = normalize_address(&request.from)
			.map_err(|e| TransferError::InvalidRequest(format!("sender: {}", e)))?;
		let to = normalize_address(&request.to)
			.map_err(|e| TransferError::InvalidRequest(format!("recipient: {}", e)))?;
		let value = native_to_wei(request.amount)
			.map_err(|e| TransferError::InvalidRequest(e.to_string()))?;

		let nonce = handle.ledger().get_nonce(from).await.map_err(|e| {
			tracing::error!(error = %e, "Failed to read nonce");
			TransferError::ConnectionUnavailable(e.to_string())
		})?;

		let quote = self.advisor.quote_gas_price(handle).await?;

		Ok(TransferPayload {
			nonce,
			from,
			to,
			value,
			gas_limit: TRANSFER_GAS_LIMIT,
			gas_price: quote.price,
			chain_id: handle.chain_id(),
		})
	}

	/// Refuses the transfer when balance < value + gas_limit * gas_price.
	async fn preflight(
		&self,
		handle: &NetworkHandle,
		request: &TransferRequest,
		payload: &TransferPayload,
	) -> Result<(), TransferError> {
		let required = payload.total_cost();
		tracing::info!(
			gas_price_gwei = %wei_to_gwei_string(payload.gas_price),
			fee = %format_native_amount(payload.max_fee(), 8),
			"Estimated gas cost"
		);

		let (_, available) = handle.balance_wei(&request.from).await?;

		if available < required {
			tracing::error!(
				required = %format_native_amount(required, 8),
				available = %format_native_amount(available, 8),
				symbol = %handle.native_symbol(),
				"Insufficient funds, transfer aborted"
			);
			return Err(TransferError::InsufficientFunds {
				required,
				available,
			});
		}

		Ok(())
	}

	/// Polls for the receipt until it arrives or the timeout elapses.
	async fn await_receipt(
		&self,
		handle: &NetworkHandle,
		hash: TransactionHash,
	) -> Result<TransactionReceipt, TransferError> {
		let deadline = Instant::now() + self.receipt_timeout;
		tracing::info!(
			tx_hash = %hash,
			timeout_secs = self.receipt_timeout.as_secs(),
			"Waiting for transaction receipt"
		);

		loop {
			match tokio::time::timeout_at(deadline, handle.ledger().get_receipt(&hash)).await {
				Err(_) => break,
				Ok(Ok(Some(receipt))) if receipt.success => {
					tracing::info!(
						tx_hash = %hash,
						block_number = receipt.block_number,
						gas_used = receipt.gas_used,
						state = %TransferState::Confirmed,
						"Transaction confirmed"
					);
					return Ok(receipt);
				},
				Ok(Ok(Some(receipt))) => {
					tracing::error!(
						tx_hash = %hash,
						block_number = receipt.block_number,
						state = %TransferState::Failed,
						"Transaction failed on-chain"
					);
					return Err(TransferError::OnChainRejection { receipt });
				},
				Ok(Ok(None)) => {
					tracing::debug!(tx_hash = %hash, "Transaction pending");
				},
				Ok(Err(e)) => {
					tracing::warn!(tx_hash = %hash, error = %e, "Receipt lookup failed");
				},
			}

			let now = Instant::now();
			if now >= deadline {
				break;
			}
			tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
		}

		tracing::warn!(
			tx_hash = %hash,
			state = %TransferState::TimedOut,
			"No receipt before timeout; the transaction may still confirm later"
		);
		Err(TransferError::Timeout {
			hash,
			waited: self.receipt_timeout,
		})
	}
}

fn transition(state: TransferState, payload: &TransferPayload) {
	tracing::debug!(
		state = %state,
		from = %to_checksum_address(&payload.from),
		to = %to_checksum_address(&payload.to),
		nonce = payload.nonce,
		"Transfer state changed"
	);
}

async fn sign(
	request: &TransferRequest,
	payload: &TransferPayload,
) -> Result<SignedTransfer, TransferError> {
	let account = LocalAccount::from_secret(&request.private_key).map_err(|e| {
		tracing::error!(error = %e, "Invalid signing key");
		TransferError::InvalidCredentials(e.to_string())
	})?;

	account.sign_transfer(payload).await.map_err(|e| {
		tracing::error!(error = %e, "Signing failed");
		TransferError::InvalidCredentials(e.to_string())
	})
}

/// Broadcasts the signed bytes and returns the hash the node reports.
async fn broadcast(
	handle: &NetworkHandle,
	signed: &SignedTransfer,
) -> Result<TransactionHash, TransferError> {
	let hash = handle
		.ledger()
		.send_raw_transaction(&signed.raw)
		.await
		.map_err(|e| match e {
			DeliveryError::Rejected(message) => classify_rejection(&message),
			other => TransferError::BroadcastUnconfirmed {
				hash: signed.hash.clone(),
				reason: other.to_string(),
			},
		})
		.inspect_err(|e| tracing::error!(error = %e, "Broadcast failed"))?;

	if hash != signed.hash {
		tracing::warn!(
			tx_hash = %hash,
			local_hash = %signed.hash,
			"Node reported a different hash than computed locally"
		);
	}
	tracing::info!(tx_hash = %hash, "Transaction sent");

	Ok(hash)
}

/// Maps a node's refusal message onto the failure taxonomy.
fn classify_rejection(message: &str) -> TransferError {
	let lower = message.to_ascii_lowercase();
	let nonce_related = [
		"nonce too low",
		"nonce too high",
		"invalid nonce",
		"replacement transaction underpriced",
		"already known",
	];

	if nonce_related.iter().any(|needle| lower.contains(needle)) {
		TransferError::NonceConflict(message.to_string())
	} else {
		TransferError::BroadcastRejected(message.to_string())
	}
}
