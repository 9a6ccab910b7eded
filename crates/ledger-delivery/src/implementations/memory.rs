//! In-memory ledger for tests.
//!
//! Holds balances, nonces and a gas price in memory, records every broadcast
//! and answers receipt lookups according to a configurable behavior. Only
//! compiled for tests or with the `testing` feature.

use crate::{DeliveryError, LedgerInterface};
use alloy::primitives::{keccak256, Address, U256};
use async_trait::async_trait;
use ledger_types::{TransactionHash, TransactionReceipt, TRANSFER_GAS_LIMIT};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Block number reported in receipts.
pub const MEMORY_BLOCK_NUMBER: u64 = 1_000;

/// How receipt lookups answer for broadcast transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptBehavior {
	/// Mined successfully on the first lookup.
	Success,
	/// Mined successfully once `n` lookups have returned nothing.
	SuccessAfter(usize),
	/// Mined with a failure status.
	Reverted,
	/// Never mined.
	Never,
}

/// Scriptable in-memory ledger.
pub struct InMemoryLedger {
	chain_id: u64,
	gas_price: Mutex<u128>,
	balances: Mutex<HashMap<Address, U256>>,
	nonces: Mutex<HashMap<Address, u64>>,
	receipt_behavior: Mutex<ReceiptBehavior>,
	broadcast_error: Mutex<Option<String>>,
	broadcasts: Mutex<Vec<Vec<u8>>>,
	unreachable: AtomicBool,
	balance_failure: AtomicBool,
	receipt_lookups: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryLedger {
	pub fn new(chain_id: u64) -> Self {
		Self {
			chain_id,
			gas_price: Mutex::new(0),
			balances: Mutex::new(HashMap::new()),
			nonces: Mutex::new(HashMap::new()),
			receipt_behavior: Mutex::new(ReceiptBehavior::Success),
			broadcast_error: Mutex::new(None),
			broadcasts: Mutex::new(Vec::new()),
			unreachable: AtomicBool::new(false),
			balance_failure: AtomicBool::new(false),
			receipt_lookups: AtomicUsize::new(0),
		}
	}

	pub fn set_gas_price(&self, wei: u128) {
		*lock(&self.gas_price) = wei;
	}

	pub fn set_balance(&self, address: Address, wei: U256) {
		lock(&self.balances).insert(address, wei);
	}

	pub fn set_nonce(&self, address: Address, nonce: u64) {
		lock(&self.nonces).insert(address, nonce);
	}

	pub fn set_receipt_behavior(&self, behavior: ReceiptBehavior) {
		*lock(&self.receipt_behavior) = behavior;
	}

	/// Makes the next broadcasts fail with the given node message.
	pub fn set_broadcast_error(&self, message: Option<&str>) {
		*lock(&self.broadcast_error) = message.map(str::to_string);
	}

	/// Makes every call fail with a network error.
	pub fn set_unreachable(&self, unreachable: bool) {
		self.unreachable.store(unreachable, Ordering::SeqCst);
	}

	/// Makes balance lookups fail while other calls keep working.
	pub fn set_balance_failure(&self, fail: bool) {
		self.balance_failure.store(fail, Ordering::SeqCst);
	}

	/// Number of transactions broadcast so far.
	pub fn broadcast_count(&self) -> usize {
		lock(&self.broadcasts).len()
	}

	/// Raw bytes of every broadcast, oldest first.
	pub fn broadcasts(&self) -> Vec<Vec<u8>> {
		lock(&self.broadcasts).clone()
	}

	/// Number of receipt lookups served so far.
	pub fn receipt_lookups(&self) -> usize {
		self.receipt_lookups.load(Ordering::SeqCst)
	}

	fn check_reachable(&self) -> Result<(), DeliveryError> {
		if self.unreachable.load(Ordering::SeqCst) {
			return Err(DeliveryError::Network("connection refused".to_string()));
		}
		Ok(())
	}

	fn is_broadcast(&self, hash: &TransactionHash) -> bool {
		lock(&self.broadcasts)
			.iter()
			.any(|raw| keccak256(raw).as_slice() == hash.0.as_slice())
	}
}

#[async_trait]
impl LedgerInterface for InMemoryLedger {
	async fn get_chain_id(&self) -> Result<u64, DeliveryError> {
		self.check_reachable()?;
		Ok(self.chain_id)
	}

	async fn get_gas_price(&self) -> Result<u128, DeliveryError> {
		self.check_reachable()?;
		Ok(*lock(&self.gas_price))
	}

	async fn get_balance(&self, address: Address) -> Result<U256, DeliveryError> {
		self.check_reachable()?;
		if self.balance_failure.load(Ordering::SeqCst) {
			return Err(DeliveryError::Network("balance backend down".to_string()));
		}
		Ok(lock(&self.balances)
			.get(&address)
			.copied()
			.unwrap_or(U256::ZERO))
	}

	async fn get_nonce(&self, address: Address) -> Result<u64, DeliveryError> {
		self.check_reachable()?;
		Ok(lock(&self.nonces).get(&address).copied().unwrap_or(0))
	}

	async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TransactionHash, DeliveryError> {
		self.check_reachable()?;
		if let Some(message) = lock(&self.broadcast_error).clone() {
			return Err(DeliveryError::Rejected(message));
		}

		lock(&self.broadcasts).push(raw.to_vec());
		// Legacy transactions hash to keccak256 of their encoding
		Ok(TransactionHash::from(keccak256(raw)))
	}

	async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		self.check_reachable()?;
		let lookups_before = self.receipt_lookups.fetch_add(1, Ordering::SeqCst);

		if !self.is_broadcast(hash) {
			return Ok(None);
		}

		let success = match *lock(&self.receipt_behavior) {
			ReceiptBehavior::Success => true,
			ReceiptBehavior::SuccessAfter(n) if lookups_before >= n => true,
			ReceiptBehavior::SuccessAfter(_) | ReceiptBehavior::Never => return Ok(None),
			ReceiptBehavior::Reverted => false,
		};

		Ok(Some(TransactionReceipt {
			hash: hash.clone(),
			block_number: MEMORY_BLOCK_NUMBER,
			gas_used: TRANSFER_GAS_LIMIT,
			success,
		}))
	}
}
