//! Transfer request and gas quote types.

use crate::SecretString;
use rust_decimal::Decimal;

/// Inputs to a single transfer submission.
///
/// Addresses may be given in `0x` or `xdc` form in any letter case; the
/// submitter normalizes them before use. The amount is in the native unit.
#[derive(Debug, Clone)]
pub struct TransferRequest {
	pub from: String,
	pub to: String,
	pub private_key: SecretString,
	pub amount: Decimal,
}

impl TransferRequest {
	pub fn new(
		from: impl Into<String>,
		to: impl Into<String>,
		private_key: SecretString,
		amount: Decimal,
	) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			private_key,
			amount,
		}
	}
}

/// Gas price chosen for one submission, in wei.
///
/// Derived from live network state on every call; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasQuote {
	/// Price the network suggested.
	pub network_price: u128,
	/// Configured minimum.
	pub floor_price: u128,
	/// `max(network_price, floor_price)`.
	pub price: u128,
}

impl GasQuote {
	pub fn new(network_price: u128, floor_price: u128) -> Self {
		Self {
			network_price,
			floor_price,
			price: network_price.max(floor_price),
		}
	}

	/// True when the network suggestion was below the floor.
	pub fn floor_applied(&self) -> bool {
		self.network_price < self.floor_price
	}
}
