//! Gas price advisor.
//!
//! Some test networks suggest a gas price of zero or close to it, while their
//! validating nodes enforce a higher minimum and silently drop anything
//! cheaper. The advisor reads the suggestion and raises it to a configured
//! floor when needed.

use crate::{NetworkHandle, TransferError};
use ledger_types::{gwei_to_wei, wei_to_gwei_string, GasQuote};

/// Quotes `max(network suggestion, floor)` on every call.
#[derive(Debug, Clone, Copy)]
pub struct GasPriceAdvisor {
	floor_price: u128,
}

impl GasPriceAdvisor {
	/// Creates an advisor with a floor expressed in Gwei.
	pub fn new(min_gas_price_gwei: u64) -> Self {
		Self {
			floor_price: gwei_to_wei(min_gas_price_gwei),
		}
	}

	/// Floor price in wei.
	pub fn floor_price(&self) -> u128 {
		self.floor_price
	}

	/// Reads the network's suggested price and applies the floor.
	///
	/// Nothing is cached; two calls without a network change return equal quotes.
	pub async fn quote_gas_price(&self, handle: &NetworkHandle) -> Result<GasQuote, TransferError> {
		let network_price = handle.ledger().get_gas_price().await.map_err(|e| {
			tracing::error!(error = %e, "Failed to read network gas price");
			TransferError::ConnectionUnavailable(e.to_string())
		})?;

		let quote = GasQuote::new(network_price, self.floor_price);

		if quote.floor_applied() {
			tracing::warn!(
				network_gwei = %wei_to_gwei_string(quote.network_price),
				floor_gwei = %wei_to_gwei_string(quote.floor_price),
				"Network gas price below minimum, using floor"
			);
		} else {
			tracing::info!(
				network_gwei = %wei_to_gwei_string(quote.network_price),
				"Using network gas price"
			);
		}

		Ok(quote)
	}
}
