//! Network configuration types.
//!
//! Describes the single ledger endpoint the transfer core talks to and the
//! chain identifier it expects to find there.

use serde::{Deserialize, Serialize};

/// Public RPC endpoint of the XDC Apothem testnet.
pub const APOTHEM_RPC_URL: &str = "https://erpc.apothem.network";

/// Chain id reported by the XDC Apothem testnet.
pub const APOTHEM_CHAIN_ID: u64 = 51;

/// Gas price floor in Gwei. Apothem nodes reject transactions priced at the
/// (often zero) value the network suggests.
pub const DEFAULT_MIN_GAS_PRICE_GWEI: u64 = 250;

/// Configuration for the ledger network.
///
/// # Fields
///
/// * `rpc_url` - The HTTP(S) JSON-RPC endpoint
/// * `expected_chain_id` - Chain id the endpoint should report
/// * `strict_chain_id` - Refuse the connection on a chain id mismatch instead of warning
/// * `native_symbol` - Symbol used when displaying native amounts
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkConfig {
	pub rpc_url: String,
	#[serde(default = "default_expected_chain_id")]
	pub expected_chain_id: u64,
	#[serde(default)]
	pub strict_chain_id: bool,
	#[serde(default = "default_native_symbol")]
	pub native_symbol: String,
}

impl NetworkConfig {
	/// Creates a permissive configuration for the given endpoint and expected chain id.
	pub fn new(rpc_url: impl Into<String>, expected_chain_id: u64) -> Self {
		Self {
			rpc_url: rpc_url.into(),
			expected_chain_id,
			strict_chain_id: false,
			native_symbol: default_native_symbol(),
		}
	}
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self::new(APOTHEM_RPC_URL, APOTHEM_CHAIN_ID)
	}
}

fn default_expected_chain_id() -> u64 {
	APOTHEM_CHAIN_ID
}

fn default_native_symbol() -> String {
	"XDC".to_string()
}
