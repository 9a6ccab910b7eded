//! Common types module for the ledger transfer system.
//!
//! This module defines the data types shared by the configuration, account,
//! delivery and service crates, so that every component agrees on how
//! hashes, receipts, amounts and addresses are represented.

/// Transaction delivery types for blockchain interactions.
pub mod delivery;
/// Network configuration types.
pub mod networks;
/// Secret wrapper for signing keys.
pub mod secret_string;
/// Transfer request and gas quote types.
pub mod transfer;
/// Utility functions for address handling, unit conversion and formatting.
pub mod utils;

pub use delivery::*;
pub use networks::{
	NetworkConfig, APOTHEM_CHAIN_ID, APOTHEM_RPC_URL, DEFAULT_MIN_GAS_PRICE_GWEI,
};
pub use secret_string::SecretString;
pub use transfer::*;
pub use utils::{
	format_native_amount, format_token_amount, gwei_to_wei, native_to_wei, normalize_address,
	to_checksum_address, wei_to_gwei_string, wei_to_native, without_0x_prefix,
	UnitError, GWEI_DECIMALS, NATIVE_DECIMALS,
};
