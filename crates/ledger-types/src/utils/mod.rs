//! Utility functions for address handling, unit conversion and formatting.
//!
//! These helpers keep the conversions between wei, Gwei and native-unit
//! decimals in one place so that no caller does float arithmetic on amounts.

pub mod address;
pub mod formatting;
pub mod units;

pub use address::{normalize_address, to_checksum_address};
pub use formatting::{format_native_amount, format_token_amount, without_0x_prefix};
pub use units::{
	gwei_to_wei, native_to_wei, wei_to_gwei_string, wei_to_native, UnitError, GWEI_DECIMALS,
	NATIVE_DECIMALS,
};
