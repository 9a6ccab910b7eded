//! String formatting utilities.
//!
//! Provides hex prefix management and fixed-point rendering of raw on-chain
//! amounts for display.

use alloy::primitives::U256;

use super::units::NATIVE_DECIMALS;

/// Removes "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Formats a raw integer amount with `decimals` implied decimal places.
///
/// Trailing zeros are dropped: `("1500000000", 9)` renders as `"1.5"`.
pub fn format_token_amount(amount: &str, decimals: u8) -> String {
	if decimals == 0 {
		return amount.to_string();
	}

	let (integer_part, decimal_part) = split_decimal(amount, decimals as usize);
	let decimal_trimmed = decimal_part.trim_end_matches('0');

	if decimal_trimmed.is_empty() {
		integer_part
	} else {
		format!("{}.{}", integer_part, decimal_trimmed)
	}
}

/// Formats a wei amount in the native unit with exactly `places` fractional digits.
///
/// Extra digits are truncated, never rounded up, so a displayed balance is
/// never larger than the real one.
pub fn format_native_amount(wei: U256, places: usize) -> String {
	let (integer_part, decimal_part) = split_decimal(&wei.to_string(), NATIVE_DECIMALS as usize);
	if places == 0 {
		return integer_part;
	}
	let fraction: String = decimal_part
		.chars()
		.chain(std::iter::repeat('0'))
		.take(places)
		.collect();
	format!("{}.{}", integer_part, fraction)
}

fn split_decimal(amount: &str, decimal_places: usize) -> (String, String) {
	if amount.len() <= decimal_places {
		(
			"0".to_string(),
			format!("{:0>width$}", amount, width = decimal_places),
		)
	} else {
		let split_pos = amount.len() - decimal_places;
		(
			amount[..split_pos].to_string(),
			amount[split_pos..].to_string(),
		)
	}
}
