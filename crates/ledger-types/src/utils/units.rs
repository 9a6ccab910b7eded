//! Conversions between wei, Gwei and native-unit decimals.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use thiserror::Error;

use super::formatting::format_token_amount;

/// Decimal places of the native unit (1 native = 10^18 wei).
pub const NATIVE_DECIMALS: u8 = 18;

/// Decimal places of a Gwei (1 Gwei = 10^9 wei).
pub const GWEI_DECIMALS: u8 = 9;

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Errors raised when an amount or address cannot be represented exactly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitError {
	/// The amount is below zero.
	#[error("Amount must not be negative: {0}")]
	Negative(Decimal),
	/// The amount has more fractional digits than the smallest unit allows.
	#[error("Amount {0} has more than 18 decimal places")]
	PrecisionLoss(Decimal),
	/// The value does not fit the target representation.
	#[error("Value out of range: {0}")]
	Overflow(String),
	/// The string is not a 20-byte hex address.
	#[error("Invalid address '{0}'")]
	InvalidAddress(String),
}

/// Converts a Gwei amount to wei.
pub fn gwei_to_wei(gwei: u64) -> u128 {
	gwei as u128 * WEI_PER_GWEI
}

/// Renders a wei price in Gwei, e.g. `250000000000` as `"250"`.
pub fn wei_to_gwei_string(wei: u128) -> String {
	format_token_amount(&wei.to_string(), GWEI_DECIMALS)
}

/// Converts a native-unit amount to wei without rounding.
///
/// Fails for negative amounts and for amounts with more than 18 fractional
/// digits, since those cannot be expressed in the smallest unit.
pub fn native_to_wei(amount: Decimal) -> Result<U256, UnitError> {
	if amount < Decimal::ZERO {
		return Err(UnitError::Negative(amount));
	}

	let normalized = amount.normalize();
	let scale = normalized.scale();
	if scale > NATIVE_DECIMALS as u32 {
		return Err(UnitError::PrecisionLoss(amount));
	}

	let mantissa = u128::try_from(normalized.mantissa())
		.map_err(|_| UnitError::Overflow(amount.to_string()))?;
	let factor = U256::from(10u64).pow(U256::from(NATIVE_DECIMALS as u32 - scale));

	U256::from(mantissa)
		.checked_mul(factor)
		.ok_or_else(|| UnitError::Overflow(amount.to_string()))
}

/// Converts a wei amount to a native-unit decimal.
///
/// Fails when the value exceeds the 96-bit mantissa of [`Decimal`].
pub fn wei_to_native(wei: U256) -> Result<Decimal, UnitError> {
	let raw = u128::try_from(wei).map_err(|_| UnitError::Overflow(wei.to_string()))?;
	let raw = i128::try_from(raw).map_err(|_| UnitError::Overflow(wei.to_string()))?;

	Decimal::try_from_i128_with_scale(raw, NATIVE_DECIMALS as u32)
		.map(|d| d.normalize())
		.map_err(|_| UnitError::Overflow(wei.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	fn dec(s: &str) -> Decimal {
		Decimal::from_str(s).unwrap()
	}

	#[test]
	fn test_gwei_to_wei() {
		assert_eq!(gwei_to_wei(250), 250_000_000_000);
		assert_eq!(gwei_to_wei(0), 0);
		assert_eq!(wei_to_gwei_string(gwei_to_wei(250)), "250");
		assert_eq!(wei_to_gwei_string(12_500_000_000), "12.5");
	}

	#[test]
	fn test_native_to_wei_exact() {
		assert_eq!(
			native_to_wei(dec("90")).unwrap(),
			U256::from(90_000_000_000_000_000_000u128)
		);
		assert_eq!(
			native_to_wei(dec("0.0001")).unwrap(),
			U256::from(100_000_000_000_000u128)
		);
		assert_eq!(native_to_wei(dec("0.000000000000000001")).unwrap(), U256::from(1u64));
		assert_eq!(native_to_wei(Decimal::ZERO).unwrap(), U256::ZERO);
		// Trailing zeros beyond 18 places carry no precision
		assert_eq!(
			native_to_wei(dec("1.0000000000000000000000")).unwrap(),
			U256::from(1_000_000_000_000_000_000u128)
		);
	}

	#[test]
	fn test_native_to_wei_rejects_invalid_amounts() {
		assert_eq!(
			native_to_wei(dec("-1")),
			Err(UnitError::Negative(dec("-1")))
		);
		assert!(matches!(
			native_to_wei(dec("1.0000000000000000001")),
			Err(UnitError::PrecisionLoss(_))
		));
	}

	#[test]
	fn test_wei_to_native() {
		assert_eq!(
			wei_to_native(U256::from(100_000_000_000_000_000_000u128)).unwrap(),
			dec("100")
		);
		assert_eq!(
			wei_to_native(U256::from(5_250_000_000_000_000u128)).unwrap(),
			dec("0.00525")
		);
		assert!(matches!(
			wei_to_native(U256::MAX),
			Err(UnitError::Overflow(_))
		));
	}
}
