//! Address normalization.
//!
//! XDC tooling shows addresses with an `xdc` prefix where other EVM chains
//! use `0x`. Both forms are accepted here and turned into a parsed
//! [`Address`], whose checksummed rendering is what gets logged and signed.

use alloy::primitives::Address;
use std::str::FromStr;

use super::units::UnitError;

/// Parses an address given as `0x…`, `xdc…` or bare hex, in any letter case.
pub fn normalize_address(input: &str) -> Result<Address, UnitError> {
	let trimmed = input.trim();
	let hex_part = match trimmed.get(..3) {
		Some(prefix) if prefix.eq_ignore_ascii_case("xdc") => &trimmed[3..],
		_ => trimmed,
	};

	let hex_part = super::without_0x_prefix(hex_part);
	if hex_part.len() != 40 {
		return Err(UnitError::InvalidAddress(input.to_string()));
	}

	Address::from_str(hex_part).map_err(|_| UnitError::InvalidAddress(input.to_string()))
}

/// Renders an address in EIP-55 mixed-case checksum form.
pub fn to_checksum_address(address: &Address) -> String {
	address.to_checksum(None)
}

#[cfg(test)]
mod tests {
	use super::*;

	const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

	#[test]
	fn test_lowercase_address_is_checksummed() {
		let address = normalize_address(&CHECKSUMMED.to_lowercase()).unwrap();
		assert_eq!(to_checksum_address(&address), CHECKSUMMED);
	}

	#[test]
	fn test_xdc_prefix_is_accepted() {
		let xdc_form = format!("xdc{}", &CHECKSUMMED[2..]);
		let upper_form = format!("XDC{}", &CHECKSUMMED[2..].to_lowercase());

		assert_eq!(
			to_checksum_address(&normalize_address(&xdc_form).unwrap()),
			CHECKSUMMED
		);
		assert_eq!(
			to_checksum_address(&normalize_address(&upper_form).unwrap()),
			CHECKSUMMED
		);
	}

	#[test]
	fn test_invalid_addresses_are_rejected() {
		for bad in ["", "0x", "xdc...", "0x1234", "0xzzaeb6053f3e94c9b9a09f33669435e7ef1beaed"] {
			assert!(
				matches!(normalize_address(bad), Err(UnitError::InvalidAddress(_))),
				"accepted {bad:?}"
			);
		}
	}
}
