// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Address and number formatting helpers.
//!
//! ```rust
//! use fhevm_sdk::format::{decimal_to_hex, format_address, hex_to_decimal, is_valid_address};
//!
//! let addr = "0xF7d1BFA0fa5b68099F5Cc85856515F7b290c92e2";
//! assert!(is_valid_address(addr));
//! assert_eq!(format_address(addr), "0xF7d1...92e2");
//! assert_eq!(decimal_to_hex(255), "0xff");
//! assert_eq!(hex_to_decimal("0xff").unwrap(), 255);
//! ```

use std::str::FromStr;

use alloy_primitives::{Address, U256};

use crate::error::{FhevmError, FhevmResult};

/// `0x` followed by exactly 40 hex characters (either case).
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(body) => body.len() == 40 && body.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Parse a 20-byte hex address, rejecting anything [`is_valid_address`] rejects.
pub fn parse_address(address: &str) -> FhevmResult<Address> {
    if !is_valid_address(address) {
        return Err(FhevmError::InvalidAddress(address.to_string()));
    }
    Address::from_str(address).map_err(|_| FhevmError::InvalidAddress(address.to_string()))
}

/// `first6...last4`; inputs shorter than 10 characters come back unchanged.
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() < 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Parse a hex string (with or without `0x`) as an unsigned integer.
pub fn hex_to_decimal(hex: &str) -> FhevmResult<u64> {
    let digits = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);
    u64::from_str_radix(digits, 16).map_err(|_| FhevmError::InvalidAmount(hex.to_string()))
}

pub fn decimal_to_hex(decimal: u64) -> String {
    format!("{decimal:#x}")
}

/// Wei → decimal ETH string.
pub fn format_ether(wei: U256) -> String {
    alloy_primitives::utils::format_ether(wei)
}

/// Decimal ETH string → wei.
pub fn parse_ether(eth: &str) -> FhevmResult<U256> {
    alloy_primitives::utils::parse_ether(eth.trim())
        .map_err(|e| FhevmError::InvalidAmount(format!("{eth}: {e}")))
}

/// Decimal wei string → wei.
pub fn parse_wei(wei: &str) -> FhevmResult<U256> {
    U256::from_str_radix(wei.trim(), 10).map_err(|e| FhevmError::InvalidAmount(format!("{wei}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0xF7d1BFA0fa5b68099F5Cc85856515F7b290c92e2";

    #[test]
    fn valid_addresses() {
        assert!(is_valid_address(ADDR));
        assert!(is_valid_address(&ADDR.to_lowercase()));
        assert!(is_valid_address("0x0000000000000000000000000000000000000000"));
    }

    #[test]
    fn invalid_addresses() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("0x"));
        // missing prefix
        assert!(!is_valid_address(&ADDR[2..]));
        // 39 and 41 hex chars
        assert!(!is_valid_address(&ADDR[..41]));
        assert!(!is_valid_address(&format!("{ADDR}a")));
        // non-hex char
        assert!(!is_valid_address("0xG7d1BFA0fa5b68099F5Cc85856515F7b290c92e2"));
        // uppercase prefix is not accepted
        assert!(!is_valid_address("0XF7d1BFA0fa5b68099F5Cc85856515F7b290c92e2"));
    }

    #[test]
    fn parse_address_rejects_malformed() {
        assert!(parse_address(ADDR).is_ok());
        assert!(matches!(
            parse_address("0x1234"),
            Err(FhevmError::InvalidAddress(_))
        ));
    }

    #[test]
    fn format_full_address() {
        assert_eq!(format_address(ADDR), "0xF7d1...92e2");
    }

    #[test]
    fn format_short_input_unchanged() {
        for s in ["", "0x", "0x1234567"] {
            assert_eq!(format_address(s), s);
        }
        assert_eq!(format_address("0x12345678"), "0x1234...5678");
    }

    #[test]
    fn hex_decimal_conversions() {
        assert_eq!(decimal_to_hex(255), "0xff");
        assert_eq!(decimal_to_hex(0), "0x0");
        assert_eq!(hex_to_decimal("0xff").unwrap(), 255);
        assert_eq!(hex_to_decimal("ff").unwrap(), 255);
        assert!(hex_to_decimal("0xzz").is_err());
    }

    #[test]
    fn hex_decimal_roundtrip() {
        for v in [0u64, 1, 15, 16, 255, 256, 65_535, 1 << 40, u64::MAX] {
            assert_eq!(hex_to_decimal(&decimal_to_hex(v)).unwrap(), v);
        }
    }

    #[test]
    fn ether_parsing() {
        assert_eq!(
            parse_ether("0.01").unwrap(),
            U256::from(10_000_000_000_000_000u64)
        );
        assert!(parse_ether("abc").is_err());
        assert_eq!(parse_wei("1000").unwrap(), U256::from(1000u64));
        assert_eq!(format_ether(U256::from(1_500_000_000_000_000_000u64)), "1.500000000000000000");
    }
}
