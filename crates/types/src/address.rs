//! Address format checks
//!
//! Addresses are accepted in any letter case. EIP-55 checksums are not
//! verified, so a checksummed address and its lowercase form compare equal.

/// Number of hex digits following the `0x` prefix
pub const ADDRESS_HEX_LEN: usize = 40;

/// Placeholder address standing for the chain's native asset inside a route
pub const NATIVE_TOKEN_SENTINEL: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

/// Returns true if `value` is `0x` followed by exactly 40 hex digits.
pub fn is_valid_address(value: &str) -> bool {
    match value.strip_prefix("0x") {
        Some(digits) => digits.len() == ADDRESS_HEX_LEN && hex::decode(digits).is_ok(),
        None => false,
    }
}

/// Compare two addresses ignoring letter case
pub fn addresses_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Lowercase form used when addresses are logged or compared as keys
pub fn normalize_address(value: &str) -> String {
    value.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_lowercase_and_checksummed() {
        assert!(is_valid_address("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
        assert!(is_valid_address("0x4200000000000000000000000000000000000006"));
        assert!(is_valid_address(NATIVE_TOKEN_SENTINEL));
        assert!(is_valid_address("0xABCDEFabcdef0123456789ABCDEFabcdef012345"));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("0x"));
        // 39 digits
        assert!(!is_valid_address("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
        // 41 digits
        assert!(!is_valid_address("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
        assert!(!is_valid_address("0xgaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
        assert!(!is_valid_address("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"));
        assert!(!is_valid_address("0X4200000000000000000000000000000000000006"));
        assert!(!is_valid_address(" 0x4200000000000000000000000000000000000006"));
    }

    #[test]
    fn test_addresses_equal_ignores_case() {
        assert!(addresses_equal(
            NATIVE_TOKEN_SENTINEL,
            "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"
        ));
        assert!(!addresses_equal(
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaab"
        ));
        assert_eq!(
            normalize_address("0xABCDEFabcdef0123456789ABCDEFabcdef012345"),
            "0xabcdefabcdef0123456789abcdefabcdef012345"
        );
    }
}
