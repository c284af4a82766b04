//! EIP-55 mixed-case checksum encoding of 20-byte account addresses.

use super::ecdsa::keccak256;

/// Number of bytes in an account address.
pub const ADDRESS_LENGTH: usize = 20;

/// Encode an address as `0x` followed by 40 EIP-55 checksummed hex characters
///
/// Each letter is upper-cased when the matching nibble of
/// `keccak256(lowercase_hex)` is 8 or above.
///
/// # Example
/// ```rust
/// use siwe_message::crypto::address::to_checksum_address;
///
/// let bytes: [u8; 20] = hex::decode("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")
///     .unwrap()
///     .try_into()
///     .unwrap();
/// assert_eq!(to_checksum_address(&bytes), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
/// ```
pub fn to_checksum_address(address: &[u8; ADDRESS_LENGTH]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut checksummed = String::with_capacity(2 + lower.len());
    checksummed.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }
    checksummed
}

/// Whether `address` is a `0x`-prefixed address in its exact checksummed form.
pub fn is_checksum_address(address: &str) -> bool {
    let Some(digits) = address.strip_prefix("0x") else {
        return false;
    };
    let Ok(bytes) = <[u8; ADDRESS_LENGTH]>::try_from(hex::decode(digits).unwrap_or_default()) else {
        return false;
    };
    to_checksum_address(&bytes) == address
}
