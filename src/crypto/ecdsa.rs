use crate::error::{Result, SiweError};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use super::address::{to_checksum_address, ADDRESS_LENGTH};

/// Length of a recoverable signature: `r` (32) ‖ `s` (32) ‖ `v` (1).
pub const SIGNATURE_LENGTH: usize = 65;

/// Keccak-256 digest of `data`
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Keccak256::digest(data));
    digest
}

/// Derive the 20-byte account address of a secp256k1 public key
///
/// The address is the last 20 bytes of the Keccak-256 hash of the
/// uncompressed public key without its `0x04` tag byte.
pub fn public_key_to_address(key: &VerifyingKey) -> [u8; ADDRESS_LENGTH] {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);

    let mut address = [0u8; ADDRESS_LENGTH];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Recover the signer address from a 32-byte digest and a 65-byte signature
///
/// # Arguments
/// * `digest` - Prehashed message bytes that were signed
/// * `signature` - `r ‖ s ‖ v` where `v` is `0`, `1`, `27` or `28`
///
/// # Returns
/// * `Ok([u8; 20])` - Address of the recovered public key
/// * `Err(SiweError::CryptoError)` - Malformed signature or recovery failure
///
/// # Example
/// ```rust
/// use siwe_message::crypto::ecdsa::{keccak256, recover_address};
///
/// let digest = keccak256(b"hello");
/// // An all-zero signature has r = s = 0 and cannot be recovered
/// assert!(recover_address(&digest, &[0u8; 65]).is_err());
/// ```
pub fn recover_address(digest: &[u8; 32], signature: &[u8]) -> Result<[u8; ADDRESS_LENGTH]> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(SiweError::CryptoError(format!(
            "Expected {} signature bytes, got {}",
            SIGNATURE_LENGTH,
            signature.len()
        )));
    }

    let mut recovery_id = recovery_id(signature[64])?;
    let mut signature = Signature::from_slice(&signature[..64])
        .map_err(|e| SiweError::CryptoError(format!("Failed to parse signature: {}", e)))?;

    // k256 only recovers from low-S signatures; negating s flips the y parity
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let key = VerifyingKey::recover_from_prehash(digest, &signature, recovery_id)
        .map_err(|e| SiweError::CryptoError(format!("Failed to recover public key: {}", e)))?;

    Ok(public_key_to_address(&key))
}

/// Recover the signer and render it as an EIP-55 checksummed address
pub fn recover_checksum_address(digest: &[u8; 32], signature: &[u8]) -> Result<String> {
    recover_address(digest, signature).map(|address| to_checksum_address(&address))
}

/// Decode a hex signature, with or without a `0x` prefix
pub fn decode_signature_hex(signature: &str) -> Result<Vec<u8>> {
    let signature = signature.trim();
    hex::decode(signature.strip_prefix("0x").unwrap_or(signature))
        .map_err(|e| SiweError::CryptoError(format!("Failed to decode signature: {}", e)))
}

fn recovery_id(v: u8) -> Result<RecoveryId> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => {
            return Err(SiweError::CryptoError(format!(
                "Invalid recovery id: {}",
                v
            )))
        }
    };
    RecoveryId::from_byte(id)
        .ok_or_else(|| SiweError::CryptoError(format!("Invalid recovery id: {}", v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;

    // Hardhat / Anvil account #0
    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn signing_key() -> SigningKey {
        SigningKey::from_slice(&hex::decode(TEST_KEY).unwrap()).unwrap()
    }

    fn sign(digest: &[u8; 32], key: &SigningKey, v_offset: u8) -> Vec<u8> {
        let (signature, recovery_id) = key.sign_prehash_recoverable(digest).unwrap();
        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + v_offset);
        bytes
    }

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_public_key_to_address() {
        let key = signing_key();
        let address = public_key_to_address(key.verifying_key());
        assert_eq!(to_checksum_address(&address), TEST_ADDRESS);
    }

    #[test]
    fn test_recover_address() {
        let key = signing_key();
        let digest = keccak256(b"sign in please");

        for v_offset in [0, 27] {
            let signature = sign(&digest, &key, v_offset);
            let recovered = recover_checksum_address(&digest, &signature).unwrap();
            assert_eq!(recovered, TEST_ADDRESS);
        }
    }

    #[test]
    fn test_recover_address_high_s() {
        let key = signing_key();
        let digest = keccak256(b"sign in please");
        let (signature, recovery_id) = key.sign_prehash_recoverable(&digest).unwrap();

        let (r, s) = signature.split_scalars();
        let high = Signature::from_scalars(r.to_bytes(), (-*s).to_bytes()).unwrap();
        assert!(high.normalize_s().is_some());

        let mut bytes = high.to_bytes().to_vec();
        bytes.push((recovery_id.to_byte() ^ 1) + 27);

        let recovered = recover_checksum_address(&digest, &bytes).unwrap();
        assert_eq!(recovered, TEST_ADDRESS);
    }

    #[test]
    fn test_recover_address_other_digest() {
        let key = signing_key();
        let signature = sign(&keccak256(b"original"), &key, 0);
        let recovered = recover_checksum_address(&keccak256(b"tampered"), &signature);

        // Recovery over a different digest yields some other key, or none at all
        assert!(recovered.map(|a| a != TEST_ADDRESS).unwrap_or(true));
    }

    #[test]
    fn test_recover_address_wrong_length() {
        let digest = keccak256(b"hello");
        let result = recover_address(&digest, &[1u8; 64]);
        assert!(matches!(result, Err(SiweError::CryptoError(_))));
    }

    #[test]
    fn test_recover_address_invalid_recovery_id() {
        let key = signing_key();
        let digest = keccak256(b"hello");
        let mut signature = sign(&digest, &key, 0);
        signature[64] = 5;
        assert!(matches!(
            recover_address(&digest, &signature),
            Err(SiweError::CryptoError(_))
        ));
    }

    #[test]
    fn test_decode_signature_hex() {
        assert_eq!(decode_signature_hex("0x0aff").unwrap(), vec![0x0a, 0xff]);
        assert_eq!(decode_signature_hex(" 0aff ").unwrap(), vec![0x0a, 0xff]);
        assert!(matches!(
            decode_signature_hex("0xzz"),
            Err(SiweError::CryptoError(_))
        ));
    }
}
