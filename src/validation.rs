use crate::{
    crypto::{
        address::is_checksum_address,
        ecdsa::{decode_signature_hex, keccak256, recover_checksum_address},
    },
    error::{Result, SiweError},
    message::Message,
};
use chrono::{DateTime, Utc};
use tracing::debug;

const VALIDATION_TARGET: &str = "siwe_message::validation";

/// Reason reported when the signature is blank.
pub const EMPTY_SIGNATURE: &str = "Signature cannot be empty";
/// Reason reported when no public key can be recovered from the signature.
pub const RECOVERY_FAILED: &str = "Failed to recover public key from signature";
/// Reason reported when the recovered signer is not the message address.
pub const ADDRESS_MISMATCH: &str = "Signer address must match message address";

impl Message {
    /// Validate a raw 65-byte `r ‖ s ‖ v` signature against this message
    ///
    /// The current time is sampled once and used for both the expiration
    /// and not-before checks.
    ///
    /// # Errors
    /// - `ExpiredMessage` - Now is after `Expiration Time`
    /// - `InvalidMessage` - Now is before `Not Before`
    /// - `Timestamp` - `Expiration Time` or `Not Before` is not valid RFC 3339
    /// - `InvalidSignature` - The signature is empty, unrecoverable, or from another address
    ///
    /// # Example
    /// ```rust
    /// use siwe_message::{Message, MessageOptions, SiweError};
    ///
    /// let message = Message::new(
    ///     "service.org",
    ///     "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
    ///     "https://service.org/login",
    ///     "1",
    ///     MessageOptions::new(),
    /// )
    /// .unwrap();
    ///
    /// match message.validate(b"") {
    ///     Err(SiweError::InvalidSignature(reason)) => assert_eq!(reason, "Signature cannot be empty"),
    ///     other => panic!("unexpected result: {:?}", other),
    /// }
    /// ```
    pub fn validate(&self, signature: &[u8]) -> Result<()> {
        self.validate_at(signature, Utc::now())
    }

    /// Validate a raw signature as of `now`
    pub fn validate_at(&self, signature: &[u8], now: DateTime<Utc>) -> Result<()> {
        self.check_time_bounds(now)?;

        if signature.trim_ascii().is_empty() {
            debug!(target: VALIDATION_TARGET, "Rejecting empty signature");
            return Err(SiweError::InvalidSignature(EMPTY_SIGNATURE.to_string()));
        }

        self.check_signer(signature)
    }

    /// Validate a hex-encoded signature, with or without a `0x` prefix
    ///
    /// Hex that cannot be decoded is reported the same way as a signature
    /// from which no key can be recovered.
    pub fn validate_hex(&self, signature: &str) -> Result<()> {
        self.validate_hex_at(signature, Utc::now())
    }

    /// Validate a hex-encoded signature as of `now`
    pub fn validate_hex_at(&self, signature: &str, now: DateTime<Utc>) -> Result<()> {
        self.check_time_bounds(now)?;

        let signature = signature.trim();
        if signature.strip_prefix("0x").unwrap_or(signature).is_empty() {
            debug!(target: VALIDATION_TARGET, "Rejecting empty signature");
            return Err(SiweError::InvalidSignature(EMPTY_SIGNATURE.to_string()));
        }

        let bytes = decode_signature_hex(signature).map_err(|e| {
            debug!(target: VALIDATION_TARGET, "{}", e);
            SiweError::InvalidSignature(RECOVERY_FAILED.to_string())
        })?;
        self.check_signer(&bytes)
    }

    /// Check `Expiration Time` and `Not Before` against `now`
    ///
    /// A message is expired only when `now` is strictly after its expiration
    /// time, and premature only when `now` is strictly before its not-before
    /// time.
    pub fn check_time_bounds(&self, now: DateTime<Utc>) -> Result<()> {
        if let Some(expiration_time) = self.expiration_time() {
            let expiration_time = DateTime::parse_from_rfc3339(expiration_time)?;
            if now > expiration_time {
                debug!(
                    target: VALIDATION_TARGET,
                    "Message expired at {}, now is {}", expiration_time, now
                );
                return Err(SiweError::ExpiredMessage);
            }
        }

        if let Some(not_before) = self.not_before() {
            let not_before = DateTime::parse_from_rfc3339(not_before)?;
            if now < not_before {
                debug!(
                    target: VALIDATION_TARGET,
                    "Message not valid before {}, now is {}", not_before, now
                );
                return Err(SiweError::InvalidMessage);
            }
        }

        Ok(())
    }

    fn check_signer(&self, signature: &[u8]) -> Result<()> {
        let digest = keccak256(self.prepare_message().as_bytes());

        let signer = recover_checksum_address(&digest, signature).map_err(|e| {
            debug!(target: VALIDATION_TARGET, "{}", e);
            SiweError::InvalidSignature(RECOVERY_FAILED.to_string())
        })?;

        if signer != self.address() {
            if !is_checksum_address(self.address()) {
                debug!(
                    target: VALIDATION_TARGET,
                    "Message address {} is not in EIP-55 checksum form",
                    self.address()
                );
            }
            debug!(
                target: VALIDATION_TARGET,
                "Recovered signer {} does not match {}",
                signer,
                self.address()
            );
            return Err(SiweError::InvalidSignature(ADDRESS_MISMATCH.to_string()));
        }

        debug!(target: VALIDATION_TARGET, "Validated signature from {}", signer);
        Ok(())
    }
}
