use rand::{distributions::Alphanumeric, Rng};

/// Length of nonces produced by [`generate_nonce`].
pub const NONCE_LENGTH: usize = 17;

/// Generate a cryptographically secure random nonce
///
/// Returns 17 alphanumeric characters drawn from the thread-local CSPRNG,
/// which satisfies the EIP-4361 requirement of at least 8 alphanumerics.
///
/// # Example
/// ```rust
/// use siwe_message::crypto::nonce::generate_nonce;
///
/// let nonce = generate_nonce();
/// assert_eq!(nonce.len(), 17);
/// ```
pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}
