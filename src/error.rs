/// Sign-In with Ethereum message and signature errors
///
/// Every parse, construction and validation failure is returned as one of
/// these variants so callers can branch on the kind of failure.
///
/// # Example
/// ```rust
/// use siwe_message::{SiweError, Result};
///
/// fn handle_login(result: Result<()>) {
///     match result {
///         Ok(()) => println!("Signed in"),
///         Err(SiweError::ExpiredMessage) => println!("Message has expired"),
///         Err(SiweError::InvalidSignature(reason)) => println!("Bad signature: {}", reason),
///         Err(e) => println!("Rejected: {}", e),
///     }
/// }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum SiweError {
    /// The message has expired
    ///
    /// This error occurs when the validation instant is strictly after
    /// the message's `Expiration Time`.
    #[error("Expired Message")]
    ExpiredMessage,

    /// Message text is malformed or not yet usable
    ///
    /// This error occurs when:
    /// - The text does not match the EIP-4361 grammar as a whole
    /// - A captured field fails its grammar once defaults are resolved
    /// - The validation instant precedes the message's `Not Before`
    #[error("Invalid Message")]
    InvalidMessage,

    /// Signature does not authenticate the message
    ///
    /// This error occurs when:
    /// - The signature is empty, blank or a bare `0x`
    /// - The signature is not hex, not 65 bytes, or has an unknown `v`
    /// - No public key can be recovered from it
    /// - The recovered address differs from the message address
    #[error("Invalid Signature: {0}")]
    InvalidSignature(String),

    /// A message timestamp cannot be read as a calendar instant
    ///
    /// Construction only checks the RFC 3339 shape, so dates such as
    /// `2021-02-30` surface here at validation time.
    #[error(transparent)]
    Timestamp(#[from] chrono::ParseError),

    /// A value supplied at construction does not satisfy its field's grammar.
    #[error("Invalid value for `{field}`: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// Low-level signature decoding or public key recovery failure.
    #[error("Cryptographic error: {0}")]
    CryptoError(String),

    /// Options or message JSON could not be decoded.
    #[error("Failed to decode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SiweError>;
