//! # siwe-message
//!
//! A Rust library for **Sign-In with Ethereum** ([EIP-4361](https://eips.ethereum.org/EIPS/eip-4361))
//! messages. Builds the canonical text a wallet signs, parses that text back into
//! structured fields, and validates a recoverable secp256k1 signature against it.
//!
//! ## Features
//!
//! - **Canonical Serialization** - Byte-exact EIP-4361 text, ready to hash and sign
//! - **Strict Parsing** - Anchored grammar that rejects malformed or truncated messages
//! - **Signature Validation** - Keccak-256 + public key recovery + EIP-55 address comparison
//! - **Temporal Checks** - `Expiration Time` and `Not Before` enforced against a single clock sample
//! - **Typed Options** - Defaults for issued-at, nonce and chain ID, validated at construction
//! - **Stateless Design** - No nonce storage or sessions, you control persistence
//!
//! ## Quick Start
//!
//! ```rust
//! use siwe_message::{parse_message, Message, MessageOptions, SiweError};
//!
//! // Server: build a message for the client to sign
//! let message = Message::new(
//!     "service.org",
//!     "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
//!     "https://service.org/login",
//!     "1",
//!     MessageOptions::new().with_statement("I accept the ServiceOrg Terms of Service"),
//! )
//! .unwrap();
//! let text = message.prepare_message();
//!
//! // Later: parse what the client sent back and check the signature
//! let received = parse_message(&text).unwrap();
//! assert_eq!(received, message);
//!
//! match received.validate_hex("0x") {
//!     Ok(()) => println!("Signed in as {}", received.address()),
//!     Err(SiweError::InvalidSignature(reason)) => println!("Rejected: {}", reason),
//!     Err(e) => println!("Rejected: {}", e),
//! }
//! ```
//!
//! ## Examples
//!
//! See the [siwe_workflow example](demos/siwe_workflow.rs) for a complete sign and verify flow:
//!
//! ```bash
//! cargo run --example siwe_workflow
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod grammar;
pub mod message;
pub mod parser;
pub mod validation;

// Re-export main types for easier access
pub use config::{MessageOptions, ResolvedOptions};
pub use crypto::nonce::generate_nonce;
pub use error::{Result, SiweError};
pub use message::{create_message, Message};
pub use parser::parse_message;
