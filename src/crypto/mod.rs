pub mod address;
pub mod ecdsa;
pub mod nonce;

// Re-export main functions for easier access
pub use address::to_checksum_address;
pub use ecdsa::{keccak256, recover_address};
pub use nonce::generate_nonce;
