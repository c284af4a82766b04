// demos/siwe_workflow.rs

use chrono::{Duration, Utc};
use k256::ecdsa::SigningKey;
use siwe_message::{
    crypto::{
        address::to_checksum_address,
        ecdsa::{keccak256, public_key_to_address},
    },
    parse_message, Message, MessageOptions,
};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

fn sign(key: &SigningKey, text: &str) -> Result<String, Box<dyn std::error::Error>> {
    let (signature, recovery_id) = key.sign_prehash_recoverable(&keccak256(text.as_bytes()))?;
    let mut bytes = signature.to_bytes().to_vec();
    bytes.push(recovery_id.to_byte() + 27);
    Ok(format!("0x{}", hex::encode(bytes)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    println!("Sign-In with Ethereum Example");

    // 1. Client wallet (in a real app the key never leaves the wallet)
    let wallet = SigningKey::random(&mut rand::rngs::OsRng);
    let address = to_checksum_address(&public_key_to_address(wallet.verifying_key()));
    println!("Wallet address: {}", address);

    // 2. Server builds the message and remembers the nonce (in real app, use Redis/DB)
    let mut nonces: HashMap<String, String> = HashMap::new();
    let options = MessageOptions::new()
        .with_statement("I accept the ServiceOrg Terms of Service")
        .with_expiration_time(Utc::now() + Duration::minutes(10))
        .with_resource("https://service.org/terms");
    let message = Message::new(
        "service.org",
        address.as_str(),
        "https://service.org/login",
        "1",
        options,
    )?;
    nonces.insert(address.clone(), message.nonce().to_string());

    let text = message.prepare_message();
    println!("\nMessage to sign:\n{}\n", text);

    // 3. Client signs the exact text
    let signature = sign(&wallet, &text)?;
    println!("Signature: {}", signature);

    // 4. Server parses what it received and validates it
    let received = parse_message(&text)?;
    if nonces.get(received.address()).map(String::as_str) != Some(received.nonce()) {
        println!("Unknown nonce, rejecting");
        return Ok(());
    }

    match received.validate_hex(&signature) {
        Ok(()) => println!("Signed in as {}", received.address()),
        Err(e) => println!("Sign-in failed: {}", e),
    }

    // 5. A tampered message no longer matches the signature
    let tampered = parse_message(&text.replace("Chain ID: 1", "Chain ID: 5"))?;
    match tampered.validate_hex(&signature) {
        Ok(()) => println!("Tampered message unexpectedly accepted"),
        Err(e) => println!("Tampered message rejected (expected): {}", e),
    }

    println!("\nExample completed!");
    Ok(())
}
