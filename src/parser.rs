use crate::{
    config::MessageOptions,
    error::{Result, SiweError},
    grammar::{Tag, MESSAGE, RESOURCE_BULLET},
    message::Message,
};
use regex::Captures;
use std::str::FromStr;
use tracing::{debug, trace};

const PARSER_TARGET: &str = "siwe_message::parser";

/// Parse canonical EIP-4361 text into a [`Message`]
///
/// The whole input must match the grammar; leading or trailing text,
/// missing lines and malformed field values are all rejected.
///
/// # Errors
/// - `InvalidMessage` - The text is not a well-formed EIP-4361 message
///
/// # Example
/// ```rust
/// use siwe_message::parse_message;
///
/// let text = "service.org wants you to sign in with your Ethereum account:
/// 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266
///
/// I accept the ServiceOrg Terms of Service
///
/// URI: https://service.org/login
/// Version: 1
/// Chain ID: 1
/// Nonce: 32891756
/// Issued At: 2021-09-30T16:25:24Z";
///
/// let message = parse_message(text).unwrap();
/// assert_eq!(message.domain(), "service.org");
/// assert_eq!(message.statement(), Some("I accept the ServiceOrg Terms of Service"));
/// assert_eq!(message.prepare_message(), text);
/// ```
pub fn parse_message(text: &str) -> Result<Message> {
    trace!(target: PARSER_TARGET, "Parsing {} bytes of message text", text.len());

    let captures = MESSAGE.captures(text).ok_or_else(|| {
        debug!(target: PARSER_TARGET, "Message text does not match the EIP-4361 grammar");
        SiweError::InvalidMessage
    })?;

    let options = MessageOptions {
        issued_at: optional(&captures, Tag::IssuedAt.capture()),
        nonce: optional(&captures, Tag::Nonce.capture()),
        chain_id: optional(&captures, Tag::ChainId.capture()),
        statement: optional(&captures, "statement"),
        expiration_time: optional(&captures, Tag::ExpirationTime.capture()),
        not_before: optional(&captures, Tag::NotBefore.capture()),
        request_id: optional(&captures, Tag::RequestId.capture()),
        resources: captures
            .name("resources")
            .map(|block| {
                block
                    .as_str()
                    .split('\n')
                    .filter_map(|line| line.strip_prefix(RESOURCE_BULLET))
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default(),
    };

    Message::new(
        required(&captures, "domain")?,
        required(&captures, "address")?,
        required(&captures, Tag::Uri.capture())?,
        required(&captures, Tag::Version.capture())?,
        options,
    )
    .map_err(|e| {
        debug!(target: PARSER_TARGET, "Parsed fields rejected: {}", e);
        SiweError::InvalidMessage
    })
}

impl FromStr for Message {
    type Err = SiweError;

    fn from_str(s: &str) -> Result<Self> {
        parse_message(s)
    }
}

fn optional(captures: &Captures<'_>, name: &str) -> Option<String> {
    captures.name(name).map(|m| m.as_str().to_owned())
}

fn required(captures: &Captures<'_>, name: &str) -> Result<String> {
    optional(captures, name).ok_or(SiweError::InvalidMessage)
}
