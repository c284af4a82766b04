use crate::{
    config::{check, MessageOptions, ResolvedOptions},
    error::{Result, SiweError},
    grammar::{Rule, Tag, PREAMBLE, RESOURCES_HEADER, RESOURCE_BULLET},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Sign-In with Ethereum (EIP-4361) message
///
/// Messages are created either from explicit parts with [`Message::new`]
/// or from canonical text with [`parse_message`](crate::parse_message).
/// Every field has been checked against the EIP-4361 grammar by the time a
/// `Message` exists, and a `Message` is never modified afterwards. To derive
/// an updated message, take [`Message::to_options`], change it, and build a
/// new one.
///
/// The `Display` implementation renders the canonical text that gets signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "MessageRepr")]
pub struct Message {
    domain: String,
    address: String,
    uri: String,
    version: String,
    issued_at: String,
    nonce: String,
    chain_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    statement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    not_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    resources: Vec<String>,
}

/// Wire shape accepted when deserializing a [`Message`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageRepr {
    domain: String,
    address: String,
    uri: String,
    version: String,
    #[serde(flatten)]
    options: MessageOptions,
}

impl TryFrom<MessageRepr> for Message {
    type Error = SiweError;

    fn try_from(repr: MessageRepr) -> Result<Self> {
        Message::new(repr.domain, repr.address, repr.uri, repr.version, repr.options)
    }
}

/// Create a message from its required parts and an options bundle
///
/// Shorthand for [`Message::new`].
///
/// # Example
/// ```rust
/// use siwe_message::{create_message, MessageOptions};
///
/// let message = create_message(
///     "service.org",
///     "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
///     "https://service.org/login",
///     "1",
///     MessageOptions::new().with_nonce("32891756"),
/// )
/// .unwrap();
///
/// assert_eq!(message.chain_id(), "1");
/// assert!(message
///     .prepare_message()
///     .starts_with("service.org wants you to sign in with your Ethereum account:\n"));
/// ```
pub fn create_message(
    domain: impl Into<String>,
    address: impl Into<String>,
    uri: impl Into<String>,
    version: impl Into<String>,
    options: MessageOptions,
) -> Result<Message> {
    Message::new(domain, address, uri, version, options)
}

impl Message {
    /// Create a message, resolving option defaults against the current time
    ///
    /// # Errors
    /// - `InvalidField` - Any part or option does not match its grammar rule
    pub fn new(
        domain: impl Into<String>,
        address: impl Into<String>,
        uri: impl Into<String>,
        version: impl Into<String>,
        options: MessageOptions,
    ) -> Result<Self> {
        Self::from_resolved(domain, address, uri, version, options.resolve()?)
    }

    /// Create a message from already resolved options
    pub fn from_resolved(
        domain: impl Into<String>,
        address: impl Into<String>,
        uri: impl Into<String>,
        version: impl Into<String>,
        options: ResolvedOptions,
    ) -> Result<Self> {
        Ok(Self {
            domain: check("domain", Rule::Domain, domain.into())?,
            address: check("address", Rule::Address, address.into())?,
            uri: check("uri", Rule::Uri, uri.into())?,
            version: check("version", Rule::Version, version.into())?,
            issued_at: options.issued_at,
            nonce: options.nonce,
            chain_id: options.chain_id,
            statement: options.statement,
            expiration_time: options.expiration_time,
            not_before: options.not_before,
            request_id: options.request_id,
            resources: options.resources,
        })
    }

    /// Options that rebuild this exact message when passed to [`Message::new`]
    pub fn to_options(&self) -> MessageOptions {
        MessageOptions {
            issued_at: Some(self.issued_at.clone()),
            nonce: Some(self.nonce.clone()),
            chain_id: Some(self.chain_id.clone()),
            statement: self.statement.clone(),
            expiration_time: self.expiration_time.clone(),
            not_before: self.not_before.clone(),
            request_id: self.request_id.clone(),
            resources: self.resources.clone(),
        }
    }

    /// Render the canonical EIP-4361 text
    ///
    /// This is the exact byte sequence that is hashed and signed. Lines are
    /// joined with `\n` and there is no trailing line break.
    pub fn prepare_message(&self) -> String {
        let mut lines = vec![
            format!("{} {}", self.domain, PREAMBLE),
            self.address.clone(),
            String::new(),
        ];
        if let Some(statement) = &self.statement {
            lines.push(statement.clone());
        }
        lines.push(String::new());

        for tag in Tag::BODY {
            if let Some(value) = self.value(tag) {
                lines.push(format!("{}: {}", tag.label(), value));
            }
        }

        if !self.resources.is_empty() {
            lines.push(RESOURCES_HEADER.to_string());
            lines.extend(
                self.resources
                    .iter()
                    .map(|resource| format!("{RESOURCE_BULLET}{resource}")),
            );
        }

        lines.join("\n")
    }

    /// Value rendered on the body line described by `tag`, if present
    pub(crate) fn value(&self, tag: Tag) -> Option<&str> {
        match tag {
            Tag::Uri => Some(&self.uri),
            Tag::Version => Some(&self.version),
            Tag::ChainId => Some(&self.chain_id),
            Tag::Nonce => Some(&self.nonce),
            Tag::IssuedAt => Some(&self.issued_at),
            Tag::ExpirationTime => self.expiration_time.as_deref(),
            Tag::NotBefore => self.not_before.as_deref(),
            Tag::RequestId => self.request_id.as_deref(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn issued_at(&self) -> &str {
        &self.issued_at
    }

    pub fn statement(&self) -> Option<&str> {
        self.statement.as_deref()
    }

    pub fn expiration_time(&self) -> Option<&str> {
        self.expiration_time.as_deref()
    }

    pub fn not_before(&self) -> Option<&str> {
        self.not_before.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prepare_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn options() -> MessageOptions {
        MessageOptions {
            issued_at: Some("2021-09-30T16:25:24Z".to_string()),
            nonce: Some("32891756".to_string()),
            ..Default::default()
        }
    }

    fn message(options: MessageOptions) -> Message {
        Message::new("service.org", ADDRESS, "https://service.org/login", "1", options).unwrap()
    }

    #[test]
    fn test_prepare_minimal_message() {
        let expected = "service.org wants you to sign in with your Ethereum account:
0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266


URI: https://service.org/login
Version: 1
Chain ID: 1
Nonce: 32891756
Issued At: 2021-09-30T16:25:24Z";
        assert_eq!(message(options()).prepare_message(), expected);
    }

    #[test]
    fn test_prepare_full_message() {
        let options = MessageOptions {
            chain_id: Some("137".to_string()),
            statement: Some("I accept the ServiceOrg Terms of Service: https://service.org/tos".to_string()),
            expiration_time: Some("2021-10-01T16:25:24Z".to_string()),
            not_before: Some("2021-09-30T16:00:00Z".to_string()),
            request_id: Some("request-1".to_string()),
            resources: vec![
                "ipfs://bafybeiemxf5abjwjbikoz4mc3a3dla6ual3jsgpdr4cjr3oz3evfyavhwq/".to_string(),
                "https://example.com/my-web2-claim.json".to_string(),
            ],
            ..options()
        };
        let expected = "service.org wants you to sign in with your Ethereum account:
0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266

I accept the ServiceOrg Terms of Service: https://service.org/tos

URI: https://service.org/login
Version: 1
Chain ID: 137
Nonce: 32891756
Issued At: 2021-09-30T16:25:24Z
Expiration Time: 2021-10-01T16:25:24Z
Not Before: 2021-09-30T16:00:00Z
Request ID: request-1
Resources:
- ipfs://bafybeiemxf5abjwjbikoz4mc3a3dla6ual3jsgpdr4cjr3oz3evfyavhwq/
- https://example.com/my-web2-claim.json";
        assert_eq!(message(options).prepare_message(), expected);
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let message = message(options().with_statement("Hello").with_resource("https://a.example"));
        assert_eq!(message.prepare_message(), message.prepare_message());
        assert_eq!(message.to_string(), message.prepare_message());
    }

    #[test]
    fn test_blank_statement_is_elided() {
        let with_blank = message(options().with_statement("   "));
        assert_eq!(with_blank.statement(), None);
        assert_eq!(with_blank.prepare_message(), message(options()).prepare_message());
    }

    #[test]
    fn test_no_trailing_newline() {
        let message = message(options().with_resource("https://a.example"));
        assert!(message.prepare_message().ends_with("- https://a.example"));
    }

    #[test]
    fn test_invalid_parts_rejected() {
        let cases = [
            ("service.org?x", ADDRESS, "https://service.org", "1", "domain"),
            ("service.org", "0x1234", "https://service.org", "1", "address"),
            ("service.org", ADDRESS, "service.org", "1", "uri"),
            ("service.org", ADDRESS, "https://service.org", "2", "version"),
        ];
        for (domain, address, uri, version, expected) in cases {
            match Message::new(domain, address, uri, version, options()) {
                Err(SiweError::InvalidField { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected InvalidField for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_to_options_rebuilds_message() {
        let original = message(options().with_chain_id(10).with_request_id("r1"));
        let rebuilt = Message::new(
            original.domain(),
            original.address(),
            original.uri(),
            original.version(),
            original.to_options(),
        )
        .unwrap();
        assert_eq!(rebuilt, original);

        let updated = Message::new(
            original.domain(),
            original.address(),
            original.uri(),
            original.version(),
            original.to_options().with_chain_id(1),
        )
        .unwrap();
        assert_eq!(updated.chain_id(), "1");
        assert_eq!(original.chain_id(), "10");
    }

    #[test]
    fn test_json_round_trip() {
        let message = message(options().with_statement("Hi").with_request_id("abc"));
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["chainId"], "1");
        assert_eq!(json["issuedAt"], "2021-09-30T16:25:24Z");
        assert_eq!(json["requestId"], "abc");
        assert!(json.get("expirationTime").is_none());
        assert!(json.get("resources").is_none());

        let decoded: Message = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_json_rejects_invalid_message() {
        let json = r#"{
            "domain": "service.org",
            "address": "0xnothex",
            "uri": "https://service.org/login",
            "version": "1"
        }"#;
        assert!(serde_json::from_str::<Message>(json).is_err());
    }
}
