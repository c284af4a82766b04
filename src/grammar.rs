//! The EIP-4361 text layout.
//!
//! Field rules and body line descriptors are declared once here. The full
//! message regex used by the parser and the line layout used by
//! [`Message::prepare_message`](crate::Message::prepare_message) are both
//! derived from [`Tag::BODY`] and the literal constants below.

use regex::Regex;
use std::sync::LazyLock;

/// Text following the domain on the first line.
pub const PREAMBLE: &str = "wants you to sign in with your Ethereum account:";

/// Header line opening the resources block.
pub const RESOURCES_HEADER: &str = "Resources:";

/// Prefix of each resource line.
pub const RESOURCE_BULLET: &str = "- ";

/// The only message version currently defined.
pub const VERSION: &str = "1";

/// Character-level constraint of a single field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    Domain,
    Address,
    Statement,
    Uri,
    Version,
    ChainId,
    Nonce,
    DateTime,
    RequestId,
}

impl Rule {
    const ALL: [Rule; 9] = [
        Rule::Domain,
        Rule::Address,
        Rule::Statement,
        Rule::Uri,
        Rule::Version,
        Rule::ChainId,
        Rule::Nonce,
        Rule::DateTime,
        Rule::RequestId,
    ];

    /// Unanchored regex fragment without capture groups.
    pub const fn pattern(self) -> &'static str {
        match self {
            Rule::Domain => r"[^?#\s]+",
            Rule::Address => r"0x[0-9a-fA-F]{40}",
            Rule::Statement => r"[^\n]+",
            // RFC 3986 absolute URI, restricted to a single line
            Rule::Uri => r"[a-zA-Z][a-zA-Z0-9+.\-]*:[^\s?#]*(?:\?[^\s#]*)?(?:#\S*)?",
            Rule::Version => r"1",
            Rule::ChainId => r"[0-9]+",
            Rule::Nonce => r"[a-zA-Z0-9]{8,}",
            Rule::DateTime => concat!(
                r"[0-9]+-(?:0[1-9]|1[012])-(?:0[1-9]|[12][0-9]|3[01])",
                r"[Tt](?:[01][0-9]|2[0-3]):[0-5][0-9]:(?:[0-5][0-9]|60)(?:\.[0-9]+)?",
                r"(?:[Zz]|[+\-](?:[01][0-9]|2[0-3]):[0-5][0-9])",
            ),
            Rule::RequestId => r"[\-._~!$&'()*+,;=:@%a-zA-Z0-9]*",
        }
    }

    /// Whether `value`, in full, satisfies this rule.
    pub fn is_match(self, value: &str) -> bool {
        RULES[self as usize].is_match(value)
    }
}

static RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    Rule::ALL
        .iter()
        .map(|rule| {
            Regex::new(&format!(r"\A(?:{})\z", rule.pattern()))
                .expect("field rule patterns are valid regexes")
        })
        .collect()
});

/// A `Label: value` line of the message body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    Uri,
    Version,
    ChainId,
    Nonce,
    IssuedAt,
    ExpirationTime,
    NotBefore,
    RequestId,
}

impl Tag {
    /// Body lines in wire order.
    pub const BODY: [Tag; 8] = [
        Tag::Uri,
        Tag::Version,
        Tag::ChainId,
        Tag::Nonce,
        Tag::IssuedAt,
        Tag::ExpirationTime,
        Tag::NotBefore,
        Tag::RequestId,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Tag::Uri => "URI",
            Tag::Version => "Version",
            Tag::ChainId => "Chain ID",
            Tag::Nonce => "Nonce",
            Tag::IssuedAt => "Issued At",
            Tag::ExpirationTime => "Expiration Time",
            Tag::NotBefore => "Not Before",
            Tag::RequestId => "Request ID",
        }
    }

    /// Capture group name used by the message regex.
    pub const fn capture(self) -> &'static str {
        match self {
            Tag::Uri => "uri",
            Tag::Version => "version",
            Tag::ChainId => "chain_id",
            Tag::Nonce => "nonce",
            Tag::IssuedAt => "issued_at",
            Tag::ExpirationTime => "expiration_time",
            Tag::NotBefore => "not_before",
            Tag::RequestId => "request_id",
        }
    }

    pub const fn rule(self) -> Rule {
        match self {
            Tag::Uri => Rule::Uri,
            Tag::Version => Rule::Version,
            Tag::ChainId => Rule::ChainId,
            Tag::Nonce => Rule::Nonce,
            Tag::IssuedAt | Tag::ExpirationTime | Tag::NotBefore => Rule::DateTime,
            Tag::RequestId => Rule::RequestId,
        }
    }

    pub const fn is_optional(self) -> bool {
        matches!(self, Tag::ExpirationTime | Tag::NotBefore | Tag::RequestId)
    }
}

/// Anchored regex matching a complete message.
pub(crate) static MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&message_pattern()).expect("message grammar is a valid regex")
});

/// Compose the full message pattern from the header literals, [`Tag::BODY`]
/// and the resources block.
pub(crate) fn message_pattern() -> String {
    let mut pattern = format!(
        r"\A(?P<domain>{}) {}\n(?P<address>{})\n\n(?:(?P<statement>{})\n)?\n",
        Rule::Domain.pattern(),
        regex::escape(PREAMBLE),
        Rule::Address.pattern(),
        Rule::Statement.pattern(),
    );

    for (i, tag) in Tag::BODY.iter().enumerate() {
        let separator = if i == 0 { "" } else { r"\n" };
        let line = format!(
            "{separator}{}: (?P<{}>{})",
            regex::escape(tag.label()),
            tag.capture(),
            tag.rule().pattern()
        );
        if tag.is_optional() {
            pattern.push_str(&format!("(?:{line})?"));
        } else {
            pattern.push_str(&line);
        }
    }

    pattern.push_str(&format!(
        r"(?:\n{}(?P<resources>(?:\n{}(?:{}))+))?\z",
        regex::escape(RESOURCES_HEADER),
        regex::escape(RESOURCE_BULLET),
        Rule::Uri.pattern(),
    ));
    pattern
}
