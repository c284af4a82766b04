use crate::{
    crypto::nonce::generate_nonce,
    error::{Result, SiweError},
    grammar::Rule,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Chain ID used when none is supplied (Ethereum mainnet).
pub const DEFAULT_CHAIN_ID: &str = "1";

/// Optional construction parameters for a [`Message`](crate::Message)
///
/// Every slot may be left empty. [`MessageOptions::resolve`] fills in
/// defaults for the required ones and checks every supplied value against
/// its grammar rule:
/// - `issued_at` defaults to the current UTC time
/// - `nonce` defaults to a freshly generated random token
/// - `chain_id` defaults to `"1"`
///
/// Blank strings count as absent. The serde field names match the
/// camelCase keys used by SIWE clients, so options can be loaded straight
/// from a JSON request body.
///
/// # Example
/// ```rust
/// use siwe_message::MessageOptions;
///
/// let options = MessageOptions::new()
///     .with_chain_id("137")
///     .with_statement("I accept the Terms of Service")
///     .with_resource("https://example.com/terms");
///
/// let resolved = options.resolve().unwrap();
/// assert_eq!(resolved.chain_id(), "137");
/// assert_eq!(resolved.nonce().len(), 17);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageOptions {
    /// RFC 3339 time the message was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    /// At least 8 alphanumeric characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// EIP-155 chain ID in decimal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    /// Human-readable single-line assertion shown to the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// URIs the user wishes to have resolved as part of authentication
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

/// Fully populated options, produced only by [`MessageOptions::resolve`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub(crate) issued_at: String,
    pub(crate) nonce: String,
    pub(crate) chain_id: String,
    pub(crate) statement: Option<String>,
    pub(crate) expiration_time: Option<String>,
    pub(crate) not_before: Option<String>,
    pub(crate) request_id: Option<String>,
    pub(crate) resources: Vec<String>,
}

impl MessageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON document with camelCase keys
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = Some(format_timestamp(issued_at));
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn with_chain_id(mut self, chain_id: impl ToString) -> Self {
        self.chain_id = Some(chain_id.to_string());
        self
    }

    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = Some(statement.into());
        self
    }

    pub fn with_expiration_time(mut self, expiration_time: DateTime<Utc>) -> Self {
        self.expiration_time = Some(format_timestamp(expiration_time));
        self
    }

    pub fn with_not_before(mut self, not_before: DateTime<Utc>) -> Self {
        self.not_before = Some(format_timestamp(not_before));
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resources.push(resource.into());
        self
    }

    /// Resolve defaults against the current time and a random nonce
    ///
    /// # Errors
    /// - `InvalidField` - A supplied value does not match its field's grammar
    pub fn resolve(self) -> Result<ResolvedOptions> {
        self.resolve_with(Utc::now(), generate_nonce)
    }

    /// Resolve defaults against an explicit time and nonce source
    ///
    /// `nonce_source` is only called when no nonce was supplied; its output is
    /// checked like any supplied value.
    pub fn resolve_with<F>(self, now: DateTime<Utc>, nonce_source: F) -> Result<ResolvedOptions>
    where
        F: FnOnce() -> String,
    {
        let issued_at = present(self.issued_at).unwrap_or_else(|| format_timestamp(now));
        let nonce = present(self.nonce).unwrap_or_else(nonce_source);
        let chain_id = present(self.chain_id).unwrap_or_else(|| DEFAULT_CHAIN_ID.to_string());

        let resources = self
            .resources
            .into_iter()
            .map(|resource| check("resources", Rule::Uri, resource))
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedOptions {
            issued_at: check("issuedAt", Rule::DateTime, issued_at)?,
            nonce: check("nonce", Rule::Nonce, nonce)?,
            chain_id: check("chainId", Rule::ChainId, chain_id)?,
            statement: check_optional("statement", Rule::Statement, self.statement)?,
            expiration_time: check_optional("expirationTime", Rule::DateTime, self.expiration_time)?,
            not_before: check_optional("notBefore", Rule::DateTime, self.not_before)?,
            request_id: check_optional("requestId", Rule::RequestId, self.request_id)?,
            resources,
        })
    }
}

impl ResolvedOptions {
    pub fn issued_at(&self) -> &str {
        &self.issued_at
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
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

/// Render a UTC instant as RFC 3339 with millisecond precision and `Z`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn check(field: &'static str, rule: Rule, value: String) -> Result<String> {
    if rule.is_match(&value) {
        Ok(value)
    } else {
        Err(SiweError::InvalidField { field, value })
    }
}

fn check_optional(field: &'static str, rule: Rule, value: Option<String>) -> Result<Option<String>> {
    present(value).map(|v| check(field, rule, v)).transpose()
}
