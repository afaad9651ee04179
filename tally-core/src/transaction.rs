//! Transaction records as delivered by a banking feed

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::time::parse_timestamp;

/// A single banking transaction. Read-only input to the analyzers.
///
/// Feeds are loosely typed, so anything that may be missing or malformed
/// upstream is optional here and the analyzers decide how to treat it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Transaction {
    /// Opaque identifier from the source
    #[serde(default)]
    pub id: String,
    /// Direction of the money movement
    #[serde(rename = "type", default)]
    pub kind: TransactionKind,
    /// Non-negative amount; `None` when absent or not a number
    #[serde(default)]
    pub amount: Option<f64>,
    /// Free text, the primary categorization signal
    #[serde(default)]
    pub description: String,
    /// Counterparty, used when the description is blank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    /// RFC 3339 timestamp as received
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub currency: String,
}

/// Transaction direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Send,
    Receive,
    Deposit,
    Withdrawal,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TransactionKind {
    /// Parse a feed value; unrecognized values map to `Unknown`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "send" => Self::Send,
            "receive" => Self::Receive,
            "deposit" => Self::Deposit,
            "withdrawal" => Self::Withdrawal,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Receive => "receive",
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Unknown => "unknown",
        }
    }
}

impl Transaction {
    /// Create a transaction with the fields the analyzers care about
    pub fn new(
        id: impl Into<String>,
        kind: TransactionKind,
        amount: f64,
        description: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            amount: Some(amount),
            description: description.into(),
            recipient: None,
            date: Some(date.into()),
            status: "completed".to_string(),
            currency: "USD".to_string(),
        }
    }

    /// Set the recipient field
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    /// Money leaving the account
    pub fn is_outgoing(&self) -> bool {
        self.kind == TransactionKind::Send
    }

    /// Money entering the account
    pub fn is_incoming(&self) -> bool {
        self.kind == TransactionKind::Receive
    }

    /// Amount, with absent values counted as zero
    pub fn amount_or_zero(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }

    /// Parsed timestamp, `None` when absent or malformed
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.date.as_deref().and_then(parse_timestamp)
    }

    /// Payee label: description, then recipient, then "Unknown"
    pub fn merchant(&self) -> &str {
        if !self.description.is_empty() {
            return &self.description;
        }
        match self.recipient.as_deref() {
            Some(r) if !r.is_empty() => r,
            _ => "Unknown",
        }
    }
}
