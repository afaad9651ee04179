//! Banking API transaction feed (JSON)
//!
//! The `get_transactions` payload looks like:
//!   {"transactions": [{"id": "...", "type": "send", "amount": 15.99,
//!                      "description": "...", "date": "2026-01-15T10:00:00Z", ...}]}
//!
//! Entries are loosely typed. A field holding the wrong JSON type is treated
//! as absent instead of failing the whole feed.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use tally_core::{Transaction, TransactionKind};
use tracing::debug;

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn transaction_from_object(obj: &Map<String, Value>) -> Transaction {
    Transaction {
        id: str_field(obj, "id").unwrap_or_default(),
        kind: str_field(obj, "type")
            .map(|t| TransactionKind::parse(&t))
            .unwrap_or_default(),
        amount: obj.get("amount").and_then(Value::as_f64),
        description: str_field(obj, "description").unwrap_or_default(),
        recipient: str_field(obj, "recipient"),
        date: str_field(obj, "date"),
        status: str_field(obj, "status").unwrap_or_default(),
        currency: str_field(obj, "currency").unwrap_or_default(),
    }
}

/// Parse a feed payload into transactions.
///
/// Accepts the `{"transactions": [...]}` envelope or a bare array.
/// Non-object entries are skipped.
pub fn parse_transactions_json(text: &str) -> Result<Vec<Transaction>> {
    let value: Value = serde_json::from_str(text).context("parse transaction feed JSON")?;

    let entries = match &value {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get("transactions") {
            Some(Value::Array(items)) => items,
            // Envelope without a usable list: nothing to analyze
            _ => return Ok(Vec::new()),
        },
        _ => bail!("transaction feed must be an object or an array"),
    };

    let txns: Vec<Transaction> = entries
        .iter()
        .filter_map(Value::as_object)
        .map(transaction_from_object)
        .collect();

    let skipped = entries.len() - txns.len();
    if skipped > 0 {
        debug!("Skipped {} non-object feed entries", skipped);
    }

    Ok(txns)
}
