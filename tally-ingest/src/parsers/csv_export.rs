//! Flat CSV transaction export
//!
//! Header row (column order is free, `recipient` optional):
//!   id,type,amount,description,date,status,currency,recipient

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Read;
use tally_core::{Transaction, TransactionKind};

/// Parse a CSV export into transactions.
/// Unparseable amounts become absent; blank rows are skipped.
pub fn parse_transactions_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: HashMap<String, usize> = rdr
        .headers()
        .context("reading CSV header")?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_ascii_lowercase(), i))
        .collect();

    let field = |record: &csv::StringRecord, name: &str| -> Option<String> {
        columns
            .get(name)
            .and_then(|&i| record.get(i))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut txns = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        txns.push(Transaction {
            id: field(&record, "id").unwrap_or_default(),
            kind: field(&record, "type")
                .map(|t| TransactionKind::parse(&t))
                .unwrap_or_default(),
            amount: field(&record, "amount").and_then(|a| a.parse().ok()),
            description: field(&record, "description").unwrap_or_default(),
            recipient: field(&record, "recipient"),
            date: field(&record, "date"),
            status: field(&record, "status").unwrap_or_default(),
            currency: field(&record, "currency").unwrap_or_default(),
        });
    }

    Ok(txns)
}
