//! tally-ingest: transaction loaders (JSON feed, CSV export) and synthetic data generators.

pub mod mock;
pub mod parsers;
pub mod types;

pub use mock::{mock_spending_transactions, mock_subscription_transactions};
pub use parsers::{parse_transactions_csv, parse_transactions_json};
pub use types::FeedFormat;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tally_core::Transaction;
use tracing::info;

/// Load transactions from a file, choosing the parser by extension.
pub fn load_transactions(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let format = FeedFormat::from_path(path);

    let txns = match format {
        FeedFormat::Csv => {
            let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
            parse_transactions_csv(file).with_context(|| format!("parsing {}", path.display()))?
        }
        FeedFormat::Json => {
            let text =
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            parse_transactions_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
    };

    info!("Loaded {} transactions from {} ({:?})", txns.len(), path.display(), format);
    Ok(txns)
}
