use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk shape of a transaction source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedFormat {
    /// Banking API payload: `{"transactions": [...]}` or a bare array
    Json,
    /// Flat export with a header row
    Csv,
}

impl FeedFormat {
    /// Pick a format from the file extension; anything but `.csv` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => FeedFormat::Csv,
            _ => FeedFormat::Json,
        }
    }
}
