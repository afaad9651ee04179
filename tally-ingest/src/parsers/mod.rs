pub mod csv_export;
pub mod json_feed;

pub use csv_export::parse_transactions_csv;
pub use json_feed::parse_transactions_json;
