//! tally-core: Core types and utilities for Tally spending analytics

pub mod error;
pub mod time;
pub mod transaction;

pub use error::{Error, Result};
pub use transaction::{Transaction, TransactionKind};

/// Utility for categorizing transaction descriptions
pub mod categorizer {
    use serde::{Deserialize, Serialize};
    use std::fmt;

    /// Spending categories, declared in match priority order
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum Category {
        #[serde(rename = "Food & Dining")]
        FoodAndDining,
        #[serde(rename = "Transportation")]
        Transportation,
        #[serde(rename = "Shopping")]
        Shopping,
        #[serde(rename = "Entertainment")]
        Entertainment,
        #[serde(rename = "Bills & Utilities")]
        BillsAndUtilities,
        #[serde(rename = "Other")]
        Other,
    }

    impl Category {
        pub fn as_str(&self) -> &'static str {
            match self {
                Category::FoodAndDining => "Food & Dining",
                Category::Transportation => "Transportation",
                Category::Shopping => "Shopping",
                Category::Entertainment => "Entertainment",
                Category::BillsAndUtilities => "Bills & Utilities",
                Category::Other => "Other",
            }
        }
    }

    impl fmt::Display for Category {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    /// Keyword table, evaluated top to bottom. First hit wins.
    pub const CATEGORY_RULES: &[(Category, &[&str])] = &[
        (
            Category::FoodAndDining,
            &["starbucks", "coffee", "chipotle", "pizza", "food", "doordash", "restaurant", "cafe"],
        ),
        (Category::Transportation, &["uber", "lyft", "gas", "metro", "parking"]),
        (Category::Shopping, &["amazon", "target", "nike", "store"]),
        (
            Category::Entertainment,
            &["netflix", "spotify", "movie", "steam", "hulu", "disney"],
        ),
        (Category::BillsAndUtilities, &["bill", "electric", "internet", "phone"]),
    ];

    /// Categorize a description by case-insensitive keyword match
    pub fn categorize(description: &str) -> Category {
        let desc = description.to_lowercase();

        CATEGORY_RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| desc.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Other)
    }

}

pub use categorizer::{categorize, Category};
