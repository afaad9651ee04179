//! Spending summary: category breakdown, cash flow, velocity and insights.

use serde::Serialize;
use std::collections::BTreeMap;
use tally_core::{categorize, Category, Transaction};
use tracing::debug;

/// How many categories a summary keeps
pub const TOP_CATEGORIES: usize = 5;

/// Result of a spending analysis
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SpendingSummary {
    /// No transactions at all; numeric fields are skipped
    Empty { summary: String },
    Report(SpendingReport),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpendingReport {
    pub total_spent: f64,
    pub total_received: f64,
    pub net_cash_flow: f64,
    pub spend_count: usize,
    pub receive_count: usize,
    pub avg_daily_spend: f64,
    pub velocity: Velocity,
    pub top_categories: Vec<CategorySummary>,
    pub insights: Vec<String>,
}

/// Aggregate outgoing spend for one category
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategorySummary {
    pub category: Category,
    pub amount: f64,
    pub count: usize,
    /// Share of total spend, 0–100
    pub percentage: f64,
}

/// Qualitative rate of spending transactions per week
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Velocity {
    Low,
    Moderate,
    High,
}

impl Velocity {
    /// Classify from a count of spending transactions over `days`
    pub fn classify(spend_count: usize, days: u32) -> Self {
        let per_week = spend_count as f64 / days as f64 * 7.0;
        if per_week < 2.0 {
            Velocity::Low
        } else if per_week < 7.0 {
            Velocity::Moderate
        } else {
            Velocity::High
        }
    }
}

impl SpendingSummary {
    pub fn report(&self) -> Option<&SpendingReport> {
        match self {
            SpendingSummary::Report(r) => Some(r),
            SpendingSummary::Empty { .. } => None,
        }
    }
}

/// Summarize spending over a window of `days`.
///
/// Only `send` counts as spend and only `receive` as income. Absent amounts
/// count as zero.
pub fn analyze_spending(transactions: &[Transaction], days: u32) -> SpendingSummary {
    if transactions.is_empty() {
        return SpendingSummary::Empty {
            summary: "No transactions found in the specified period".to_string(),
        };
    }

    let mut total_spent = 0.0;
    let mut total_received = 0.0;
    let mut spend_count = 0;
    let mut receive_count = 0;
    let mut by_category: BTreeMap<Category, (f64, usize)> = BTreeMap::new();

    for tx in transactions {
        let amount = tx.amount_or_zero();
        if tx.is_outgoing() {
            total_spent += amount;
            spend_count += 1;
            let entry = by_category.entry(categorize(&tx.description)).or_default();
            entry.0 += amount;
            entry.1 += 1;
        } else if tx.is_incoming() {
            total_received += amount;
            receive_count += 1;
        }
    }

    let avg_daily_spend = total_spent / days as f64;
    let net_cash_flow = total_received - total_spent;

    let mut categories: Vec<CategorySummary> = by_category
        .into_iter()
        .map(|(category, (amount, count))| CategorySummary {
            category,
            amount,
            count,
            percentage: if total_spent > 0.0 {
                amount / total_spent * 100.0
            } else {
                0.0
            },
        })
        .collect();
    // Stable sort: equal amounts stay in category order
    categories.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    categories.truncate(TOP_CATEGORIES);

    debug!(
        "Spending analysis: {} sent, {} received, {} categories over {} days",
        spend_count,
        receive_count,
        categories.len(),
        days
    );

    let mut insights = vec![
        format!("You made {} spending transactions over {} days", spend_count, days),
        format!("Average daily spend: ${:.2}", avg_daily_spend),
    ];

    if net_cash_flow > 0.0 {
        insights.push(format!(
            "Great! You're cash flow positive with ${:.2} net income",
            net_cash_flow
        ));
    } else if net_cash_flow < 0.0 {
        insights.push(format!(
            "You spent ${:.2} more than you received this period",
            net_cash_flow.abs()
        ));
    }

    if let Some(top) = categories.first() {
        insights.push(format!(
            "Your biggest spending category is {} ({:.0}% of spending)",
            top.category, top.percentage
        ));
    }

    SpendingSummary::Report(SpendingReport {
        total_spent,
        total_received,
        net_cash_flow,
        spend_count,
        receive_count,
        avg_daily_spend,
        velocity: Velocity::classify(spend_count, days),
        top_categories: categories,
        insights,
    })
}
