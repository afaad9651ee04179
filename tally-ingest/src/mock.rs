//! Synthetic transaction generators for demo ("mock") mode.
//!
//! Generators take the RNG and the reference time as arguments so a seeded
//! RNG reproduces the same data.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::Rng;
use tally_core::{Transaction, TransactionKind};

struct Template {
    description: &'static str,
    amount: f64,
    kind: TransactionKind,
}

const fn send(description: &'static str, amount: f64) -> Template {
    Template { description, amount, kind: TransactionKind::Send }
}

const fn receive(description: &'static str, amount: f64) -> Template {
    Template { description, amount, kind: TransactionKind::Receive }
}

const SPENDING_TEMPLATES: &[Template] = &[
    // Food & Dining
    send("Starbucks Coffee", 8.50),
    send("Chipotle Mexican Grill", 15.75),
    send("Whole Foods Market", 67.30),
    send("DoorDash - Pizza Delivery", 32.50),
    send("Local Coffee Shop", 6.25),
    // Transportation
    send("Uber Ride", 18.50),
    send("Gas Station", 45.00),
    send("Lyft Ride", 22.75),
    send("Metro Card Reload", 30.00),
    // Shopping
    send("Amazon.com", 89.99),
    send("Target Store", 54.25),
    send("Nike Store", 125.00),
    // Entertainment
    send("Netflix Subscription", 15.99),
    send("Spotify Premium", 10.99),
    send("Movie Theater", 28.50),
    send("Steam Games", 59.99),
    // Bills
    send("Electric Bill Payment", 125.50),
    send("Internet Service", 79.99),
    send("Phone Bill", 65.00),
    // Income
    receive("Payroll Deposit", 2500.00),
    receive("Freelance Payment", 450.00),
    receive("Refund from Amazon", 29.99),
    receive("Payment from @alice", 75.00),
];

struct Recurring {
    merchant: &'static str,
    amount: f64,
    period_days: i64,
}

const RECURRING_TEMPLATES: &[Recurring] = &[
    Recurring { merchant: "Netflix Subscription", amount: 15.99, period_days: 30 },
    Recurring { merchant: "Spotify Premium", amount: 10.99, period_days: 30 },
    Recurring { merchant: "Amazon Prime", amount: 14.99, period_days: 30 },
    Recurring { merchant: "Adobe Creative Cloud", amount: 54.99, period_days: 30 },
    Recurring { merchant: "Planet Fitness", amount: 24.99, period_days: 30 },
    Recurring { merchant: "New York Times Digital", amount: 17.00, period_days: 30 },
    Recurring { merchant: "Hulu (No Ads)", amount: 17.99, period_days: 30 },
    Recurring { merchant: "iCloud Storage 200GB", amount: 2.99, period_days: 30 },
    Recurring { merchant: "GitHub Pro", amount: 7.00, period_days: 30 },
    Recurring { merchant: "Dropbox Plus", amount: 11.99, period_days: 30 },
    Recurring { merchant: "Annual Software License", amount: 299.00, period_days: 365 },
    Recurring { merchant: "Quarterly Insurance", amount: 450.00, period_days: 90 },
    Recurring { merchant: "Biweekly Meal Delivery", amount: 89.99, period_days: 14 },
];

const ONE_TIME_PURCHASES: &[&str] = &[
    "Whole Foods Market",
    "Target Store",
    "Uber Ride",
    "Amazon.com",
    "Starbucks Coffee",
    "Gas Station",
];

fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn mock_tx(id: String, kind: TransactionKind, amount: f64, description: &str, at: DateTime<Utc>) -> Transaction {
    Transaction::new(id, kind, amount, description, rfc3339(at))
}

/// 30–40 random transactions spread over the last `days` days,
/// amounts within ±20% of their template.
pub fn mock_spending_transactions<R: Rng>(rng: &mut R, now: DateTime<Utc>, days: u32) -> Vec<Transaction> {
    let days = days.max(1) as i64;
    let count = rng.gen_range(30..=40);

    (0..count)
        .map(|i| {
            let t = &SPENDING_TEMPLATES[rng.gen_range(0..SPENDING_TEMPLATES.len())];
            let days_ago = rng.gen_range(0..days);
            let variance = 0.8 + rng.r#gen::<f64>() * 0.4;
            mock_tx(
                format!("tx_mock_{i}"),
                t.kind,
                round_cents(t.amount * variance),
                t.description,
                now - Duration::days(days_ago),
            )
        })
        .collect()
}

/// 5–8 recurring payments repeated at their period over `months × 30` days,
/// plus 20 one-off purchases.
///
/// Each selected subscription gets a single price within ±2% of its
/// template, held for all of its charges.
pub fn mock_subscription_transactions<R: Rng>(
    rng: &mut R,
    now: DateTime<Utc>,
    months: u32,
) -> Vec<Transaction> {
    let span_days = (months.max(1) * 30) as i64;
    let mut txns = Vec::new();

    let picks = rng.gen_range(5..=8);
    for _ in 0..picks {
        let sub = &RECURRING_TEMPLATES[rng.gen_range(0..RECURRING_TEMPLATES.len())];
        let variance = 0.98 + rng.r#gen::<f64>() * 0.04;
        let amount = round_cents(sub.amount * variance);

        let occurrences = span_days / sub.period_days;
        for j in 0..occurrences {
            let days_ago = j * sub.period_days;
            txns.push(mock_tx(
                format!("tx_sub_{}_{}", sub.merchant, j),
                TransactionKind::Send,
                amount,
                sub.merchant,
                now - Duration::days(days_ago),
            ));
        }
    }

    for i in 0..20 {
        let purchase = ONE_TIME_PURCHASES[rng.gen_range(0..ONE_TIME_PURCHASES.len())];
        let days_ago = rng.gen_range(0..span_days);
        let amount = 10.0 + rng.r#gen::<f64>() * 90.0;
        txns.push(mock_tx(
            format!("tx_once_{i}"),
            TransactionKind::Send,
            round_cents(amount),
            purchase,
            now - Duration::days(days_ago),
        ));
    }

    txns
}
