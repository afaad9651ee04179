//! Actionable notes about detected subscriptions: overall cost, overlapping
//! services, likely-inactive payments and a savings tip.

use chrono::{DateTime, NaiveTime, Utc};

use crate::subscriptions::{total_monthly_cost, SubscriptionCandidate};

/// Days without a payment after which a sparse subscription looks inactive
const INACTIVE_AFTER_DAYS: f64 = 90.0;
/// Occurrences below which a subscription can be flagged as inactive
const INACTIVE_MAX_OCCURRENCES: usize = 3;
/// Monthly spend above which a savings tip is shown
const SAVINGS_TIP_THRESHOLD: f64 = 50.0;

/// Service buckets used to spot overlapping subscriptions, in report order.
/// A merchant may land in more than one bucket.
pub const SERVICE_BUCKETS: &[(&str, &[&str])] = &[
    (
        "streaming",
        &["netflix", "hulu", "disney", "prime", "spotify", "hbo", "apple tv", "youtube premium"],
    ),
    ("music", &["spotify", "apple music", "youtube music", "tidal", "pandora"]),
    ("cloud", &["dropbox", "google one", "icloud", "onedrive"]),
    ("fitness", &["peloton", "classpass", "apple fitness", "strava", "planet fitness"]),
    ("software", &["adobe", "github", "office"]),
];

/// Build the ordered warning list for a set of detected subscriptions.
pub fn generate_warnings(subscriptions: &[SubscriptionCandidate], now: DateTime<Utc>) -> Vec<String> {
    if subscriptions.is_empty() {
        return vec!["No subscriptions were detected in your transaction history.".to_string()];
    }

    let total = total_monthly_cost(subscriptions);
    let mut warnings = vec![format!(
        "You are spending approximately ${:.2} per month on subscriptions.",
        total
    )];

    for (bucket, keywords) in SERVICE_BUCKETS {
        let merchants: Vec<&str> = subscriptions
            .iter()
            .map(|s| s.merchant.as_str())
            .filter(|m| {
                let lower = m.to_lowercase();
                keywords.iter().any(|k| lower.contains(k))
            })
            .collect();

        if merchants.len() > 1 {
            warnings.push(format!(
                "You have multiple {} subscriptions: {}. Consider consolidating.",
                bucket,
                merchants.join(", ")
            ));
        }
    }

    for sub in subscriptions {
        if sub.occurrences >= INACTIVE_MAX_OCCURRENCES {
            continue;
        }
        let last_paid = sub.last_occurrence.and_time(NaiveTime::MIN).and_utc();
        let idle_days = (now - last_paid).num_seconds() as f64 / 86_400.0;
        if idle_days > INACTIVE_AFTER_DAYS {
            warnings.push(format!(
                "Subscription to '{}' seems inactive (last paid {}). Consider cancelling if you no longer use it.",
                sub.merchant,
                sub.last_occurrence.format("%Y-%m-%d")
            ));
        }
    }

    if total > SAVINGS_TIP_THRESHOLD {
        let savings = (total * 0.1 * 100.0).round() / 100.0;
        warnings.push(format!(
            "Tip: Cancelling just 10% of your subscriptions could save you ${:.2} monthly!",
            savings
        ));
    }

    warnings
}
