//! Recurring payment detection.
//!
//! Outgoing payments are grouped by (merchant, amount in cents). A group with
//! at least two occurrences whose gaps are regular enough is reported as a
//! subscription, with an inferred billing frequency, next-payment estimate
//! and confidence.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tally_core::Transaction;
use tally_core::time::{add_months, whole_days_between};
use tracing::{debug, info};

use crate::warnings::generate_warnings;

pub const DEFAULT_MIN_AMOUNT: f64 = 1.00;
pub const DEFAULT_MAX_AMOUNT: f64 = 999.99;

/// Allowed deviation of an interval from the mean, as a fraction of the mean
const INTERVAL_TOLERANCE: f64 = 0.2;
/// Share of intervals that must fall within tolerance
const REGULAR_SHARE: f64 = 0.7;

/// Billing frequency inferred from the mean payment interval
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    Irregular,
    Unknown,
}

impl Frequency {
    /// Classify a mean interval in days. Ranges are inclusive and overlap at
    /// 7 days, so the check order matters: longer periods first, then
    /// biweekly before weekly.
    pub fn from_mean_interval(avg_days: f64) -> Self {
        let within = |lo: f64, hi: f64| avg_days >= lo && avg_days <= hi;

        if within(25.0, 35.0) {
            Frequency::Monthly
        } else if within(80.0, 100.0) {
            Frequency::Quarterly
        } else if within(170.0, 190.0) {
            Frequency::SemiAnnual
        } else if within(350.0, 380.0) {
            Frequency::Annual
        } else if within(7.0, 14.0) {
            Frequency::Biweekly
        } else if within(1.0, 7.0) {
            Frequency::Weekly
        } else {
            Frequency::Irregular
        }
    }

    /// Classify a list of day intervals; an empty list is `Unknown`
    pub fn detect(intervals: &[i64]) -> Self {
        match mean(intervals) {
            Some(avg) => Self::from_mean_interval(avg),
            None => Frequency::Unknown,
        }
    }

    /// Date of the next payment after `last`, `None` when the frequency has no period
    pub fn next_after(&self, last: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => last.checked_add_signed(Duration::days(7)),
            Frequency::Biweekly => last.checked_add_signed(Duration::days(14)),
            Frequency::Monthly => add_months(last, 1),
            Frequency::Quarterly => add_months(last, 3),
            Frequency::SemiAnnual => add_months(last, 6),
            Frequency::Annual => add_months(last, 12),
            Frequency::Irregular | Frequency::Unknown => None,
        }
    }

    /// Normalize one payment of `amount` to a monthly cost.
    ///
    /// Weekly and biweekly use the rounded factors 4.333 and 2.167.
    pub fn monthly_equivalent(&self, amount: f64) -> f64 {
        match self {
            Frequency::Monthly => amount,
            Frequency::Quarterly => amount / 3.0,
            Frequency::SemiAnnual => amount / 6.0,
            Frequency::Annual => amount / 12.0,
            Frequency::Biweekly => amount * 2.167,
            Frequency::Weekly => amount * 4.333,
            Frequency::Irregular | Frequency::Unknown => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::SemiAnnual => "semi-annual",
            Frequency::Annual => "annual",
            Frequency::Irregular => "irregular",
            Frequency::Unknown => "unknown",
        }
    }
}

/// How sure the detector is that a candidate is a real subscription
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// High needs 4+ occurrences and a regular pattern, medium 3+.
    ///
    /// Candidates only reach scoring after passing the regularity test, so
    /// the re-check here never fails in practice.
    pub fn assess(occurrences: usize, intervals: &[i64]) -> Self {
        if occurrences >= 4 && is_regular_pattern(intervals) {
            Confidence::High
        } else if occurrences >= 3 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// A detected recurring payment
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubscriptionCandidate {
    pub merchant: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub occurrences: usize,
    /// Local calendar dates of each payment, oldest first
    pub dates: Vec<NaiveDate>,
    pub last_occurrence: NaiveDate,
    #[serde(serialize_with = "serialize_next_payment")]
    pub estimated_next: Option<NaiveDate>,
    pub total_paid: f64,
    pub confidence: Confidence,
}

fn serialize_next_payment<S: Serializer>(next: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
    match next {
        Some(date) => s.collect_str(&date.format("%Y-%m-%d")),
        None => s.serialize_str("unknown"),
    }
}

/// Output of a subscription analysis
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubscriptionReport {
    pub subscriptions: Vec<SubscriptionCandidate>,
    pub total_monthly_cost: f64,
    pub warnings: Vec<String>,
}

fn mean(intervals: &[i64]) -> Option<f64> {
    if intervals.is_empty() {
        return None;
    }
    Some(intervals.iter().sum::<i64>() as f64 / intervals.len() as f64)
}

/// Whether payment gaps form a recurring pattern: at least 70% of intervals
/// lie within 20% of the mean interval.
pub fn is_regular_pattern(intervals: &[i64]) -> bool {
    let Some(avg) = mean(intervals) else {
        return false;
    };

    let tolerance = avg * INTERVAL_TOLERANCE;
    let within = intervals
        .iter()
        .filter(|&&i| (i as f64 - avg).abs() <= tolerance)
        .count();

    within as f64 / intervals.len() as f64 >= REGULAR_SHARE
}

/// Amount quantized to whole cents
/// Whole cents, with exact half-cent ties going to the even cent
fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round_ties_even() as i64
}

/// Find recurring payments among outgoing transactions dated at or after
/// `cutoff` with an amount in `[min_amount, max_amount]`.
///
/// Transactions without an amount or a parseable date are skipped.
/// Results are ordered by merchant, then amount.
pub fn detect_subscriptions(
    transactions: &[Transaction],
    cutoff: DateTime<Utc>,
    min_amount: f64,
    max_amount: f64,
) -> Vec<SubscriptionCandidate> {
    let mut groups: BTreeMap<(String, i64), Vec<DateTime<FixedOffset>>> = BTreeMap::new();

    for tx in transactions {
        if !tx.is_outgoing() {
            continue;
        }
        let Some(amount) = tx.amount else { continue };
        if amount < min_amount || amount > max_amount {
            continue;
        }
        let Some(ts) = tx.timestamp() else { continue };
        if ts.with_timezone(&Utc) < cutoff {
            continue;
        }

        groups
            .entry((tx.merchant().to_string(), to_cents(amount)))
            .or_default()
            .push(ts);
    }

    let group_count = groups.len();
    let mut subscriptions = Vec::new();

    for ((merchant, cents), mut stamps) in groups {
        if stamps.len() < 2 {
            continue;
        }

        stamps.sort();
        let intervals: Vec<i64> = stamps
            .windows(2)
            .map(|w| whole_days_between(w[0], w[1]))
            .collect();

        if !is_regular_pattern(&intervals) {
            debug!("Skipping {} @ {} cents - irregular intervals {:?}", merchant, cents, intervals);
            continue;
        }

        let amount = cents as f64 / 100.0;
        let frequency = Frequency::detect(&intervals);
        let dates: Vec<NaiveDate> = stamps.iter().map(|ts| ts.date_naive()).collect();
        // Safe: groups hold at least two stamps here
        let last_occurrence = dates[dates.len() - 1];
        let occurrences = dates.len();

        debug!(
            "Found subscription: {} @ ${:.2}/{} ({} payments)",
            merchant,
            amount,
            frequency.as_str(),
            occurrences
        );

        subscriptions.push(SubscriptionCandidate {
            merchant,
            amount,
            frequency,
            occurrences,
            last_occurrence,
            estimated_next: frequency.next_after(last_occurrence),
            total_paid: amount * occurrences as f64,
            confidence: Confidence::assess(occurrences, &intervals),
            dates,
        });
    }

    info!(
        "Subscription scan: {} transactions, {} payment groups, {} subscriptions",
        transactions.len(),
        group_count,
        subscriptions.len()
    );

    subscriptions
}

/// Sum of every subscription's monthly equivalent, rounded to cents
pub fn total_monthly_cost(subscriptions: &[SubscriptionCandidate]) -> f64 {
    let total: f64 = subscriptions
        .iter()
        .map(|s| s.frequency.monthly_equivalent(s.amount))
        .sum();
    (total * 100.0).round() / 100.0
}

/// Detect subscriptions and summarize their cost, using the current time
/// for inactivity warnings.
pub fn analyze_subscriptions(
    transactions: &[Transaction],
    cutoff: DateTime<Utc>,
    min_amount: f64,
    max_amount: f64,
) -> SubscriptionReport {
    analyze_subscriptions_at(transactions, cutoff, min_amount, max_amount, Utc::now())
}

/// Same as [`analyze_subscriptions`] with an explicit "now"
pub fn analyze_subscriptions_at(
    transactions: &[Transaction],
    cutoff: DateTime<Utc>,
    min_amount: f64,
    max_amount: f64,
    now: DateTime<Utc>,
) -> SubscriptionReport {
    let subscriptions = detect_subscriptions(transactions, cutoff, min_amount, max_amount);
    let total_monthly_cost = total_monthly_cost(&subscriptions);
    let warnings = generate_warnings(&subscriptions, now);

    SubscriptionReport {
        subscriptions,
        total_monthly_cost,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tally_core::TransactionKind;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn charge(merchant: &str, amount: f64, date: NaiveDate) -> Transaction {
        Transaction::new(
            "t",
            TransactionKind::Send,
            amount,
            merchant,
            format!("{}T09:30:00Z", date.format("%Y-%m-%d")),
        )
    }

    /// `count` charges starting at `start`, `gap_days` apart
    fn series(merchant: &str, amount: f64, start: NaiveDate, gap_days: i64, count: usize) -> Vec<Transaction> {
        (0..count)
            .map(|i| charge(merchant, amount, start + Duration::days(gap_days * i as i64)))
            .collect()
    }

    fn early_cutoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn detect(txns: &[Transaction]) -> Vec<SubscriptionCandidate> {
        detect_subscriptions(txns, early_cutoff(), DEFAULT_MIN_AMOUNT, DEFAULT_MAX_AMOUNT)
    }

    #[test]
    fn test_regularity() {
        assert!(is_regular_pattern(&[30, 30, 30]));
        // avg 35, tolerance 7: both gaps 5 away
        assert!(is_regular_pattern(&[30, 40]));
        assert!(!is_regular_pattern(&[10, 60, 5]));
        assert!(!is_regular_pattern(&[]));
        // avg 34.5, tolerance 6.9: exactly 7 of 10 gaps within
        assert!(is_regular_pattern(&[30, 30, 30, 30, 30, 30, 30, 45, 45, 45]));
        // avg 36, tolerance 7.2: only 6 of 10
        assert!(!is_regular_pattern(&[30, 30, 30, 30, 30, 30, 45, 45, 45, 45]));
    }

    #[test]
    fn test_frequency_ranges_and_order() {
        assert_eq!(Frequency::from_mean_interval(25.0), Frequency::Monthly);
        assert_eq!(Frequency::from_mean_interval(35.0), Frequency::Monthly);
        assert_eq!(Frequency::from_mean_interval(90.0), Frequency::Quarterly);
        assert_eq!(Frequency::from_mean_interval(180.0), Frequency::SemiAnnual);
        assert_eq!(Frequency::from_mean_interval(365.0), Frequency::Annual);
        assert_eq!(Frequency::from_mean_interval(14.0), Frequency::Biweekly);
        // 7 sits in both the weekly and biweekly ranges; biweekly is checked first
        assert_eq!(Frequency::from_mean_interval(7.0), Frequency::Biweekly);
        assert_eq!(Frequency::from_mean_interval(6.5), Frequency::Weekly);
        assert_eq!(Frequency::from_mean_interval(1.0), Frequency::Weekly);
        assert_eq!(Frequency::from_mean_interval(20.0), Frequency::Irregular);
        assert_eq!(Frequency::from_mean_interval(0.0), Frequency::Irregular);
        assert_eq!(Frequency::detect(&[]), Frequency::Unknown);
    }

    #[test]
    fn test_next_payment_is_calendar_based() {
        let last = day(2026, 1, 31);
        assert_eq!(Frequency::Weekly.next_after(last), Some(day(2026, 2, 7)));
        assert_eq!(Frequency::Biweekly.next_after(last), Some(day(2026, 2, 14)));
        assert_eq!(Frequency::Monthly.next_after(day(2026, 1, 15)), Some(day(2026, 2, 15)));
        assert_eq!(Frequency::Quarterly.next_after(day(2026, 1, 15)), Some(day(2026, 4, 15)));
        assert_eq!(Frequency::SemiAnnual.next_after(day(2026, 1, 15)), Some(day(2026, 7, 15)));
        assert_eq!(Frequency::Annual.next_after(day(2026, 1, 15)), Some(day(2027, 1, 15)));
        // Short target months roll over instead of clamping
        assert_eq!(Frequency::Monthly.next_after(last), Some(day(2026, 3, 3)));
        assert_eq!(Frequency::Quarterly.next_after(day(2025, 11, 30)), Some(day(2026, 3, 2)));
        assert_eq!(Frequency::Annual.next_after(day(2024, 2, 29)), Some(day(2025, 3, 1)));
        assert_eq!(Frequency::Irregular.next_after(last), None);
        assert_eq!(Frequency::Unknown.next_after(last), None);
    }

    #[test]
    fn test_confidence_rule() {
        assert_eq!(Confidence::assess(4, &[30, 30, 30]), Confidence::High);
        assert_eq!(Confidence::assess(3, &[30, 30]), Confidence::Medium);
        assert_eq!(Confidence::assess(2, &[30]), Confidence::Low);
        // Irregular gaps with many occurrences drop to medium
        assert_eq!(Confidence::assess(4, &[10, 60, 5]), Confidence::Medium);
    }

    #[test]
    fn test_netflix_monthly_high_confidence() {
        let txns = series("Netflix Subscription", 15.99, day(2026, 1, 1), 30, 4);
        let subs = detect(&txns);
        assert_eq!(subs.len(), 1);

        let s = &subs[0];
        assert_eq!(s.merchant, "Netflix Subscription");
        assert_eq!(s.amount, 15.99);
        assert_eq!(s.frequency, Frequency::Monthly);
        assert_eq!(s.occurrences, 4);
        assert_eq!(s.last_occurrence, day(2026, 4, 1));
        assert_eq!(s.estimated_next, Some(day(2026, 5, 1)));
        assert_eq!(s.confidence, Confidence::High);
        assert_eq!(s.dates.first(), Some(&day(2026, 1, 1)));
        assert!((s.total_paid - 63.96).abs() < 1e-9);
    }

    #[test]
    fn test_gaps_of_30_and_40_are_monthly() {
        let txns = vec![
            charge("Gym", 24.99, day(2026, 1, 1)),
            charge("Gym", 24.99, day(2026, 1, 31)),
            charge("Gym", 24.99, day(2026, 3, 12)),
        ];
        let subs = detect(&txns);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].frequency, Frequency::Monthly);
        assert_eq!(subs[0].confidence, Confidence::Medium);
    }

    #[test]
    fn test_irregular_group_is_excluded() {
        let txns = vec![
            charge("Corner Deli", 12.0, day(2026, 1, 1)),
            charge("Corner Deli", 12.0, day(2026, 1, 11)),
            charge("Corner Deli", 12.0, day(2026, 3, 12)),
            charge("Corner Deli", 12.0, day(2026, 3, 17)),
        ];
        assert!(detect(&txns).is_empty());
    }

    #[test]
    fn test_grouping_uses_rounded_cents() {
        let txns = vec![
            charge("Spotify Premium", 9.99, day(2026, 1, 5)),
            charge("Spotify Premium", 9.994, day(2026, 2, 4)),
        ];
        let subs = detect(&txns);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].occurrences, 2);
        assert_eq!(subs[0].amount, 9.99);
        assert_eq!(subs[0].confidence, Confidence::Low);

        let split = vec![
            charge("Spotify Premium", 9.99, day(2026, 1, 5)),
            charge("Spotify Premium", 10.00, day(2026, 2, 4)),
        ];
        assert!(detect(&split).is_empty());
    }

    #[test]
    fn test_filters() {
        let mut txns = series("Netflix", 15.99, day(2026, 1, 1), 30, 3);

        // Incoming payments never count
        let mut incoming = series("Netflix", 15.99, day(2025, 6, 1), 30, 3);
        for tx in &mut incoming {
            tx.kind = TransactionKind::Receive;
        }
        txns.extend(incoming);

        // Out of amount range
        txns.extend(series("Big Lease", 1500.0, day(2026, 1, 1), 30, 3));
        txns.extend(series("Tiny Fee", 0.50, day(2026, 1, 1), 30, 3));

        // Malformed records are skipped silently
        let mut no_date = charge("Netflix", 15.99, day(2026, 5, 1));
        no_date.date = Some("yesterday".to_string());
        let mut no_amount = charge("Netflix", 15.99, day(2026, 5, 1));
        no_amount.amount = None;
        txns.push(no_date);
        txns.push(no_amount);

        let subs = detect(&txns);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].occurrences, 3);
    }

    #[test]
    fn test_amount_bounds_are_inclusive() {
        let mut txns = series("Floor", 1.00, day(2026, 1, 1), 30, 2);
        txns.extend(series("Ceiling", 999.99, day(2026, 1, 1), 30, 2));
        assert_eq!(detect(&txns).len(), 2);
    }

    #[test]
    fn test_cutoff_excludes_older_payments() {
        let txns = series("Hulu", 17.99, day(2026, 1, 1), 30, 4);
        let cutoff = Utc.with_ymd_and_hms(2026, 2, 15, 0, 0, 0).unwrap();
        let subs = detect_subscriptions(&txns, cutoff, DEFAULT_MIN_AMOUNT, DEFAULT_MAX_AMOUNT);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].occurrences, 2);

        // A payment exactly at the cutoff stays in
        let at = Utc.with_ymd_and_hms(2026, 1, 31, 9, 30, 0).unwrap();
        let subs = detect_subscriptions(&txns, at, DEFAULT_MIN_AMOUNT, DEFAULT_MAX_AMOUNT);
        assert_eq!(subs[0].occurrences, 3);
    }

    #[test]
    fn test_recipient_and_unknown_merchants() {
        let mut txns = Vec::new();
        for tx in series("", 20.0, day(2026, 1, 1), 7, 3) {
            txns.push(tx.with_recipient("@landlord"));
        }
        txns.extend(series("", 5.0, day(2026, 1, 1), 14, 2));

        let subs = detect(&txns);
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].merchant, "@landlord");
        assert_eq!(subs[0].frequency, Frequency::Biweekly);
        assert_eq!(subs[1].merchant, "Unknown");
        assert_eq!(subs[1].frequency, Frequency::Biweekly);
    }

    #[test]
    fn test_single_occurrence_is_not_a_pattern() {
        assert!(detect(&[charge("Netflix", 15.99, day(2026, 1, 1))]).is_empty());
    }

    #[test]
    fn test_monthly_cost_normalization() {
        let annual = series("Annual Software License", 299.00, day(2025, 1, 10), 365, 2);
        let subs = detect(&annual);
        assert_eq!(subs[0].frequency, Frequency::Annual);
        assert_eq!(total_monthly_cost(&subs), 24.92);

        assert_eq!(Frequency::Weekly.monthly_equivalent(10.0), 10.0 * 4.333);
        assert_eq!(Frequency::Biweekly.monthly_equivalent(10.0), 10.0 * 2.167);
        assert_eq!(Frequency::Quarterly.monthly_equivalent(450.0), 150.0);
        assert_eq!(Frequency::SemiAnnual.monthly_equivalent(60.0), 10.0);
        assert_eq!(Frequency::Irregular.monthly_equivalent(99.0), 0.0);
    }

    #[test]
    fn test_empty_input() {
        let report = analyze_subscriptions_at(
            &[],
            early_cutoff(),
            DEFAULT_MIN_AMOUNT,
            DEFAULT_MAX_AMOUNT,
            Utc::now(),
        );
        assert!(report.subscriptions.is_empty());
        assert_eq!(report.total_monthly_cost, 0.0);
        assert_eq!(
            report.warnings,
            vec!["No subscriptions were detected in your transaction history.".to_string()]
        );
    }

    #[test]
    fn test_serialization_shape() {
        let txns = series("Netflix Subscription", 15.99, day(2026, 1, 1), 30, 4);
        let json = serde_json::to_value(&detect(&txns)[0]).unwrap();
        assert_eq!(json["frequency"], "monthly");
        assert_eq!(json["confidence"], "high");
        assert_eq!(json["last_occurrence"], "2026-04-01");
        assert_eq!(json["estimated_next"], "2026-05-01");

        let odd = vec![
            charge("Odd", 5.0, day(2026, 1, 1)),
            charge("Odd", 5.0, day(2026, 1, 21)),
        ];
        let json = serde_json::to_value(&detect(&odd)[0]).unwrap();
        assert_eq!(json["frequency"], "irregular");
        assert_eq!(json["estimated_next"], "unknown");
        assert_eq!(serde_json::to_value(Frequency::SemiAnnual).unwrap(), "semi-annual");
    }

    #[test]
    fn test_monthly_series_ending_on_the_31st() {
        let txns = vec![
            charge("Gym", 20.0, day(2025, 12, 1)),
            charge("Gym", 20.0, day(2025, 12, 31)),
            charge("Gym", 20.0, day(2026, 1, 31)),
        ];
        let subs = detect(&txns);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].frequency, Frequency::Monthly);
        assert_eq!(subs[0].last_occurrence, day(2026, 1, 31));
        assert_eq!(subs[0].estimated_next, Some(day(2026, 3, 3)));
    }

    #[test]
    fn test_cent_ties_round_to_even() {
        assert_eq!(to_cents(1.125), 112);
        assert_eq!(to_cents(1.375), 138);
        assert_eq!(to_cents(15.99), 1599);

        // 1.125 keys as 1.12, so it does not pair up with 1.13
        let txns = vec![
            charge("Gym", 1.125, day(2026, 1, 1)),
            charge("Gym", 1.13, day(2026, 1, 31)),
        ];
        assert!(detect(&txns).is_empty());
    }
}
