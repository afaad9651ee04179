//! tally-finance: spending summary, subscription detection and warnings

pub mod params;
pub mod spending;
pub mod subscriptions;
pub mod warnings;

pub use params::{SpendingParams, SubscriptionParams};
pub use spending::{analyze_spending, CategorySummary, SpendingReport, SpendingSummary, Velocity};
pub use subscriptions::{
    analyze_subscriptions, analyze_subscriptions_at, detect_subscriptions, total_monthly_cost,
    Confidence, Frequency, SubscriptionCandidate, SubscriptionReport,
};
pub use warnings::generate_warnings;
