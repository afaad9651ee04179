use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{json, Value};
use std::path::PathBuf;
use tally_core::Transaction;
use tally_core::time::{months_before, parse_timezone, to_rfc3339_utc};
use tally_finance::{analyze_spending, analyze_subscriptions_at, SpendingParams, SubscriptionParams};
use tally_ingest::{load_transactions, mock_spending_transactions, mock_subscription_transactions};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Spending and subscription analytics over banking transactions"
)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Where transactions come from
#[derive(clap::Args, Debug, Clone)]
struct SourceArgs {
    /// Transaction feed (.json payload or .csv export)
    #[arg(long, conflicts_with = "mock")]
    file: Option<PathBuf>,

    /// Analyze synthetic transactions
    #[arg(long)]
    mock: bool,

    /// Seed for synthetic transactions (ignored for file sources)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize spending by category, cash flow and velocity
    Spending {
        /// Number of days to analyze (default: 30)
        #[arg(long)]
        days: Option<u32>,

        /// Host parameters as JSON, e.g. '{"days": 7, "use_mock": true}'
        #[arg(long, value_name = "JSON")]
        params: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Detect recurring payments and estimate their monthly cost
    Subscriptions {
        /// Number of months to scan for recurring patterns (default: 6)
        #[arg(long)]
        months: Option<u32>,

        /// Minimum amount considered a subscription (default: 1.00)
        #[arg(long)]
        min_amount: Option<f64>,

        /// Maximum amount considered a subscription (default: 999.99)
        #[arg(long)]
        max_amount: Option<f64>,

        /// Host parameters as JSON, e.g. '{"timeframe_months": 3}'
        #[arg(long, value_name = "JSON")]
        params: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective configuration
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .init();

    match cli.command {
        Command::Spending { days, params, source } => {
            let cfg = config::load_config()?;
            let params = spending_params(&cfg, params.as_deref(), days, &source);

            let now = Utc::now();
            let txns = source.transactions(params.use_mock, |rng| {
                mock_spending_transactions(rng, now, params.days)
            })?;
            print_json(&spending_envelope(&txns, params, now))?;
        }

        Command::Subscriptions {
            months,
            min_amount,
            max_amount,
            params,
            source,
        } => {
            let cfg = config::load_config()?;
            let mut params = subscription_params(&cfg, params.as_deref(), &source);
            if let Some(m) = months {
                params.timeframe_months = m;
            }
            if let Some(x) = min_amount {
                params.min_amount = x;
            }
            if let Some(x) = max_amount {
                params.max_amount = x;
            }
            let params = params.resolved();

            let now = Utc::now();
            let tz = parse_timezone(&cfg.profile.timezone)?;
            let cutoff = months_before(now, params.timeframe_months, tz)?;

            let txns = source.transactions(params.use_mock, |rng| {
                mock_subscription_transactions(rng, now, params.timeframe_months)
            })?;
            print_json(&subscriptions_envelope(&txns, params, cutoff, now))?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
        },
    }

    Ok(())
}

/// Spending parameters from `--params` JSON or the config, then flags
fn spending_params(cfg: &Config, json: Option<&str>, days: Option<u32>, source: &SourceArgs) -> SpendingParams {
    let mut params = match json {
        Some(json) => SpendingParams::from_json(json),
        None => SpendingParams {
            days: cfg.analysis.days,
            use_mock: cfg.analysis.use_mock,
        },
    };
    if let Some(days) = days {
        params.days = days;
    }
    params.use_mock = source.wants_mock(params.use_mock);
    params.resolved()
}

/// Subscription parameters from `--params` JSON or the config; flags are
/// applied by the caller
fn subscription_params(cfg: &Config, json: Option<&str>, source: &SourceArgs) -> SubscriptionParams {
    let mut params = match json {
        Some(json) => SubscriptionParams::from_json(json),
        None => SubscriptionParams {
            timeframe_months: cfg.analysis.timeframe_months,
            min_amount: cfg.analysis.min_amount,
            max_amount: cfg.analysis.max_amount,
            use_mock: cfg.analysis.use_mock,
        },
    };
    params.use_mock = source.wants_mock(params.use_mock);
    params
}

impl SourceArgs {
    /// An explicit file always wins; otherwise `--mock` or `fallback` decides
    fn wants_mock(&self, fallback: bool) -> bool {
        self.file.is_none() && (self.mock || fallback)
    }

    fn transactions<F>(&self, use_mock: bool, generate: F) -> Result<Vec<Transaction>>
    where
        F: FnOnce(&mut StdRng) -> Vec<Transaction>,
    {
        if use_mock {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let txns = generate(&mut rng);
            info!("Generated {} mock transactions", txns.len());
            return Ok(txns);
        }

        let path = self.file.clone().unwrap_or_else(default_feed);
        if !path.exists() {
            bail!(
                "Transactions not found: {} (pass --file <path> or --mock)",
                path.display()
            );
        }
        load_transactions(&path)
    }
}

fn default_feed() -> PathBuf {
    PathBuf::from("transactions.json")
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn spending_envelope(txns: &[Transaction], params: SpendingParams, now: DateTime<Utc>) -> Value {
    json!({
        "period_days": params.days,
        "total_transactions": txns.len(),
        "analysis": analyze_spending(txns, params.days),
        "data_source": { "is_mock": params.use_mock },
        "generated_at": to_rfc3339_utc(now),
    })
}

fn subscriptions_envelope(
    txns: &[Transaction],
    params: SubscriptionParams,
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Value {
    let report = analyze_subscriptions_at(txns, cutoff, params.min_amount, params.max_amount, now);
    json!({
        "analysis_period": format!("{} months", params.timeframe_months),
        "total_transactions_scanned": txns.len(),
        "subscriptions_found": report.subscriptions.len(),
        "subscriptions": report.subscriptions,
        "total_monthly_cost": report.total_monthly_cost,
        "warnings": report.warnings,
        "data_source": { "is_mock": params.use_mock },
        "generated_at": to_rfc3339_utc(now),
    })
}
