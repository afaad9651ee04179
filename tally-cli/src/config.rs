use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_finance::params::{DEFAULT_DAYS, DEFAULT_TIMEFRAME_MONTHS};
use tally_finance::subscriptions::{DEFAULT_MAX_AMOUNT, DEFAULT_MIN_AMOUNT};

use crate::state::{ensure_tally_home, tally_home};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub profile: ProfileSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisSection {
    /// Spending window in days
    pub days: u32,
    /// Subscription look-back in months
    pub timeframe_months: u32,
    pub min_amount: f64,
    pub max_amount: f64,
    /// Analyze synthetic data when no file is given
    pub use_mock: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileSection {
    /// IANA timezone used for calendar cutoffs
    pub timezone: String,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            timeframe_months: DEFAULT_TIMEFRAME_MONTHS,
            min_amount: DEFAULT_MIN_AMOUNT,
            max_amount: DEFAULT_MAX_AMOUNT,
            use_mock: true,
        }
    }
}

impl Default for ProfileSection {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_tally_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.analysis.days, 30);
        assert!(cfg.analysis.use_mock);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\ndays = 14\nuse_mock = false\n\n[profile]\ntimezone = \"UTC\"").unwrap();

        let cfg = load_config_from(file.path()).unwrap();
        assert_eq!(cfg.analysis.days, 14);
        assert!(!cfg.analysis.use_mock);
        assert_eq!(cfg.analysis.timeframe_months, 6);
        assert_eq!(cfg.analysis.max_amount, 999.99);
        assert_eq!(cfg.profile.timezone, "UTC");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(toml::from_str::<Config>(&s).unwrap(), cfg);
    }

    #[test]
    fn test_bad_toml_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis\ndays = ").unwrap();
        let err = load_config_from(file.path()).unwrap_err();
        assert!(format!("{err}").contains(&file.path().display().to_string()));
    }
}
