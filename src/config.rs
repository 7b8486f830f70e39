use crate::constants::{DEFAULT_ALERT_THRESHOLD, DEFAULT_CATEGORIES};
use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;

/// Ledger rules handed to the service. Read once at startup, never shared
/// as mutable state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerSettings {
    pub categories: Vec<String>,
    pub default_alert_threshold: u8,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        LedgerSettings {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            default_alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }
}

impl LedgerSettings {
    pub fn is_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub ledger: LedgerSettings,
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        let defaults = LedgerSettings::default();
        let categories = env::var("CATEGORIES")
            .ok()
            .map(|v| parse_categories(&v))
            .filter(|c| !c.is_empty())
            .unwrap_or(defaults.categories);
        let default_alert_threshold = env::var("DEFAULT_ALERT_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<u8>().ok())
            .filter(|t| (1..=100).contains(t))
            .unwrap_or(defaults.default_alert_threshold);

        Self {
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(5000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            ledger: LedgerSettings {
                categories,
                default_alert_threshold,
            },
        }
    }
}

fn parse_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
