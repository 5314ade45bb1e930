use crate::error::StockError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Quantities strictly below this trigger a low-stock alert.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Shortest bound any single alert attempt may be given.
pub const MIN_ALERT_TIMEOUT: Duration = Duration::from_secs(1);

pub const ENV_PREFIX: &str = "STOCKPILE_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub loglevel: String,
    pub max_connections: u32,
    pub alerts: AlertConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    pub policy: AlertPolicy,
    /// Recipient of low-stock messages.
    pub phone_number: String,
    /// When unset, alerts are only written to the log.
    pub webhook_url: Option<Url>,
    /// Bound on one delivery attempt. Retries get their own attempts on top.
    pub timeout_secs: u64,
}

/// Whether a full inventory scan re-sends alerts that already went out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPolicy {
    /// Every scan alerts on every item currently below the threshold.
    #[default]
    EveryScan,
    /// An item is alerted once, then stays quiet until it is restocked to the
    /// threshold or removed.
    UntilRestocked,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:stockpile.db".to_string(),
            loglevel: "info".to_string(),
            max_connections: 4,
            alerts: AlertConfig::default(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            policy: AlertPolicy::EveryScan,
            phone_number: "1234567890".to_string(),
            webhook_url: None,
            timeout_secs: 10,
        }
    }
}

impl AlertConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs).max(MIN_ALERT_TIMEOUT)
    }
}

impl Config {
    /// Defaults overlaid with `STOCKPILE_*` environment variables.
    /// Nested keys use `__`, e.g. `STOCKPILE_ALERTS__POLICY=until_restocked`.
    pub fn load() -> Result<Self, StockError> {
        Ok(Self::figment().extract()?)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
