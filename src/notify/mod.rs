//! Low-stock notification gateway.
//!
//! Gateways report delivery as a plain `bool`. They never return errors to the
//! inventory service; failures are logged where they happen.

pub mod webhook;

use crate::config::AlertConfig;
use crate::error::StockError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub use webhook::{RetrySettings, WebhookNotifier};

/// Delivers low-stock alerts.
#[async_trait]
pub trait LowStockNotifier: Send + Sync {
    /// Returns whether the alert was delivered.
    async fn send_low_stock_alert(&self, item_name: &str, quantity: i64) -> bool;

    /// Longest a single call may legitimately take, retries included.
    /// `None` leaves the caller's own bound in charge.
    fn delivery_budget(&self) -> Option<Duration> {
        None
    }
}

/// The outbound message for a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowStockAlert {
    pub item_name: String,
    pub quantity: i64,
}

impl LowStockAlert {
    pub fn new(item_name: impl Into<String>, quantity: i64) -> Self {
        Self {
            item_name: item_name.into(),
            quantity,
        }
    }

    pub fn message(&self) -> String {
        format!(
            "Alert: Low inventory for {}. Only {} left.",
            self.item_name, self.quantity
        )
    }
}

/// Writes alerts to the log only. Used when no delivery endpoint is configured.
pub struct LogNotifier {
    phone_number: String,
}

impl LogNotifier {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
        }
    }
}

#[async_trait]
impl LowStockNotifier for LogNotifier {
    async fn send_low_stock_alert(&self, item_name: &str, quantity: i64) -> bool {
        let alert = LowStockAlert::new(item_name, quantity);
        info!(to = %self.phone_number, message = %alert.message(), "low-stock alert");
        true
    }
}

/// Pick the gateway described by `cfg`: webhook when a URL is set, log otherwise.
pub fn from_config(cfg: &AlertConfig) -> Result<Arc<dyn LowStockNotifier>, StockError> {
    match cfg.webhook_url.as_ref() {
        Some(url) => {
            let notifier = WebhookNotifier::new(url.clone(), cfg.phone_number.clone(), cfg.timeout())
                .inspect_err(|e| warn!(error = %e, "failed to build webhook notifier"))?;
            Ok(Arc::new(notifier))
        }
        None => Ok(Arc::new(LogNotifier::new(cfg.phone_number.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_message_text() {
        let alert = LowStockAlert::new("Bolts", 2);
        assert_eq!(alert.message(), "Alert: Low inventory for Bolts. Only 2 left.");
    }

    #[tokio::test]
    async fn log_notifier_always_delivers() {
        let notifier = LogNotifier::new("555");
        assert!(notifier.send_low_stock_alert("Nuts", 0).await);
    }
}
