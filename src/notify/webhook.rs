use super::{LowStockAlert, LowStockNotifier};
use crate::error::StockError;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Backoff schedule for webhook deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Retries after the first attempt.
    pub max_times: usize,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
            max_times: 3,
        }
    }
}

impl RetrySettings {
    fn policy(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_times)
            .with_jitter()
    }

    /// Worst-case wall time of a full schedule where every attempt runs to
    /// `attempt_timeout`. Jitter can at most double a delay.
    pub fn worst_case(&self, attempt_timeout: Duration) -> Duration {
        let attempts = u32::try_from(self.max_times.saturating_add(1)).unwrap_or(u32::MAX);
        let sleeps = attempts - 1;
        attempt_timeout
            .saturating_mul(attempts)
            .saturating_add(self.max_delay.saturating_mul(sleeps.saturating_mul(2)))
    }
}

/// Posts alerts as JSON to an SMS/HTTP bridge.
///
/// Body: `{"to": <phone>, "message": <text>, "item_name": <name>, "quantity": <n>}`.
/// Any 2xx counts as delivered.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Url,
    phone_number: String,
    attempt_timeout: Duration,
    retry: RetrySettings,
}

impl WebhookNotifier {
    /// `attempt_timeout` bounds each request; retries each get a fresh one.
    pub fn new(
        url: Url,
        phone_number: String,
        attempt_timeout: Duration,
    ) -> Result<Self, StockError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("stockpile/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(attempt_timeout.min(Duration::from_secs(5)))
            .timeout(attempt_timeout)
            .build()?;
        Ok(Self {
            client,
            url,
            phone_number,
            attempt_timeout,
            retry: RetrySettings::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    /// Deliver one alert, retrying transient failures.
    pub async fn deliver(&self, alert: &LowStockAlert) -> Result<(), StockError> {
        let payload = json!({
            "to": self.phone_number,
            "message": alert.message(),
            "item_name": alert.item_name,
            "quantity": alert.quantity,
        });

        (|| async {
            let resp = self
                .client
                .post(self.url.clone())
                .json(&payload)
                .send()
                .await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(StockError::NotifyStatus(status));
            }
            Ok(())
        })
        .retry(self.retry.policy())
        .when(|e: &StockError| e.is_retryable())
        .notify(|err, dur: Duration| {
            warn!(
                "Low-stock webhook retrying after error {}, sleeping {:?}",
                err, dur
            );
        })
        .await
    }
}

#[async_trait]
impl LowStockNotifier for WebhookNotifier {
    async fn send_low_stock_alert(&self, item_name: &str, quantity: i64) -> bool {
        let alert = LowStockAlert::new(item_name, quantity);
        match self.deliver(&alert).await {
            Ok(()) => {
                debug!(item_name, quantity, "low-stock alert delivered");
                true
            }
            Err(e) => {
                warn!(item_name, quantity, error = %e, "low-stock alert delivery failed");
                false
            }
        }
    }

    fn delivery_budget(&self) -> Option<Duration> {
        Some(self.retry.worst_case(self.attempt_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_covers_every_attempt_and_sleep() {
        let retry = RetrySettings {
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            max_times: 3,
        };
        // 4 attempts of 2s plus 3 sleeps of at most 2s
        assert_eq!(retry.worst_case(Duration::from_secs(2)), Duration::from_secs(14));
    }

    #[test]
    fn no_retries_means_one_attempt() {
        let retry = RetrySettings {
            max_times: 0,
            ..RetrySettings::default()
        };
        assert_eq!(retry.worst_case(Duration::from_secs(2)), Duration::from_secs(2));
    }
}
