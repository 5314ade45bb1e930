use crate::config::Config;
use crate::db::Storage;
use crate::error::StockError;
use crate::notify::{self, LowStockNotifier};
use crate::service::{CredentialService, InventoryService};
use std::sync::Arc;
use tracing::{info, warn};

/// The services handed to whatever drives the application.
/// Built once per process; clones share the same pool and gateway.
#[derive(Clone)]
pub struct Stockpile {
    pub credentials: CredentialService,
    pub inventory: InventoryService,
    storage: Storage,
}

impl Stockpile {
    /// Connect to the configured database, create the schema and wire the
    /// notification gateway chosen by the alert settings.
    pub async fn open(cfg: &Config) -> Result<Self, StockError> {
        let storage = Storage::connect(&cfg.database_url, cfg.max_connections).await?;
        storage.init_schema().await?;
        let notifier = notify::from_config(&cfg.alerts)?;
        info!(
            database_url = %cfg.database_url,
            alert_policy = ?cfg.alerts.policy,
            webhook = cfg.alerts.webhook_url.is_some(),
            "stockpile opened"
        );
        Ok(Self::with_storage(storage, notifier, cfg))
    }

    pub fn with_storage(
        storage: Storage,
        notifier: Arc<dyn LowStockNotifier>,
        cfg: &Config,
    ) -> Self {
        let inventory = InventoryService::new(storage.clone(), notifier)
            .with_alert_policy(cfg.alerts.policy)
            .with_alert_timeout(cfg.alerts.timeout());
        Self {
            credentials: CredentialService::new(storage.clone()),
            inventory,
            storage,
        }
    }

    /// Wipe users and inventory. Item ids start over afterwards, so the
    /// inventory service's alert suppression is cleared with them.
    pub async fn reset(&self) -> Result<(), StockError> {
        self.storage.reset_schema().await?;
        self.inventory.forget_alerts();
        warn!("stockpile reset: all users and items removed");
        Ok(())
    }
}
