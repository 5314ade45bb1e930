use crate::config::{AlertConfig, AlertPolicy, LOW_STOCK_THRESHOLD, MIN_ALERT_TIMEOUT};
use crate::db::{InventoryItem, ItemId, Storage};
use crate::error::StockError;
use crate::notify::LowStockNotifier;
use crate::service::input::require_name;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub fn is_low_stock(quantity: i64) -> bool {
    quantity < LOW_STOCK_THRESHOLD
}

/// Result of [`InventoryService::add_or_merge_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// No item with that name existed; a new record was written.
    AddedNew(ItemId),
    /// An item with the same name (ignoring case) exists. Nothing was written;
    /// the caller must resolve the duplicate.
    DuplicateFound(PendingDuplicate),
}

/// A duplicate waiting for a decision. Consumed by exactly one of
/// `merge`, `add_separately`, `cancel` or `resolve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDuplicate {
    existing: InventoryItem,
    incoming_name: String,
    incoming_quantity: i64,
}

impl PendingDuplicate {
    /// First stored item matching the incoming name.
    pub fn existing(&self) -> &InventoryItem {
        &self.existing
    }

    pub fn incoming_name(&self) -> &str {
        &self.incoming_name
    }

    pub fn incoming_quantity(&self) -> i64 {
        self.incoming_quantity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateResolution {
    /// Add the incoming quantity to the existing item.
    Merge,
    /// Store the incoming item as its own record.
    AddSeparately,
    /// Leave storage untouched.
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    MergedIntoExisting { id: ItemId, new_quantity: i64 },
    AddedSeparately(ItemId),
    Cancelled,
}

/// Item lifecycle, duplicate handling and low-stock alerting.
#[derive(Clone)]
pub struct InventoryService {
    storage: Storage,
    notifier: Arc<dyn LowStockNotifier>,
    policy: AlertPolicy,
    alert_timeout: Duration,
    /// Items already alerted under `AlertPolicy::UntilRestocked`.
    alerted: Arc<Mutex<HashSet<ItemId>>>,
}

impl InventoryService {
    pub fn new(storage: Storage, notifier: Arc<dyn LowStockNotifier>) -> Self {
        let defaults = AlertConfig::default();
        Self {
            storage,
            notifier,
            policy: defaults.policy,
            alert_timeout: defaults.timeout(),
            alerted: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn with_alert_policy(mut self, policy: AlertPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Per-alert bound, floored at [`MIN_ALERT_TIMEOUT`]. A gateway that
    /// reports a longer [`LowStockNotifier::delivery_budget`] gets that instead.
    pub fn with_alert_timeout(mut self, timeout: Duration) -> Self {
        self.alert_timeout = timeout.max(MIN_ALERT_TIMEOUT);
        self
    }

    pub fn alert_policy(&self) -> AlertPolicy {
        self.policy
    }

    /// Drop all suppression state. Must follow anything that lets item ids be
    /// handed out again, such as a schema reset.
    pub fn forget_alerts(&self) {
        self.alerted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn dispatch_bound(&self) -> Duration {
        self.notifier
            .delivery_budget()
            .map_or(self.alert_timeout, |budget| budget.max(self.alert_timeout))
    }

    /// Add an item unless one with the same name (case-insensitive) exists.
    pub async fn add_or_merge_item(
        &self,
        name: &str,
        quantity: i64,
    ) -> Result<AddOutcome, StockError> {
        let name = require_name(name)?;

        match self.storage.find_item_by_name(name).await? {
            None => {
                let id = self.storage.insert_item(name, quantity).await?;
                info!(item_id = id, item_name = name, quantity, "item added");
                Ok(AddOutcome::AddedNew(id))
            }
            Some(existing) => {
                debug!(
                    item_id = existing.id,
                    item_name = name,
                    existing_quantity = existing.quantity,
                    "duplicate item name detected"
                );
                Ok(AddOutcome::DuplicateFound(PendingDuplicate {
                    existing,
                    incoming_name: name.to_string(),
                    incoming_quantity: quantity,
                }))
            }
        }
    }

    pub async fn resolve(
        &self,
        pending: PendingDuplicate,
        choice: DuplicateResolution,
    ) -> Result<Resolution, StockError> {
        match choice {
            DuplicateResolution::Merge => self.merge(pending).await,
            DuplicateResolution::AddSeparately => self.add_separately(pending).await,
            DuplicateResolution::Cancel => Ok(self.cancel(pending)),
        }
    }

    /// Add the incoming quantity to the stored one. The stored name is kept.
    ///
    /// The existing record is re-read so the sum uses the current quantity,
    /// not the one seen when the duplicate was detected.
    pub async fn merge(&self, pending: PendingDuplicate) -> Result<Resolution, StockError> {
        let id = pending.existing.id;
        let current = self
            .storage
            .find_item_by_id(id)
            .await?
            .ok_or(StockError::MergeTargetGone(id))?;

        let new_quantity = current
            .quantity
            .checked_add(pending.incoming_quantity)
            .ok_or_else(|| StockError::validation("quantity", "merged quantity out of range"))?;

        let rows = self
            .storage
            .update_item(id, &current.name, new_quantity)
            .await?;
        if rows == 0 {
            return Err(StockError::MergeTargetGone(id));
        }

        info!(
            item_id = id,
            item_name = %current.name,
            added = pending.incoming_quantity,
            new_quantity,
            "merged into existing item"
        );
        Ok(Resolution::MergedIntoExisting { id, new_quantity })
    }

    /// Store the incoming item as a separate record with the same name.
    pub async fn add_separately(&self, pending: PendingDuplicate) -> Result<Resolution, StockError> {
        let id = self
            .storage
            .insert_item(&pending.incoming_name, pending.incoming_quantity)
            .await?;
        info!(
            item_id = id,
            duplicate_of = pending.existing.id,
            item_name = %pending.incoming_name,
            quantity = pending.incoming_quantity,
            "duplicate item added separately"
        );
        Ok(Resolution::AddedSeparately(id))
    }

    pub fn cancel(&self, pending: PendingDuplicate) -> Resolution {
        debug!(
            item_id = pending.existing.id,
            item_name = %pending.incoming_name,
            "duplicate add cancelled"
        );
        Resolution::Cancelled
    }

    /// Overwrite name and quantity of `id`. No duplicate-name check.
    /// `Ok(false)` when no such item exists.
    pub async fn update_item(
        &self,
        id: ItemId,
        name: &str,
        quantity: i64,
    ) -> Result<bool, StockError> {
        let name = require_name(name)?;
        let rows = self.storage.update_item(id, name, quantity).await?;
        if rows == 0 {
            debug!(item_id = id, "update skipped: item not found");
            return Ok(false);
        }
        info!(item_id = id, item_name = name, quantity, "item updated");
        Ok(true)
    }

    /// `Ok(false)` when no such item exists.
    pub async fn delete_item(&self, id: ItemId) -> Result<bool, StockError> {
        let rows = self.storage.delete_item(id).await?;
        if rows == 0 {
            debug!(item_id = id, "delete skipped: item not found");
            return Ok(false);
        }
        info!(item_id = id, "item deleted");
        Ok(true)
    }

    pub async fn get_by_id(&self, id: ItemId) -> Result<Option<InventoryItem>, StockError> {
        self.storage.find_item_by_id(id).await
    }

    /// Every item in storage order.
    ///
    /// Each call also alerts on items below the low-stock threshold, subject
    /// to the configured [`AlertPolicy`]. Alert failures never fail the listing.
    pub async fn list_all(&self) -> Result<Vec<InventoryItem>, StockError> {
        let items = self.storage.list_items().await?;
        self.alert_low_stock(&items).await;
        Ok(items)
    }

    /// Push a fixed alert through the gateway to check delivery end to end.
    pub async fn send_test_alert(&self) -> bool {
        self.dispatch_alert("Test Item", 1).await
    }

    async fn alert_low_stock(&self, items: &[InventoryItem]) {
        let low: Vec<&InventoryItem> = items.iter().filter(|i| is_low_stock(i.quantity)).collect();

        let due: Vec<&InventoryItem> = match self.policy {
            AlertPolicy::EveryScan => low,
            AlertPolicy::UntilRestocked => {
                let mut alerted = self.alerted.lock().unwrap_or_else(PoisonError::into_inner);
                // forget items that were restocked or deleted
                alerted.retain(|id| low.iter().any(|i| i.id == *id));
                low.into_iter().filter(|i| !alerted.contains(&i.id)).collect()
            }
        };

        for item in due {
            let delivered = self.dispatch_alert(&item.name, item.quantity).await;
            if delivered && self.policy == AlertPolicy::UntilRestocked {
                self.alerted
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(item.id);
            }
        }
    }

    /// Run one gateway call on its own task, bounded by the alert timeout or
    /// the gateway's own retry budget, whichever is longer.
    async fn dispatch_alert(&self, item_name: &str, quantity: i64) -> bool {
        let notifier = Arc::clone(&self.notifier);
        let name = item_name.to_string();
        let mut task =
            tokio::spawn(async move { notifier.send_low_stock_alert(&name, quantity).await });

        let bound = self.dispatch_bound();
        match tokio::time::timeout(bound, &mut task).await {
            Ok(Ok(true)) => true,
            Ok(Ok(false)) => {
                warn!(item_name, quantity, "low-stock alert not delivered");
                false
            }
            Ok(Err(e)) => {
                error!(item_name, quantity, error = %e, "low-stock alert task failed");
                false
            }
            Err(_) => {
                task.abort();
                warn!(
                    item_name,
                    quantity,
                    timeout_ms = u64::try_from(bound.as_millis()).unwrap_or(u64::MAX),
                    "low-stock alert timed out"
                );
                false
            }
        }
    }
}
