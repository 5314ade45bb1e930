#![allow(dead_code)]

use async_trait::async_trait;
use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};
use stockpile::{LowStockNotifier, Storage};

/// A throwaway SQLite file, removed on drop.
pub struct TempDb {
    pub path: PathBuf,
    pub storage: Storage,
}

impl TempDb {
    pub async fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();

        let mut path = std::env::temp_dir();
        path.push(format!(
            "stockpile-{}-{}-{}.sqlite",
            tag,
            std::process::id(),
            nanos
        ));

        let database_url = format!("sqlite:{}", path.display());
        let storage = Storage::connect(&database_url, 1)
            .await
            .expect("failed to open test database");
        storage.init_schema().await.expect("failed to init schema");
        Self { path, storage }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
        for suffix in ["-wal", "-shm"] {
            let mut side = self.path.clone().into_os_string();
            side.push(suffix);
            let _ = fs::remove_file(side);
        }
    }
}

/// Records every alert and answers with a fixed delivery result.
#[derive(Default)]
pub struct RecordingNotifier {
    pub calls: Mutex<Vec<(String, i64)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<(String, i64)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn clear(&self) {
        self.calls.lock().expect("calls lock poisoned").clear();
    }
}

#[async_trait]
impl LowStockNotifier for RecordingNotifier {
    async fn send_low_stock_alert(&self, item_name: &str, quantity: i64) -> bool {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((item_name.to_string(), quantity));
        !self.fail
    }
}
