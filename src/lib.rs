pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod notify;
pub mod service;

pub use app::Stockpile;
pub use config::Config;
pub use db::{InventoryItem, ItemId, Storage};
pub use error::StockError;
pub use notify::LowStockNotifier;
