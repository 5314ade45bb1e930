//! SQL DDL for the user and inventory tables.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `users.username` UNIQUE (duplicate inserts fail instead of overwriting)
/// - `inventory.item_name` free text; duplicates are resolved by the inventory service
/// - Expression index on `LOWER(item_name)` for case-insensitive lookups
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL -- stored verbatim, not hashed
);

CREATE TABLE IF NOT EXISTS inventory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_name TEXT NOT NULL,
    quantity INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_inventory_item_name_lower ON inventory(LOWER(item_name));
"#;

pub const SQLITE_DROP: &str = r#"
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS inventory;
"#;
