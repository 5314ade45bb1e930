use crate::db::models::{DbUser, InventoryItem, ItemId, UserId};
use crate::db::schema::{SQLITE_DROP, SQLITE_INIT};
use crate::error::StockError;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

/// Raw record access for users and inventory. No business rules live here.
///
/// Each method checks a connection out of the pool for the duration of the call;
/// it goes back to the pool when the guard drops, on success and error alike.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the SQLite database at `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StockError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(connect_opts)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn conn(&self) -> Result<PoolConnection<Sqlite>, StockError> {
        Ok(self.pool.acquire().await?)
    }

    /// Create both tables if absent. Safe to call repeatedly.
    pub async fn init_schema(&self) -> Result<(), StockError> {
        self.run_script(SQLITE_INIT).await
    }

    /// Drop both tables and recreate them empty.
    pub async fn reset_schema(&self) -> Result<(), StockError> {
        self.run_script(SQLITE_DROP).await?;
        self.run_script(SQLITE_INIT).await
    }

    async fn run_script(&self, script: &str) -> Result<(), StockError> {
        let mut conn = self.conn().await?;
        // sqlx::query runs a single statement at a time
        for stmt in script.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&mut *conn).await?;
        }
        Ok(())
    }

    /// Insert a user. Returns `None` when the username is already taken;
    /// the existing row is left untouched.
    pub async fn insert_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserId>, StockError> {
        let mut conn = self.conn().await?;
        let res = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(password)
            .execute(&mut *conn)
            .await;
        match res {
            Ok(done) => Ok(Some(done.last_insert_rowid())),
            Err(e) if is_unique_violation(&e) => {
                debug!(username, "username already registered");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Exact match on both username and password.
    pub async fn find_user(&self, username: &str, password: &str) -> Result<bool, StockError> {
        let mut conn = self.conn().await?;
        let rec: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = ? AND password = ? LIMIT 1")
                .bind(username)
                .bind(password)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(rec.is_some())
    }

    pub async fn find_user_by_name(&self, username: &str) -> Result<Option<DbUser>, StockError> {
        let mut conn = self.conn().await?;
        let user = sqlx::query_as::<_, DbUser>(
            "SELECT id, username, password FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(user)
    }

    pub async fn insert_item(&self, name: &str, quantity: i64) -> Result<ItemId, StockError> {
        let mut conn = self.conn().await?;
        let done = sqlx::query("INSERT INTO inventory (item_name, quantity) VALUES (?, ?)")
            .bind(name)
            .bind(quantity)
            .execute(&mut *conn)
            .await?;
        Ok(done.last_insert_rowid())
    }

    /// Overwrite name and quantity by id. Returns the number of rows touched (0 or 1).
    pub async fn update_item(
        &self,
        id: ItemId,
        name: &str,
        quantity: i64,
    ) -> Result<u64, StockError> {
        let mut conn = self.conn().await?;
        let done = sqlx::query("UPDATE inventory SET item_name = ?, quantity = ? WHERE id = ?")
            .bind(name)
            .bind(quantity)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(done.rows_affected())
    }

    pub async fn delete_item(&self, id: ItemId) -> Result<u64, StockError> {
        let mut conn = self.conn().await?;
        let done = sqlx::query("DELETE FROM inventory WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(done.rows_affected())
    }

    /// All items in storage order (ascending id, i.e. insertion order).
    pub async fn list_items(&self) -> Result<Vec<InventoryItem>, StockError> {
        let mut conn = self.conn().await?;
        let items = sqlx::query_as::<_, InventoryItem>(
            "SELECT id, item_name, quantity FROM inventory ORDER BY id",
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(items)
    }

    pub async fn find_item_by_id(&self, id: ItemId) -> Result<Option<InventoryItem>, StockError> {
        let mut conn = self.conn().await?;
        let item = sqlx::query_as::<_, InventoryItem>(
            "SELECT id, item_name, quantity FROM inventory WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(item)
    }

    /// Case-insensitive name lookup. When several rows share the name the
    /// first one in storage order wins.
    pub async fn find_item_by_name(&self, name: &str) -> Result<Option<InventoryItem>, StockError> {
        let mut conn = self.conn().await?;
        let item = sqlx::query_as::<_, InventoryItem>(
            r#"SELECT id, item_name, quantity FROM inventory
               WHERE LOWER(item_name) = LOWER(?)
               ORDER BY id LIMIT 1"#,
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(item)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
