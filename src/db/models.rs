use sqlx::FromRow;

pub type UserId = i64;
pub type ItemId = i64;

/// A registered account. The password is kept exactly as entered.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DbUser {
    pub id: UserId,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct InventoryItem {
    pub id: ItemId,
    #[sqlx(rename = "item_name")]
    pub name: String,
    pub quantity: i64,
}
