mod common;

use common::TempDb;

#[tokio::test]
async fn init_schema_is_idempotent() {
    let db = TempDb::new("schema").await;
    db.storage.init_schema().await.expect("second init failed");
    let id = db.storage.insert_item("Gear", 3).await.expect("insert failed");
    db.storage.init_schema().await.expect("third init failed");
    let item = db.storage.find_item_by_id(id).await.expect("query failed");
    assert_eq!(item.map(|i| i.quantity), Some(3));
}

#[tokio::test]
async fn reset_schema_clears_both_tables() {
    let db = TempDb::new("reset").await;
    db.storage.insert_item("Gear", 3).await.unwrap();
    db.storage.insert_user("alice", "pw1").await.unwrap();

    db.storage.reset_schema().await.expect("reset failed");

    assert!(db.storage.list_items().await.unwrap().is_empty());
    assert!(!db.storage.find_user("alice", "pw1").await.unwrap());
}

#[tokio::test]
async fn duplicate_username_insert_returns_none() {
    let db = TempDb::new("users").await;
    let first = db.storage.insert_user("alice", "pw1").await.unwrap();
    assert!(first.is_some());

    let second = db.storage.insert_user("alice", "other").await.unwrap();
    assert_eq!(second, None);

    let stored = db
        .storage
        .find_user_by_name("alice")
        .await
        .unwrap()
        .expect("alice should exist");
    assert_eq!(Some(stored.id), first);
    assert_eq!(stored.password, "pw1");
}

#[tokio::test]
async fn usernames_are_case_sensitive() {
    let db = TempDb::new("case").await;
    assert!(db.storage.insert_user("alice", "pw").await.unwrap().is_some());
    assert!(db.storage.insert_user("Alice", "pw").await.unwrap().is_some());
    assert!(!db.storage.find_user("ALICE", "pw").await.unwrap());
}

#[tokio::test]
async fn list_items_keeps_insertion_order() {
    let db = TempDb::new("order").await;
    let a = db.storage.insert_item("Zeta", 10).await.unwrap();
    let b = db.storage.insert_item("Alpha", 20).await.unwrap();
    let c = db.storage.insert_item("Mid", 30).await.unwrap();

    let ids: Vec<_> = db
        .storage
        .list_items()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(ids, vec![a, b, c]);
}

#[tokio::test]
async fn find_item_by_name_ignores_case_and_returns_first() {
    let db = TempDb::new("byname").await;
    let first = db.storage.insert_item("Widget", 3).await.unwrap();
    db.storage.insert_item("WIDGET", 9).await.unwrap();

    let found = db
        .storage
        .find_item_by_name("wIdGeT")
        .await
        .unwrap()
        .expect("should match");
    assert_eq!(found.id, first);
    assert_eq!(found.name, "Widget");

    assert!(db.storage.find_item_by_name("gadget").await.unwrap().is_none());
}

#[tokio::test]
async fn update_and_delete_report_rows_affected() {
    let db = TempDb::new("rows").await;
    let id = db.storage.insert_item("Gear", 3).await.unwrap();

    assert_eq!(db.storage.update_item(id, "Cog", -2).await.unwrap(), 1);
    assert_eq!(db.storage.update_item(id + 100, "Cog", 1).await.unwrap(), 0);

    let item = db.storage.find_item_by_id(id).await.unwrap().unwrap();
    assert_eq!((item.name.as_str(), item.quantity), ("Cog", -2));

    assert_eq!(db.storage.delete_item(id + 100).await.unwrap(), 0);
    assert_eq!(db.storage.delete_item(id).await.unwrap(), 1);
    assert!(db.storage.find_item_by_id(id).await.unwrap().is_none());
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let db = TempDb::new("ids").await;
    let first = db.storage.insert_item("Gear", 1).await.unwrap();
    db.storage.delete_item(first).await.unwrap();
    let second = db.storage.insert_item("Gear", 1).await.unwrap();
    assert!(second > first);
}
