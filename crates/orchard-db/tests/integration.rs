//! Integration tests for orchard-db
//!
//! Exercises entities and the visibility scoping against a real SQLite
//! in-memory database.

use chrono::Utc;
use orchard_db::entities::account::{self, Role};
use orchard_db::entities::fruit::{self, Remark, Status};
use orchard_db::scope::{visibility_condition, visible_to};
use orchard_db::{connect, migrate};
use sea_orm::{prelude::Uuid, ActiveModelTrait, EntityTrait, QueryFilter, QueryOrder, Set};

/// Helper to create a test database
async fn setup_test_db() -> sea_orm::DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

async fn insert_account(db: &sea_orm::DatabaseConnection, username: &str, role: Role) {
    let now = Utc::now();
    account::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        password_hash: Set("$argon2id$v=19$m=19456,t=2,p=1$dGVzdA$dGVzdA".to_string()),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert account");
}

async fn insert_fruit(
    db: &sea_orm::DatabaseConnection,
    product_name: &str,
    added_by: &str,
    added_by_role: Role,
    status: Status,
) -> fruit::Model {
    let now = Utc::now();
    fruit::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_name: Set(product_name.to_string()),
        state: Set("Kashmir".to_string()),
        price: Set(10.0),
        quantity: Set(5),
        remark: Set(Remark::Available),
        status: Set(status),
        added_by: Set(added_by.to_string()),
        added_by_role: Set(added_by_role),
        approved_by: Set(None),
        approved_by_role: Set(None),
        approval_date: Set(None),
        rejection_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert fruit")
}

#[tokio::test]
async fn test_database_connection() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    use sea_orm::ConnectionTrait;
    let backend = db.get_database_backend();
    assert!(matches!(backend, sea_orm::DatabaseBackend::Sqlite));
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let result = migrate(&db).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let db = setup_test_db().await;

    // Running the migrator a second time must be a no-op
    let result = migrate(&db).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_username_uniqueness_enforced() {
    let db = setup_test_db().await;

    insert_account(&db, "manager", Role::Manager).await;

    let now = Utc::now();
    let duplicate = account::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set("manager".to_string()),
        password_hash: Set("$argon2id$v=19$m=19456,t=2,p=1$dGVzdA$dGVzdA".to_string()),
        role: Set(Role::Owner),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await;

    assert!(duplicate.is_err(), "duplicate username must be rejected");
}

#[tokio::test]
async fn test_fruit_roundtrip_preserves_enums() {
    let db = setup_test_db().await;

    let inserted = insert_fruit(&db, "Banana", "alice", Role::Manager, Status::Pending).await;

    let found = fruit::Entity::find_by_id(inserted.id)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("Fruit not found");

    assert_eq!(found.product_name, "Banana");
    assert_eq!(found.remark, Remark::Available);
    assert_eq!(found.status, Status::Pending);
    assert_eq!(found.added_by_role, Role::Manager);
    assert!(found.approved_by.is_none());
    assert!(found.approval_date.is_none());
}

#[tokio::test]
async fn test_workflow_fields_update() {
    let db = setup_test_db().await;

    let inserted = insert_fruit(&db, "Mango", "alice", Role::Manager, Status::Pending).await;

    let mut active: fruit::ActiveModel = inserted.clone().into();
    active.status = Set(Status::Approved);
    active.approved_by = Set(Some("owner".to_string()));
    active.approved_by_role = Set(Some(Role::Owner));
    active.approval_date = Set(Some(Utc::now()));
    active.updated_at = Set(Utc::now());
    let updated = active.update(&db).await.expect("Failed to update");

    assert_eq!(updated.status, Status::Approved);
    assert_eq!(updated.approved_by.as_deref(), Some("owner"));
    assert_eq!(updated.approved_by_role, Some(Role::Owner));
    assert!(updated.approval_date.is_some());
}

#[tokio::test]
async fn test_visibility_condition_matches_predicate() {
    let db = setup_test_db().await;

    // A mix of ownership and status combinations
    insert_fruit(&db, "Apple", "alice", Role::Manager, Status::Pending).await;
    insert_fruit(&db, "Banana", "alice", Role::Manager, Status::Approved).await;
    insert_fruit(&db, "Orange", "alice", Role::Manager, Status::Rejected).await;
    insert_fruit(&db, "Mango", "bob", Role::Manager, Status::Pending).await;
    insert_fruit(&db, "Grapes", "bob", Role::Manager, Status::Approved).await;
    insert_fruit(&db, "Pomegranate", "owner", Role::Owner, Status::Approved).await;

    let all = fruit::Entity::find().all(&db).await.expect("query failed");
    assert_eq!(all.len(), 6);

    for (username, role) in [
        ("alice", Role::Manager),
        ("bob", Role::Manager),
        ("owner", Role::Owner),
    ] {
        let mut filtered: Vec<Uuid> = fruit::Entity::find()
            .filter(visibility_condition(username, role))
            .all(&db)
            .await
            .expect("scoped query failed")
            .into_iter()
            .map(|f| f.id)
            .collect();
        filtered.sort();

        let mut expected: Vec<Uuid> = all
            .iter()
            .filter(|f| visible_to(username, role, f))
            .map(|f| f.id)
            .collect();
        expected.sort();

        assert_eq!(filtered, expected, "scope mismatch for {username}");
    }
}

#[tokio::test]
async fn test_manager_scope_counts() {
    let db = setup_test_db().await;

    insert_fruit(&db, "Apple", "alice", Role::Manager, Status::Pending).await;
    insert_fruit(&db, "Banana", "bob", Role::Manager, Status::Pending).await;
    insert_fruit(&db, "Grapes", "bob", Role::Manager, Status::Approved).await;

    let visible = fruit::Entity::find()
        .filter(visibility_condition("alice", Role::Manager))
        .all(&db)
        .await
        .expect("scoped query failed");

    // Own pending item plus bob's approved one; bob's pending is hidden
    assert_eq!(visible.len(), 2);
    assert!(visible
        .iter()
        .all(|f| f.added_by == "alice" || f.status == Status::Approved));
}

#[tokio::test]
async fn test_ordering_newest_first() {
    let db = setup_test_db().await;

    let first = insert_fruit(&db, "Apple", "alice", Role::Manager, Status::Pending).await;

    // Force a later creation timestamp on the second item
    let mut active: fruit::ActiveModel = insert_fruit(
        &db,
        "Banana",
        "alice",
        Role::Manager,
        Status::Pending,
    )
    .await
    .into();
    active.created_at = Set(first.created_at + chrono::Duration::seconds(5));
    let second = active.update(&db).await.expect("Failed to update");

    let ordered = fruit::Entity::find()
        .order_by_desc(fruit::Column::CreatedAt)
        .all(&db)
        .await
        .expect("query failed");

    assert_eq!(ordered.first().map(|f| f.id), Some(second.id));
    assert_eq!(ordered.last().map(|f| f.id), Some(first.id));
}
