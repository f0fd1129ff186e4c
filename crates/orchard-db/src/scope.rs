//! Role-scoped visibility rules for inventory queries
//!
//! The same rule exists in two forms: a pure predicate over fetched models
//! and a SeaORM `Condition` applied at the query level. Both are derived
//! from the caller's identity and must agree; the tests below pin that.

use sea_orm::{ColumnTrait, Condition};

use crate::entities::account::Role;
use crate::entities::fruit::{self, Status};

/// Whether `item` is visible to the given caller.
///
/// Managers see their own items regardless of status plus every Approved
/// item; Owners see everything.
pub fn visible_to(username: &str, role: Role, item: &fruit::Model) -> bool {
    match role {
        Role::Owner => true,
        Role::Manager => item.added_by == username || item.status == Status::Approved,
    }
}

/// The visibility rule as a query filter.
///
/// An empty `Condition::all()` applies no filter (Owner); Managers get
/// `added_by = username OR status = 'Approved'`.
pub fn visibility_condition(username: &str, role: Role) -> Condition {
    match role {
        Role::Owner => Condition::all(),
        Role::Manager => Condition::any()
            .add(fruit::Column::AddedBy.eq(username))
            .add(fruit::Column::Status.eq(Status::Approved)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::fruit::Remark;
    use chrono::Utc;
    use sea_orm::prelude::Uuid;

    fn item(added_by: &str, status: Status) -> fruit::Model {
        let now = Utc::now();
        fruit::Model {
            id: Uuid::new_v4(),
            product_name: "Apple".to_string(),
            state: "Kashmir".to_string(),
            price: 10.0,
            quantity: 5,
            remark: Remark::Available,
            status,
            added_by: added_by.to_string(),
            added_by_role: Role::Manager,
            approved_by: None,
            approved_by_role: None,
            approval_date: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn manager_sees_own_items_any_status() {
        assert!(visible_to("alice", Role::Manager, &item("alice", Status::Pending)));
        assert!(visible_to("alice", Role::Manager, &item("alice", Status::Rejected)));
        assert!(visible_to("alice", Role::Manager, &item("alice", Status::Approved)));
    }

    #[test]
    fn manager_sees_foreign_items_only_when_approved() {
        assert!(visible_to("alice", Role::Manager, &item("bob", Status::Approved)));
        assert!(!visible_to("alice", Role::Manager, &item("bob", Status::Pending)));
        assert!(!visible_to("alice", Role::Manager, &item("bob", Status::Rejected)));
    }

    #[test]
    fn owner_sees_everything() {
        assert!(visible_to("owner", Role::Owner, &item("bob", Status::Pending)));
        assert!(visible_to("owner", Role::Owner, &item("bob", Status::Rejected)));
        assert!(visible_to("owner", Role::Owner, &item("owner", Status::Approved)));
    }

    #[test]
    fn condition_sql_reflects_role() {
        use sea_orm::{DatabaseBackend, EntityTrait, QueryFilter, QueryTrait};

        let manager_sql = fruit::Entity::find()
            .filter(visibility_condition("alice", Role::Manager))
            .build(DatabaseBackend::Sqlite)
            .to_string();
        assert!(manager_sql.contains("added_by"));
        assert!(manager_sql.contains("Approved"));

        // Owner scope applies no filter at all
        let owner_sql = fruit::Entity::find()
            .filter(visibility_condition("owner", Role::Owner))
            .build(DatabaseBackend::Sqlite)
            .to_string();
        assert!(!owner_sql.contains("WHERE"));
    }
}
