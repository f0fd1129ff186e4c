//! Fruit inventory entity with embedded approval workflow metadata

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::account::Role;

/// Stock availability remark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Remark {
    #[sea_orm(string_value = "Available")]
    Available,

    #[sea_orm(string_value = "In Transit")]
    #[serde(rename = "In Transit")]
    InTransit,

    #[sea_orm(string_value = "Not Available")]
    #[serde(rename = "Not Available")]
    NotAvailable,
}

/// Approval state of an inventory item
///
/// Pending is initial (Approved when the creator is an Owner). Only Owners
/// transition the state; Approved blocks Manager edits and deletes but an
/// Owner may still move the item back to Rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Status {
    #[sea_orm(string_value = "Pending")]
    Pending,

    #[sea_orm(string_value = "Approved")]
    Approved,

    #[sea_orm(string_value = "Rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fruits")]
pub struct Model {
    /// Fruit UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Product name (e.g. "Apple")
    pub product_name: String,

    /// Origin region, auto-derived from the product name when known
    pub state: String,

    /// Unit price (non-negative)
    pub price: f64,

    /// Units in stock (non-negative)
    pub quantity: i32,

    /// Availability remark
    pub remark: Remark,

    /// Approval workflow state
    pub status: Status,

    /// Username of the creator
    pub added_by: String,

    /// Role of the creator
    pub added_by_role: Role,

    /// Username of the Owner who last approved or rejected
    pub approved_by: Option<String>,

    /// Role of the approver
    pub approved_by_role: Option<Role>,

    /// When the item was last approved or rejected
    pub approval_date: Option<ChronoDateTimeUtc>,

    /// Reason given on rejection, cleared on approval
    pub rejection_reason: Option<String>,

    /// When the item was created
    pub created_at: ChronoDateTimeUtc,

    /// When the item was last updated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
