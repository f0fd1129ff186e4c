use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use orchard_db::entities::{account, fruit};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    /// Submits inventory items; sees own items plus approved items
    Manager,
    /// Full visibility and approve/reject authority
    Owner,
}

impl From<account::Role> for Role {
    fn from(role: account::Role) -> Self {
        match role {
            account::Role::Manager => Role::Manager,
            account::Role::Owner => Role::Owner,
        }
    }
}

/// Availability remark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Remark {
    Available,
    #[serde(rename = "In Transit")]
    InTransit,
    #[serde(rename = "Not Available")]
    NotAvailable,
}

impl From<fruit::Remark> for Remark {
    fn from(remark: fruit::Remark) -> Self {
        match remark {
            fruit::Remark::Available => Remark::Available,
            fruit::Remark::InTransit => Remark::InTransit,
            fruit::Remark::NotAvailable => Remark::NotAvailable,
        }
    }
}

impl From<Remark> for fruit::Remark {
    fn from(remark: Remark) -> Self {
        match remark {
            Remark::Available => fruit::Remark::Available,
            Remark::InTransit => fruit::Remark::InTransit,
            Remark::NotAvailable => fruit::Remark::NotAvailable,
        }
    }
}

/// Approval workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WorkflowStatus {
    Pending,
    Approved,
    Rejected,
}

impl From<fruit::Status> for WorkflowStatus {
    fn from(status: fruit::Status) -> Self {
        match status {
            fruit::Status::Pending => WorkflowStatus::Pending,
            fruit::Status::Approved => WorkflowStatus::Approved,
            fruit::Status::Rejected => WorkflowStatus::Rejected,
        }
    }
}

/// A JSON number or a numeric string
///
/// The web client historically sent price and quantity as strings; both
/// forms are accepted and coerced, with out-of-domain values rejected at
/// validation time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) => Some(*n),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Coerce to an integer; fractional values are rejected rather than
    /// truncated.
    pub fn as_i32(&self) -> Option<i32> {
        let value = self.as_f64()?;
        if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 {
            Some(value as i32)
        } else {
            None
        }
    }
}

/// Account information (credentials omitted)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Account {
    /// Account UUID
    pub id: String,
    /// Login name
    pub username: String,
    /// Account role
    pub role: Role,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<account::Model> for Account {
    fn from(model: account::Model) -> Self {
        Self {
            id: model.id.to_string(),
            username: model.username,
            role: model.role.into(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Minimal account listing used by the bootstrap endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountSummary {
    /// Login name
    pub username: String,
    /// Account role
    pub role: Role,
}

impl From<account::Model> for AccountSummary {
    fn from(model: account::Model) -> Self {
        Self {
            username: model.username,
            role: model.role.into(),
        }
    }
}

/// List of accounts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountList {
    /// Accounts
    pub accounts: Vec<Account>,
    /// Total count
    pub total: usize,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Authenticated account
    pub account: Account,
    /// Session token
    pub token: String,
    /// Token expiration timestamp
    pub expires_at: DateTime<Utc>,
}

/// Bootstrap response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetupResponse {
    /// Outcome description
    pub message: String,
    /// Whether default accounts were created by this call
    pub created: bool,
    /// Accounts present after the call (usernames and roles only)
    pub accounts: Vec<AccountSummary>,
}

/// Inventory item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Fruit {
    /// Fruit UUID
    pub id: String,
    /// Product name
    pub product_name: String,
    /// Origin region
    pub state: String,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub quantity: i32,
    /// Availability remark
    pub remark: Remark,
    /// Approval workflow state
    pub status: WorkflowStatus,
    /// Username of the creator
    pub added_by: String,
    /// Role of the creator
    pub added_by_role: Role,
    /// Username of the Owner who last approved or rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    /// Role of the approver
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by_role: Option<Role>,
    /// When the item was last approved or rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<DateTime<Utc>>,
    /// Reason given on rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// When the item was created
    pub created_at: DateTime<Utc>,
    /// When the item was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<fruit::Model> for Fruit {
    fn from(model: fruit::Model) -> Self {
        Self {
            id: model.id.to_string(),
            product_name: model.product_name,
            state: model.state,
            price: model.price,
            quantity: model.quantity,
            remark: model.remark.into(),
            status: model.status.into(),
            added_by: model.added_by,
            added_by_role: model.added_by_role.into(),
            approved_by: model.approved_by,
            approved_by_role: model.approved_by_role.map(Into::into),
            approval_date: model.approval_date,
            rejection_reason: model.rejection_reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// List of inventory items
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FruitList {
    /// Items visible to the caller
    pub fruits: Vec<Fruit>,
    /// Total count
    pub total: usize,
}

/// Request to create an inventory item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateFruitRequest {
    /// Product name
    pub product_name: String,
    /// Origin region; ignored when the product name has a fixed origin,
    /// required otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Unit price (number or numeric string, must be >= 0)
    pub price: Numeric,
    /// Units in stock (integer or numeric string, must be >= 0)
    pub quantity: Numeric,
    /// Availability remark (default Available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<Remark>,
}

/// Request to update an inventory item; only provided fields are applied
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateFruitRequest {
    /// New product name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// New origin region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// New unit price (must be >= 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Numeric>,
    /// New quantity (must be >= 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Numeric>,
    /// New availability remark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<Remark>,
}

/// Request to reject an inventory item
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RejectFruitRequest {
    /// Why the item was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Response for approve/reject operations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FruitActionResponse {
    /// Outcome description
    pub message: String,
    /// The item after the transition
    pub fruit: Fruit,
}

/// Generic success message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Outcome description
    pub message: String,
}

/// Role-scoped dashboard statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    /// Items visible to the caller
    pub total_fruits: usize,
    /// Visible items with Approved status
    pub approved_fruits: usize,
    /// Visible items with Pending status
    pub pending_fruits: usize,
    /// Visible items with Rejected status
    pub rejected_fruits: usize,
    /// Sum of price * quantity over approved visible items
    pub total_value: f64,
    /// Sum of quantity over approved visible items
    pub total_quantity: i64,
    /// Caller's login name
    pub username: String,
    /// Caller's role
    pub role: Role,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_accepts_numbers_and_strings() {
        let n: Numeric = serde_json::from_str("12.5").unwrap();
        assert_eq!(n.as_f64(), Some(12.5));

        let n: Numeric = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(n.as_f64(), Some(12.5));

        let n: Numeric = serde_json::from_str("\"not a number\"").unwrap();
        assert_eq!(n.as_f64(), None);
    }

    #[test]
    fn numeric_integer_coercion_rejects_fractions() {
        let n: Numeric = serde_json::from_str("5").unwrap();
        assert_eq!(n.as_i32(), Some(5));

        let n: Numeric = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(n.as_i32(), Some(5));

        let n: Numeric = serde_json::from_str("5.5").unwrap();
        assert_eq!(n.as_i32(), None);
    }

    #[test]
    fn remark_serializes_with_spaces() {
        assert_eq!(
            serde_json::to_string(&Remark::InTransit).unwrap(),
            "\"In Transit\""
        );
        assert_eq!(
            serde_json::to_string(&Remark::NotAvailable).unwrap(),
            "\"Not Available\""
        );
    }
}
