use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use orchard_auth::{hash_password, verify_password, SessionClaims, SessionValidator};
use orchard_db::entities::{account, fruit};
use orchard_db::origin::origin_for;
use orchard_db::scope::visibility_condition;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

/// Username/password pairs created by the bootstrap endpoint
const DEFAULT_ACCOUNTS: &[(&str, &str, account::Role)] = &[
    ("manager", "123456", account::Role::Manager),
    ("owner", "123456", account::Role::Owner),
];

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Authenticate with username and password
///
/// Any mismatch (unknown username or wrong password) yields the same
/// generic failure, so usernames cannot be enumerated through this endpoint.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }

    let found = account::Entity::find()
        .filter(account::Column::Username.eq(&body.username))
        .one(&state.db)
        .await?;

    let Some(stored) = found else {
        return Err(invalid_credentials());
    };

    let matches = verify_password(&body.password, &stored.password_hash)
        .map_err(|e| ApiError::internal(format!("Credential verification failed: {}", e)))?;

    if !matches {
        return Err(invalid_credentials());
    }

    let claims = SessionClaims::new(
        stored.id.to_string(),
        stored.username.clone(),
        stored.role.to_string(),
        Duration::hours(state.session_ttl_hours),
    );

    let token = SessionValidator::encode(state.jwt_secret.as_bytes(), &claims)
        .map_err(|e| ApiError::internal(format!("Failed to issue session token: {}", e)))?;

    let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);

    info!("Login: {} ({})", stored.username, stored.role);

    Ok(Json(LoginResponse {
        account: stored.into(),
        token,
        expires_at,
    }))
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthenticated("INVALID_CREDENTIALS", "Invalid credentials")
}

/// Bootstrap default accounts
///
/// Creates one Manager and one Owner when the accounts table is empty;
/// otherwise reports the existing accounts without creating anything.
#[utoipa::path(
    post,
    path = "/api/auth/setup",
    responses(
        (status = 200, description = "Bootstrap outcome", body = SetupResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn setup(State(state): State<Arc<AppState>>) -> Result<Json<SetupResponse>, ApiError> {
    let existing = account::Entity::find().all(&state.db).await?;

    if !existing.is_empty() {
        return Ok(Json(SetupResponse {
            message: "Accounts already exist".to_string(),
            created: false,
            accounts: existing.into_iter().map(Into::into).collect(),
        }));
    }

    let mut created = Vec::with_capacity(DEFAULT_ACCOUNTS.len());

    for (username, password, role) in DEFAULT_ACCOUNTS {
        let hash = hash_password(password)
            .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

        let now = Utc::now();
        let inserted = account::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            password_hash: Set(hash),
            role: Set(*role),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&state.db)
        .await?;

        created.push(inserted.into());
    }

    info!("Bootstrap created {} default accounts", created.len());

    Ok(Json(SetupResponse {
        message: "Default accounts created successfully".to_string(),
        created: true,
        accounts: created,
    }))
}

/// List accounts (credentials omitted)
#[utoipa::path(
    get,
    path = "/api/auth/users",
    responses(
        (status = 200, description = "List of accounts", body = AccountList),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AccountList>, ApiError> {
    let accounts: Vec<Account> = account::Entity::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let total = accounts.len();

    Ok(Json(AccountList { accounts, total }))
}

/// List inventory items visible to the caller
///
/// Managers see their own items plus everyone's approved items; Owners see
/// all items. Newest first.
#[utoipa::path(
    get,
    path = "/api/fruits",
    responses(
        (status = 200, description = "Role-scoped item list", body = FruitList),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse)
    ),
    tag = "fruits"
)]
pub async fn list_fruits(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FruitList>, ApiError> {
    user.require_role(&[account::Role::Manager, account::Role::Owner])?;

    debug!("Listing fruits for {} ({})", user.username, user.role);

    let fruits: Vec<Fruit> = fruit::Entity::find()
        .filter(visibility_condition(&user.username, user.role))
        .order_by_desc(fruit::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let total = fruits.len();

    Ok(Json(FruitList { fruits, total }))
}

/// Create an inventory item
///
/// The origin region is derived from the product name when the product has
/// a fixed origin; otherwise the caller-supplied state is used. Items
/// created by Owners start Approved, everything else starts Pending.
#[utoipa::path(
    post,
    path = "/api/fruits",
    request_body = CreateFruitRequest,
    responses(
        (status = 201, description = "Item created", body = Fruit),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse)
    ),
    tag = "fruits"
)]
pub async fn create_fruit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateFruitRequest>,
) -> Result<(StatusCode, Json<Fruit>), ApiError> {
    user.require_role(&[account::Role::Manager, account::Role::Owner])?;

    if body.product_name.trim().is_empty() {
        return Err(ApiError::validation("product_name is required"));
    }

    let price = body
        .price
        .as_f64()
        .ok_or_else(|| ApiError::validation("price must be a number"))?;
    if price < 0.0 {
        return Err(ApiError::validation("price must be non-negative"));
    }

    let quantity = body
        .quantity
        .as_i32()
        .ok_or_else(|| ApiError::validation("quantity must be an integer"))?;
    if quantity < 0 {
        return Err(ApiError::validation("quantity must be non-negative"));
    }

    let origin_state = match origin_for(&body.product_name) {
        Some(origin) => origin.to_string(),
        None => body
            .state
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::validation("state is required for products without a fixed origin")
            })?,
    };

    let status = if user.role == account::Role::Owner {
        fruit::Status::Approved
    } else {
        fruit::Status::Pending
    };

    let now = Utc::now();
    let inserted = fruit::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_name: Set(body.product_name.clone()),
        state: Set(origin_state),
        price: Set(price),
        quantity: Set(quantity),
        remark: Set(body.remark.map(Into::into).unwrap_or(fruit::Remark::Available)),
        status: Set(status),
        added_by: Set(user.username.clone()),
        added_by_role: Set(user.role),
        approved_by: Set(None),
        approved_by_role: Set(None),
        approval_date: Set(None),
        rejection_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    info!(
        "Fruit created: {} by {} ({:?})",
        inserted.product_name, user.username, inserted.status
    );

    Ok((StatusCode::CREATED, Json(inserted.into())))
}

/// Update an inventory item
///
/// Managers may update only their own not-yet-approved items; Owners may
/// update anything. Workflow fields are not touchable here, and the origin
/// lookup is not re-applied.
#[utoipa::path(
    put,
    path = "/api/fruits/{id}",
    params(
        ("id" = String, Path, description = "Fruit ID")
    ),
    request_body = UpdateFruitRequest,
    responses(
        (status = 200, description = "Updated item", body = Fruit),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 403, description = "Outside caller's scope", body = ErrorResponse),
        (status = 404, description = "Fruit not found", body = ErrorResponse)
    ),
    tag = "fruits"
)]
pub async fn update_fruit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateFruitRequest>,
) -> Result<Json<Fruit>, ApiError> {
    user.require_role(&[account::Role::Manager, account::Role::Owner])?;

    let existing = find_fruit(&state, &id).await?;

    if user.role == account::Role::Manager {
        if existing.added_by != user.username {
            return Err(ApiError::forbidden("You can only update your own items"));
        }
        if existing.status == fruit::Status::Approved {
            return Err(ApiError::forbidden("Cannot update approved items"));
        }
    }

    let mut active: fruit::ActiveModel = existing.into();

    if let Some(product_name) = body.product_name {
        if product_name.trim().is_empty() {
            return Err(ApiError::validation("product_name must not be empty"));
        }
        active.product_name = Set(product_name);
    }

    if let Some(origin_state) = body.state {
        active.state = Set(origin_state);
    }

    if let Some(price) = body.price {
        let price = price
            .as_f64()
            .ok_or_else(|| ApiError::validation("price must be a number"))?;
        if price < 0.0 {
            return Err(ApiError::validation("price must be non-negative"));
        }
        active.price = Set(price);
    }

    if let Some(quantity) = body.quantity {
        let quantity = quantity
            .as_i32()
            .ok_or_else(|| ApiError::validation("quantity must be an integer"))?;
        if quantity < 0 {
            return Err(ApiError::validation("quantity must be non-negative"));
        }
        active.quantity = Set(quantity);
    }

    if let Some(remark) = body.remark {
        active.remark = Set(remark.into());
    }

    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;

    Ok(Json(updated.into()))
}

/// Delete an inventory item
///
/// Managers may delete only their own not-yet-approved items; Owners may
/// delete anything.
#[utoipa::path(
    delete,
    path = "/api/fruits/{id}",
    params(
        ("id" = String, Path, description = "Fruit ID")
    ),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 403, description = "Outside caller's scope", body = ErrorResponse),
        (status = 404, description = "Fruit not found", body = ErrorResponse)
    ),
    tag = "fruits"
)]
pub async fn delete_fruit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require_role(&[account::Role::Manager, account::Role::Owner])?;

    let existing = find_fruit(&state, &id).await?;

    if user.role == account::Role::Manager {
        if existing.added_by != user.username {
            return Err(ApiError::forbidden("You can only delete your own items"));
        }
        if existing.status == fruit::Status::Approved {
            return Err(ApiError::forbidden("Cannot delete approved items"));
        }
    }

    fruit::Entity::delete_by_id(existing.id)
        .exec(&state.db)
        .await?;

    info!("Fruit {} deleted by {}", existing.id, user.username);

    Ok(Json(MessageResponse {
        message: "Fruit deleted successfully".to_string(),
    }))
}

/// Approve an inventory item (Owner only)
///
/// Also legal on Rejected items (re-approval); clears any rejection reason.
#[utoipa::path(
    put,
    path = "/api/fruits/{id}/approve",
    params(
        ("id" = String, Path, description = "Fruit ID")
    ),
    responses(
        (status = 200, description = "Item approved", body = FruitActionResponse),
        (status = 403, description = "Caller is not an Owner", body = ErrorResponse),
        (status = 404, description = "Fruit not found", body = ErrorResponse)
    ),
    tag = "fruits"
)]
pub async fn approve_fruit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<FruitActionResponse>, ApiError> {
    user.require_role(&[account::Role::Owner])?;

    let existing = find_fruit(&state, &id).await?;

    let mut active: fruit::ActiveModel = existing.into();
    active.status = Set(fruit::Status::Approved);
    active.approved_by = Set(Some(user.username.clone()));
    active.approved_by_role = Set(Some(user.role));
    active.approval_date = Set(Some(Utc::now()));
    active.rejection_reason = Set(None);
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;

    info!("Fruit {} approved by {}", updated.id, user.username);

    Ok(Json(FruitActionResponse {
        message: "Fruit approved successfully".to_string(),
        fruit: updated.into(),
    }))
}

/// Reject an inventory item (Owner only)
///
/// Also legal on Approved items; there is deliberately no guard against
/// reversing an approval.
#[utoipa::path(
    put,
    path = "/api/fruits/{id}/reject",
    params(
        ("id" = String, Path, description = "Fruit ID")
    ),
    request_body = RejectFruitRequest,
    responses(
        (status = 200, description = "Item rejected", body = FruitActionResponse),
        (status = 403, description = "Caller is not an Owner", body = ErrorResponse),
        (status = 404, description = "Fruit not found", body = ErrorResponse)
    ),
    tag = "fruits"
)]
pub async fn reject_fruit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<RejectFruitRequest>,
) -> Result<Json<FruitActionResponse>, ApiError> {
    user.require_role(&[account::Role::Owner])?;

    let existing = find_fruit(&state, &id).await?;

    let reason = body
        .rejection_reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| "No reason provided".to_string());

    let mut active: fruit::ActiveModel = existing.into();
    active.status = Set(fruit::Status::Rejected);
    active.rejection_reason = Set(Some(reason));
    active.approved_by = Set(Some(user.username.clone()));
    active.approved_by_role = Set(Some(user.role));
    active.approval_date = Set(Some(Utc::now()));
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;

    info!("Fruit {} rejected by {}", updated.id, user.username);

    Ok(Json(FruitActionResponse {
        message: "Fruit rejected successfully".to_string(),
        fruit: updated.into(),
    }))
}

/// Role-scoped dashboard statistics
///
/// Counts run over the same visibility scope as the list endpoint; value and
/// quantity totals cover approved items only.
#[utoipa::path(
    get,
    path = "/api/fruits/stats",
    responses(
        (status = 200, description = "Aggregate statistics", body = StatsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse)
    ),
    tag = "fruits"
)]
pub async fn fruit_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse>, ApiError> {
    user.require_role(&[account::Role::Manager, account::Role::Owner])?;

    let visible = fruit::Entity::find()
        .filter(visibility_condition(&user.username, user.role))
        .all(&state.db)
        .await?;

    let total_fruits = visible.len();
    let approved_fruits = visible
        .iter()
        .filter(|f| f.status == fruit::Status::Approved)
        .count();
    let pending_fruits = visible
        .iter()
        .filter(|f| f.status == fruit::Status::Pending)
        .count();
    let rejected_fruits = visible
        .iter()
        .filter(|f| f.status == fruit::Status::Rejected)
        .count();

    let approved = visible
        .iter()
        .filter(|f| f.status == fruit::Status::Approved);
    let total_value: f64 = approved
        .clone()
        .map(|f| f.price * f.quantity as f64)
        .sum();
    let total_quantity: i64 = approved.map(|f| f.quantity as i64).sum();

    Ok(Json(StatsResponse {
        total_fruits,
        approved_fruits,
        pending_fruits,
        rejected_fruits,
        total_value,
        total_quantity,
        username: user.username,
        role: user.role.into(),
    }))
}

/// List items awaiting approval (Owner only)
#[utoipa::path(
    get,
    path = "/api/fruits/pending",
    responses(
        (status = 200, description = "Pending items, newest first", body = FruitList),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not an Owner", body = ErrorResponse)
    ),
    tag = "fruits"
)]
pub async fn pending_fruits(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FruitList>, ApiError> {
    user.require_role(&[account::Role::Owner])?;

    let fruits: Vec<Fruit> = fruit::Entity::find()
        .filter(fruit::Column::Status.eq(fruit::Status::Pending))
        .order_by_desc(fruit::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let total = fruits.len();

    Ok(Json(FruitList { fruits, total }))
}

/// Resolve a path id to a stored fruit, or 404.
async fn find_fruit(state: &AppState, id: &str) -> Result<fruit::Model, ApiError> {
    let fruit_id =
        Uuid::parse_str(id).map_err(|_| ApiError::validation("Invalid fruit id"))?;

    fruit::Entity::find_by_id(fruit_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Fruit not found"))
}
