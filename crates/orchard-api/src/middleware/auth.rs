//! Session authentication middleware
//!
//! Extracts the session token from an HTTP-only cookie or the Authorization
//! header, validates signature and expiration, then resolves the account
//! from the database. The role attached to the request is the stored role:
//! a token minted before a role change (or for a deleted account) never
//! grants the old authority.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use sea_orm::EntityTrait;
use std::sync::Arc;
use uuid::Uuid;

use orchard_db::entities::account::Role;
use orchard_db::entities::prelude::Account;

use crate::error::ApiError;
use crate::AppState;

/// Authenticated caller context resolved from a session token
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Account UUID
    pub id: Uuid,
    /// Login name (from the database, not the token)
    pub username: String,
    /// Role (from the database, not the token)
    pub role: Role,
}

impl AuthUser {
    /// Authorize the caller against a required role set.
    ///
    /// The failure message enumerates the acceptable roles and the caller's
    /// actual role; authorization failures (403) stay distinct from
    /// authentication failures (401).
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            return Ok(());
        }

        let required = allowed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ");

        Err(ApiError::forbidden(format!(
            "Access denied. Required role: {}. Your role: {}",
            required, self.role
        )))
    }
}

/// Authentication middleware for protected routes
///
/// # Errors
/// Returns 401 Unauthorized if:
/// - Both cookie and Authorization header are missing
/// - The Authorization header is not `Bearer <token>`
/// - The token is malformed, tampered with, or expired
/// - The token subject no longer resolves to a stored account
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Try to extract token from cookie first (preferred for web apps)
    let token = if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        cookie_header.to_str().ok().and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find(|c| c.starts_with("session_token="))
                .and_then(|c| c.strip_prefix("session_token="))
        })
    } else {
        None
    };

    // If not in cookie, fall back to Authorization header (for API clients)
    let token = match token {
        Some(t) => t.to_string(),
        None => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| {
                    ApiError::unauthenticated(
                        "MISSING_AUTH",
                        "Missing authentication token (cookie or Authorization header)",
                    )
                })?;

            auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| {
                    ApiError::unauthenticated(
                        "INVALID_AUTH_FORMAT",
                        "Invalid Authorization header format. Expected 'Bearer <token>'",
                    )
                })?
                .to_string()
        }
    };

    // Validate the token and extract claims
    let claims = state.sessions.validate(&token).map_err(|e| {
        ApiError::unauthenticated("INVALID_TOKEN", format!("Invalid or expired token: {}", e))
    })?;

    let account_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        ApiError::unauthenticated("INVALID_TOKEN", "Token subject is not a valid account id")
    })?;

    // Resolve the account server-side; the stored role is authoritative
    let account = Account::find_by_id(account_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            ApiError::unauthenticated("UNKNOWN_ACCOUNT", "Account no longer exists")
        })?;

    let auth_user = AuthUser {
        id: account.id,
        username: account.username,
        role: account.role,
    };

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Extension, Json, Router};
    use chrono::{Duration, Utc};
    use orchard_auth::{SessionClaims, SessionValidator};
    use orchard_db::entities::account;
    use sea_orm::{ActiveModelTrait, Set};
    use tower::ServiceExt; // For oneshot()

    const SECRET: &str = "test-secret";

    async fn protected_handler(Extension(user): Extension<AuthUser>) -> Json<String> {
        Json(format!("{}:{}", user.username, user.role))
    }

    async fn create_test_state() -> Arc<AppState> {
        let db = orchard_db::connect("sqlite::memory:")
            .await
            .expect("Failed to connect");
        orchard_db::migrate(&db).await.expect("Failed to migrate");

        Arc::new(AppState {
            db,
            jwt_secret: SECRET.to_string(),
            session_ttl_hours: 24,
            sessions: SessionValidator::new(SECRET.as_bytes()),
        })
    }

    async fn seed_account(state: &AppState, username: &str, role: Role) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        account::ActiveModel {
            id: Set(id),
            username: Set(username.to_string()),
            password_hash: Set(orchard_auth::hash_password("pw").unwrap()),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&state.db)
        .await
        .expect("Failed to insert account");
        id
    }

    fn mint_token(account_id: Uuid, username: &str) -> String {
        let claims = SessionClaims::new(
            account_id.to_string(),
            username.to_string(),
            "Manager".to_string(),
            Duration::hours(1),
        );
        SessionValidator::encode(SECRET.as_bytes(), &claims).unwrap()
    }

    fn create_test_app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/protected", get(protected_handler))
            .layer(middleware::from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_valid_token_resolves_account() {
        let state = create_test_state().await;
        let id = seed_account(&state, "manager", Role::Manager).await;
        let app = create_test_app(state);

        let token = mint_token(id, "manager");
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cookie_token_accepted() {
        let state = create_test_state().await;
        let id = seed_account(&state, "owner", Role::Owner).await;
        let app = create_test_app(state);

        let token = mint_token(id, "owner");
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Cookie", format!("session_token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let state = create_test_state().await;
        let app = create_test_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_bearer_format_rejected() {
        let state = create_test_state().await;
        let app = create_test_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", "Token abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_for_deleted_account_rejected() {
        let state = create_test_state().await;
        let app = create_test_app(state);

        // Token is well-formed but its subject was never stored
        let token = mint_token(Uuid::new_v4(), "ghost");
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_require_role_message_enumerates_roles() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            role: Role::Manager,
        };

        assert!(user.require_role(&[Role::Manager, Role::Owner]).is_ok());

        let err = user.require_role(&[Role::Owner]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Required role: Owner"));
        assert!(message.contains("Your role: Manager"));
    }
}
