pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use orchard_auth::SessionValidator;
use sea_orm::DatabaseConnection;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub sessions: SessionValidator,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Orchard API",
        version = "0.1.0",
        description = "REST API for the fruit-inventory approval workflow",
        contact(
            name = "Orchard Team",
            email = "team@orchard.dev"
        )
    ),
    paths(
        handlers::health_check,
        handlers::login,
        handlers::setup,
        handlers::list_users,
        handlers::list_fruits,
        handlers::create_fruit,
        handlers::update_fruit,
        handlers::delete_fruit,
        handlers::approve_fruit,
        handlers::reject_fruit,
        handlers::fruit_stats,
        handlers::pending_fruits,
    ),
    components(
        schemas(
            models::Role,
            models::Remark,
            models::WorkflowStatus,
            models::Numeric,
            models::Account,
            models::AccountSummary,
            models::AccountList,
            models::LoginRequest,
            models::LoginResponse,
            models::SetupResponse,
            models::Fruit,
            models::FruitList,
            models::CreateFruitRequest,
            models::UpdateFruitRequest,
            models::RejectFruitRequest,
            models::FruitActionResponse,
            models::MessageResponse,
            models::StatsResponse,
            models::HealthResponse,
            models::ErrorResponse,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and account endpoints"),
        (name = "fruits", description = "Inventory and approval workflow endpoints"),
        (name = "system", description = "System health endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
    /// Secret for signing session tokens
    pub jwt_secret: String,
    /// Session token validity in hours
    pub session_ttl_hours: i64,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            enable_cors: true,
            jwt_secret: "development-secret-change-me".to_string(),
            session_ttl_hours: 24,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiServerConfig, db: DatabaseConnection) -> Self {
        let state = Arc::new(AppState {
            db,
            jwt_secret: config.jwt_secret.clone(),
            session_ttl_hours: config.session_ttl_hours,
            sessions: SessionValidator::new(config.jwt_secret.as_bytes()),
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        // Build PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/auth/login", post(handlers::login))
            .route("/api/auth/setup", post(handlers::setup))
            .route("/api/auth/users", get(handlers::list_users))
            .with_state(self.state.clone());

        // Build PROTECTED routes (require a valid session token)
        let protected_router = Router::new()
            .route(
                "/api/fruits",
                get(handlers::list_fruits).post(handlers::create_fruit),
            )
            .route("/api/fruits/stats", get(handlers::fruit_stats))
            .route("/api/fruits/pending", get(handlers::pending_fruits))
            .route(
                "/api/fruits/{id}",
                put(handlers::update_fruit).delete(handlers::delete_fruit),
            )
            .route("/api/fruits/{id}/approve", put(handlers::approve_fruit))
            .route("/api/fruits/{id}/reject", put(handlers::reject_fruit))
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                self.state.clone(),
                middleware::require_auth,
            ));

        // Merge public and protected routers
        let api_router = public_router.merge(protected_router);

        // Merge with Swagger UI
        // SwaggerUi automatically creates a route for /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        // Configure CORS
        let cors = if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            // For cookie-based auth we must allow credentials, which rules
            // out allow_origin(Any); exact origins are matched instead.
            let cors_layer = CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                        || origin_str.starts_with("https://localhost:")
                        || origin_str.starts_with("https://127.0.0.1:")
                }));

            Some(cors_layer)
        } else {
            None
        };

        // Build middleware stack
        let mut router = router.layer(TraceLayer::new_for_http());

        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        // Ensure OpenAPI spec can be generated without panics
        let _api_doc = ApiDoc::openapi();
    }
}
