//! Quote Gateway Server
//!
//! HTTP gateway proxying stock-quote lookups behind a TTL cache and a
//! token authorization table.

use quote_gateway::api::create_router;
use quote_gateway::config::Config;
use quote_gateway::db::DatabasePool;
use quote_gateway::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use quote_gateway::db::{AccountStatus, Privilege, UserRow};
use quote_gateway::models::{
    AddUserRequest, HealthResponse, StatusResponse, UpdateTokenRequest, UpdateUserRequest,
    UserCheckResponse, UserListResponse,
};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        quote_gateway::api::handlers::health_check,
        quote_gateway::api::handlers::get_quote,
        quote_gateway::api::handlers::user_check,
        quote_gateway::api::handlers::update_user,
        quote_gateway::api::handlers::add_user,
        quote_gateway::api::handlers::update_user_token,
        quote_gateway::api::handlers::user_list,
    ),
    components(
        schemas(
            HealthResponse,
            StatusResponse,
            UserCheckResponse,
            UserListResponse,
            UpdateUserRequest,
            AddUserRequest,
            UpdateTokenRequest,
            UserRow,
            AccountStatus,
            Privilege,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Quotes", description = "Cached stock quote lookups"),
        (name = "Users", description = "Account verification and management"),
    ),
    info(
        title = "Quote Gateway API",
        version = "0.1.0",
        description = "Caching HTTP gateway for stock quote lookups",
        license(name = "MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Establish the pool and make sure the users table and the default
    // admin account exist.
    let db = DatabasePool::new(&config.database_url).await?;
    db.bootstrap().await?;

    let state = Arc::new(AppState::new(&config, db)?);

    info!(
        "Starting Quote Gateway on {}:{}",
        config.host, config.port
    );
    info!(
        "Swagger UI available at http://{}:{}/swagger-ui/",
        config.host, config.port
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
