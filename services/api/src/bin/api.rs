//! services/api/src/bin/api.rs

use api_lib::{
    adapters::MemoryStore,
    config::Config,
    error::ApiError,
    web::{
        add_comment_handler, delete_comment_handler, delete_pin_handler, feed_handler,
        get_pin_handler, list_pins_handler, publish_pin_handler, recent_logs_handler,
        require_identity, rest::ApiDoc, state::AppState, toggle_like_handler,
        toggle_save_handler, update_avatar_handler, user_profile_handler, user_stats_handler,
    },
};
use axum::{
    http::{
        header::{HeaderName, ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Store Adapter & Shared State ---
    let store = Arc::new(MemoryStore::new());
    let app_state = AppState::new(store, config.clone());

    // --- 3. CORS ---
    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, CONTENT_TYPE, HeaderName::from_static("x-user-id")]);
    if let Some(origin) = &config.allowed_origin {
        let origin = origin
            .parse::<HeaderValue>()
            .map_err(|_| ApiError::Internal(format!("Invalid ALLOWED_ORIGIN: '{origin}'")))?;
        cors = cors.allow_origin(origin);
    }

    // --- 4. Create the Web Router ---
    // Read-only routes (no identity required)
    let public_routes = Router::new()
        .route("/pins", get(list_pins_handler))
        .route("/pins/{id}", get(get_pin_handler))
        .route("/users/{id}/stats", get(user_stats_handler))
        .route("/users/{id}/profile", get(user_profile_handler))
        .route("/logs", get(recent_logs_handler));

    // Acting routes (x-user-id required)
    let protected_routes = Router::new()
        .route("/pins", post(publish_pin_handler))
        .route("/pins/{id}", delete(delete_pin_handler))
        .route("/pins/{id}/like", post(toggle_like_handler))
        .route("/pins/{id}/save", post(toggle_save_handler))
        .route("/pins/{id}/comments", post(add_comment_handler))
        .route(
            "/pins/{id}/comments/{comment_id}",
            delete(delete_comment_handler),
        )
        .route("/users/{id}/avatar", put(update_avatar_handler))
        .route("/feed", get(feed_handler))
        .layer(axum_middleware::from_fn(require_identity));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
