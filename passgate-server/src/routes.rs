//! Router configuration module
//!
//! Configures all routes, middleware layers, and creates the application
//! router.

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::handlers::{
    debug_users, health, login_options, login_verify, ready, register_options, register_verify,
};
use crate::openapi::ApiDoc;
use crate::state::SharedRelyingParty;

/// Create the application router with the given relying-party service
/// and configuration.
pub fn create_router(state: SharedRelyingParty, config: &Config) -> Router {
    // CORS is restricted to the accepted relying-party origins; requests
    // a verifier would reject cannot preflight either.
    let cors_origins: Vec<_> = config
        .rp_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    tracing::info!("CORS: restricting to {} origin(s)", cors_origins.len());
    let cors = CorsLayer::new()
        .allow_origin(cors_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    // Request body limit
    let body_limit = RequestBodyLimitLayer::new(config.body_limit_kb * 1024);

    // Request timeout
    let timeout = TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.timeout_secs),
    );

    let mut router = Router::new()
        .route("/register/options", post(register_options))
        .route("/register/verify", post(register_verify))
        .route("/login/options", post(login_options))
        .route("/login/verify", post(login_verify))
        .route("/health", get(health))
        .route("/ready", get(ready));

    if config.debug_routes {
        tracing::warn!("debug routes enabled; do not expose in production");
        router = router.route("/debug/users", get(debug_users));
    }

    let router = router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(body_limit)
        .layer(timeout);

    // Conditionally apply rate limiting (disabled in tests, enabled in production)
    let router = if config.rate_limit_enabled {
        let governor_conf = GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_sec)
            .burst_size(config.rate_limit_burst)
            .finish()
            .expect("Failed to build rate limiter config");

        tracing::info!(
            "Rate limiting: {} req/s (burst: {})",
            config.rate_limit_per_sec,
            config.rate_limit_burst
        );

        router
            .layer(GovernorLayer::new(Arc::new(governor_conf)))
            .layer(TraceLayer::new_for_http())
    } else {
        tracing::warn!("Rate limiting: DISABLED");
        router.layer(TraceLayer::new_for_http())
    };

    router.with_state(state)
}
