//! Application setup and router configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::auth::{
    channels_from_config, AuthService, Dispatcher, InMemoryOtpStore, TokenService,
};
use crate::domains::user::PgUserDirectory;
use crate::server::routes::{
    check_user_handler, health_handler, login_handler, logout_handler, profile_handler,
    refresh_handler, register_handler, send_otp_handler, verify_otp_handler,
};

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth: Arc<AuthService>,
}

/// Build the Axum application router.
///
/// All collaborators are constructed here and flow into `AuthService`
/// explicitly - no module-level singletons, so tests can assemble the
/// same service around doubles.
pub fn build_app(pool: PgPool, config: &Config) -> Router {
    let tokens = TokenService::new(&config.jwt_secret, &config.jwt_refresh_secret);
    let dispatcher = Dispatcher::new(
        channels_from_config(config),
        Duration::from_secs(config.delivery_timeout_secs),
    );
    let auth = Arc::new(AuthService::new(
        Arc::new(InMemoryOtpStore::new()),
        dispatcher,
        Arc::new(PgUserDirectory::new(pool.clone())),
        tokens,
        config.development_mode,
    ));

    let state = AppState {
        db_pool: pool,
        auth,
    };

    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
    };

    Router::new()
        .route("/api/auth/send-otp", post(send_otp_handler))
        .route("/api/auth/verify-otp", post(verify_otp_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/refresh", post(refresh_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/check-user", post(check_user_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/profile", get(profile_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
