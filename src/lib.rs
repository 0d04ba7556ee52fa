//! Construction Materials Marketplace API Library
//!
//! REST backend for materials trading, material orders and skip hire.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod common;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    http::HeaderValue,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::auth::{AuthRouterExt, AuthService};
use crate::entities::user::UserType;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Wires services, auth and events over one connection pool
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let auth = Arc::new(AuthService::new(
            auth::AuthConfig::from(&config),
            db.clone(),
        ));
        let services = handlers::AppServices::new(
            db.clone(),
            Arc::new(event_sender.clone()),
            services::CommerceSettings::from(&config),
        );

        Self {
            db,
            config,
            event_sender,
            auth,
            services,
        }
    }
}

pub fn api_v1_routes() -> Router<AppState> {
    let auth_public = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login));

    let auth_private = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .with_auth();

    let companies_admin = Router::new()
        .route("/companies", post(handlers::companies::create_company))
        .with_roles(&[UserType::Admin]);

    let companies_read = Router::new()
        .route("/companies", get(handlers::companies::list_companies))
        .route("/companies/:id", get(handlers::companies::get_company))
        .with_auth();

    let materials_public = Router::new()
        .route("/materials", get(handlers::materials::list_materials))
        .route(
            "/materials/categories",
            get(handlers::materials::list_categories),
        )
        .route("/materials/search", get(handlers::materials::search_materials))
        .route("/materials/:id", get(handlers::materials::get_material));

    let materials_manage = Router::new()
        .route("/materials", post(handlers::materials::create_material))
        .route(
            "/materials/:id",
            patch(handlers::materials::update_material)
                .delete(handlers::materials::delete_material),
        )
        .with_roles(&[UserType::Supplier, UserType::Admin]);

    let orders = Router::new()
        .route(
            "/orders",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route(
            "/orders/:id",
            get(handlers::orders::get_order).patch(handlers::orders::update_order),
        )
        .route("/orders/:id/confirm", post(handlers::orders::confirm_order))
        .route("/orders/:id/cancel", post(handlers::orders::cancel_order))
        .with_auth();

    let skip_hire_booking = Router::new()
        .route("/skip-hire", post(handlers::skip_hire::create_booking))
        .with_optional_auth();

    let skip_hire_public = Router::new()
        .route(
            "/skip-hire/number/:order_number",
            get(handlers::skip_hire::get_booking_by_number),
        )
        .route("/skip-hire/:id", get(handlers::skip_hire::get_booking));

    let skip_hire_user = Router::new()
        .route("/skip-hire/my", get(handlers::skip_hire::my_bookings))
        .route(
            "/skip-hire/:id/cancel",
            post(handlers::skip_hire::cancel_booking),
        )
        .with_auth();

    let skip_hire_admin = Router::new()
        .route("/skip-hire", get(handlers::skip_hire::list_bookings))
        .route(
            "/skip-hire/:id/status",
            patch(handlers::skip_hire::update_booking_status),
        )
        .with_roles(&[UserType::Admin]);

    Router::new()
        .merge(auth_public)
        .merge(auth_private)
        .merge(companies_admin)
        .merge(companies_read)
        .merge(materials_public)
        .merge(materials_manage)
        .merge(orders)
        .merge(skip_hire_booking)
        .merge(skip_hire_public)
        .merge(skip_hire_user)
        .merge(skip_hire_admin)
}

/// CORS from configured origins; permissive only in development
pub fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.is_development() {
        ::tracing::info!("Using permissive CORS because explicit origins were not configured");
        CorsLayer::permissive()
    } else {
        // Validation rejects this combination; deny cross-origin requests if it slips through.
        CorsLayer::new()
    }
}

/// Full application: status/health, the v1 API, Swagger UI and the shared layer stack
pub fn build_router(state: AppState) -> Router {
    let auth_service = state.auth.clone();
    let cors = cors_layer(&state.config);
    let timeout = state.config.request_timeout();

    Router::<AppState>::new()
        .route("/health", get(health_check))
        .route("/status", get(api_status))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        // Inject AuthService into request extensions for auth middleware
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            |State(auth): State<Arc<AuthService>>,
             mut req: axum::extract::Request,
             next: axum::middleware::Next| async move {
                req.extensions_mut().insert(auth);
                next.run(req).await
            },
        ))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "marketplace-api",
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match db::check_connection(&state.db).await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Json(json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
