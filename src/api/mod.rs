//! API routes for almacen-server

pub mod auth;
pub mod customers;
pub mod health;
pub mod orders;
pub mod products;
pub mod reports;

use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post, put};
use axum::{Json, Router, middleware};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{admin_auth_middleware, rate_limit};
use crate::error::ApiError;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Create the combined router
pub fn create_router(state: AppState, frontend_url: Option<&str>) -> Router {
    // Public storefront surface: catalog reads and order creation
    let public = Router::new()
        .route("/", get(health::health_check))
        .route("/api/products", get(products::list_products))
        .route("/api/products/categories", get(products::list_categories))
        .route("/api/products/{id}", get(products::get_product))
        .route("/api/orders", post(orders::create_order));

    // Admin login (rate-limited per IP)
    let login = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::login_rate_limit,
        ));

    // Admin panel surface (JWT required)
    let admin = Router::new()
        .route("/api/products", post(products::create_product))
        .route(
            "/api/products/{id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/api/orders", get(orders::list_orders))
        .route(
            "/api/orders/{id}",
            get(orders::get_order).delete(orders::delete_order),
        )
        .route("/api/orders/{id}/confirm", post(orders::confirm_order))
        .route("/api/orders/{id}/status", put(orders::update_order_status))
        .route("/api/customers", get(customers::list_customers))
        .route(
            "/api/customers/{id}",
            get(customers::get_customer).put(customers::update_customer),
        )
        .route("/api/ranking", get(reports::monthly_ranking))
        .route("/api/stats", get(reports::stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(login)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(frontend_url))
        .with_state(state)
}

/// CORS for the storefront/panel origin; any origin when none is configured
fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match frontend_url.and_then(|u| u.parse::<HeaderValue>().ok()) {
        Some(origin) => layer.allow_origin(origin),
        None => layer.allow_origin(Any),
    }
}
