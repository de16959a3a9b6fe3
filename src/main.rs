//! almacen-server — wholesale order/inventory API
//!
//! Long-running service that:
//! - Serves the public product catalog and takes storefront orders
//! - Confirms orders and manages stock from the admin panel (JWT authenticated)
//! - Reports monthly customer rankings and dashboard stats

mod api;
mod auth;
mod config;
mod db;
mod error;
mod pricing;
mod state;
mod util;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "almacen_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting almacen-server (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    let app = api::create_router(state.clone(), config.frontend_url.as_deref());

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("almacen-server listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
