//! Application state for almacen-server

use sqlx::PgPool;

use crate::auth::rate_limit::RateLimiter;
use crate::config::Config;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// JWT signing secret for admin tokens
    pub jwt_secret: String,
    /// Shared admin password for the panel login
    pub admin_password: String,
    /// Rate limiter for the login route
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Create a new AppState: connect the pool and run pending migrations
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database ready");

        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            admin_password: config.admin_password.clone(),
            rate_limiter: RateLimiter::new(),
        })
    }
}
