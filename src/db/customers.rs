//! Customer database operations
//!
//! Customers are created implicitly by order placement (see `db::orders`)
//! and edited by the admin; they are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Customer list row with aggregate order stats; spend only counts
/// confirmed/delivered orders.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerWithStats {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub total_orders: i64,
    pub total_spent: f64,
}

/// Partial update; unset fields keep their current values
#[derive(Debug, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// All customers with their order stats, biggest spenders first;
/// optional substring search over name and phone.
pub async fn list(pool: &PgPool, search: Option<&str>) -> Result<Vec<CustomerWithStats>, ApiError> {
    let pattern = search.map(|s| format!("%{s}%"));
    let rows = sqlx::query_as::<_, CustomerWithStats>(
        r#"
        SELECT c.*,
            COUNT(o.id) AS total_orders,
            COALESCE(SUM(o.total) FILTER (WHERE o.status IN ('confirmed', 'delivered')), 0) AS total_spent
        FROM customers c
        LEFT JOIN orders o ON o.customer_id = c.id
        WHERE ($1::text IS NULL OR c.name ILIKE $1 OR c.phone ILIKE $1)
        GROUP BY c.id
        ORDER BY total_spent DESC
        "#,
    )
    .bind(pattern.as_deref())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<CustomerRow>, ApiError> {
    let row = sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    update: &CustomerUpdate,
) -> Result<Option<CustomerRow>, ApiError> {
    let row = sqlx::query_as::<_, CustomerRow>(
        r#"
        UPDATE customers SET
            name    = COALESCE($1, name),
            phone   = COALESCE($2, phone),
            address = COALESCE($3, address),
            email   = COALESCE($4, email),
            notes   = COALESCE($5, notes)
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(&update.name)
    .bind(&update.phone)
    .bind(&update.address)
    .bind(&update.email)
    .bind(&update.notes)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
