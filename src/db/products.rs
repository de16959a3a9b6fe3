//! Product database operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub price_bulk: Option<f64>,
    pub category: String,
    pub stock: i32,
    pub image: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new product; the handler enforces required fields
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub price_bulk: Option<f64>,
    pub category: String,
    pub stock: i32,
    pub image: Option<String>,
}

/// Partial update; unset fields keep their current values, except
/// `price_bulk` which is written verbatim so the override can be cleared.
#[derive(Debug, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub price_bulk: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<i32>,
    pub image: Option<String>,
    pub active: Option<bool>,
}

/// Active products, optionally filtered by category and/or a substring
/// search over name and description.
pub async fn list(
    pool: &PgPool,
    category: Option<&str>,
    search: Option<&str>,
) -> Result<Vec<ProductRow>, ApiError> {
    let pattern = search.map(|s| format!("%{s}%"));
    let rows = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT * FROM products
        WHERE active = TRUE
          AND ($1::text IS NULL OR category = $1)
          AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2)
        ORDER BY category, name ASC
        "#,
    )
    .bind(category)
    .bind(pattern.as_deref())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Distinct categories of active products
pub async fn categories(pool: &PgPool) -> Result<Vec<String>, ApiError> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT category FROM products WHERE active = TRUE ORDER BY category",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<ProductRow>, ApiError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT * FROM products WHERE id = $1 AND active = TRUE",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create(pool: &PgPool, product: &NewProduct) -> Result<ProductRow, ApiError> {
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        INSERT INTO products (name, description, price, price_bulk, category, stock, image)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.price_bulk)
    .bind(&product.category)
    .bind(product.stock)
    .bind(&product.image)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    update: &ProductUpdate,
) -> Result<Option<ProductRow>, ApiError> {
    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        UPDATE products SET
            name        = COALESCE($1, name),
            description = COALESCE($2, description),
            price       = COALESCE($3, price),
            price_bulk  = $4,
            category    = COALESCE($5, category),
            stock       = COALESCE($6, stock),
            image       = COALESCE($7, image),
            active      = COALESCE($8, active)
        WHERE id = $9
        RETURNING *
        "#,
    )
    .bind(&update.name)
    .bind(&update.description)
    .bind(update.price)
    .bind(update.price_bulk)
    .bind(&update.category)
    .bind(update.stock)
    .bind(&update.image)
    .bind(update.active)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Soft delete: the row stays so order history keeps its references
pub async fn soft_delete(pool: &PgPool, id: i64) -> Result<bool, ApiError> {
    let result = sqlx::query("UPDATE products SET active = FALSE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
