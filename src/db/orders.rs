//! Order lifecycle database operations
//!
//! Orders go through two phases: creation builds a priced "pending" order
//! without touching stock, and confirmation deducts stock under exclusive
//! row locks. Each phase is one transaction; any failure rolls the whole
//! phase back.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::ApiError;
use crate::pricing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        Self::Pending,
        Self::Confirmed,
        Self::Delivered,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Comma-separated list of the valid states, for error messages
    pub fn valid_list() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub status: String,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub subtotal: f64,
}

#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: OrderRow,
    pub items: Vec<OrderItemRow>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: i32,
}

/// Validated input for `create_order`; the handler enforces presence
#[derive(Debug)]
pub struct NewOrder<'a> {
    pub customer_name: &'a str,
    pub customer_phone: Option<&'a str>,
    pub customer_address: Option<&'a str>,
    pub items: &'a [OrderItemInput],
}

#[derive(Debug, Serialize)]
pub struct CreatedOrder {
    pub order_id: i64,
    pub customer_id: Option<i64>,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub status: OrderStatus,
}

/// Create a pending order: resolve the customer, price every line under
/// shared product locks, persist order + items. Stock is NOT deducted here;
/// concurrent pending orders may over-subscribe it, which confirmation
/// resolves with the authoritative check.
pub async fn create_order(pool: &PgPool, order: &NewOrder<'_>) -> Result<CreatedOrder, ApiError> {
    let mut tx = pool.begin().await?;

    let customer_id = match order.customer_phone {
        Some(phone) => Some(
            resolve_customer(&mut tx, order.customer_name, phone, order.customer_address).await?,
        ),
        None => None,
    };

    // Availability check + pricing. FOR SHARE blocks concurrent stock
    // writers on these rows while letting other order creations read.
    let mut lines = Vec::with_capacity(order.items.len());
    let mut item_snapshots = Vec::with_capacity(order.items.len());
    for item in order.items {
        let row: Option<(i64, String, f64, Option<f64>, i32)> = sqlx::query_as(
            "SELECT id, name, price, price_bulk, stock FROM products \
             WHERE id = $1 AND active = TRUE FOR SHARE",
        )
        .bind(item.product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((product_id, name, price, price_bulk, stock)) = row else {
            return Err(ApiError::NotFound(format!(
                "Product {} not found",
                item.product_id
            )));
        };
        if stock < item.quantity {
            return Err(ApiError::Validation(format!(
                "Insufficient stock for \"{name}\" (available: {stock})"
            )));
        }

        let line = pricing::price_line(price, price_bulk, item.quantity);
        item_snapshots.push((product_id, name, item.quantity, line));
        lines.push(line);
    }
    let quote = pricing::quote_lines(&lines);

    let (order_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO orders
            (customer_id, customer_name, customer_phone, customer_address, status, subtotal, discount, total)
        VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(customer_id)
    .bind(order.customer_name)
    .bind(order.customer_phone)
    .bind(order.customer_address)
    .bind(quote.subtotal)
    .bind(quote.discount)
    .bind(quote.total)
    .fetch_one(&mut *tx)
    .await?;

    for (product_id, name, quantity, line) in &item_snapshots {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .bind(name)
        .bind(quantity)
        .bind(line.unit_price)
        .bind(line.line_total)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(CreatedOrder {
        order_id,
        customer_id,
        subtotal: quote.subtotal,
        discount: quote.discount,
        total: quote.total,
        status: OrderStatus::Pending,
    })
}

/// Reuse the customer with this phone (refreshing name/address, last write
/// wins) or insert a new one.
async fn resolve_customer(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    phone: &str,
    address: Option<&str>,
) -> Result<i64, ApiError> {
    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM customers WHERE phone = $1")
        .bind(phone)
        .fetch_optional(&mut **tx)
        .await?;

    match existing {
        Some((id,)) => {
            sqlx::query("UPDATE customers SET name = $1, address = $2 WHERE id = $3")
                .bind(name)
                .bind(address)
                .bind(id)
                .execute(&mut **tx)
                .await?;
            Ok(id)
        }
        None => {
            let (id,): (i64,) = sqlx::query_as(
                "INSERT INTO customers (name, phone, address) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(name)
            .bind(phone)
            .bind(address)
            .fetch_one(&mut **tx)
            .await?;
            Ok(id)
        }
    }
}

/// Confirm a pending order: re-check stock under exclusive locks (the
/// authoritative, race-safe check), decrement it, and mark the order
/// confirmed. All-or-nothing.
pub async fn confirm_order(pool: &PgPool, order_id: i64) -> Result<OrderRow, ApiError> {
    let mut tx = pool.begin().await?;

    let order: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(order) = order else {
        return Err(ApiError::NotFound("Order not found".into()));
    };
    if order.status != OrderStatus::Pending.as_str() {
        return Err(ApiError::Conflict(format!(
            "Order is already \"{}\"",
            order.status
        )));
    }

    let items: Vec<OrderItemRow> = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

    for item in &items {
        // Snapshot-only lines (product hard-removed or ad hoc) have no stock effect
        let Some(product_id) = item.product_id else {
            continue;
        };
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT stock FROM products WHERE id = $1 FOR UPDATE")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((stock,)) = row else {
            continue;
        };
        if stock < item.quantity {
            return Err(ApiError::Validation(format!(
                "Insufficient stock for \"{}\" at confirmation (available: {stock})",
                item.product_name
            )));
        }
        sqlx::query("UPDATE products SET stock = stock - $1 WHERE id = $2")
            .bind(item.quantity)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
    }

    let confirmed: OrderRow = sqlx::query_as(
        "UPDATE orders SET status = 'confirmed', confirmed_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(order_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(confirmed)
}

/// Free-form admin status change; 'delivered' also stamps delivered_at.
/// No transition-graph validation beyond the closed set.
pub async fn update_status(
    pool: &PgPool,
    order_id: i64,
    status: OrderStatus,
) -> Result<Option<OrderRow>, ApiError> {
    let sql = if status == OrderStatus::Delivered {
        "UPDATE orders SET status = $1, delivered_at = NOW() WHERE id = $2 RETURNING *"
    } else {
        "UPDATE orders SET status = $1 WHERE id = $2 RETURNING *"
    };
    let row = sqlx::query_as::<_, OrderRow>(sql)
        .bind(status.as_str())
        .bind(order_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Newest orders first, optionally filtered by status, with items embedded
pub async fn list(
    pool: &PgPool,
    status: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<OrderWithItems>, ApiError> {
    let orders: Vec<OrderRow> = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE ($1::text IS NULL OR status = $1)
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    attach_items(pool, orders).await
}

/// A customer's full order history, newest first, with items embedded
pub async fn list_for_customer(
    pool: &PgPool,
    customer_id: i64,
) -> Result<Vec<OrderWithItems>, ApiError> {
    let orders: Vec<OrderRow> = sqlx::query_as(
        "SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await?;
    attach_items(pool, orders).await
}

pub async fn get_with_items(pool: &PgPool, id: i64) -> Result<Option<OrderWithItems>, ApiError> {
    let order: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let Some(order) = order else {
        return Ok(None);
    };
    let items: Vec<OrderItemRow> =
        sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(pool)
            .await?;
    Ok(Some(OrderWithItems { order, items }))
}

/// Hard delete of an order and its items
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, ApiError> {
    let mut tx = pool.begin().await?;

    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Ok(false);
    }

    sqlx::query("DELETE FROM order_items WHERE order_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

/// Batch-load items for a page of orders and zip them back in order
async fn attach_items(
    pool: &PgPool,
    orders: Vec<OrderRow>,
) -> Result<Vec<OrderWithItems>, ApiError> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let items: Vec<OrderItemRow> =
        sqlx::query_as("SELECT * FROM order_items WHERE order_id = ANY($1) ORDER BY id")
            .bind(&ids)
            .fetch_all(pool)
            .await?;

    let mut by_order: HashMap<i64, Vec<OrderItemRow>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_rejects_unknown() {
        assert_eq!(OrderStatus::parse("shipped"), None);
        assert_eq!(OrderStatus::parse("Pending"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn test_valid_list() {
        assert_eq!(
            OrderStatus::valid_list(),
            "pending, confirmed, delivered, cancelled"
        );
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }
}
