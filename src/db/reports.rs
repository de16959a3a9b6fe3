//! Reporting queries: monthly customer ranking and dashboard stats
//!
//! Read-only aggregates over confirmed/delivered orders, windowed by the
//! month of `confirmed_at`.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;

use crate::error::ApiError;

#[derive(Debug, sqlx::FromRow)]
struct RankingRow {
    id: i64,
    name: String,
    phone: Option<String>,
    orders_count: i64,
    items_bought: i64,
    total_spent: f64,
    rank: i64,
}

#[derive(Debug, Serialize)]
pub struct RankingEntry {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub orders_count: i64,
    pub items_bought: i64,
    pub total_spent: f64,
    pub rank: i64,
    /// Spend in the month before the requested one
    pub prev_month: f64,
    pub trend: f64,
}

/// Top 20 customers by spend in the given month, with prior-month comparison
pub async fn monthly_ranking(
    pool: &PgPool,
    year: i32,
    month: u32,
) -> Result<Vec<RankingEntry>, ApiError> {
    // Per-order item quantities are pre-aggregated so order totals are not
    // multiplied by their item count.
    let rows: Vec<RankingRow> = sqlx::query_as(
        r#"
        SELECT
            c.id,
            c.name,
            c.phone,
            COUNT(o.id)                                         AS orders_count,
            COALESCE(SUM(o.items_qty), 0)::bigint               AS items_bought,
            COALESCE(SUM(o.total), 0)                           AS total_spent,
            RANK() OVER (ORDER BY SUM(o.total) DESC NULLS LAST) AS rank
        FROM customers c
        JOIN (
            SELECT o.id, o.customer_id, o.total,
                   (SELECT COALESCE(SUM(oi.quantity), 0)
                    FROM order_items oi WHERE oi.order_id = o.id) AS items_qty
            FROM orders o
            WHERE o.status IN ('confirmed', 'delivered')
              AND EXTRACT(YEAR FROM o.confirmed_at) = $1
              AND EXTRACT(MONTH FROM o.confirmed_at) = $2
        ) o ON o.customer_id = c.id
        GROUP BY c.id
        ORDER BY total_spent DESC
        LIMIT 20
        "#,
    )
    .bind(year)
    .bind(month as i32)
    .fetch_all(pool)
    .await?;

    let (prev_year, prev_month) = crate::util::prev_month(year, month);
    let prev_rows: Vec<(i64, f64)> = sqlx::query_as(
        r#"
        SELECT c.id, COALESCE(SUM(o.total), 0) AS total_spent
        FROM customers c
        JOIN orders o ON o.customer_id = c.id
            AND o.status IN ('confirmed', 'delivered')
            AND EXTRACT(YEAR FROM o.confirmed_at) = $1
            AND EXTRACT(MONTH FROM o.confirmed_at) = $2
        GROUP BY c.id
        "#,
    )
    .bind(prev_year)
    .bind(prev_month as i32)
    .fetch_all(pool)
    .await?;
    let prev_map: HashMap<i64, f64> = prev_rows.into_iter().collect();

    Ok(rows
        .into_iter()
        .map(|r| {
            let prev = prev_map.get(&r.id).copied().unwrap_or(0.0);
            RankingEntry {
                id: r.id,
                name: r.name,
                phone: r.phone,
                orders_count: r.orders_count,
                items_bought: r.items_bought,
                total_spent: r.total_spent,
                rank: r.rank,
                prev_month: prev,
                trend: r.total_spent - prev,
            }
        })
        .collect())
}

#[derive(Debug, Serialize)]
pub struct OrderCounts {
    pub pending: i64,
    pub confirmed: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct Revenue {
    pub this_month: f64,
    pub last_month: f64,
    /// Whole-percent month-over-month growth; null without a baseline
    pub growth_pct: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub products: i64,
    pub orders: OrderCounts,
    pub customers: i64,
    pub revenue: Revenue,
}

/// Dashboard aggregates: entity counts and revenue for the current and
/// previous calendar months
pub async fn stats(pool: &PgPool) -> Result<Stats, ApiError> {
    let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE active = TRUE")
        .fetch_one(pool)
        .await?;

    let (pending, confirmed, total): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE status = 'pending'),
            COUNT(*) FILTER (WHERE status = 'confirmed'),
            COUNT(*)
        FROM orders
        "#,
    )
    .fetch_one(pool)
    .await?;

    let customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(pool)
        .await?;

    let (this_month, last_month): (f64, f64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(total) FILTER (WHERE status IN ('confirmed', 'delivered')
                AND confirmed_at >= date_trunc('month', NOW())), 0),
            COALESCE(SUM(total) FILTER (WHERE status IN ('confirmed', 'delivered')
                AND confirmed_at >= date_trunc('month', NOW()) - INTERVAL '1 month'
                AND confirmed_at < date_trunc('month', NOW())), 0)
        FROM orders
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(Stats {
        products,
        orders: OrderCounts {
            pending,
            confirmed,
            total,
        },
        customers,
        revenue: Revenue {
            this_month,
            last_month,
            growth_pct: growth_pct(this_month, last_month),
        },
    })
}

fn growth_pct(this_month: f64, last_month: f64) -> Option<i64> {
    if last_month > 0.0 {
        Some((((this_month - last_month) / last_month) * 100.0).round() as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_pct() {
        assert_eq!(growth_pct(1100.0, 1000.0), Some(10));
        assert_eq!(growth_pct(500.0, 1000.0), Some(-50));
        assert_eq!(growth_pct(1000.0, 1000.0), Some(0));
        // no baseline month -> no percentage rather than a division by zero
        assert_eq!(growth_pct(100.0, 0.0), None);
    }
}
