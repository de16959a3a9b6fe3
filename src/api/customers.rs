//! Customer endpoints (all admin)

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::db::customers::{CustomerRow, CustomerUpdate, CustomerWithStats};
use crate::db::orders::OrderWithItems;
use crate::error::ApiError;
use crate::state::AppState;

use super::ApiResult;

#[derive(Deserialize)]
pub struct ListCustomersQuery {
    pub search: Option<String>,
}

/// GET /api/customers — includes aggregate spend
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListCustomersQuery>,
) -> ApiResult<Vec<CustomerWithStats>> {
    let rows = db::customers::list(&state.pool, query.search.as_deref()).await?;
    Ok(Json(rows))
}

#[derive(Serialize)]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: CustomerRow,
    pub orders: Vec<OrderWithItems>,
}

/// GET /api/customers/{id} — detail plus full order history
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<CustomerDetail> {
    let customer = db::customers::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".into()))?;
    let orders = db::orders::list_for_customer(&state.pool, id).await?;
    Ok(Json(CustomerDetail { customer, orders }))
}

/// PUT /api/customers/{id} — partial update
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<CustomerUpdate>,
) -> ApiResult<CustomerRow> {
    let customer = db::customers::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".into()))?;
    Ok(Json(customer))
}
