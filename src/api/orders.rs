//! Order endpoints
//!
//! Creation is public (the storefront posts orders without auth); the whole
//! lifecycle after that is admin-only.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::db::orders::{
    CreatedOrder, NewOrder, OrderItemInput, OrderRow, OrderStatus, OrderWithItems,
};
use crate::error::ApiError;
use crate::state::AppState;

use super::ApiResult;

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

#[derive(Serialize)]
pub struct CreateOrderResponse {
    #[serde(flatten)]
    pub order: CreatedOrder,
    pub message: &'static str,
}

/// POST /api/orders — public; creates a pending order, stock untouched
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), ApiError> {
    let name = req
        .customer_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let Some(name) = name else {
        return Err(ApiError::Validation(
            "Customer name and items are required".into(),
        ));
    };
    if req.items.is_empty() {
        return Err(ApiError::Validation(
            "Customer name and items are required".into(),
        ));
    }
    if req.items.iter().any(|i| i.quantity < 1) {
        return Err(ApiError::Validation(
            "Item quantities must be at least 1".into(),
        ));
    }

    let phone = req
        .customer_phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    let order = db::orders::create_order(
        &state.pool,
        &NewOrder {
            customer_name: name,
            customer_phone: phone,
            customer_address: req.customer_address.as_deref(),
            items: &req.items,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order,
            message: "Order registered, awaiting confirmation",
        }),
    ))
}

#[derive(Serialize)]
pub struct ConfirmOrderResponse {
    pub message: &'static str,
    pub order: OrderRow,
}

/// POST /api/orders/{id}/confirm — admin; deducts stock exactly once
pub async fn confirm_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ConfirmOrderResponse> {
    let order = db::orders::confirm_order(&state.pool, id).await?;
    Ok(Json(ConfirmOrderResponse {
        message: "Order confirmed and stock updated",
        order,
    }))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// PUT /api/orders/{id}/status — admin; free-form within the closed set
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<OrderRow> {
    let status = req
        .status
        .as_deref()
        .and_then(OrderStatus::parse)
        .ok_or_else(|| {
            ApiError::Validation(format!("Invalid status. Valid: {}", OrderStatus::valid_list()))
        })?;

    let order = db::orders::update_status(&state.pool, id, status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".into()))?;
    Ok(Json(order))
}

fn default_limit() -> i64 {
    50
}

#[derive(Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /api/orders — admin
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<Vec<OrderWithItems>> {
    let rows =
        db::orders::list(&state.pool, query.status.as_deref(), query.limit, query.offset).await?;
    Ok(Json(rows))
}

/// GET /api/orders/{id} — admin
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<OrderWithItems> {
    let order = db::orders::get_with_items(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".into()))?;
    Ok(Json(order))
}

/// DELETE /api/orders/{id} — admin; removes the order and its items
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    if !db::orders::delete(&state.pool, id).await? {
        return Err(ApiError::NotFound("Order not found".into()));
    }
    Ok(Json(serde_json::json!({ "message": "Order deleted" })))
}
