//! Product catalog endpoints
//!
//! Reads are public (storefront); create/update/delete are admin-only.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::db;
use crate::db::products::{NewProduct, ProductRow, ProductUpdate};
use crate::error::ApiError;
use crate::state::AppState;

use super::ApiResult;

#[derive(Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> ApiResult<Vec<ProductRow>> {
    // "Todos" is the storefront's "all categories" sentinel
    let category = query.category.as_deref().filter(|c| *c != "Todos");
    let rows = db::products::list(&state.pool, category, query.search.as_deref()).await?;
    Ok(Json(rows))
}

/// GET /api/products/categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let rows = db::products::categories(&state.pool).await?;
    Ok(Json(rows))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ProductRow> {
    let product = db::products::get(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub price_bulk: Option<f64>,
    pub category: Option<String>,
    pub stock: Option<i32>,
    pub image: Option<String>,
}

/// POST /api/products — admin
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductRow>), ApiError> {
    let name = req.name.filter(|n| !n.trim().is_empty());
    let category = req.category.filter(|c| !c.trim().is_empty());
    let (Some(name), Some(price), Some(category)) = (name, req.price, category) else {
        return Err(ApiError::Validation(
            "Name, price and category are required".into(),
        ));
    };

    let product = db::products::create(
        &state.pool,
        &NewProduct {
            name,
            description: req.description,
            price,
            price_bulk: req.price_bulk,
            category,
            stock: req.stock.unwrap_or(0),
            image: req.image,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id} — admin, partial update
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<ProductUpdate>,
) -> ApiResult<ProductRow> {
    let product = db::products::update(&state.pool, id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} — admin, soft delete
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    if !db::products::soft_delete(&state.pool, id).await? {
        return Err(ApiError::NotFound("Product not found".into()));
    }
    Ok(Json(serde_json::json!({ "message": "Product deleted" })))
}
