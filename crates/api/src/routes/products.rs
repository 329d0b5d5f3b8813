//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde_json::Value;

use tinystore_core::{Price, PriceError, ProductId};

use super::{JsonBody, decode, require_fields};
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::product::{NewProduct, Product};
use crate::state::AppState;

const PRODUCT_FIELDS: &[&str] = &["name", "price", "category"];

/// List all products.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// Get a product by ID.
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let id = ProductId::parse(Some(&id))?;

    ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Product not found"))
}

/// List the products in a category; empty when nothing matches.
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .list_by_category(&category)
        .await?;
    Ok(Json(products))
}

/// Create a product.
pub async fn create(
    _auth: RequireAuth,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = validate_new_product(payload)?;

    let product = ProductRepository::new(state.pool()).create(&product).await?;
    tracing::info!(product_id = %product.id, category = %product.category, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Check a create-product payload and decode it.
///
/// Also used by the catalog seeder so both paths accept the same input.
///
/// # Errors
///
/// Returns `AppError::Validation` if a field is missing, the price is not a
/// positive JSON number the price column stores exactly, or the name is blank.
pub fn validate_new_product(payload: Value) -> Result<NewProduct> {
    require_fields(&payload, PRODUCT_FIELDS)?;

    if !payload["price"].as_f64().is_some_and(|price| price > 0.0) {
        return Err(AppError::validation(PriceError::NotPositive.to_string()));
    }
    // Numbers beyond `Decimal` range are too large for the column anyway
    let amount: Decimal = serde_json::from_value(payload["price"].clone())
        .map_err(|_| AppError::validation(PriceError::TooLarge.to_string()))?;
    Price::new(amount).map_err(|e| AppError::validation(e.to_string()))?;
    if !payload["name"]
        .as_str()
        .is_some_and(|name| !name.trim().is_empty())
    {
        return Err(AppError::validation("Name must be a non-empty string"));
    }

    decode(payload)
}
