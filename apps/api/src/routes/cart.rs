//! Cart endpoints. Always act on the caller's own cart.

use axum::extract::{Path, State};
use axum::Json;
use emporium_core::validation::validate_uuid;
use emporium_core::Cart;
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// `GET /api/cart`
pub async fn get_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Cart>, ApiError> {
    Ok(Json(state.db.carts().get_cart(&user.id).await?))
}

/// `POST /api/cart/add`
pub async fn add_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<AddItemRequest>,
) -> Result<Json<Cart>, ApiError> {
    validate_uuid("productId", &req.product_id)?;

    let cart = state
        .db
        .carts()
        .add_item(&user.id, &req.product_id, req.quantity)
        .await?;

    Ok(Json(cart))
}

/// `DELETE /api/cart/remove/{product_id}`
pub async fn remove_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<String>,
) -> Result<Json<Cart>, ApiError> {
    validate_uuid("productId", &product_id)?;

    Ok(Json(
        state.db.carts().remove_item(&user.id, &product_id).await?,
    ))
}
