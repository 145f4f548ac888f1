//! Catalog endpoints. Reading needs any bearer token; creating needs an admin.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use emporium_core::validation::{
    validate_description, validate_price_cents, validate_product_name, validate_stock,
    validate_uuid,
};
use emporium_core::Product;
use emporium_db::new_id;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::extract::{AdminUser, ApiJson, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
}

/// `GET /api/products`
pub async fn list_products(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.db.products().list().await?))
}

/// `GET /api/products/{product_id}`
pub async fn get_product(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    validate_uuid("productId", &product_id)?;
    Ok(Json(state.db.products().get(&product_id).await?))
}

/// `POST /api/products`
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let name = req.name.trim();
    let description = req
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    validate_product_name(name)?;
    validate_description(description)?;
    validate_price_cents(req.price_cents)?;
    validate_stock(req.stock)?;

    let now = Utc::now();
    let product = state
        .db
        .products()
        .insert(&Product {
            id: new_id(),
            name: name.to_string(),
            description: description.map(str::to_string),
            price_cents: req.price_cents,
            stock: req.stock,
            created_at: now,
            updated_at: now,
        })
        .await?;

    info!(product_id = %product.id, admin = %admin.username, "Catalog entry added");
    Ok((StatusCode::CREATED, Json(product)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support;

    #[tokio::test]
    async fn test_admin_creates_product() {
        let app = test_support::app().await;
        let admin = app.admin("root").await;

        let (status, body) = app
            .send(
                Method::POST,
                "/api/products",
                Some(&admin),
                Some(json!({
                    "name": "  Teapot ",
                    "description": "Cast iron",
                    "priceCents": 4599,
                    "stock": 12,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Teapot");
        assert_eq!(body["priceCents"], 4599);

        let id = body["id"].as_str().unwrap();
        let (status, fetched) = app
            .send(Method::GET, &format!("/api/products/{}", id), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["description"], "Cast iron");
    }

    #[tokio::test]
    async fn test_shopper_cannot_create_product() {
        let app = test_support::app().await;
        let token = app.shopper("alice").await;

        let (status, _) = app
            .send(
                Method::POST,
                "/api/products",
                Some(&token),
                Some(json!({ "name": "Teapot", "priceCents": 4599, "stock": 1 })),
            )
            .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_product_is_rejected() {
        let app = test_support::app().await;
        let admin = app.admin("root").await;

        for body in [
            json!({ "name": "T", "priceCents": 100, "stock": 1 }),
            json!({ "name": "Teapot", "priceCents": 0, "stock": 1 }),
            json!({ "name": "Teapot", "priceCents": 100, "stock": -1 }),
        ] {
            let (status, _) = app
                .send(Method::POST, "/api/products", Some(&admin), Some(body))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let app = test_support::app().await;
        let token = app.shopper("alice").await;
        app.product("Teapot", 4000, 1).await;
        app.product("Cup", 500, 1).await;

        let (status, body) = app.send(Method::GET, "/api/products", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Cup");
        assert_eq!(body[1]["name"], "Teapot");

        let (status, _) = app
            .send(
                Method::GET,
                &format!("/api/products/{}", emporium_db::new_id()),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.send(Method::GET, "/api/products", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
