//! Order endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use emporium_core::validation::validate_uuid;
use emporium_core::Order;

use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

/// `POST /api/orders`: checks out the caller's cart.
pub async fn place_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state.db.orders().place_order(&user.id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders`, newest first.
pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.db.orders().list_for_user(&user.id).await?))
}

/// `GET /api/orders/{order_id}`
pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    validate_uuid("orderId", &order_id)?;
    Ok(Json(state.db.orders().get_for_user(&user.id, &order_id).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{self, TestApp};

    async fn add(app: &TestApp, token: &str, product_id: &str, quantity: i64) -> StatusCode {
        app.send(
            Method::POST,
            "/api/cart/add",
            Some(token),
            Some(json!({ "productId": product_id, "quantity": quantity })),
        )
        .await
        .0
    }

    #[tokio::test]
    async fn test_checkout_scenario() {
        let app = test_support::app().await;
        let token = app.shopper("alice").await;
        let widget = app.product("Widget", 1000, 5).await;

        assert_eq!(add(&app, &token, &widget.id, 2).await, StatusCode::OK);
        let (status, order) = app.send(Method::POST, "/api/orders", Some(&token), None).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["totalCents"], 2000);
        assert_eq!(order["username"], "alice");
        assert_eq!(order["items"][0]["unitPriceCents"], 1000);
        assert_eq!(order["items"][0]["lineTotalCents"], 2000);

        let (_, cart) = app.send(Method::GET, "/api/cart", Some(&token), None).await;
        assert_eq!(cart["items"], json!([]));

        let (_, product) = app
            .send(Method::GET, &format!("/api/products/{}", widget.id), Some(&token), None)
            .await;
        assert_eq!(product["stock"], 3);

        assert_eq!(add(&app, &token, &widget.id, 10).await, StatusCode::OK);
        let (status, body) = app.send(Method::POST, "/api/orders", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Insufficient stock for product: Widget. Requested: 10, Available: 3"
        );

        let (_, product) = app
            .send(Method::GET, &format!("/api/products/{}", widget.id), Some(&token), None)
            .await;
        assert_eq!(product["stock"], 3);
    }

    #[tokio::test]
    async fn test_empty_cart_checkout_is_bad_request() {
        let app = test_support::app().await;
        let token = app.shopper("alice").await;

        let (status, body) = app.send(Method::POST, "/api/orders", Some(&token), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Cannot create order from an empty cart");
    }

    #[tokio::test]
    async fn test_list_and_get_orders() {
        let app = test_support::app().await;
        let alice = app.shopper("alice").await;
        let bob = app.shopper("bob").await;
        let mug = app.product("Mug", 800, 10).await;

        add(&app, &alice, &mug.id, 1).await;
        let (_, first) = app.send(Method::POST, "/api/orders", Some(&alice), None).await;
        add(&app, &alice, &mug.id, 3).await;
        let (_, second) = app.send(Method::POST, "/api/orders", Some(&alice), None).await;

        let (status, orders) = app.send(Method::GET, "/api/orders", Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(orders[0]["id"], second["id"]);
        assert_eq!(orders[1]["id"], first["id"]);

        let first_id = first["id"].as_str().unwrap();
        let (status, fetched) = app
            .send(Method::GET, &format!("/api/orders/{}", first_id), Some(&alice), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["totalCents"], 800);

        let (status, _) = app
            .send(Method::GET, &format!("/api/orders/{}", first_id), Some(&bob), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, bobs) = app.send(Method::GET, "/api/orders", Some(&bob), None).await;
        assert_eq!(bobs, json!([]));
    }
}
