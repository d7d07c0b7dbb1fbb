//! Server-side cart endpoints. The storefront keeps guest carts locally
//! (see [`crate::cart`]); these calls exist for the admin back-office and for
//! accounts that hold a server cart.

use crate::{
    client::ApiClient,
    dto::cart::{AddToCartRequest, ServerCart, UpdateCartItemRequest},
    error::{ClientError, ClientResult},
    response::{ApiResult, Paged},
    services::query_string,
};

pub async fn get_cart(client: &ApiClient) -> ClientResult<ApiResult<ServerCart>> {
    Ok(client.get("/cart").await?.into_result())
}

pub async fn add_to_cart(
    client: &ApiClient,
    payload: &AddToCartRequest,
) -> ClientResult<ApiResult<ServerCart>> {
    if payload.quantity == 0 {
        return Err(ClientError::InvalidQuantity(payload.quantity));
    }
    Ok(client.post("/cart/items", payload).await?.into_result())
}

pub async fn update_cart_item(
    client: &ApiClient,
    product_id: i64,
    quantity: u32,
) -> ClientResult<ApiResult<ServerCart>> {
    if quantity == 0 {
        return Err(ClientError::InvalidQuantity(quantity));
    }
    Ok(client
        .put(
            &format!("/cart/items/{product_id}"),
            &UpdateCartItemRequest { quantity },
        )
        .await?
        .into_result())
}

pub async fn remove_from_cart(
    client: &ApiClient,
    product_id: i64,
) -> ClientResult<ApiResult<ServerCart>> {
    Ok(client
        .delete(&format!("/cart/items/{product_id}"))
        .await?
        .into_result())
}

pub async fn clear_cart(client: &ApiClient) -> ClientResult<ApiResult<()>> {
    Ok(client.delete::<serde_json::Value>("/cart").await?.into_ack())
}

/// Admin view over every stored cart, most recently updated first.
pub async fn list_carts(
    client: &ApiClient,
    page: i64,
    per_page: i64,
) -> ClientResult<ApiResult<Paged<ServerCart>>> {
    let qs = query_string(&[
        ("page", page.max(1).to_string()),
        ("limit", per_page.clamp(1, 100).to_string()),
    ]);
    Ok(client
        .get::<Vec<ServerCart>>(&format!("/cart/admin/all{qs}"))
        .await?
        .into_page())
}
