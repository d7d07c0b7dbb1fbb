use crate::{
    client::ApiClient,
    dto::orders::{CreateOrderRequest, OrderListQuery, UpdateOrderStatusRequest},
    error::{ClientError, ClientResult},
    models::{Order, OrderStatus},
    response::{ApiResult, Paged},
};

pub async fn create_order(
    client: &ApiClient,
    payload: &CreateOrderRequest,
) -> ClientResult<ApiResult<Order>> {
    if payload.items.is_empty() {
        return Err(ClientError::BadRequest(
            "order must contain at least one item".to_string(),
        ));
    }
    Ok(client.post("/orders", payload).await?.into_result())
}

pub async fn get_order(client: &ApiClient, id: i64) -> ClientResult<ApiResult<Order>> {
    Ok(client.get(&format!("/orders/{id}")).await?.into_result())
}

/// Public order tracking by order number; no account required.
pub async fn track_order(
    client: &ApiClient,
    order_number: &str,
) -> ClientResult<ApiResult<Order>> {
    let order_number = order_number.trim();
    if order_number.is_empty() {
        return Err(ClientError::BadRequest("order number is required".to_string()));
    }
    let qs = crate::services::query_string(&[("orderNumber", order_number.to_string())]);
    Ok(client.get(&format!("/orders/track{qs}")).await?.into_result())
}

pub async fn my_orders(
    client: &ApiClient,
    query: &OrderListQuery,
) -> ClientResult<ApiResult<Paged<Order>>> {
    let endpoint = format!("/orders/my-orders{}", query.to_query_string());
    Ok(client.get::<Vec<Order>>(&endpoint).await?.into_page())
}

pub async fn list_orders(
    client: &ApiClient,
    query: &OrderListQuery,
) -> ClientResult<ApiResult<Paged<Order>>> {
    let endpoint = format!("/orders{}", query.to_query_string());
    Ok(client.get::<Vec<Order>>(&endpoint).await?.into_page())
}

pub async fn update_order_status(
    client: &ApiClient,
    id: i64,
    status: OrderStatus,
    tracking_number: Option<String>,
) -> ClientResult<ApiResult<Order>> {
    if status == OrderStatus::Shipped && tracking_number.is_none() {
        tracing::warn!(order_id = id, "order marked shipped without a tracking number");
    }
    let payload = UpdateOrderStatusRequest {
        status,
        tracking_number,
    };
    Ok(client
        .patch(&format!("/orders/{id}/status"), &payload)
        .await?
        .into_result())
}

pub async fn cancel_order(client: &ApiClient, id: i64) -> ClientResult<ApiResult<Order>> {
    Ok(client
        .post(&format!("/orders/{id}/cancel"), &serde_json::json!({}))
        .await?
        .into_result())
}
