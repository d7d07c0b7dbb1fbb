use crate::{
    cart::{Cart, CartStore},
    client::ApiClient,
    dto::orders::{CreateOrderRequest, CustomerDetails, OrderLineRequest},
    error::{ClientError, ClientResult},
    models::Order,
    response::ApiResult,
    services::order_service,
};

pub fn build_order_request(
    cart: &Cart,
    customer: &CustomerDetails,
    payment_method: &str,
) -> CreateOrderRequest {
    CreateOrderRequest {
        customer_name: customer.name.trim().to_string(),
        customer_email: customer.email.trim().to_string(),
        customer_phone: customer.phone.clone(),
        shipping_address: customer.shipping_address.clone(),
        items: cart
            .items()
            .iter()
            .map(|item| OrderLineRequest {
                product_id: item.product_id(),
                quantity: item.quantity(),
            })
            .collect(),
        payment_method: payment_method.to_string(),
        notes: customer.notes.clone(),
    }
}

/// Submits the guest cart as an order. The cart is cleared only once the API
/// has accepted the order.
pub async fn place_order(
    client: &ApiClient,
    cart_store: &CartStore,
    customer: &CustomerDetails,
    payment_method: &str,
) -> ClientResult<ApiResult<Order>> {
    let cart = cart_store.cart().await;
    if cart.is_empty() {
        return Err(ClientError::BadRequest("cart is empty".to_string()));
    }
    if customer.name.trim().is_empty() || customer.email.trim().is_empty() {
        return Err(ClientError::BadRequest(
            "name and email are required".to_string(),
        ));
    }

    let payload = build_order_request(&cart, customer, payment_method);
    let reply = order_service::create_order(client, &payload).await?;
    match &reply {
        Ok(order) => {
            tracing::info!(
                order_number = %order.order_number,
                total = %order.total,
                "order placed"
            );
            cart_store.clear_cart().await?;
        }
        Err(failure) => {
            tracing::warn!(code = %failure.code, message = %failure.message, "order rejected");
        }
    }
    Ok(reply)
}
