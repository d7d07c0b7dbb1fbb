use crate::{
    client::ApiClient,
    dto::payments::{InitiatePaymentRequest, PaymentRedirect, UpdatePaymentStatusRequest},
    error::ClientResult,
    models::{Payment, PaymentStatus},
    response::{ApiResult, Paged},
    services::query_string,
};

pub async fn list_payments(
    client: &ApiClient,
    page: i64,
    status: Option<PaymentStatus>,
) -> ClientResult<ApiResult<Paged<Payment>>> {
    let mut pairs = vec![("page", page.max(1).to_string())];
    if let Some(status) = status {
        pairs.push(("status", crate::services::enum_value(&status)));
    }
    let endpoint = format!("/payments{}", query_string(&pairs));
    Ok(client.get::<Vec<Payment>>(&endpoint).await?.into_page())
}

pub async fn get_payment(client: &ApiClient, id: i64) -> ClientResult<ApiResult<Payment>> {
    Ok(client.get(&format!("/payments/{id}")).await?.into_result())
}

pub async fn payments_for_order(
    client: &ApiClient,
    order_id: i64,
) -> ClientResult<ApiResult<Vec<Payment>>> {
    Ok(client
        .get(&format!("/payments/order/{order_id}"))
        .await?
        .into_result())
}

pub async fn initiate_payment(
    client: &ApiClient,
    payload: &InitiatePaymentRequest,
) -> ClientResult<ApiResult<PaymentRedirect>> {
    Ok(client.post("/payments/initiate", payload).await?.into_result())
}

pub async fn update_payment_status(
    client: &ApiClient,
    id: i64,
    status: PaymentStatus,
) -> ClientResult<ApiResult<Payment>> {
    Ok(client
        .patch(
            &format!("/payments/{id}/status"),
            &UpdatePaymentStatusRequest { status },
        )
        .await?
        .into_result())
}
