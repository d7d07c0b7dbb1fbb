use serde::{Deserialize, Serialize};

use crate::models::PaymentStatus;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentRequest {
    pub order_id: i64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
}

/// Where to send the shopper to complete payment; the gateway is opaque here.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRedirect {
    pub payment_id: i64,
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}
