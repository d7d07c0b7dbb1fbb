use crate::{
    client::ApiClient,
    dto::notifications::UnreadCount,
    error::ClientResult,
    models::Notification,
    response::{ApiResult, Paged},
};

pub async fn list_notifications(
    client: &ApiClient,
    unread_only: bool,
) -> ClientResult<ApiResult<Paged<Notification>>> {
    let endpoint = if unread_only {
        "/notifications?unread=true"
    } else {
        "/notifications"
    };
    Ok(client.get::<Vec<Notification>>(endpoint).await?.into_page())
}

pub async fn unread_count(client: &ApiClient) -> ClientResult<ApiResult<UnreadCount>> {
    Ok(client.get("/notifications/unread-count").await?.into_result())
}

/// Background badge refresh: every failure reads as zero.
pub async fn unread_count_or_zero(client: &ApiClient) -> u64 {
    match unread_count(client).await {
        Ok(Ok(UnreadCount { count })) => count,
        Ok(Err(failure)) => {
            tracing::debug!(code = %failure.code, "unread count unavailable");
            0
        }
        Err(err) => {
            tracing::debug!(error = %err, "unread count request failed");
            0
        }
    }
}

pub async fn mark_read(client: &ApiClient, id: i64) -> ClientResult<ApiResult<()>> {
    Ok(client
        .patch::<serde_json::Value, _>(&format!("/notifications/{id}/read"), &serde_json::json!({}))
        .await?
        .into_ack())
}

pub async fn mark_all_read(client: &ApiClient) -> ClientResult<ApiResult<()>> {
    Ok(client
        .patch::<serde_json::Value, _>("/notifications/read-all", &serde_json::json!({}))
        .await?
        .into_ack())
}
