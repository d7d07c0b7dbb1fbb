use crate::{
    client::ApiClient,
    dto::content::UpdateContentRequest,
    error::ClientResult,
    models::ContentBlock,
    response::ApiResult,
    services::path_segment,
};

pub async fn list_content(client: &ApiClient) -> ClientResult<ApiResult<Vec<ContentBlock>>> {
    Ok(client.get("/content").await?.into_result())
}

pub async fn get_content(client: &ApiClient, key: &str) -> ClientResult<ApiResult<ContentBlock>> {
    Ok(client
        .get(&format!("/content/{}", path_segment(key)))
        .await?
        .into_result())
}

pub async fn update_content(
    client: &ApiClient,
    key: &str,
    payload: &UpdateContentRequest,
) -> ClientResult<ApiResult<ContentBlock>> {
    Ok(client
        .put(&format!("/content/{}", path_segment(key)), payload)
        .await?
        .into_result())
}
