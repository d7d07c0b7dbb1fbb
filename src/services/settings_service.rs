use crate::{client::ApiClient, error::ClientResult, models::SiteSettings, response::ApiResult};

/// Storefront-visible settings (store name, contact, shipping rules).
pub async fn public_settings(client: &ApiClient) -> ClientResult<ApiResult<SiteSettings>> {
    Ok(client.get("/settings/public").await?.into_result())
}

pub async fn get_settings(client: &ApiClient) -> ClientResult<ApiResult<SiteSettings>> {
    Ok(client.get("/settings").await?.into_result())
}

pub async fn update_settings(
    client: &ApiClient,
    settings: &SiteSettings,
) -> ClientResult<ApiResult<SiteSettings>> {
    Ok(client.put("/settings", settings).await?.into_result())
}
