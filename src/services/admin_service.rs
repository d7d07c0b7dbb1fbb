use crate::{
    client::ApiClient,
    error::ClientResult,
    models::{DashboardStats, Product},
    response::{ApiResult, Paged},
    services::query_string,
};

pub async fn dashboard_stats(client: &ApiClient) -> ClientResult<ApiResult<DashboardStats>> {
    Ok(client.get("/dashboard/stats").await?.into_result())
}

pub async fn low_stock_products(
    client: &ApiClient,
    threshold: i32,
) -> ClientResult<ApiResult<Paged<Product>>> {
    let qs = query_string(&[("threshold", threshold.max(0).to_string())]);
    Ok(client
        .get::<Vec<Product>>(&format!("/dashboard/low-stock{qs}"))
        .await?
        .into_page())
}
