use crate::{
    client::ApiClient,
    dto::products::{
        CreateProductRequest, ProductQuery, UpdateProductRequest, UpdateProductStatusRequest,
    },
    error::ClientResult,
    models::{Product, ProductStatus},
    response::{ApiResult, Paged},
};

pub async fn list_products(
    client: &ApiClient,
    query: &ProductQuery,
) -> ClientResult<ApiResult<Paged<Product>>> {
    let endpoint = format!("/products{}", query.to_query_string());
    Ok(client.get::<Vec<Product>>(&endpoint).await?.into_page())
}

pub async fn get_product(client: &ApiClient, id: i64) -> ClientResult<ApiResult<Product>> {
    Ok(client.get(&format!("/products/{id}")).await?.into_result())
}

pub async fn featured_products(
    client: &ApiClient,
    limit: u32,
) -> ClientResult<ApiResult<Vec<Product>>> {
    Ok(client
        .get(&format!("/products/featured?limit={}", limit.clamp(1, 50)))
        .await?
        .into_result())
}

pub async fn categories(client: &ApiClient) -> ClientResult<ApiResult<Vec<String>>> {
    Ok(client.get("/products/categories").await?.into_result())
}

pub async fn create_product(
    client: &ApiClient,
    payload: &CreateProductRequest,
) -> ClientResult<ApiResult<Product>> {
    Ok(client.post("/products", payload).await?.into_result())
}

pub async fn update_product(
    client: &ApiClient,
    id: i64,
    payload: &UpdateProductRequest,
) -> ClientResult<ApiResult<Product>> {
    Ok(client
        .put(&format!("/products/{id}"), payload)
        .await?
        .into_result())
}

pub async fn update_product_status(
    client: &ApiClient,
    id: i64,
    status: ProductStatus,
) -> ClientResult<ApiResult<Product>> {
    Ok(client
        .patch(
            &format!("/products/{id}/status"),
            &UpdateProductStatusRequest { status },
        )
        .await?
        .into_result())
}

pub async fn delete_product(client: &ApiClient, id: i64) -> ClientResult<ApiResult<()>> {
    Ok(client
        .delete::<serde_json::Value>(&format!("/products/{id}"))
        .await?
        .into_ack())
}
