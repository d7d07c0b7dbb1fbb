use crate::{
    client::ApiClient,
    dto::auth::{
        AuthTokens, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
        RefreshTokenRequest, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
    },
    error::ClientResult,
    models::User,
    response::ApiResult,
};

pub async fn login(client: &ApiClient, payload: &LoginRequest) -> ClientResult<ApiResult<AuthTokens>> {
    Ok(client.post("/auth/login", payload).await?.into_result())
}

pub async fn register(
    client: &ApiClient,
    payload: &RegisterRequest,
) -> ClientResult<ApiResult<AuthTokens>> {
    Ok(client.post("/auth/register", payload).await?.into_result())
}

pub async fn logout(client: &ApiClient) -> ClientResult<ApiResult<()>> {
    Ok(client
        .post::<serde_json::Value, _>("/auth/logout", &serde_json::json!({}))
        .await?
        .into_ack())
}

pub async fn me(client: &ApiClient) -> ClientResult<ApiResult<User>> {
    Ok(client.get("/auth/me").await?.into_result())
}

/// Explicit refresh; the client also does this on its own after a 401.
pub async fn refresh(
    client: &ApiClient,
    refresh_token: &str,
) -> ClientResult<ApiResult<AuthTokens>> {
    let payload = RefreshTokenRequest {
        refresh_token: refresh_token.to_string(),
    };
    Ok(client.post("/auth/refresh", &payload).await?.into_result())
}

pub async fn update_profile(
    client: &ApiClient,
    payload: &UpdateProfileRequest,
) -> ClientResult<ApiResult<User>> {
    Ok(client.put("/auth/profile", payload).await?.into_result())
}

pub async fn change_password(
    client: &ApiClient,
    payload: &ChangePasswordRequest,
) -> ClientResult<ApiResult<()>> {
    Ok(client
        .post::<serde_json::Value, _>("/auth/change-password", payload)
        .await?
        .into_ack())
}

pub async fn forgot_password(client: &ApiClient, email: &str) -> ClientResult<ApiResult<()>> {
    let payload = ForgotPasswordRequest {
        email: email.to_string(),
    };
    Ok(client
        .post::<serde_json::Value, _>("/auth/forgot-password", &payload)
        .await?
        .into_ack())
}

pub async fn reset_password(
    client: &ApiClient,
    payload: &ResetPasswordRequest,
) -> ClientResult<ApiResult<()>> {
    Ok(client
        .post::<serde_json::Value, _>("/auth/reset-password", payload)
        .await?
        .into_ack())
}
