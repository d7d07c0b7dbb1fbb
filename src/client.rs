use std::{sync::Arc, time::Instant};

use bytes_stream::progress_stream;
use reqwest::{
    Client, Method, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION},
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    config::StorefrontConfig,
    error::{ClientError, ClientResult},
    response::ApiEnvelope,
    storage::{AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, SharedStore},
};

const REQUEST_ID_HEADER: &str = "x-request-id";
const REFRESH_ENDPOINT: &str = "/auth/refresh";
/// Endpoints exchanging credentials; a 401 from them is a plain rejection.
const CREDENTIAL_ENDPOINTS: &[&str] = &["/auth/login", "/auth/register", REFRESH_ENDPOINT];
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Access and refresh tokens persisted in local storage.
#[derive(Clone)]
pub struct TokenStore {
    store: SharedStore,
}

impl TokenStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn access_token(&self) -> ClientResult<Option<String>> {
        self.store.get(AUTH_TOKEN_KEY).await
    }

    pub async fn refresh_token(&self) -> ClientResult<Option<String>> {
        self.store.get(REFRESH_TOKEN_KEY).await
    }

    pub async fn save(&self, token: &str, refresh_token: Option<&str>) -> ClientResult<()> {
        self.store.set(AUTH_TOKEN_KEY, token.to_string()).await?;
        if let Some(refresh_token) = refresh_token {
            self.store
                .set(REFRESH_TOKEN_KEY, refresh_token.to_string())
                .await?;
        }
        Ok(())
    }

    pub async fn clear(&self) -> ClientResult<()> {
        self.store.remove(AUTH_TOKEN_KEY).await?;
        self.store.remove(REFRESH_TOKEN_KEY).await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshedTokens {
    token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Snapshot passed to upload progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: u64,
}

impl UploadProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        u8::try_from(self.loaded.saturating_mul(100) / self.total).unwrap_or(100)
    }
}

/// File payload for multipart uploads.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub field: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

struct ClientInner {
    http: Client,
    base_url: String,
    tokens: TokenStore,
}

/// Thin JSON client for the storefront REST API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    pub fn new(config: &StorefrontConfig, store: SharedStore) -> ClientResult<Self> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::with_http(http, &config.api_url, store))
    }

    pub fn with_http(http: Client, base_url: &str, store: SharedStore) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                tokens: TokenStore::new(store),
            }),
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.inner.base_url, endpoint)
        } else {
            format!("{}/{}", self.inner.base_url, endpoint)
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ClientResult<ApiEnvelope<T>> {
        self.request(Method::GET, endpoint, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<ApiEnvelope<T>> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<ApiEnvelope<T>> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ClientResult<ApiEnvelope<T>> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PATCH, endpoint, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> ClientResult<ApiEnvelope<T>> {
        self.request(Method::DELETE, endpoint, None).await
    }

    /// Sends one request. A 401 triggers a single silent refresh and, if that
    /// succeeds, exactly one retry with the new token.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> ClientResult<ApiEnvelope<T>> {
        let token = self.inner.tokens.access_token().await?;
        let response = self
            .send(&method, endpoint, body.as_ref(), token.as_deref())
            .await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED
            && !is_credential_endpoint(endpoint)
        {
            tracing::debug!(%method, endpoint, "unauthorized, attempting token refresh");
            let fresh = self.refresh_access_token().await?;
            self.send(&method, endpoint, body.as_ref(), Some(&fresh))
                .await?
        } else {
            response
        };

        decode_envelope(response).await
    }

    async fn send(
        &self,
        method: &Method,
        endpoint: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> ClientResult<Response> {
        let request_id = Uuid::new_v4().to_string();
        let mut builder = self
            .inner
            .http
            .request(method.clone(), self.url(endpoint))
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request_id.as_str());
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!(request_id = %request_id, method = %method, endpoint, "request started");
        let started = Instant::now();
        let response = builder.send().await.map_err(|err| {
            tracing::warn!(request_id = %request_id, endpoint, error = %err, "request failed");
            ClientError::Transport(err)
        })?;
        tracing::info!(
            request_id = %request_id,
            status = %response.status(),
            ms = %started.elapsed().as_millis(),
            "request finished"
        );
        Ok(response)
    }

    /// Exchanges the stored refresh token for a new access token. Any failure
    /// clears stored tokens and yields `ClientError::Authentication`.
    async fn refresh_access_token(&self) -> ClientResult<String> {
        match self.try_refresh().await {
            Ok(Some(token)) => Ok(token),
            Ok(None) => {
                self.inner.tokens.clear().await?;
                Err(ClientError::Authentication)
            }
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed");
                self.inner.tokens.clear().await?;
                Err(ClientError::Authentication)
            }
        }
    }

    async fn try_refresh(&self) -> ClientResult<Option<String>> {
        let Some(refresh_token) = self.inner.tokens.refresh_token().await? else {
            return Ok(None);
        };
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: &refresh_token,
        })?;
        let response = self
            .send(&Method::POST, REFRESH_ENDPOINT, Some(&body), None)
            .await?;
        let envelope: ApiEnvelope<RefreshedTokens> = decode_envelope(response).await?;
        let Ok(tokens) = envelope.into_result() else {
            return Ok(None);
        };
        self.inner
            .tokens
            .save(&tokens.token, tokens.refresh_token.as_deref())
            .await?;
        Ok(Some(tokens.token))
    }

    /// Multipart upload reporting progress as the body is streamed out.
    /// Bearer token is attached; the refresh path is not used.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        file: UploadFile,
        fields: &[(&str, String)],
        on_progress: Option<ProgressCallback>,
    ) -> ClientResult<ApiEnvelope<T>> {
        let total = file.bytes.len() as u64;
        let stream = progress_stream(file.bytes, UPLOAD_CHUNK_SIZE, on_progress);
        let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
            .file_name(file.file_name)
            .mime_str(&file.mime_type)?;

        let mut form = Form::new().part(file.field, part);
        for (name, value) in fields {
            form = form.text(name.to_string(), value.clone());
        }

        let mut builder = self
            .inner
            .http
            .post(self.url(endpoint))
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .multipart(form);
        if let Some(token) = self.inner.tokens.access_token().await? {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        tracing::debug!(endpoint, bytes = total, "upload started");
        let response = builder.send().await?;
        decode_envelope(response).await
    }
}

/// Compares by path only: leading/trailing `/`, query and fragment are ignored.
fn is_credential_endpoint(endpoint: &str) -> bool {
    let path = endpoint
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_matches('/');
    CREDENTIAL_ENDPOINTS
        .iter()
        .any(|credential| credential.trim_matches('/') == path)
}

async fn decode_envelope<T: DeserializeOwned>(response: Response) -> ClientResult<ApiEnvelope<T>> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

mod bytes_stream {
    use futures::{Stream, stream};

    use super::{ProgressCallback, UploadProgress};

    /// Splits `bytes` into chunks, invoking `on_progress` as each chunk is
    /// handed to the transport.
    pub(super) fn progress_stream(
        bytes: Vec<u8>,
        chunk_size: usize,
        on_progress: Option<ProgressCallback>,
    ) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + 'static {
        let total = bytes.len() as u64;
        let chunks: Vec<Vec<u8>> = bytes
            .chunks(chunk_size.max(1))
            .map(<[u8]>::to_vec)
            .collect();
        let mut loaded = 0u64;
        stream::iter(chunks.into_iter().map(move |chunk| {
            loaded += chunk.len() as u64;
            if let Some(callback) = &on_progress {
                callback(UploadProgress { loaded, total });
            }
            Ok(chunk)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_endpoints_match_regardless_of_slashes_and_query() {
        assert!(is_credential_endpoint("/auth/login"));
        assert!(is_credential_endpoint("auth/login"));
        assert!(is_credential_endpoint("/auth/register/"));
        assert!(is_credential_endpoint("/auth/refresh?source=cli"));
        assert!(!is_credential_endpoint("/auth/me"));
        assert!(!is_credential_endpoint("/auth/login-history"));
    }

    #[test]
    fn progress_percent_is_bounded() {
        assert_eq!(UploadProgress { loaded: 0, total: 0 }.percent(), 100);
        assert_eq!(UploadProgress { loaded: 50, total: 200 }.percent(), 25);
    }
}
