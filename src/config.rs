use std::{env, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub api_url: String,
    pub storage_path: PathBuf,
    pub request_timeout: Duration,
    pub currency_symbol: String,
}

impl StorefrontConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = env::var("STOREFRONT_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000/api".to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            anyhow::bail!("STOREFRONT_API_URL must be an http(s) URL, got {api_url}");
        }
        let storage_path = env::var("STOREFRONT_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".storefront/storage.json"));
        let request_timeout = env::var("STOREFRONT_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));
        let currency_symbol =
            env::var("STOREFRONT_CURRENCY_SYMBOL").unwrap_or_else(|_| "R".to_string());
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            storage_path,
            request_timeout,
            currency_symbol,
        })
    }
}
