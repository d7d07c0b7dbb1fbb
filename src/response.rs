use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
    pub total_pages: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = if per_page > 0 {
            total.saturating_add(per_page - 1) / per_page
        } else {
            0
        };
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
            total_pages: Some(total_pages),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_next_page(&self) -> bool {
        matches!((self.page, self.total_pages), (Some(page), Some(pages)) if page < pages)
    }
}

/// Error object carried by `{success: false}` replies.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    #[serde(default = "ApiFailure::unknown_code")]
    pub code: String,
    pub message: String,
}

impl ApiFailure {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    fn unknown_code() -> String {
        "UNKNOWN".to_string()
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for ApiFailure {}

/// Application-level outcome of a request that reached the API.
pub type ApiResult<T> = Result<T, ApiFailure>;

/// Wire envelope shared by every endpoint:
/// `{success, data?, error?: {code, message}, message?, meta?}`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ApiFailure>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "pagination")]
    pub meta: Option<Meta>,
}

impl<T> ApiEnvelope<T> {
    pub fn success(data: T, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            meta,
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiFailure::new(code, message)),
            message: None,
            meta: None,
        }
    }

    fn failure_detail(error: Option<ApiFailure>, message: Option<String>) -> ApiFailure {
        error.unwrap_or_else(|| {
            ApiFailure::new(
                "UNKNOWN",
                message.unwrap_or_else(|| "Request failed".to_string()),
            )
        })
    }

    /// Validates the envelope into its payload. A successful reply without
    /// `data` is reported as an `EMPTY_RESPONSE` failure.
    pub fn into_result(self) -> ApiResult<T> {
        if !self.success {
            return Err(Self::failure_detail(self.error, self.message));
        }
        self.data
            .ok_or_else(|| ApiFailure::new("EMPTY_RESPONSE", "Response contained no data"))
    }

    /// For endpoints whose payload is irrelevant (deletes, mark-as-read).
    pub fn into_ack(self) -> ApiResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(Self::failure_detail(self.error, self.message))
        }
    }
}

impl<T> ApiEnvelope<Vec<T>> {
    pub fn into_page(self) -> ApiResult<Paged<T>> {
        let meta = self.meta.clone();
        let items = if self.success && self.data.is_none() {
            Vec::new()
        } else {
            self.into_result()?
        };
        Ok(Paged { items, meta })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub meta: Option<Meta>,
}

impl<T> Paged<T> {
    pub fn total(&self) -> usize {
        self.meta
            .as_ref()
            .and_then(|m| m.total)
            .and_then(|t| usize::try_from(t).ok())
            .unwrap_or(self.items.len())
    }
}
