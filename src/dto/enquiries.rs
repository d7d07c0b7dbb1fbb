use serde::{Deserialize, Serialize};

use crate::models::{EnquiryPriority, EnquiryStatus};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnquiryRequest {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
}

impl CreateEnquiryRequest {
    /// Form-level checks done before the request leaves the client.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid_email {
            return Err("a valid email is required".to_string());
        }
        if self.subject.trim().is_empty() {
            return Err("subject is required".to_string());
        }
        if self.message.trim().len() < 10 {
            return Err("message must be at least 10 characters".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RespondEnquiryRequest {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EnquiryStatus>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpdateEnquiryStatusRequest {
    pub status: EnquiryStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpdateEnquiryPriorityRequest {
    pub priority: EnquiryPriority,
}

#[derive(Debug, Clone, Default)]
pub struct EnquiryListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<EnquiryStatus>,
    pub priority: Option<EnquiryPriority>,
    pub search: Option<String>,
}

impl EnquiryListQuery {
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.max(1).to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("limit", per_page.clamp(1, 100).to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", crate::services::enum_value(&status)));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", crate::services::enum_value(&priority)));
        }
        if let Some(search) = self.search.as_ref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.trim().to_string()));
        }
        crate::services::query_string(&pairs)
    }
}
