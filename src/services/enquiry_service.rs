use crate::{
    client::ApiClient,
    dto::enquiries::{
        CreateEnquiryRequest, EnquiryListQuery, RespondEnquiryRequest,
        UpdateEnquiryPriorityRequest, UpdateEnquiryStatusRequest,
    },
    error::{ClientError, ClientResult},
    models::{Enquiry, EnquiryPriority, EnquiryStatus},
    response::{ApiResult, Paged},
};

/// Guest contact form submission.
pub async fn submit_enquiry(
    client: &ApiClient,
    payload: &CreateEnquiryRequest,
) -> ClientResult<ApiResult<Enquiry>> {
    payload.validate().map_err(ClientError::BadRequest)?;
    Ok(client.post("/enquiries", payload).await?.into_result())
}

pub async fn list_enquiries(
    client: &ApiClient,
    query: &EnquiryListQuery,
) -> ClientResult<ApiResult<Paged<Enquiry>>> {
    let endpoint = format!("/enquiries{}", query.to_query_string());
    Ok(client.get::<Vec<Enquiry>>(&endpoint).await?.into_page())
}

pub async fn get_enquiry(client: &ApiClient, id: i64) -> ClientResult<ApiResult<Enquiry>> {
    Ok(client.get(&format!("/enquiries/{id}")).await?.into_result())
}

pub async fn respond_to_enquiry(
    client: &ApiClient,
    id: i64,
    response: &str,
) -> ClientResult<ApiResult<Enquiry>> {
    if response.trim().is_empty() {
        return Err(ClientError::BadRequest("response must not be empty".to_string()));
    }
    let payload = RespondEnquiryRequest {
        response: response.trim().to_string(),
        status: Some(EnquiryStatus::Responded),
    };
    Ok(client
        .post(&format!("/enquiries/{id}/respond"), &payload)
        .await?
        .into_result())
}

pub async fn update_enquiry_status(
    client: &ApiClient,
    id: i64,
    status: EnquiryStatus,
) -> ClientResult<ApiResult<Enquiry>> {
    Ok(client
        .patch(
            &format!("/enquiries/{id}/status"),
            &UpdateEnquiryStatusRequest { status },
        )
        .await?
        .into_result())
}

pub async fn update_enquiry_priority(
    client: &ApiClient,
    id: i64,
    priority: EnquiryPriority,
) -> ClientResult<ApiResult<Enquiry>> {
    Ok(client
        .patch(
            &format!("/enquiries/{id}/priority"),
            &UpdateEnquiryPriorityRequest { priority },
        )
        .await?
        .into_result())
}

pub async fn delete_enquiry(client: &ApiClient, id: i64) -> ClientResult<ApiResult<()>> {
    Ok(client
        .delete::<serde_json::Value>(&format!("/enquiries/{id}"))
        .await?
        .into_ack())
}
