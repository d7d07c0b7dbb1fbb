use serde::{Deserialize, Serialize};

use crate::{
    client::{ApiClient, ProgressCallback, UploadFile},
    error::{ClientError, ClientResult},
    response::ApiResult,
};

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub url: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

fn check_image(file: &UploadFile) -> ClientResult<()> {
    if !IMAGE_TYPES.contains(&file.mime_type.as_str()) {
        return Err(ClientError::BadRequest(format!(
            "unsupported image type {}",
            file.mime_type
        )));
    }
    check_size(file, MAX_IMAGE_BYTES)
}

fn check_size(file: &UploadFile, limit: usize) -> ClientResult<()> {
    if file.bytes.is_empty() {
        return Err(ClientError::BadRequest("file is empty".to_string()));
    }
    if file.bytes.len() > limit {
        return Err(ClientError::BadRequest(format!(
            "file exceeds {} MB",
            limit / (1024 * 1024)
        )));
    }
    Ok(())
}

pub async fn upload_product_image(
    client: &ApiClient,
    product_id: i64,
    file: UploadFile,
    on_progress: Option<ProgressCallback>,
) -> ClientResult<ApiResult<UploadedFile>> {
    check_image(&file)?;
    let file = UploadFile {
        field: "image".to_string(),
        ..file
    };
    Ok(client
        .upload(
            "/upload/product-image",
            file,
            &[("productId", product_id.to_string())],
            on_progress,
        )
        .await?
        .into_result())
}

pub async fn upload_product_thumbnail(
    client: &ApiClient,
    product_id: i64,
    file: UploadFile,
    on_progress: Option<ProgressCallback>,
) -> ClientResult<ApiResult<UploadedFile>> {
    check_image(&file)?;
    let file = UploadFile {
        field: "thumbnail".to_string(),
        ..file
    };
    Ok(client
        .upload(
            "/upload/product-thumbnail",
            file,
            &[("productId", product_id.to_string())],
            on_progress,
        )
        .await?
        .into_result())
}

/// Generic attachment, optionally tagged with the folder it belongs to.
pub async fn upload_file(
    client: &ApiClient,
    file: UploadFile,
    folder: Option<&str>,
    on_progress: Option<ProgressCallback>,
) -> ClientResult<ApiResult<UploadedFile>> {
    check_size(&file, MAX_FILE_BYTES)?;
    let file = UploadFile {
        field: "file".to_string(),
        ..file
    };
    let fields: Vec<(&str, String)> = folder
        .map(|f| vec![("folder", f.to_string())])
        .unwrap_or_default();
    Ok(client
        .upload("/upload/file", file, &fields, on_progress)
        .await?
        .into_result())
}
