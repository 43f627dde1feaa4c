use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    response::Response,
};
use courier_core::AppError;
use courier_services::UploadFile;
use std::sync::Arc;

use crate::cookies::request_cookies;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::templates::{render, UploadTemplate};

pub async fn upload_form(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    render(&UploadTemplate {
        upload_path: state.config.upload_path.clone(),
        prefix: String::new(),
        status: None,
    })
}

/// Read the `prefix` text field and the `file` field. An empty file input counts as no file.
async fn read_upload_form(
    mut multipart: Multipart,
) -> Result<(String, Option<UploadFile>), AppError> {
    let mut prefix = String::new();
    let mut file: Option<UploadFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "prefix" => {
                prefix = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read prefix: {}", e)))?;
            }
            // First file wins; the form only ever uploads one
            "file" if file.is_none() => {
                let filename = field.file_name().map(|s: &str| s.to_string()).unwrap_or_default();
                let content_type = field.content_type().map(|s: &str| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

                if !filename.is_empty() {
                    let mut upload = UploadFile::new(filename, data);
                    upload.content_type = content_type;
                    file = Some(upload);
                }
            }
            _ => {}
        }
    }

    Ok((prefix, file))
}

pub async fn upload_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let cookies = request_cookies(&headers, &state.config);
    let (prefix, file) = read_upload_form(multipart).await?;

    let status = state.upload.submit(&prefix, file, &cookies).await;

    render(&UploadTemplate {
        upload_path: state.config.upload_path.clone(),
        prefix,
        status: Some(status),
    })
}
