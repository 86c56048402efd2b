//! Media endpoints

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};

use crate::AppState;
use crate::api::converters::media_to_response;
use crate::api::dto::MediaAttachmentResponse;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};
use crate::service::{MAX_IMAGE_BYTES, MAX_VIDEO_BYTES, MediaKind, StatusService};

/// POST /v1/media
///
/// Multipart fields: `file` (required) and `description`.
pub async fn upload_media(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MediaAttachmentResponse>), AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/v1/media"])
        .start_timer();

    let mut file_data: Option<Vec<u8>> = None;
    let mut content_type: Option<String> = None;
    let mut description: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to parse multipart: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let detected_content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .ok_or(AppError::Validation(
                        "Missing content type for uploaded file".to_string(),
                    ))?;
                let max_size = match MediaKind::from_content_type(&detected_content_type) {
                    MediaKind::Image => MAX_IMAGE_BYTES,
                    MediaKind::Video => MAX_VIDEO_BYTES,
                    MediaKind::Unknown => {
                        return Err(AppError::Validation(format!(
                            "Unsupported media type: {}",
                            detected_content_type
                        )));
                    }
                };

                // Stop reading as soon as the limit is crossed
                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {}", e)))?
                {
                    if bytes.len() + chunk.len() > max_size {
                        return Err(AppError::Validation(format!(
                            "File too large: exceeds {} bytes",
                            max_size
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }

                content_type = Some(detected_content_type);
                file_data = Some(bytes);
            }
            "description" => {
                description = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read description: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or(AppError::Validation("No file provided".to_string()))?;
    let content_type = content_type.ok_or(AppError::Validation(
        "Missing content type for uploaded file".to_string(),
    ))?;

    let status_service = StatusService::new(state.db.clone(), state.storage.clone());
    let media = status_service
        .upload_media(&account, file_data, &content_type, description)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/v1/media", "201"])
        .inc();

    Ok((StatusCode::CREATED, Json(media_to_response(&media))))
}
