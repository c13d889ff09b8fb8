use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};

use crate::errors::ServiceError;
use crate::services::uploads::StoredFile;
use crate::{ApiResponse, AppState};

/// Upload a file via multipart/form-data; the first `file` field is stored
#[utoipa::path(
    post,
    path = "/api/v1/uploads/{category}",
    tag = "uploads",
    params(("category" = String, Path, description = "Upload category (vehicles, dealers, documents)")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored"),
        (status = 400, description = "Bad category, file name, or empty payload", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn upload_file(
    State(state): State<AppState>,
    Path(category): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<StoredFile>>), ServiceError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::ValidationError(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(|f| f.to_string())
            .ok_or_else(|| ServiceError::ValidationError("File field has no name".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ServiceError::ValidationError(format!("Failed to read upload: {}", e)))?;

        let stored = state
            .services
            .uploads
            .store(&category, &filename, &data)
            .await?;
        return Ok((StatusCode::CREATED, Json(ApiResponse::success(stored))));
    }

    Err(ServiceError::ValidationError(
        "Multipart body is missing a 'file' field".to_string(),
    ))
}

/// Delete a stored file
#[utoipa::path(
    delete,
    path = "/api/v1/uploads/{category}/{filename}",
    tag = "uploads",
    params(
        ("category" = String, Path, description = "Upload category"),
        ("filename" = String, Path, description = "Stored file name"),
    ),
    responses(
        (status = 200, description = "File deleted"),
        (status = 400, description = "Bad category or file name", body = crate::errors::ErrorResponse),
        (status = 404, description = "File not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_file(
    State(state): State<AppState>,
    Path((category, filename)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state.services.uploads.delete(&category, &filename).await?;
    Ok(Json(ApiResponse::success(())))
}
