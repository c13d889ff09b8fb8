use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::feedback::{FeedbackFilter, FeedbackResponse, SubmitFeedbackRequest};
use crate::{ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct FeedbackListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    pub customer_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub min_rating: Option<i32>,
}

/// Submit customer feedback
#[utoipa::path(
    post,
    path = "/api/v1/feedback",
    tag = "feedback",
    request_body = SubmitFeedbackRequest,
    responses(
        (status = 201, description = "Feedback submitted"),
        (status = 400, description = "Rating out of range", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer or order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FeedbackResponse>>), ServiceError> {
    let feedback = state.services.feedback.submit_feedback(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(feedback))))
}

/// List feedback
#[utoipa::path(
    get,
    path = "/api/v1/feedback",
    tag = "feedback",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("customer_id" = Option<Uuid>, Query, description = "Filter by customer"),
        ("order_id" = Option<Uuid>, Query, description = "Filter by order"),
        ("min_rating" = Option<i32>, Query, description = "Minimum rating"),
    ),
    responses(
        (status = 200, description = "Feedback retrieved"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_feedback(
    State(state): State<AppState>,
    Query(query): Query<FeedbackListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<FeedbackResponse>>>, ServiceError> {
    let filter = FeedbackFilter {
        customer_id: query.customer_id,
        order_id: query.order_id,
        min_rating: query.min_rating,
    };
    let result = state
        .services
        .feedback
        .list_feedback(filter, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.feedback,
        result.total,
        query.page,
        query.limit,
    ))))
}

/// Get feedback by id
#[utoipa::path(
    get,
    path = "/api/v1/feedback/{id}",
    tag = "feedback",
    params(("id" = Uuid, Path, description = "Feedback id")),
    responses(
        (status = 200, description = "Feedback retrieved"),
        (status = 404, description = "Feedback not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FeedbackResponse>>, ServiceError> {
    let feedback = state
        .services
        .feedback
        .get_feedback(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Feedback not found".to_string()))?;
    Ok(Json(ApiResponse::success(feedback)))
}

/// Delete feedback (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/feedback/{id}",
    tag = "feedback",
    params(("id" = Uuid, Path, description = "Feedback id")),
    responses(
        (status = 200, description = "Feedback deleted"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Feedback not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_feedback(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    if !auth_user.is_admin() {
        return Err(ServiceError::Forbidden(
            "Only administrators can delete feedback".to_string(),
        ));
    }
    state.services.feedback.delete_feedback(id).await?;
    Ok(Json(ApiResponse::success(())))
}
