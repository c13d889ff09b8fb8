//! Unauthenticated mirrors under `/api/public`: customers acting on a
//! quotation link, requesting an appointment, or leaving feedback without
//! an account. Same services, no principal.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::appointments::{AppointmentResponse, BookAppointmentRequest};
use crate::services::feedback::{FeedbackResponse, SubmitFeedbackRequest};
use crate::services::quotations::{
    AcceptQuotationResponse, QuotationResponse, RejectQuotationRequest,
};
use crate::{ApiResponse, AppState};

/// Accept a retail quotation from a customer-facing link
#[utoipa::path(
    post,
    path = "/api/public/quotations/{id}/accept",
    tag = "public",
    params(("id" = Uuid, Path, description = "Quotation id")),
    responses(
        (status = 200, description = "Quotation accepted and order created"),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already settled or expired", body = crate::errors::ErrorResponse),
    )
)]
pub async fn accept_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AcceptQuotationResponse>>, ServiceError> {
    let result = state.services.quotations.accept_quotation(id).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// Reject a quotation from a customer-facing link
#[utoipa::path(
    post,
    path = "/api/public/quotations/{id}/reject",
    tag = "public",
    params(("id" = Uuid, Path, description = "Quotation id")),
    request_body = RejectQuotationRequest,
    responses(
        (status = 200, description = "Quotation rejected"),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already settled", body = crate::errors::ErrorResponse),
    )
)]
pub async fn reject_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectQuotationRequest>,
) -> Result<Json<ApiResponse<QuotationResponse>>, ServiceError> {
    let quotation = state
        .services
        .quotations
        .reject_quotation(id, request)
        .await?;
    Ok(Json(ApiResponse::success(quotation)))
}

/// Request a test-drive appointment without logging in
#[utoipa::path(
    post,
    path = "/api/public/appointments",
    tag = "public",
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment requested"),
        (status = 400, description = "Scheduled time is in the past", body = crate::errors::ErrorResponse),
    )
)]
pub async fn request_appointment(
    State(state): State<AppState>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentResponse>>), ServiceError> {
    let appointment = state
        .services
        .appointments
        .book_appointment(request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(appointment))))
}

/// Submit feedback without logging in
#[utoipa::path(
    post,
    path = "/api/public/feedback",
    tag = "public",
    request_body = SubmitFeedbackRequest,
    responses(
        (status = 201, description = "Feedback submitted"),
        (status = 400, description = "Rating out of range", body = crate::errors::ErrorResponse),
    )
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FeedbackResponse>>), ServiceError> {
    let feedback = state.services.feedback.submit_feedback(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(feedback))))
}
