use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::payments::{PaymentResponse, RecordPaymentRequest};
use crate::{ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    pub invoice_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: String,
}

/// Record a payment against an invoice or an order
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "payments",
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded as pending"),
        (status = 400, description = "Invalid payment data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Invoice or order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn record_payment(
    State(state): State<AppState>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentResponse>>), ServiceError> {
    let payment = state.services.payments.record_payment(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(payment))))
}

/// List payments
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    tag = "payments",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("invoice_id" = Option<Uuid>, Query, description = "Filter by invoice"),
        ("order_id" = Option<Uuid>, Query, description = "Filter by order"),
    ),
    responses(
        (status = 200, description = "Payments retrieved"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<PaymentResponse>>>, ServiceError> {
    let result = state
        .services
        .payments
        .list_payments(query.invoice_id, query.order_id, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.payments,
        result.total,
        query.page,
        query.limit,
    ))))
}

/// Get a payment by id
#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    tag = "payments",
    params(("id" = Uuid, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment retrieved"),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PaymentResponse>>, ServiceError> {
    let payment = state
        .services
        .payments
        .get_payment(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Payment not found".to_string()))?;
    Ok(Json(ApiResponse::success(payment)))
}

/// Settle a payment: complete, fail, or refund it
#[utoipa::path(
    put,
    path = "/api/v1/payments/{id}/status",
    tag = "payments",
    params(("id" = Uuid, Path, description = "Payment id")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Payment status updated"),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed from current status", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<ApiResponse<PaymentResponse>>, ServiceError> {
    let payment = state
        .services
        .payments
        .update_status(id, &request.status)
        .await?;
    Ok(Json(ApiResponse::success(payment)))
}
