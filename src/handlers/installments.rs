use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::installments::{
    CreatePlanRequest, MarkPaidRequest, PlanResponse, ScheduleResponse,
};
use crate::{ApiResponse, AppState};

/// Create an installment plan for an invoice, generating the full schedule
#[utoipa::path(
    post,
    path = "/api/v1/installment-plans",
    tag = "installments",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Plan created with its schedule"),
        (status = 400, description = "Invalid terms", body = crate::errors::ErrorResponse),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invoice already has a plan", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_plan(
    State(state): State<AppState>,
    Json(request): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PlanResponse>>), ServiceError> {
    let plan = state.services.installments.create_plan(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(plan))))
}

/// Get an installment plan with its schedule
#[utoipa::path(
    get,
    path = "/api/v1/installment-plans/{id}",
    tag = "installments",
    params(("id" = Uuid, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Plan retrieved"),
        (status = 404, description = "Plan not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PlanResponse>>, ServiceError> {
    let plan = state
        .services
        .installments
        .get_plan(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Installment plan not found".to_string()))?;
    Ok(Json(ApiResponse::success(plan)))
}

/// Get the installment plan attached to an invoice
#[utoipa::path(
    get,
    path = "/api/v1/installment-plans/by-invoice/{invoice_id}",
    tag = "installments",
    params(("invoice_id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Plan retrieved"),
        (status = 404, description = "No plan for this invoice", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_plan_for_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<ApiResponse<PlanResponse>>, ServiceError> {
    let plan = state
        .services
        .installments
        .get_plan_for_invoice(invoice_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound("No installment plan for this invoice".to_string())
        })?;
    Ok(Json(ApiResponse::success(plan)))
}

/// Record payment of a single installment
#[utoipa::path(
    post,
    path = "/api/v1/installment-schedules/{id}/pay",
    tag = "installments",
    params(("id" = Uuid, Path, description = "Schedule row id")),
    request_body = MarkPaidRequest,
    responses(
        (status = 200, description = "Installment marked paid"),
        (status = 404, description = "Schedule row not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Installment is already paid", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn mark_installment_paid(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MarkPaidRequest>,
) -> Result<Json<ApiResponse<ScheduleResponse>>, ServiceError> {
    let schedule = state.services.installments.mark_paid(id, request).await?;
    Ok(Json(ApiResponse::success(schedule)))
}
