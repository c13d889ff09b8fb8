use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::appointments::{AppointmentFilter, AppointmentResponse, BookAppointmentRequest};
use crate::{ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct AppointmentListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    pub customer_id: Option<Uuid>,
    pub dealer_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAppointmentStatusRequest {
    pub status: String,
}

/// Book a test-drive or service appointment
#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    tag = "appointments",
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked"),
        (status = 400, description = "Scheduled time is in the past", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn book_appointment(
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

/// List appointments
#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    tag = "appointments",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("customer_id" = Option<Uuid>, Query, description = "Filter by customer"),
        ("dealer_id" = Option<Uuid>, Query, description = "Filter by dealer"),
        ("status" = Option<String>, Query, description = "Filter by status"),
    ),
    responses(
        (status = 200, description = "Appointments retrieved"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<AppointmentResponse>>>, ServiceError> {
    let dealer_id = match auth_user.dealer_id {
        Some(own) if !auth_user.is_admin() => Some(own),
        _ => query.dealer_id,
    };
    let filter = AppointmentFilter {
        customer_id: query.customer_id,
        dealer_id,
        status: query.status,
    };
    let result = state
        .services
        .appointments
        .list_appointments(filter, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.appointments,
        result.total,
        query.page,
        query.limit,
    ))))
}

/// Get an appointment by id
#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}",
    tag = "appointments",
    params(("id" = Uuid, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment retrieved"),
        (status = 404, description = "Appointment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AppointmentResponse>>, ServiceError> {
    let appointment = state
        .services
        .appointments
        .get_appointment(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Appointment not found".to_string()))?;
    Ok(Json(ApiResponse::success(appointment)))
}

/// Confirm, complete, or cancel an appointment
#[utoipa::path(
    put,
    path = "/api/v1/appointments/{id}/status",
    tag = "appointments",
    params(("id" = Uuid, Path, description = "Appointment id")),
    request_body = UpdateAppointmentStatusRequest,
    responses(
        (status = 200, description = "Appointment status updated"),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed from current status", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_appointment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentStatusRequest>,
) -> Result<Json<ApiResponse<AppointmentResponse>>, ServiceError> {
    let appointment = state
        .services
        .appointments
        .update_status(id, &request.status)
        .await?;
    Ok(Json(ApiResponse::success(appointment)))
}

/// Delete an appointment that never ran (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/appointments/{id}",
    tag = "appointments",
    params(("id" = Uuid, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment deleted"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 409, description = "Appointment already completed or cancelled", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_appointment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    if !auth_user.is_admin() {
        return Err(ServiceError::Forbidden(
            "Only administrators can delete appointments".to_string(),
        ));
    }
    state.services.appointments.delete_appointment(id).await?;
    Ok(Json(ApiResponse::success(())))
}
