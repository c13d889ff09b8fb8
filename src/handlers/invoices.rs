use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::invoicing::InvoiceResponse;
use crate::{ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct InvoiceListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateInvoiceStatusRequest {
    pub status: String,
}

/// Accept a dealer quotation, issuing its invoice
#[utoipa::path(
    post,
    path = "/api/v1/invoices/from-quotation/{quotation_id}",
    tag = "invoices",
    params(("quotation_id" = Uuid, Path, description = "Dealer quotation id")),
    responses(
        (status = 201, description = "Quotation accepted and invoice issued"),
        (status = 400, description = "Retail quotation; use the order flow", body = crate::errors::ErrorResponse),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already settled, expired, or invoiced", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn accept_dealer_quotation(
    State(state): State<AppState>,
    Path(quotation_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<InvoiceResponse>>), ServiceError> {
    let invoice = state
        .services
        .invoices
        .accept_dealer_quotation(quotation_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(invoice))))
}

/// List invoices
#[utoipa::path(
    get,
    path = "/api/v1/invoices",
    tag = "invoices",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("status" = Option<String>, Query, description = "Filter by stored status"),
    ),
    responses(
        (status = 200, description = "Invoices retrieved"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<InvoiceListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<InvoiceResponse>>>, ServiceError> {
    let result = state
        .services
        .invoices
        .list_invoices(query.status, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.invoices,
        result.total,
        query.page,
        query.limit,
    ))))
}

/// Get an invoice by id
#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}",
    tag = "invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice retrieved"),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<InvoiceResponse>>, ServiceError> {
    let invoice = state
        .services
        .invoices
        .get_invoice(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Invoice not found".to_string()))?;
    Ok(Json(ApiResponse::success(invoice)))
}

/// Mark an invoice paid or cancelled
#[utoipa::path(
    put,
    path = "/api/v1/invoices/{id}/status",
    tag = "invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = UpdateInvoiceStatusRequest,
    responses(
        (status = 200, description = "Invoice status updated"),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed from current status", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_invoice_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInvoiceStatusRequest>,
) -> Result<Json<ApiResponse<InvoiceResponse>>, ServiceError> {
    let invoice = state
        .services
        .invoices
        .update_status(id, &request.status)
        .await?;
    Ok(Json(ApiResponse::success(invoice)))
}
