use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::quotations::{
    AcceptQuotationResponse, CreateQuotationRequest, QuotationFilter, QuotationResponse,
    RejectQuotationRequest, UpdateQuotationRequest,
};
use crate::{ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct QuotationListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    pub customer_id: Option<Uuid>,
    pub dealer_id: Option<Uuid>,
    pub status: Option<String>,
}

/// Dealer-scoped visibility: dealer-side callers only see their own
/// dealer's quotations, whatever filter they ask for.
fn scoped_filter(auth_user: &AuthUser, query: QuotationListQuery) -> QuotationFilter {
    let dealer_id = match auth_user.dealer_id {
        Some(own) if !auth_user.is_admin() => Some(own),
        _ => query.dealer_id,
    };
    QuotationFilter {
        customer_id: query.customer_id,
        dealer_id,
        status: query.status,
    }
}

fn check_quotation_access(
    auth_user: &AuthUser,
    quotation: &QuotationResponse,
) -> Result<(), ServiceError> {
    if let Some(dealer_id) = quotation.dealer_id {
        if !auth_user.can_access_dealer(dealer_id) {
            return Err(ServiceError::Forbidden(
                "Quotation belongs to another dealer".to_string(),
            ));
        }
    }
    Ok(())
}

/// List quotations with pagination and filtering
#[utoipa::path(
    get,
    path = "/api/v1/quotations",
    tag = "quotations",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("customer_id" = Option<Uuid>, Query, description = "Filter by customer"),
        ("dealer_id" = Option<Uuid>, Query, description = "Filter by dealer"),
        ("status" = Option<String>, Query, description = "Filter by stored status"),
    ),
    responses(
        (status = 200, description = "Quotations retrieved"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_quotations(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<QuotationListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<QuotationResponse>>>, ServiceError> {
    let page = query.page;
    let limit = query.limit;
    let filter = scoped_filter(&auth_user, query);
    let result = state
        .services
        .quotations
        .list_quotations(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.quotations,
        result.total,
        page,
        limit,
    ))))
}

/// Get a quotation by id
#[utoipa::path(
    get,
    path = "/api/v1/quotations/{id}",
    tag = "quotations",
    params(("id" = Uuid, Path, description = "Quotation id")),
    responses(
        (status = 200, description = "Quotation retrieved"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_quotation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<QuotationResponse>>, ServiceError> {
    let quotation = state
        .services
        .quotations
        .get_quotation(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Quotation not found".to_string()))?;
    check_quotation_access(&auth_user, &quotation)?;
    Ok(Json(ApiResponse::success(quotation)))
}

/// Create a retail quotation priced from the variant's list price
#[utoipa::path(
    post,
    path = "/api/v1/quotations",
    tag = "quotations",
    request_body = CreateQuotationRequest,
    responses(
        (status = 201, description = "Quotation created"),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer or variant not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_quotation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateQuotationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<QuotationResponse>>), ServiceError> {
    let quotation = state
        .services
        .quotations
        .create_quotation(request, Some(auth_user.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(quotation))))
}

/// Update a pending quotation's discount or notes
#[utoipa::path(
    put,
    path = "/api/v1/quotations/{id}",
    tag = "quotations",
    params(("id" = Uuid, Path, description = "Quotation id")),
    request_body = UpdateQuotationRequest,
    responses(
        (status = 200, description = "Quotation updated"),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Quotation is no longer pending", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateQuotationRequest>,
) -> Result<Json<ApiResponse<QuotationResponse>>, ServiceError> {
    let quotation = state
        .services
        .quotations
        .update_quotation(id, request)
        .await?;
    Ok(Json(ApiResponse::success(quotation)))
}

/// Send a quotation to the customer, stamping its expiry date
#[utoipa::path(
    post,
    path = "/api/v1/quotations/{id}/send",
    tag = "quotations",
    params(("id" = Uuid, Path, description = "Quotation id")),
    responses(
        (status = 200, description = "Quotation sent"),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Quotation is not pending", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn send_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<QuotationResponse>>, ServiceError> {
    let quotation = state.services.quotations.send_quotation(id).await?;
    Ok(Json(ApiResponse::success(quotation)))
}

/// Accept a retail quotation, creating its order
#[utoipa::path(
    post,
    path = "/api/v1/quotations/{id}/accept",
    tag = "quotations",
    params(("id" = Uuid, Path, description = "Quotation id")),
    responses(
        (status = 200, description = "Quotation accepted and order created"),
        (status = 400, description = "Dealer quotation; use the invoicing flow", body = crate::errors::ErrorResponse),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already settled or expired", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn accept_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AcceptQuotationResponse>>, ServiceError> {
    let result = state.services.quotations.accept_quotation(id).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// Reject a quotation with an optional reason
#[utoipa::path(
    post,
    path = "/api/v1/quotations/{id}/reject",
    tag = "quotations",
    params(("id" = Uuid, Path, description = "Quotation id")),
    request_body = RejectQuotationRequest,
    responses(
        (status = 200, description = "Quotation rejected"),
        (status = 404, description = "Quotation not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already settled", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
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

/// Delete a pending quotation (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/quotations/{id}",
    tag = "quotations",
    params(("id" = Uuid, Path, description = "Quotation id")),
    responses(
        (status = 200, description = "Quotation deleted"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 409, description = "Quotation already sent", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn delete_quotation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    if !auth_user.is_admin() {
        return Err(ServiceError::Forbidden(
            "Only administrators can delete quotations".to_string(),
        ));
    }
    state.services.quotations.delete_quotation(id).await?;
    Ok(Json(ApiResponse::success(())))
}
