use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::dealer_orders::{CreateDealerOrderRequest, DealerOrderResponse};
use crate::services::quotations::QuotationResponse;
use crate::{ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct DealerOrderListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    pub dealer_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDealerOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateQuotationRequest {
    /// Wholesale discount applied to the order subtotal
    pub discount_percent: Option<Decimal>,
    pub notes: Option<String>,
}

/// Place a wholesale order for a dealer
#[utoipa::path(
    post,
    path = "/api/v1/dealer-orders",
    tag = "dealer-orders",
    request_body = CreateDealerOrderRequest,
    responses(
        (status = 201, description = "Dealer order created"),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Dealer or variant not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_dealer_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(request): Json<CreateDealerOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DealerOrderResponse>>), ServiceError> {
    if !auth_user.can_access_dealer(request.dealer_id) {
        return Err(ServiceError::Forbidden(
            "Cannot place orders for another dealer".to_string(),
        ));
    }
    let order = state
        .services
        .dealer_orders
        .create_dealer_order(request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// List dealer orders; dealer-side callers only see their own dealer's
#[utoipa::path(
    get,
    path = "/api/v1/dealer-orders",
    tag = "dealer-orders",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("dealer_id" = Option<Uuid>, Query, description = "Filter by dealer"),
    ),
    responses(
        (status = 200, description = "Dealer orders retrieved"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_dealer_orders(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<DealerOrderListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<DealerOrderResponse>>>, ServiceError> {
    let dealer_id = match auth_user.dealer_id {
        Some(own) if !auth_user.is_admin() => Some(own),
        _ => query.dealer_id,
    };
    let result = state
        .services
        .dealer_orders
        .list_dealer_orders(dealer_id, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.dealer_orders,
        result.total,
        query.page,
        query.limit,
    ))))
}

/// Get a dealer order with its line items
#[utoipa::path(
    get,
    path = "/api/v1/dealer-orders/{id}",
    tag = "dealer-orders",
    params(("id" = Uuid, Path, description = "Dealer order id")),
    responses(
        (status = 200, description = "Dealer order retrieved"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Dealer order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_dealer_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DealerOrderResponse>>, ServiceError> {
    let order = state
        .services
        .dealer_orders
        .get_dealer_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Dealer order not found".to_string()))?;
    if !auth_user.can_access_dealer(order.dealer_id) {
        return Err(ServiceError::Forbidden(
            "Dealer order belongs to another dealer".to_string(),
        ));
    }
    Ok(Json(ApiResponse::success(order)))
}

/// Move a dealer order along its workflow
#[utoipa::path(
    put,
    path = "/api/v1/dealer-orders/{id}/status",
    tag = "dealer-orders",
    params(("id" = Uuid, Path, description = "Dealer order id")),
    request_body = UpdateDealerOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed from current status", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_dealer_order_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDealerOrderStatusRequest>,
) -> Result<Json<ApiResponse<DealerOrderResponse>>, ServiceError> {
    let current = state
        .services
        .dealer_orders
        .get_dealer_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Dealer order not found".to_string()))?;
    if !auth_user.can_access_dealer(current.dealer_id) {
        return Err(ServiceError::Forbidden(
            "Dealer order belongs to another dealer".to_string(),
        ));
    }
    let order = state
        .services
        .dealer_orders
        .update_status(id, &request.status)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Generate a wholesale quotation from a submitted dealer order
#[utoipa::path(
    post,
    path = "/api/v1/dealer-orders/{id}/quotation",
    tag = "dealer-orders",
    params(("id" = Uuid, Path, description = "Dealer order id")),
    request_body = GenerateQuotationRequest,
    responses(
        (status = 201, description = "Quotation generated, dealer order marked quoted"),
        (status = 400, description = "Invalid discount or empty order", body = crate::errors::ErrorResponse),
        (status = 404, description = "Dealer order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Dealer order is not submitted", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn generate_quotation(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<GenerateQuotationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<QuotationResponse>>), ServiceError> {
    let quotation = state
        .services
        .dealer_orders
        .generate_quotation(
            id,
            request.discount_percent,
            request.notes,
            Some(auth_user.user_id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(quotation))))
}
