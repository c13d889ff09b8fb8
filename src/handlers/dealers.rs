use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::dealer;
use crate::errors::ServiceError;
use crate::services::dealers::{CreateDealerRequest, UpdateDealerRequest};
use crate::{ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct DealerListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    pub region: Option<String>,
}

/// List dealers, optionally filtered by region
#[utoipa::path(
    get,
    path = "/api/v1/dealers",
    tag = "dealers",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("region" = Option<String>, Query, description = "Filter by region"),
    ),
    responses(
        (status = 200, description = "Dealers retrieved"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn list_dealers(
    State(state): State<AppState>,
    Query(query): Query<DealerListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<dealer::Model>>>, ServiceError> {
    let result = state
        .services
        .dealers
        .list_dealers(query.region, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.dealers,
        result.total,
        query.page,
        query.limit,
    ))))
}

/// Get a dealer by id
#[utoipa::path(
    get,
    path = "/api/v1/dealers/{id}",
    tag = "dealers",
    params(("id" = Uuid, Path, description = "Dealer id")),
    responses(
        (status = 200, description = "Dealer retrieved"),
        (status = 404, description = "Dealer not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_dealer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<dealer::Model>>, ServiceError> {
    let dealer = state
        .services
        .dealers
        .get_dealer(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Dealer not found".to_string()))?;
    Ok(Json(ApiResponse::success(dealer)))
}

/// Register a dealer
#[utoipa::path(
    post,
    path = "/api/v1/dealers",
    tag = "dealers",
    request_body = CreateDealerRequest,
    responses(
        (status = 201, description = "Dealer created"),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_dealer(
    State(state): State<AppState>,
    Json(request): Json<CreateDealerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<dealer::Model>>), ServiceError> {
    let dealer = state.services.dealers.create_dealer(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(dealer))))
}

/// Update a dealer
#[utoipa::path(
    put,
    path = "/api/v1/dealers/{id}",
    tag = "dealers",
    params(("id" = Uuid, Path, description = "Dealer id")),
    request_body = UpdateDealerRequest,
    responses(
        (status = 200, description = "Dealer updated"),
        (status = 404, description = "Dealer not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_dealer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDealerRequest>,
) -> Result<Json<ApiResponse<dealer::Model>>, ServiceError> {
    let dealer = state.services.dealers.update_dealer(id, request).await?;
    Ok(Json(ApiResponse::success(dealer)))
}

/// Deactivate a dealer; dealers are never hard-deleted
#[utoipa::path(
    post,
    path = "/api/v1/dealers/{id}/deactivate",
    tag = "dealers",
    params(("id" = Uuid, Path, description = "Dealer id")),
    responses(
        (status = 200, description = "Dealer deactivated"),
        (status = 404, description = "Dealer not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn deactivate_dealer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<dealer::Model>>, ServiceError> {
    let dealer = state.services.dealers.deactivate_dealer(id).await?;
    Ok(Json(ApiResponse::success(dealer)))
}
