use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{vehicle_model, vehicle_variant};
use crate::errors::ServiceError;
use crate::services::vehicles::{
    CreateModelRequest, CreateVariantRequest, UpdateModelRequest, UpdateVariantRequest,
};
use crate::{ApiResponse, AppState, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct ModelListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub only_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct VariantListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default = "crate::default_limit")]
    pub limit: u64,
    pub model_id: Option<Uuid>,
    #[serde(default)]
    pub only_active: bool,
}

/// List vehicle models
#[utoipa::path(
    get,
    path = "/api/v1/vehicle-models",
    tag = "vehicles",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("only_active" = Option<bool>, Query, description = "Hide discontinued models"),
    ),
    responses((status = 200, description = "Models retrieved")),
    security(("Bearer" = []))
)]
pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ModelListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<vehicle_model::Model>>>, ServiceError> {
    let result = state
        .services
        .vehicles
        .list_models(query.only_active, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.models,
        result.total,
        query.page,
        query.limit,
    ))))
}

/// Get a vehicle model by id
#[utoipa::path(
    get,
    path = "/api/v1/vehicle-models/{id}",
    tag = "vehicles",
    params(("id" = Uuid, Path, description = "Model id")),
    responses(
        (status = 200, description = "Model retrieved"),
        (status = 404, description = "Model not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<vehicle_model::Model>>, ServiceError> {
    let model = state
        .services
        .vehicles
        .get_model(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Vehicle model not found".to_string()))?;
    Ok(Json(ApiResponse::success(model)))
}

/// Add a vehicle model to the catalog
#[utoipa::path(
    post,
    path = "/api/v1/vehicle-models",
    tag = "vehicles",
    request_body = CreateModelRequest,
    responses(
        (status = 201, description = "Model created"),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_model(
    State(state): State<AppState>,
    Json(request): Json<CreateModelRequest>,
) -> Result<(StatusCode, Json<ApiResponse<vehicle_model::Model>>), ServiceError> {
    let model = state.services.vehicles.create_model(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(model))))
}

/// Update a vehicle model
#[utoipa::path(
    put,
    path = "/api/v1/vehicle-models/{id}",
    tag = "vehicles",
    params(("id" = Uuid, Path, description = "Model id")),
    request_body = UpdateModelRequest,
    responses(
        (status = 200, description = "Model updated"),
        (status = 404, description = "Model not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_model(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateModelRequest>,
) -> Result<Json<ApiResponse<vehicle_model::Model>>, ServiceError> {
    let model = state.services.vehicles.update_model(id, request).await?;
    Ok(Json(ApiResponse::success(model)))
}

/// List vehicle variants
#[utoipa::path(
    get,
    path = "/api/v1/vehicle-variants",
    tag = "vehicles",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("model_id" = Option<Uuid>, Query, description = "Filter by model"),
        ("only_active" = Option<bool>, Query, description = "Hide discontinued variants"),
    ),
    responses((status = 200, description = "Variants retrieved")),
    security(("Bearer" = []))
)]
pub async fn list_variants(
    State(state): State<AppState>,
    Query(query): Query<VariantListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<vehicle_variant::Model>>>, ServiceError> {
    let result = state
        .services
        .vehicles
        .list_variants(query.model_id, query.only_active, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.variants,
        result.total,
        query.page,
        query.limit,
    ))))
}

/// Get a vehicle variant by id
#[utoipa::path(
    get,
    path = "/api/v1/vehicle-variants/{id}",
    tag = "vehicles",
    params(("id" = Uuid, Path, description = "Variant id")),
    responses(
        (status = 200, description = "Variant retrieved"),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn get_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<vehicle_variant::Model>>, ServiceError> {
    let variant = state
        .services
        .vehicles
        .get_variant(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Vehicle variant not found".to_string()))?;
    Ok(Json(ApiResponse::success(variant)))
}

/// Add a variant under an existing model
#[utoipa::path(
    post,
    path = "/api/v1/vehicle-variants",
    tag = "vehicles",
    request_body = CreateVariantRequest,
    responses(
        (status = 201, description = "Variant created"),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU already exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn create_variant(
    State(state): State<AppState>,
    Json(request): Json<CreateVariantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<vehicle_variant::Model>>), ServiceError> {
    let variant = state.services.vehicles.create_variant(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(variant))))
}

/// Update a vehicle variant
#[utoipa::path(
    put,
    path = "/api/v1/vehicle-variants/{id}",
    tag = "vehicles",
    params(("id" = Uuid, Path, description = "Variant id")),
    request_body = UpdateVariantRequest,
    responses(
        (status = 200, description = "Variant updated"),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = []))
)]
pub async fn update_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVariantRequest>,
) -> Result<Json<ApiResponse<vehicle_variant::Model>>, ServiceError> {
    let variant = state.services.vehicles.update_variant(id, request).await?;
    Ok(Json(ApiResponse::success(variant)))
}
