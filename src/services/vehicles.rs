use crate::{
    db::DbPool,
    entities::vehicle_model::{
        self, ActiveModel as ModelActiveModel, Entity as ModelEntity, Model as VehicleModelRow,
    },
    entities::vehicle_variant::{
        self, ActiveModel as VariantActiveModel, Entity as VariantEntity,
        Model as VehicleVariantRow,
    },
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateModelRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub segment: Option<String>,
    pub base_price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateModelRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub segment: Option<String>,
    pub base_price: Option<Decimal>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateVariantRequest {
    pub model_id: Uuid,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    pub battery_kwh: Option<i32>,
    pub range_km: Option<i32>,
    pub color: Option<String>,
    pub price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateVariantRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub battery_kwh: Option<i32>,
    pub range_km: Option<i32>,
    pub color: Option<String>,
    pub price: Option<Decimal>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelListResponse {
    pub models: Vec<VehicleModelRow>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VariantListResponse {
    pub variants: Vec<VehicleVariantRow>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Catalog service for vehicle models and their sellable variants.
#[derive(Clone)]
pub struct VehicleService {
    db_pool: Arc<DbPool>,
}

impl VehicleService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request))]
    pub async fn create_model(
        &self,
        request: CreateModelRequest,
    ) -> Result<VehicleModelRow, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if request.base_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Base price cannot be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let model = ModelActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            segment: Set(request.segment),
            base_price: Set(request.base_price),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        info!(model_id = %created.id, "Vehicle model created");
        Ok(created)
    }

    #[instrument(skip(self), fields(model_id = %model_id))]
    pub async fn get_model(
        &self,
        model_id: Uuid,
    ) -> Result<Option<VehicleModelRow>, ServiceError> {
        ModelEntity::find_by_id(model_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn list_models(
        &self,
        only_active: bool,
        page: u64,
        per_page: u64,
    ) -> Result<ModelListResponse, ServiceError> {
        let mut query = ModelEntity::find();
        if only_active {
            query = query.filter(vehicle_model::Column::Active.eq(true));
        }

        let paginator = query
            .order_by_asc(vehicle_model::Column::Name)
            .paginate(&*self.db_pool, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let models = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(ModelListResponse {
            models,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, request), fields(model_id = %model_id))]
    pub async fn update_model(
        &self,
        model_id: Uuid,
        request: UpdateModelRequest,
    ) -> Result<VehicleModelRow, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let model = ModelEntity::find_by_id(model_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Vehicle model not found".to_string()))?;

        let mut active_model: ModelActiveModel = model.into();
        if let Some(name) = request.name {
            active_model.name = Set(name);
        }
        if let Some(segment) = request.segment {
            active_model.segment = Set(Some(segment));
        }
        if let Some(base_price) = request.base_price {
            if base_price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Base price cannot be negative".to_string(),
                ));
            }
            active_model.base_price = Set(base_price);
        }
        if let Some(active) = request.active {
            active_model.active = Set(active);
        }
        active_model.updated_at = Set(Some(Utc::now()));

        active_model
            .update(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, request), fields(model_id = %request.model_id, sku = %request.sku))]
    pub async fn create_variant(
        &self,
        request: CreateVariantRequest,
    ) -> Result<VehicleVariantRow, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if request.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;
        ModelEntity::find_by_id(request.model_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Vehicle model not found".to_string()))?;

        let duplicate = VariantEntity::find()
            .filter(vehicle_variant::Column::Sku.eq(request.sku.clone()))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(
                "A variant with this SKU already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let model = VariantActiveModel {
            id: Set(Uuid::new_v4()),
            model_id: Set(request.model_id),
            name: Set(request.name),
            sku: Set(request.sku),
            battery_kwh: Set(request.battery_kwh),
            range_km: Set(request.range_km),
            color: Set(request.color),
            price: Set(request.price),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let created = model.insert(db).await.map_err(ServiceError::DatabaseError)?;
        info!(variant_id = %created.id, "Vehicle variant created");
        Ok(created)
    }

    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn get_variant(
        &self,
        variant_id: Uuid,
    ) -> Result<Option<VehicleVariantRow>, ServiceError> {
        VariantEntity::find_by_id(variant_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn list_variants(
        &self,
        model_id: Option<Uuid>,
        only_active: bool,
        page: u64,
        per_page: u64,
    ) -> Result<VariantListResponse, ServiceError> {
        let mut query = VariantEntity::find();
        if let Some(model_id) = model_id {
            query = query.filter(vehicle_variant::Column::ModelId.eq(model_id));
        }
        if only_active {
            query = query.filter(vehicle_variant::Column::Active.eq(true));
        }

        let paginator = query
            .order_by_asc(vehicle_variant::Column::Name)
            .paginate(&*self.db_pool, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let variants = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(VariantListResponse {
            variants,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, request), fields(variant_id = %variant_id))]
    pub async fn update_variant(
        &self,
        variant_id: Uuid,
        request: UpdateVariantRequest,
    ) -> Result<VehicleVariantRow, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let variant = VariantEntity::find_by_id(variant_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Vehicle variant not found".to_string()))?;

        let mut active_model: VariantActiveModel = variant.into();
        if let Some(name) = request.name {
            active_model.name = Set(name);
        }
        if let Some(battery_kwh) = request.battery_kwh {
            active_model.battery_kwh = Set(Some(battery_kwh));
        }
        if let Some(range_km) = request.range_km {
            active_model.range_km = Set(Some(range_km));
        }
        if let Some(color) = request.color {
            active_model.color = Set(Some(color));
        }
        if let Some(price) = request.price {
            if price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Price cannot be negative".to_string(),
                ));
            }
            active_model.price = Set(price);
        }
        if let Some(active) = request.active {
            active_model.active = Set(active);
        }
        active_model.updated_at = Set(Some(Utc::now()));

        active_model
            .update(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn variant_request_requires_sku() {
        let request = CreateVariantRequest {
            model_id: Uuid::new_v4(),
            name: "Long Range AWD".to_string(),
            sku: String::new(),
            battery_kwh: Some(82),
            range_km: Some(540),
            color: None,
            price: dec!(45990.00),
        };
        assert!(request.validate().is_err());
    }
}
