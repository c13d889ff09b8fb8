use crate::{
    db::DbPool,
    entities::dealer::{
        self, ActiveModel as DealerActiveModel, Entity as DealerEntity, Model as DealerModel,
    },
    errors::ServiceError,
};
use chrono::Utc;
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
pub struct CreateDealerRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub region: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateDealerRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub region: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DealerListResponse {
    pub dealers: Vec<DealerModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct DealerService {
    db_pool: Arc<DbPool>,
}

impl DealerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request))]
    pub async fn create_dealer(
        &self,
        request: CreateDealerRequest,
    ) -> Result<DealerModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let now = Utc::now();
        let model = DealerActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            region: Set(request.region),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        info!(dealer_id = %created.id, "Dealer created");
        Ok(created)
    }

    #[instrument(skip(self), fields(dealer_id = %dealer_id))]
    pub async fn get_dealer(&self, dealer_id: Uuid) -> Result<Option<DealerModel>, ServiceError> {
        DealerEntity::find_by_id(dealer_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn list_dealers(
        &self,
        region: Option<String>,
        page: u64,
        per_page: u64,
    ) -> Result<DealerListResponse, ServiceError> {
        let mut query = DealerEntity::find();
        if let Some(region) = &region {
            query = query.filter(dealer::Column::Region.eq(region.clone()));
        }

        let paginator = query
            .order_by_asc(dealer::Column::Name)
            .paginate(&*self.db_pool, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let dealers = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(DealerListResponse {
            dealers,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, request), fields(dealer_id = %dealer_id))]
    pub async fn update_dealer(
        &self,
        dealer_id: Uuid,
        request: UpdateDealerRequest,
    ) -> Result<DealerModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let dealer = DealerEntity::find_by_id(dealer_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Dealer not found".to_string()))?;

        let mut active_model: DealerActiveModel = dealer.into();
        if let Some(name) = request.name {
            active_model.name = Set(name);
        }
        if let Some(region) = request.region {
            active_model.region = Set(Some(region));
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

    /// Deactivates instead of hard-deleting; dealers are referenced by
    /// orders and quotations.
    #[instrument(skip(self), fields(dealer_id = %dealer_id))]
    pub async fn deactivate_dealer(&self, dealer_id: Uuid) -> Result<DealerModel, ServiceError> {
        self.update_dealer(
            dealer_id,
            UpdateDealerRequest {
                name: None,
                region: None,
                active: Some(false),
            },
        )
        .await
    }
}
