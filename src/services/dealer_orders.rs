use crate::{
    db::DbPool,
    entities::dealer::{self, Entity as DealerEntity},
    entities::dealer_order::{
        self, ActiveModel as DealerOrderActiveModel, Entity as DealerOrderEntity,
        Model as DealerOrderModel,
    },
    entities::dealer_order_item::{
        self, ActiveModel as ItemActiveModel, Entity as ItemEntity, Model as ItemModel,
    },
    entities::quotation::ActiveModel as QuotationActiveModel,
    entities::vehicle_variant::{self, Entity as VariantEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::quotations::{self, QuotationResponse};

pub mod status {
    pub const DRAFT: &str = "draft";
    pub const SUBMITTED: &str = "submitted";
    pub const QUOTED: &str = "quoted";
    pub const CONFIRMED: &str = "confirmed";
    pub const FULFILLED: &str = "fulfilled";
    pub const CANCELLED: &str = "cancelled";
}

/// States a dealer order may move to `new_status` from. `quoted` is also
/// reachable through `generate_quotation`.
fn allowed_sources(new_status: &str) -> Option<&'static [&'static str]> {
    match new_status {
        status::SUBMITTED => Some(&[status::DRAFT]),
        status::CONFIRMED => Some(&[status::QUOTED]),
        status::FULFILLED => Some(&[status::CONFIRMED]),
        status::CANCELLED => Some(&[
            status::DRAFT,
            status::SUBMITTED,
            status::QUOTED,
            status::CONFIRMED,
        ]),
        _ => None,
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DealerOrderItemRequest {
    pub variant_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateDealerOrderRequest {
    pub dealer_id: Uuid,
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<DealerOrderItemRequest>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DealerOrderItemResponse {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DealerOrderResponse {
    pub id: Uuid,
    pub dealer_id: Uuid,
    pub status: String,
    pub order_date: DateTime<Utc>,
    pub items: Vec<DealerOrderItemResponse>,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DealerOrderListResponse {
    pub dealer_orders: Vec<DealerOrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for dealer wholesale orders and the dealer-side quotations
/// generated from them.
#[derive(Clone)]
pub struct DealerOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    quotation_validity_days: i64,
}

impl DealerOrderService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        quotation_validity_days: i64,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            quotation_validity_days,
        }
    }

    /// Creates a dealer order with its line items, priced from the current
    /// variant list prices, in one transaction.
    #[instrument(skip(self, request), fields(dealer_id = %request.dealer_id))]
    pub async fn create_dealer_order(
        &self,
        request: CreateDealerOrderRequest,
    ) -> Result<DealerOrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if request.items.iter().any(|item| item.quantity < 1) {
            return Err(ServiceError::ValidationError(
                "Item quantity must be at least 1".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for dealer order");
            ServiceError::DatabaseError(e)
        })?;

        let dealer = DealerEntity::find_by_id(request.dealer_id)
            .filter(dealer::Column::Active.eq(true))
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if dealer.is_none() {
            return Err(ServiceError::NotFound("Dealer not found".to_string()));
        }

        let order_id = Uuid::new_v4();
        let order = DealerOrderActiveModel {
            id: Set(order_id),
            dealer_id: Set(request.dealer_id),
            status: Set(status::DRAFT.to_string()),
            order_date: Set(now),
            notes: Set(request.notes.clone()),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let order_model = order
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut item_models = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let variant = VariantEntity::find_by_id(item.variant_id)
                .filter(vehicle_variant::Column::Active.eq(true))
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "Vehicle variant {} not found",
                        item.variant_id
                    ))
                })?;

            let row = ItemActiveModel {
                id: Set(Uuid::new_v4()),
                dealer_order_id: Set(order_id),
                variant_id: Set(item.variant_id),
                quantity: Set(item.quantity),
                unit_price: Set(variant.price),
                created_at: Set(now),
            };
            item_models.push(row.insert(&txn).await.map_err(ServiceError::DatabaseError)?);
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, dealer_order_id = %order_id, "Failed to commit dealer order");
            ServiceError::DatabaseError(e)
        })?;

        info!(dealer_order_id = %order_id, dealer_id = %request.dealer_id, items = item_models.len(), "Dealer order created");
        self.emit(Event::DealerOrderCreated(order_id)).await;

        Ok(to_response(order_model, item_models))
    }

    #[instrument(skip(self), fields(dealer_order_id = %dealer_order_id))]
    pub async fn get_dealer_order(
        &self,
        dealer_order_id: Uuid,
    ) -> Result<Option<DealerOrderResponse>, ServiceError> {
        let db = &*self.db_pool;
        let order = DealerOrderEntity::find_by_id(dealer_order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        match order {
            Some(order_model) => {
                let items = ItemEntity::find()
                    .filter(dealer_order_item::Column::DealerOrderId.eq(dealer_order_id))
                    .all(db)
                    .await
                    .map_err(ServiceError::DatabaseError)?;
                Ok(Some(to_response(order_model, items)))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_dealer_orders(
        &self,
        dealer_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<DealerOrderListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = DealerOrderEntity::find();
        if let Some(dealer_id) = dealer_id {
            query = query.filter(dealer_order::Column::DealerId.eq(dealer_id));
        }

        let paginator = query
            .order_by_desc(dealer_order::Column::CreatedAt)
            .paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let orders = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut responses = Vec::with_capacity(orders.len());
        for order_model in orders {
            let items = ItemEntity::find()
                .filter(dealer_order_item::Column::DealerOrderId.eq(order_model.id))
                .all(db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            responses.push(to_response(order_model, items));
        }

        Ok(DealerOrderListResponse {
            dealer_orders: responses,
            total,
            page,
            per_page,
        })
    }

    /// Moves a dealer order along `draft -> submitted -> quoted ->
    /// confirmed -> fulfilled`, or to `cancelled` from any non-terminal
    /// state. Conditional flip; stale transitions surface as conflicts.
    #[instrument(skip(self), fields(dealer_order_id = %dealer_order_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        dealer_order_id: Uuid,
        new_status: &str,
    ) -> Result<DealerOrderResponse, ServiceError> {
        let allowed_from = allowed_sources(new_status).ok_or_else(|| {
            ServiceError::InvalidStatus(format!(
                "Unknown dealer order status '{}'",
                new_status
            ))
        })?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let current = DealerOrderEntity::find_by_id(dealer_order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Dealer order not found".to_string()))?;
        let old_status = current.status.clone();

        let result = DealerOrderEntity::update_many()
            .col_expr(dealer_order::Column::Status, Expr::value(new_status))
            .col_expr(dealer_order::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(dealer_order::Column::Id.eq(dealer_order_id))
            .filter(dealer_order::Column::Status.is_in(allowed_from.iter().copied()))
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            warn!(dealer_order_id = %dealer_order_id, status = %old_status, "Dealer order transition rejected");
            return Err(ServiceError::Conflict(format!(
                "Dealer order is '{}' and cannot become '{}'",
                old_status, new_status
            )));
        }

        info!(dealer_order_id = %dealer_order_id, old_status = %old_status, new_status = %new_status, "Dealer order status updated");
        self.emit(Event::DealerOrderStatusChanged {
            dealer_order_id,
            old_status,
            new_status: new_status.to_string(),
        })
        .await;

        self.get_dealer_order(dealer_order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Dealer order not found".to_string()))
    }

    /// Generates a dealer-scoped quotation from a submitted dealer order.
    /// The quotation totals the order's line items, applies the percentage
    /// discount, and the dealer order flips `submitted -> quoted` in the
    /// same transaction.
    #[instrument(skip(self), fields(dealer_order_id = %dealer_order_id))]
    pub async fn generate_quotation(
        &self,
        dealer_order_id: Uuid,
        discount_percent: Option<Decimal>,
        notes: Option<String>,
        created_by: Option<Uuid>,
    ) -> Result<QuotationResponse, ServiceError> {
        let pct = discount_percent.unwrap_or(Decimal::ZERO);
        if pct < Decimal::ZERO || pct > Decimal::from(100) {
            return Err(ServiceError::ValidationError(
                "Discount percent must be between 0 and 100".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        // submitted -> quoted flip doubles as the concurrency guard: two
        // staff generating at once cannot both pass.
        let result = DealerOrderEntity::update_many()
            .col_expr(dealer_order::Column::Status, Expr::value(status::QUOTED))
            .col_expr(dealer_order::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(dealer_order::Column::Id.eq(dealer_order_id))
            .filter(dealer_order::Column::Status.eq(status::SUBMITTED))
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            txn.rollback().await.ok();
            let found = DealerOrderEntity::find_by_id(dealer_order_id)
                .one(&*self.db_pool)
                .await
                .map_err(ServiceError::DatabaseError)?;
            return Err(match found {
                Some(order) => ServiceError::InvalidStatus(format!(
                    "Quotations require a submitted dealer order, status is '{}'",
                    order.status
                )),
                None => ServiceError::NotFound("Dealer order not found".to_string()),
            });
        }

        let order = DealerOrderEntity::find_by_id(dealer_order_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Dealer order not found".to_string()))?;

        let items = ItemEntity::find()
            .filter(dealer_order_item::Column::DealerOrderId.eq(dealer_order_id))
            .all(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if items.is_empty() {
            txn.rollback().await.ok();
            return Err(ServiceError::InvalidOperation(
                "Dealer order has no items".to_string(),
            ));
        }

        let total_price: Decimal = items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum();
        let discount = (total_price * pct / Decimal::from(100)).round_dp(2);

        // Dealer on record instead of an end customer
        let representative_variant = items[0].variant_id;
        let quotation_id = Uuid::new_v4();
        let model = QuotationActiveModel {
            id: Set(quotation_id),
            customer_id: Set(order.dealer_id),
            variant_id: Set(representative_variant),
            dealer_id: Set(Some(order.dealer_id)),
            dealer_order_id: Set(Some(dealer_order_id)),
            total_price: Set(total_price),
            discount_amount: Set(discount),
            final_price: Set(total_price - discount),
            status: Set(quotations::status::PENDING.to_string()),
            quotation_date: Set(now),
            expiry_date: Set(Some(now + Duration::days(self.quotation_validity_days))),
            rejection_reason: Set(None),
            rejected_at: Set(None),
            notes: Set(notes),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let created = model
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, dealer_order_id = %dealer_order_id, "Failed to commit dealer quotation");
            ServiceError::DatabaseError(e)
        })?;

        info!(quotation_id = %quotation_id, dealer_order_id = %dealer_order_id, "Dealer quotation generated");
        self.emit(Event::QuotationCreated(quotation_id)).await;
        self.emit(Event::DealerOrderStatusChanged {
            dealer_order_id,
            old_status: status::SUBMITTED.to_string(),
            new_status: status::QUOTED.to_string(),
        })
        .await;

        Ok(quotations::model_to_response(created))
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send dealer order event");
            }
        }
    }
}

fn to_response(order: DealerOrderModel, items: Vec<ItemModel>) -> DealerOrderResponse {
    let item_responses: Vec<DealerOrderItemResponse> = items
        .into_iter()
        .map(|item| DealerOrderItemResponse {
            id: item.id,
            variant_id: item.variant_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.unit_price * Decimal::from(item.quantity),
        })
        .collect();
    let total_amount = item_responses.iter().map(|i| i.line_total).sum();

    DealerOrderResponse {
        id: order.id,
        dealer_id: order.dealer_id,
        status: order.status,
        order_date: order.order_date,
        items: item_responses,
        total_amount,
        notes: order.notes,
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: i32, unit_price: Decimal) -> ItemModel {
        ItemModel {
            id: Uuid::new_v4(),
            dealer_order_id: Uuid::new_v4(),
            variant_id: Uuid::new_v4(),
            quantity,
            unit_price,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn response_totals_line_items() {
        let now = Utc::now();
        let order = DealerOrderModel {
            id: Uuid::new_v4(),
            dealer_id: Uuid::new_v4(),
            status: status::DRAFT.to_string(),
            order_date: now,
            notes: Some("urgent restock".to_string()),
            created_at: now,
            updated_at: None,
        };
        let items = vec![item(3, dec!(30000.00)), item(2, dec!(45000.50))];

        let response = to_response(order, items);
        assert_eq!(response.items[0].line_total, dec!(90000.00));
        assert_eq!(response.items[1].line_total, dec!(91001.00));
        assert_eq!(response.total_amount, dec!(181001.00));
        assert_eq!(response.notes.as_deref(), Some("urgent restock"));
    }

    #[test]
    fn create_request_rejects_empty_items() {
        let request = CreateDealerOrderRequest {
            dealer_id: Uuid::new_v4(),
            items: vec![],
            notes: None,
        };
        assert!(request.validate().is_err());
    }

}
