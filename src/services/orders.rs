use crate::{
    db::DbPool,
    entities::order::{self, Entity as OrderEntity, Model as OrderModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

pub mod status {
    pub const PENDING: &str = "pending";
    pub const CONFIRMED: &str = "confirmed";
    pub const IN_PROGRESS: &str = "in_progress";
    pub const DELIVERED: &str = "delivered";
    pub const CANCELLED: &str = "cancelled";
}

/// States an order may move to `new_status` from.
fn allowed_sources(new_status: &str) -> Option<&'static [&'static str]> {
    match new_status {
        status::CONFIRMED => Some(&[status::PENDING]),
        status::IN_PROGRESS => Some(&[status::CONFIRMED]),
        status::DELIVERED => Some(&[status::CONFIRMED, status::IN_PROGRESS]),
        status::CANCELLED => Some(&[
            status::PENDING,
            status::CONFIRMED,
            status::IN_PROGRESS,
        ]),
        _ => None,
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub variant_id: Uuid,
    pub quotation_id: Option<Uuid>,
    pub status: String,
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Default)]
pub struct OrderFilter {
    pub customer_id: Option<Uuid>,
    pub status: Option<String>,
}

/// Service for retail orders. Orders are born from accepted quotations
/// (see the quotation service); this service covers reads and the
/// delivery lifecycle.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<OrderResponse>, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(order.map(model_to_response))
    }

    #[instrument(skip(self, filter))]
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let mut query = OrderEntity::find();
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(order::Column::CustomerId.eq(customer_id));
        }
        if let Some(status) = &filter.status {
            query = query.filter(order::Column::Status.eq(status.clone()));
        }

        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let orders = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(OrderListResponse {
            orders: orders.into_iter().map(model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Moves an order along `pending -> confirmed -> in_progress ->
    /// delivered`, or to `cancelled` before delivery. Conditional flip; a
    /// stale transition comes back as a conflict.
    #[instrument(skip(self, request), fields(order_id = %order_id, new_status = %request.status))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let allowed_from = allowed_sources(&request.status).ok_or_else(|| {
            ServiceError::InvalidStatus(format!("Unknown order status '{}'", request.status))
        })?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let current = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
        let old_status = current.status.clone();

        let mut update = OrderEntity::update_many()
            .col_expr(order::Column::Status, Expr::value(request.status.clone()))
            .col_expr(order::Column::UpdatedAt, Expr::value(Some(now)));
        if let Some(notes) = &request.notes {
            update = update.col_expr(order::Column::Notes, Expr::value(Some(notes.clone())));
        }
        let result = update
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::Status.is_in(allowed_from.iter().copied()))
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            warn!(order_id = %order_id, status = %old_status, "Order transition rejected");
            return Err(ServiceError::Conflict(format!(
                "Order is '{}' and cannot become '{}'",
                old_status, request.status
            )));
        }

        info!(order_id = %order_id, old_status = %old_status, new_status = %request.status, "Order status updated");
        self.emit(Event::OrderStatusChanged {
            order_id,
            old_status,
            new_status: request.status.clone(),
        })
        .await;
        if request.status == status::CANCELLED {
            self.emit(Event::OrderCancelled(order_id)).await;
        }

        self.get_order(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))
    }

    /// Cancels an order with an optional reason recorded in the notes.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel_order(
        &self,
        order_id: Uuid,
        reason: Option<String>,
    ) -> Result<OrderResponse, ServiceError> {
        self.update_order_status(
            order_id,
            UpdateOrderStatusRequest {
                status: status::CANCELLED.to_string(),
                notes: reason,
            },
        )
        .await
    }

    /// Deletes an order. Delivered and cancelled orders are part of the
    /// audit trail and stay.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let result = OrderEntity::delete_many()
            .filter(order::Column::Id.eq(order_id))
            .filter(
                order::Column::Status
                    .is_not_in([status::DELIVERED, status::CANCELLED]),
            )
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            let existing = OrderEntity::find_by_id(order_id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            return Err(match existing {
                Some(order) => ServiceError::Conflict(format!(
                    "Order is '{}' and cannot be deleted",
                    order.status
                )),
                None => ServiceError::NotFound("Order not found".to_string()),
            });
        }

        info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send order event");
            }
        }
    }
}

pub(crate) fn model_to_response(model: OrderModel) -> OrderResponse {
    OrderResponse {
        id: model.id,
        order_number: model.order_number,
        customer_id: model.customer_id,
        variant_id: model.variant_id,
        quotation_id: model.quotation_id,
        status: model.status,
        total_amount: model.total_amount,
        order_date: model.order_date,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn model_to_response_conversion() {
        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let quotation_id = Uuid::new_v4();
        let model = OrderModel {
            id: order_id,
            order_number: "ORD-20260829-AB12CD34".to_string(),
            customer_id: Uuid::new_v4(),
            variant_id: Uuid::new_v4(),
            quotation_id: Some(quotation_id),
            status: status::PENDING.to_string(),
            total_amount: dec!(38990.00),
            order_date: now,
            notes: None,
            created_at: now,
            updated_at: Some(now),
        };

        let response = model_to_response(model);
        assert_eq!(response.id, order_id);
        assert_eq!(response.quotation_id, Some(quotation_id));
        assert_eq!(response.status, "pending");
        assert_eq!(response.total_amount, dec!(38990.00));
    }

    #[test]
    fn delivery_requires_confirmation_first() {
        let sources = allowed_sources(status::DELIVERED).unwrap();
        assert!(sources.contains(&status::CONFIRMED));
        assert!(sources.contains(&status::IN_PROGRESS));
        assert!(!sources.contains(&status::PENDING));
    }

    #[test]
    fn cancel_blocked_after_delivery() {
        let sources = allowed_sources(status::CANCELLED).unwrap();
        assert!(sources.contains(&status::PENDING));
        assert!(sources.contains(&status::IN_PROGRESS));
        assert!(!sources.contains(&status::DELIVERED));
    }

    #[test]
    fn unknown_status_rejected() {
        assert!(allowed_sources("teleported").is_none());
    }
}
