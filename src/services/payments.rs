use crate::{
    db::DbPool,
    entities::invoice::{self, Entity as InvoiceEntity},
    entities::order::Entity as OrderEntity,
    entities::payment::{
        self, ActiveModel as PaymentActiveModel, Entity as PaymentEntity, Model as PaymentModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::invoicing;

pub mod status {
    pub const PENDING: &str = "pending";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
    pub const REFUNDED: &str = "refunded";
}

fn allowed_sources(new_status: &str) -> Option<&'static [&'static str]> {
    match new_status {
        status::COMPLETED => Some(&[status::PENDING]),
        status::FAILED => Some(&[status::PENDING]),
        status::REFUNDED => Some(&[status::COMPLETED]),
        _ => None,
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordPaymentRequest {
    pub invoice_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub amount: Decimal,
    pub method: String,
    pub reference: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub invoice_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub amount: Decimal,
    pub method: String,
    pub status: String,
    pub reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentListResponse {
    pub payments: Vec<PaymentResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service recording payments against invoices or retail orders. Payments
/// are recorded, never charged; there is no gateway behind this.
#[derive(Clone)]
pub struct PaymentService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PaymentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Records a pending payment against exactly one of invoice or order.
    #[instrument(skip(self, request))]
    pub async fn record_payment(
        &self,
        request: RecordPaymentRequest,
    ) -> Result<PaymentResponse, ServiceError> {
        if request.invoice_id.is_some() == request.order_id.is_some() {
            return Err(ServiceError::ValidationError(
                "Payment must reference exactly one of invoice or order".to_string(),
            ));
        }
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Payment amount must be positive".to_string(),
            ));
        }
        if request.method.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Payment method is required".to_string(),
            ));
        }

        let db = &*self.db_pool;
        if let Some(invoice_id) = request.invoice_id {
            InvoiceEntity::find_by_id(invoice_id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| ServiceError::NotFound("Invoice not found".to_string()))?;
        }
        if let Some(order_id) = request.order_id {
            OrderEntity::find_by_id(order_id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
        }

        let now = Utc::now();
        let payment_id = Uuid::new_v4();
        let model = PaymentActiveModel {
            id: Set(payment_id),
            invoice_id: Set(request.invoice_id),
            order_id: Set(request.order_id),
            amount: Set(request.amount.round_dp(2)),
            method: Set(request.method),
            status: Set(status::PENDING.to_string()),
            reference: Set(request.reference),
            paid_at: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let created = model.insert(db).await.map_err(ServiceError::DatabaseError)?;

        info!(payment_id = %payment_id, "Payment recorded");
        self.emit(Event::PaymentRecorded(payment_id)).await;

        Ok(model_to_response(created))
    }

    #[instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn get_payment(
        &self,
        payment_id: Uuid,
    ) -> Result<Option<PaymentResponse>, ServiceError> {
        let found = PaymentEntity::find_by_id(payment_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(found.map(model_to_response))
    }

    #[instrument(skip(self))]
    pub async fn list_payments(
        &self,
        invoice_id: Option<Uuid>,
        order_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<PaymentListResponse, ServiceError> {
        let mut query = PaymentEntity::find();
        if let Some(invoice_id) = invoice_id {
            query = query.filter(payment::Column::InvoiceId.eq(invoice_id));
        }
        if let Some(order_id) = order_id {
            query = query.filter(payment::Column::OrderId.eq(order_id));
        }

        let paginator = query
            .order_by_desc(payment::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let payments = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(PaymentListResponse {
            payments: payments.into_iter().map(model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Settles a payment: `pending -> completed | failed`, and
    /// `completed -> refunded`. When completed payments for an invoice
    /// cover its total, the invoice flips to `paid` (conditional, so a
    /// racing cancel wins cleanly).
    #[instrument(skip(self), fields(payment_id = %payment_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        payment_id: Uuid,
        new_status: &str,
    ) -> Result<PaymentResponse, ServiceError> {
        let allowed_from = allowed_sources(new_status).ok_or_else(|| {
            ServiceError::InvalidStatus(format!("Unknown payment status '{}'", new_status))
        })?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let mut update = PaymentEntity::update_many()
            .col_expr(payment::Column::Status, Expr::value(new_status))
            .col_expr(payment::Column::UpdatedAt, Expr::value(Some(now)));
        if new_status == status::COMPLETED {
            update = update.col_expr(payment::Column::PaidAt, Expr::value(Some(now)));
        }
        let result = update
            .filter(payment::Column::Id.eq(payment_id))
            .filter(payment::Column::Status.is_in(allowed_from.iter().copied()))
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            let found = PaymentEntity::find_by_id(payment_id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            return Err(match found {
                Some(p) => ServiceError::Conflict(format!(
                    "Payment is '{}' and cannot become '{}'",
                    p.status, new_status
                )),
                None => ServiceError::NotFound("Payment not found".to_string()),
            });
        }

        let updated = PaymentEntity::find_by_id(payment_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Payment not found".to_string()))?;

        info!(payment_id = %payment_id, new_status = %new_status, "Payment status updated");
        match new_status {
            status::COMPLETED => {
                self.emit(Event::PaymentRecorded(payment_id)).await;
                if let Some(invoice_id) = updated.invoice_id {
                    self.settle_invoice_if_covered(invoice_id, now).await?;
                }
            }
            status::FAILED => self.emit(Event::PaymentFailed(payment_id)).await,
            _ => {}
        }

        Ok(model_to_response(updated))
    }

    /// Flips the invoice to `paid` once completed payments cover its
    /// total. Conditional on `pending`; losing the race is not an error.
    async fn settle_invoice_if_covered(
        &self,
        invoice_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let invoice = match InvoiceEntity::find_by_id(invoice_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
        {
            Some(invoice) => invoice,
            None => return Ok(()),
        };

        let completed = PaymentEntity::find()
            .filter(payment::Column::InvoiceId.eq(invoice_id))
            .filter(payment::Column::Status.eq(status::COMPLETED))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let covered: Decimal = completed.iter().map(|p| p.amount).sum();

        if covered >= invoice.total_amount {
            let result = InvoiceEntity::update_many()
                .col_expr(
                    invoice::Column::Status,
                    Expr::value(invoicing::status::PAID),
                )
                .col_expr(invoice::Column::UpdatedAt, Expr::value(Some(now)))
                .filter(invoice::Column::Id.eq(invoice_id))
                .filter(invoice::Column::Status.eq(invoicing::status::PENDING))
                .exec(db)
                .await
                .map_err(ServiceError::DatabaseError)?;

            if result.rows_affected > 0 {
                info!(invoice_id = %invoice_id, "Invoice fully covered by payments");
                self.emit(Event::InvoiceStatusChanged {
                    invoice_id,
                    old_status: invoicing::status::PENDING.to_string(),
                    new_status: invoicing::status::PAID.to_string(),
                })
                .await;
            }
        }

        Ok(())
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send payment event");
            }
        }
    }
}

fn model_to_response(model: PaymentModel) -> PaymentResponse {
    PaymentResponse {
        id: model.id,
        invoice_id: model.invoice_id,
        order_id: model.order_id,
        amount: model.amount,
        method: model.method,
        status: model.status,
        reference: model.reference,
        paid_at: model.paid_at,
        created_at: model.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refund_only_from_completed() {
        assert_eq!(
            allowed_sources(status::REFUNDED).unwrap(),
            &[status::COMPLETED]
        );
        assert!(allowed_sources("charged_back").is_none());
    }

    #[test]
    fn completion_and_failure_both_require_pending() {
        assert_eq!(
            allowed_sources(status::COMPLETED).unwrap(),
            &[status::PENDING]
        );
        assert_eq!(allowed_sources(status::FAILED).unwrap(), &[status::PENDING]);
    }
}
