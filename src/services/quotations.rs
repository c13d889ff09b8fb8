use crate::{
    db::DbPool,
    entities::order::ActiveModel as OrderActiveModel,
    entities::quotation::{
        self, ActiveModel as QuotationActiveModel, Entity as QuotationEntity,
        Model as QuotationModel,
    },
    entities::vehicle_variant::{self, Entity as VariantEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub mod status {
    pub const PENDING: &str = "pending";
    pub const SENT: &str = "sent";
    pub const ACCEPTED: &str = "accepted";
    pub const REJECTED: &str = "rejected";
    /// Derived only, never persisted.
    pub const EXPIRED: &str = "expired";
}

/// Read-path view of a quotation status. `expired` is computed from
/// `expiry_date` instead of being written back, so a clock tick can never
/// race a concurrent accept.
pub fn effective_status(
    stored_status: &str,
    expiry_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    if stored_status == status::PENDING || stored_status == status::SENT {
        if let Some(expiry) = expiry_date {
            if expiry < now {
                return status::EXPIRED.to_string();
            }
        }
    }
    stored_status.to_string()
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuotationRequest {
    pub customer_id: Uuid,
    pub variant_id: Uuid,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateQuotationRequest {
    pub discount_amount: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RejectQuotationRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuotationResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub variant_id: Uuid,
    pub dealer_id: Option<Uuid>,
    pub dealer_order_id: Option<Uuid>,
    pub total_price: Decimal,
    pub discount_amount: Decimal,
    pub final_price: Decimal,
    /// Stored status with the expiry rule applied
    pub status: String,
    pub quotation_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AcceptQuotationResponse {
    pub quotation: QuotationResponse,
    pub order_id: Uuid,
    pub order_number: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuotationListResponse {
    pub quotations: Vec<QuotationResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Default)]
pub struct QuotationFilter {
    pub customer_id: Option<Uuid>,
    pub dealer_id: Option<Uuid>,
    pub status: Option<String>,
}

/// Service managing the retail quotation lifecycle:
/// pending -> sent -> accepted | rejected, with accept creating the order
/// and expiry derived on read.
#[derive(Clone)]
pub struct QuotationService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    validity_days: i64,
}

impl QuotationService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        validity_days: i64,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            validity_days,
        }
    }

    /// Creates a quotation in `pending`, pricing it from the variant's
    /// current list price.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, variant_id = %request.variant_id))]
    pub async fn create_quotation(
        &self,
        request: CreateQuotationRequest,
        created_by: Option<Uuid>,
    ) -> Result<QuotationResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let variant = VariantEntity::find_by_id(request.variant_id)
            .filter(vehicle_variant::Column::Active.eq(true))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Vehicle variant not found".to_string()))?;

        let total_price = variant.price;
        let discount = request.discount_amount.unwrap_or(Decimal::ZERO);
        if discount < Decimal::ZERO || discount > total_price {
            return Err(ServiceError::ValidationError(
                "Discount must be between zero and the total price".to_string(),
            ));
        }
        let final_price = total_price - discount;

        let now = Utc::now();
        let quotation_id = Uuid::new_v4();

        let model = QuotationActiveModel {
            id: Set(quotation_id),
            customer_id: Set(request.customer_id),
            variant_id: Set(request.variant_id),
            dealer_id: Set(None),
            dealer_order_id: Set(None),
            total_price: Set(total_price),
            discount_amount: Set(discount),
            final_price: Set(final_price),
            status: Set(status::PENDING.to_string()),
            quotation_date: Set(now),
            expiry_date: Set(None),
            rejection_reason: Set(None),
            rejected_at: Set(None),
            notes: Set(request.notes),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let created = model.insert(db).await.map_err(|e| {
            error!(error = %e, quotation_id = %quotation_id, "Failed to create quotation");
            ServiceError::DatabaseError(e)
        })?;

        info!(quotation_id = %quotation_id, "Quotation created");
        self.emit(Event::QuotationCreated(quotation_id)).await;

        Ok(model_to_response(created))
    }

    #[instrument(skip(self), fields(quotation_id = %quotation_id))]
    pub async fn get_quotation(
        &self,
        quotation_id: Uuid,
    ) -> Result<Option<QuotationResponse>, ServiceError> {
        let quotation = QuotationEntity::find_by_id(quotation_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(quotation.map(model_to_response))
    }

    #[instrument(skip(self, filter))]
    pub async fn list_quotations(
        &self,
        filter: QuotationFilter,
        page: u64,
        per_page: u64,
    ) -> Result<QuotationListResponse, ServiceError> {
        let mut query = QuotationEntity::find();
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(quotation::Column::CustomerId.eq(customer_id));
        }
        if let Some(dealer_id) = filter.dealer_id {
            query = query.filter(quotation::Column::DealerId.eq(dealer_id));
        }
        if let Some(status) = &filter.status {
            query = query.filter(quotation::Column::Status.eq(status.clone()));
        }

        let paginator = query
            .order_by_desc(quotation::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let quotations = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(QuotationListResponse {
            quotations: quotations.into_iter().map(model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Updates pricing fields of a quotation still in `pending`.
    #[instrument(skip(self, request), fields(quotation_id = %quotation_id))]
    pub async fn update_quotation(
        &self,
        quotation_id: Uuid,
        request: UpdateQuotationRequest,
    ) -> Result<QuotationResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let quotation = QuotationEntity::find_by_id(quotation_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Quotation not found".to_string()))?;

        if quotation.status != status::PENDING {
            return Err(ServiceError::InvalidStatus(format!(
                "Only pending quotations can be edited, current status is '{}'",
                quotation.status
            )));
        }

        let total_price = quotation.total_price;
        let discount = request.discount_amount.unwrap_or(quotation.discount_amount);
        if discount < Decimal::ZERO || discount > total_price {
            return Err(ServiceError::ValidationError(
                "Discount must be between zero and the total price".to_string(),
            ));
        }

        let mut active: QuotationActiveModel = quotation.into();
        active.discount_amount = Set(discount);
        active.final_price = Set(total_price - discount);
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;
        Ok(model_to_response(updated))
    }

    /// Sends a quotation: conditional `pending -> sent` flip that also stamps
    /// the expiry date. Concurrent sends lose on `rows_affected == 0`.
    #[instrument(skip(self), fields(quotation_id = %quotation_id))]
    pub async fn send_quotation(
        &self,
        quotation_id: Uuid,
    ) -> Result<QuotationResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();
        let expiry = now + Duration::days(self.validity_days);

        let result = QuotationEntity::update_many()
            .col_expr(quotation::Column::Status, Expr::value(status::SENT))
            .col_expr(quotation::Column::ExpiryDate, Expr::value(Some(expiry)))
            .col_expr(quotation::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(quotation::Column::Id.eq(quotation_id))
            .filter(quotation::Column::Status.eq(status::PENDING))
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            return Err(self.transition_conflict(quotation_id, status::PENDING).await);
        }

        info!(quotation_id = %quotation_id, expiry = %expiry, "Quotation sent");
        self.emit(Event::QuotationSent(quotation_id)).await;
        self.require_response(quotation_id).await
    }

    /// Accepts a quotation and creates the retail order in the same
    /// transaction. The flip is conditional on `sent` and an unexpired
    /// `expiry_date`; the unique index on `orders.quotation_id` backs up
    /// the one-order-per-quotation guarantee.
    #[instrument(skip(self), fields(quotation_id = %quotation_id))]
    pub async fn accept_quotation(
        &self,
        quotation_id: Uuid,
    ) -> Result<AcceptQuotationResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for quotation accept");
            ServiceError::DatabaseError(e)
        })?;

        let result = QuotationEntity::update_many()
            .col_expr(quotation::Column::Status, Expr::value(status::ACCEPTED))
            .col_expr(quotation::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(quotation::Column::Id.eq(quotation_id))
            .filter(quotation::Column::Status.is_in([status::SENT, status::PENDING]))
            // Dealer quotations settle into invoices, not retail orders
            .filter(quotation::Column::DealerId.is_null())
            .filter(
                Condition::any()
                    .add(quotation::Column::ExpiryDate.is_null())
                    .add(quotation::Column::ExpiryDate.gte(now)),
            )
            .exec(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            txn.rollback().await.ok();
            return Err(self.accept_conflict(quotation_id, now).await);
        }

        let quotation = QuotationEntity::find_by_id(quotation_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Quotation not found".to_string()))?;

        let order_id = Uuid::new_v4();
        let order_number = generate_order_number(now, order_id);
        let order_model = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(order_number.clone()),
            customer_id: Set(quotation.customer_id),
            variant_id: Set(quotation.variant_id),
            quotation_id: Set(Some(quotation_id)),
            status: Set("pending".to_string()),
            total_amount: Set(quotation.final_price),
            order_date: Set(now),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        order_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, quotation_id = %quotation_id, "Failed to create order from quotation");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, quotation_id = %quotation_id, "Failed to commit quotation accept");
            ServiceError::DatabaseError(e)
        })?;

        info!(quotation_id = %quotation_id, order_id = %order_id, "Quotation accepted, order created");
        self.emit(Event::QuotationAccepted {
            quotation_id,
            order_id: Some(order_id),
            invoice_id: None,
        })
        .await;
        self.emit(Event::OrderCreated(order_id)).await;

        Ok(AcceptQuotationResponse {
            quotation: model_to_response(quotation),
            order_id,
            order_number,
        })
    }

    /// Rejects a quotation: conditional flip to `rejected` with an optional
    /// reason. Expired quotations can still be rejected for bookkeeping.
    #[instrument(skip(self, request), fields(quotation_id = %quotation_id))]
    pub async fn reject_quotation(
        &self,
        quotation_id: Uuid,
        request: RejectQuotationRequest,
    ) -> Result<QuotationResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let result = QuotationEntity::update_many()
            .col_expr(quotation::Column::Status, Expr::value(status::REJECTED))
            .col_expr(
                quotation::Column::RejectionReason,
                Expr::value(request.reason.clone()),
            )
            .col_expr(quotation::Column::RejectedAt, Expr::value(Some(now)))
            .col_expr(quotation::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(quotation::Column::Id.eq(quotation_id))
            .filter(quotation::Column::Status.is_in([status::SENT, status::PENDING]))
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            return Err(self.transition_conflict(quotation_id, status::SENT).await);
        }

        info!(quotation_id = %quotation_id, "Quotation rejected");
        self.emit(Event::QuotationRejected {
            quotation_id,
            reason: request.reason,
        })
        .await;
        self.require_response(quotation_id).await
    }

    /// Deletes a quotation. Only pending ones can be deleted; anything sent is
    /// part of the audit trail.
    #[instrument(skip(self), fields(quotation_id = %quotation_id))]
    pub async fn delete_quotation(&self, quotation_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let result = QuotationEntity::delete_many()
            .filter(quotation::Column::Id.eq(quotation_id))
            .filter(quotation::Column::Status.eq(status::PENDING))
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            return Err(self.transition_conflict(quotation_id, status::PENDING).await);
        }

        info!(quotation_id = %quotation_id, "Quotation deleted");
        self.emit(Event::QuotationDeleted(quotation_id)).await;
        Ok(())
    }

    /// Maps a failed conditional flip to NotFound or Conflict by looking at
    /// what is actually stored.
    async fn transition_conflict(&self, quotation_id: Uuid, expected: &str) -> ServiceError {
        match QuotationEntity::find_by_id(quotation_id)
            .one(&*self.db_pool)
            .await
        {
            Ok(Some(found)) => {
                warn!(
                    quotation_id = %quotation_id,
                    status = %found.status,
                    expected = %expected,
                    "Quotation transition rejected"
                );
                ServiceError::Conflict(format!(
                    "Quotation is '{}', expected '{}'",
                    effective_status(&found.status, found.expiry_date, Utc::now()),
                    expected
                ))
            }
            Ok(None) => ServiceError::NotFound("Quotation not found".to_string()),
            Err(e) => ServiceError::DatabaseError(e),
        }
    }

    async fn accept_conflict(&self, quotation_id: Uuid, now: DateTime<Utc>) -> ServiceError {
        match QuotationEntity::find_by_id(quotation_id)
            .one(&*self.db_pool)
            .await
        {
            Ok(Some(found)) => {
                if found.dealer_id.is_some() {
                    return ServiceError::InvalidOperation(
                        "Dealer quotations are accepted through the invoicing flow".to_string(),
                    );
                }
                let shown = effective_status(&found.status, found.expiry_date, now);
                if shown == status::EXPIRED {
                    ServiceError::Conflict("Quotation has expired".to_string())
                } else {
                    ServiceError::Conflict(format!(
                        "Quotation is '{}' and cannot be accepted",
                        shown
                    ))
                }
            }
            Ok(None) => ServiceError::NotFound("Quotation not found".to_string()),
            Err(e) => ServiceError::DatabaseError(e),
        }
    }

    async fn require_response(
        &self,
        quotation_id: Uuid,
    ) -> Result<QuotationResponse, ServiceError> {
        self.get_quotation(quotation_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Quotation not found".to_string()))
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send quotation event");
            }
        }
    }
}

pub(crate) fn generate_order_number(now: DateTime<Utc>, order_id: Uuid) -> String {
    // Date prefix for operators, uuid suffix for uniqueness
    format!(
        "ORD-{}-{}",
        now.format("%Y%m%d"),
        &order_id.simple().to_string()[..8].to_uppercase()
    )
}

pub(crate) fn model_to_response(model: QuotationModel) -> QuotationResponse {
    let shown_status = effective_status(&model.status, model.expiry_date, Utc::now());
    QuotationResponse {
        id: model.id,
        customer_id: model.customer_id,
        variant_id: model.variant_id,
        dealer_id: model.dealer_id,
        dealer_order_id: model.dealer_order_id,
        total_price: model.total_price,
        discount_amount: model.discount_amount,
        final_price: model.final_price,
        status: shown_status,
        quotation_date: model.quotation_date,
        expiry_date: model.expiry_date,
        rejection_reason: model.rejection_reason,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_status_derives_expired_for_sent_past_expiry() {
        let now = Utc::now();
        let past = now - Duration::hours(1);
        assert_eq!(effective_status(status::SENT, Some(past), now), "expired");
    }

    #[test]
    fn effective_status_keeps_sent_before_expiry() {
        let now = Utc::now();
        let future = now + Duration::days(7);
        assert_eq!(effective_status(status::SENT, Some(future), now), "sent");
    }

    #[test]
    fn effective_status_ignores_expiry_for_terminal_states() {
        let now = Utc::now();
        let past = now - Duration::days(30);
        assert_eq!(
            effective_status(status::ACCEPTED, Some(past), now),
            "accepted"
        );
        assert_eq!(
            effective_status(status::REJECTED, Some(past), now),
            "rejected"
        );
        assert_eq!(effective_status(status::PENDING, None, now), "pending");
    }

    #[test]
    fn effective_status_boundary_is_still_valid() {
        // Expiry is inclusive: a quotation expiring exactly now can still
        // be accepted.
        let now = Utc::now();
        assert_eq!(effective_status(status::SENT, Some(now), now), "sent");
        assert_eq!(
            effective_status(status::SENT, Some(now - Duration::seconds(1)), now),
            "expired"
        );
    }

    #[test]
    fn pending_quotation_can_expire_too() {
        let now = Utc::now();
        assert_eq!(
            effective_status(status::PENDING, Some(now - Duration::days(1)), now),
            "expired"
        );
    }

    #[test]
    fn order_number_carries_date_prefix() {
        let now = Utc::now();
        let number = generate_order_number(now, Uuid::new_v4());
        assert!(number.starts_with(&format!("ORD-{}-", now.format("%Y%m%d"))));
        assert_eq!(number.len(), "ORD-YYYYMMDD-".len() + 8);
    }

    #[test]
    fn quotation_response_shows_derived_status() {
        let now = Utc::now();
        let model = QuotationModel {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            variant_id: Uuid::new_v4(),
            dealer_id: None,
            dealer_order_id: None,
            total_price: Decimal::new(4500000, 2),
            discount_amount: Decimal::new(50000, 2),
            final_price: Decimal::new(4450000, 2),
            status: status::SENT.to_string(),
            quotation_date: now - Duration::days(30),
            expiry_date: Some(now - Duration::days(16)),
            rejection_reason: None,
            rejected_at: None,
            notes: None,
            created_by: None,
            created_at: now - Duration::days(30),
            updated_at: None,
        };
        let response = model_to_response(model);
        assert_eq!(response.status, "expired");
        assert_eq!(response.final_price, Decimal::new(4450000, 2));
    }
}
