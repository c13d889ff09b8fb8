use crate::{
    db::DbPool,
    entities::invoice::{
        self, ActiveModel as InvoiceActiveModel, Entity as InvoiceEntity, Model as InvoiceModel,
    },
    entities::quotation::{self, Entity as QuotationEntity},
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

use super::quotations;

pub mod status {
    pub const PENDING: &str = "pending";
    pub const PAID: &str = "paid";
    pub const CANCELLED: &str = "cancelled";
    /// Derived only, never persisted.
    pub const OVERDUE: &str = "overdue";
}

/// Read-path invoice status: a stored `pending` invoice past its due date
/// shows as `overdue`, same derivation rule as quotation expiry.
pub fn effective_status(stored: &str, due_date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if stored == status::PENDING && due_date < now {
        return status::OVERDUE.to_string();
    }
    stored.to_string()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub quotation_id: Uuid,
    pub dealer_order_id: Option<Uuid>,
    pub total_amount: Decimal,
    /// Stored status with the overdue rule applied
    pub status: String,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceListResponse {
    pub invoices: Vec<InvoiceResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service producing and managing invoices. Dealer quotation accepts are
/// settled here: the accept flip and invoice insert share a transaction.
#[derive(Clone)]
pub struct InvoiceService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    payment_term_days: i64,
}

impl InvoiceService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        payment_term_days: i64,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            payment_term_days,
        }
    }

    /// Accepts a dealer quotation and issues the invoice. The flip is
    /// conditional on `sent` and an unexpired quotation; the unique index
    /// on `invoices.quotation_id` guarantees at most one invoice per
    /// quotation even if two accepts race past the flip.
    #[instrument(skip(self), fields(quotation_id = %quotation_id))]
    pub async fn accept_dealer_quotation(
        &self,
        quotation_id: Uuid,
    ) -> Result<InvoiceResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for dealer quotation accept");
            ServiceError::DatabaseError(e)
        })?;

        let result = QuotationEntity::update_many()
            .col_expr(
                quotation::Column::Status,
                Expr::value(quotations::status::ACCEPTED),
            )
            .col_expr(quotation::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(quotation::Column::Id.eq(quotation_id))
            .filter(
                quotation::Column::Status
                    .is_in([quotations::status::SENT, quotations::status::PENDING]),
            )
            .filter(quotation::Column::DealerId.is_not_null())
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

        let invoice_number = self.next_invoice_number(&txn, now).await?;
        let invoice_id = Uuid::new_v4();
        let model = InvoiceActiveModel {
            id: Set(invoice_id),
            quotation_id: Set(quotation_id),
            dealer_order_id: Set(quotation.dealer_order_id),
            invoice_number: Set(invoice_number.clone()),
            total_amount: Set(quotation.final_price),
            status: Set(status::PENDING.to_string()),
            issue_date: Set(now),
            due_date: Set(now + Duration::days(self.payment_term_days)),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let created = model.insert(&txn).await.map_err(|e| {
            error!(error = %e, quotation_id = %quotation_id, "Failed to insert invoice");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, invoice_id = %invoice_id, "Failed to commit dealer quotation accept");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            invoice_id = %invoice_id,
            invoice_number = %invoice_number,
            quotation_id = %quotation_id,
            "Invoice issued for dealer quotation"
        );
        self.emit(Event::QuotationAccepted {
            quotation_id,
            order_id: None,
            invoice_id: Some(invoice_id),
        })
        .await;
        self.emit(Event::InvoiceIssued {
            invoice_id,
            invoice_number,
        })
        .await;

        Ok(model_to_response(created))
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice(
        &self,
        invoice_id: Uuid,
    ) -> Result<Option<InvoiceResponse>, ServiceError> {
        let found = InvoiceEntity::find_by_id(invoice_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(found.map(model_to_response))
    }

    #[instrument(skip(self))]
    pub async fn list_invoices(
        &self,
        status_filter: Option<String>,
        page: u64,
        per_page: u64,
    ) -> Result<InvoiceListResponse, ServiceError> {
        let mut query = InvoiceEntity::find();
        if let Some(status) = &status_filter {
            query = query.filter(invoice::Column::Status.eq(status.clone()));
        }

        let paginator = query
            .order_by_desc(invoice::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let invoices = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(InvoiceListResponse {
            invoices: invoices.into_iter().map(model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Moves an invoice along the payment states. Conditional flip with
    /// explicit allowed sources per target state.
    #[instrument(skip(self), fields(invoice_id = %invoice_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        invoice_id: Uuid,
        new_status: &str,
    ) -> Result<InvoiceResponse, ServiceError> {
        let allowed_from = allowed_sources(new_status).ok_or_else(|| {
            ServiceError::InvalidStatus(format!("Unknown invoice status '{}'", new_status))
        })?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let current = InvoiceEntity::find_by_id(invoice_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Invoice not found".to_string()))?;
        let old_status = current.status.clone();

        let result = InvoiceEntity::update_many()
            .col_expr(invoice::Column::Status, Expr::value(new_status))
            .col_expr(invoice::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(invoice::Column::Id.eq(invoice_id))
            .filter(invoice::Column::Status.is_in(allowed_from.iter().copied()))
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            warn!(invoice_id = %invoice_id, status = %old_status, "Invoice transition rejected");
            return Err(ServiceError::Conflict(format!(
                "Invoice is '{}' and cannot become '{}'",
                old_status, new_status
            )));
        }

        info!(invoice_id = %invoice_id, old_status = %old_status, new_status = %new_status, "Invoice status updated");
        self.emit(Event::InvoiceStatusChanged {
            invoice_id,
            old_status,
            new_status: new_status.to_string(),
        })
        .await;

        self.get_invoice(invoice_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Invoice not found".to_string()))
    }

    /// Per-day monotone sequence: `INV-YYYYMMDD-NNNN`. Counted inside the
    /// caller's transaction; the unique index on `invoice_number` catches
    /// the rare same-instant race.
    async fn next_invoice_number(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        now: DateTime<Utc>,
    ) -> Result<String, ServiceError> {
        let prefix = format!("INV-{}-", now.format("%Y%m%d"));
        let todays = InvoiceEntity::find()
            .filter(invoice::Column::InvoiceNumber.starts_with(&prefix))
            .count(txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(format_invoice_number(&prefix, todays + 1))
    }

    async fn accept_conflict(&self, quotation_id: Uuid, now: DateTime<Utc>) -> ServiceError {
        match QuotationEntity::find_by_id(quotation_id)
            .one(&*self.db_pool)
            .await
        {
            Ok(Some(found)) => {
                if found.dealer_id.is_none() {
                    return ServiceError::InvalidOperation(
                        "Retail quotations are accepted through the order flow".to_string(),
                    );
                }
                let shown =
                    quotations::effective_status(&found.status, found.expiry_date, now);
                if shown == quotations::status::EXPIRED {
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

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send invoice event");
            }
        }
    }
}

fn format_invoice_number(prefix: &str, sequence: u64) -> String {
    format!("{}{:04}", prefix, sequence)
}

/// States an invoice may move to `new_status` from. `None` for an unknown
/// target status.
fn allowed_sources(new_status: &str) -> Option<&'static [&'static str]> {
    match new_status {
        status::PAID => Some(&[status::PENDING]),
        status::CANCELLED => Some(&[status::PENDING]),
        _ => None,
    }
}

pub(crate) fn model_to_response(model: InvoiceModel) -> InvoiceResponse {
    let shown_status = effective_status(&model.status, model.due_date, Utc::now());
    InvoiceResponse {
        id: model.id,
        invoice_number: model.invoice_number,
        quotation_id: model.quotation_id,
        dealer_order_id: model.dealer_order_id,
        total_amount: model.total_amount,
        status: shown_status,
        issue_date: model.issue_date,
        due_date: model.due_date,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_number_format() {
        let pattern = regex::Regex::new(r"^INV-\d{8}-\d{4}$").unwrap();
        assert!(pattern.is_match(&format_invoice_number("INV-20260829-", 1)));
        assert!(pattern.is_match(&format_invoice_number("INV-20260829-", 9999)));
    }

    #[test]
    fn invoice_number_is_zero_padded_and_sequential() {
        assert_eq!(format_invoice_number("INV-20260829-", 1), "INV-20260829-0001");
        assert_eq!(format_invoice_number("INV-20260829-", 42), "INV-20260829-0042");
        assert_eq!(
            format_invoice_number("INV-20260829-", 10000),
            "INV-20260829-10000"
        );
    }

    #[test]
    fn settlement_only_from_pending() {
        for (target, from, ok) in [
            (status::PAID, status::PENDING, true),
            (status::PAID, status::CANCELLED, false),
            (status::CANCELLED, status::PENDING, true),
            (status::CANCELLED, status::PAID, false),
        ] {
            let allowed = allowed_sources(target).unwrap();
            assert_eq!(allowed.contains(&from), ok, "{} -> {}", from, target);
        }
    }

    #[test]
    fn unknown_status_has_no_sources() {
        assert!(allowed_sources("shredded").is_none());
        assert!(allowed_sources(status::PENDING).is_none());
    }

    #[test]
    fn overdue_is_derived_from_due_date() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);
        let tomorrow = now + Duration::days(1);
        assert_eq!(effective_status(status::PENDING, yesterday, now), "overdue");
        assert_eq!(effective_status(status::PENDING, tomorrow, now), "pending");
        assert_eq!(effective_status(status::PAID, yesterday, now), "paid");
        assert_eq!(effective_status(status::CANCELLED, yesterday, now), "cancelled");
    }
}
