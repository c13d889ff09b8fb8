use crate::{
    db::DbPool,
    entities::installment_plan::{
        self, ActiveModel as PlanActiveModel, Entity as PlanEntity, Model as PlanModel,
    },
    entities::installment_schedule::{
        self, ActiveModel as ScheduleActiveModel, Entity as ScheduleEntity,
        Model as ScheduleModel,
    },
    entities::invoice::Entity as InvoiceEntity,
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub mod schedule_status {
    pub const PENDING: &str = "pending";
    pub const PAID: &str = "paid";
    /// Derived only, never persisted.
    pub const OVERDUE: &str = "overdue";
}

const MAX_TERM_MONTHS: i32 = 120;

/// One row of a computed amortization schedule, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleLine {
    pub installment_number: i32,
    pub due_date: NaiveDate,
    pub principal: Decimal,
    pub interest: Decimal,
    pub amount: Decimal,
}

/// Builds an equal-principal amortization schedule.
///
/// The principal portion is `loan / term` rounded to cents, with the
/// rounding remainder absorbed into the final installment so principals
/// sum to the loan exactly. Interest is simple monthly interest on the
/// declining balance (`annual_rate_percent / 12` applied to the balance
/// outstanding before each installment).
pub fn build_schedule(
    loan_amount: Decimal,
    annual_rate_percent: Decimal,
    term_months: i32,
    first_payment_date: NaiveDate,
) -> Result<Vec<ScheduleLine>, ServiceError> {
    if loan_amount <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Loan amount must be positive".to_string(),
        ));
    }
    if annual_rate_percent < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Interest rate cannot be negative".to_string(),
        ));
    }
    if !(1..=MAX_TERM_MONTHS).contains(&term_months) {
        return Err(ServiceError::ValidationError(format!(
            "Term must be between 1 and {} months",
            MAX_TERM_MONTHS
        )));
    }

    let term = Decimal::from(term_months);
    let base_principal = (loan_amount / term).round_dp(2);
    let monthly_rate = annual_rate_percent / dec!(100) / dec!(12);

    let mut lines = Vec::with_capacity(term_months as usize);
    let mut remaining = loan_amount;

    for number in 1..=term_months {
        let principal = if number == term_months {
            // Last installment absorbs the rounding remainder
            remaining
        } else {
            base_principal
        };
        let interest = (remaining * monthly_rate).round_dp(2);
        let due_date = first_payment_date
            .checked_add_months(Months::new((number - 1) as u32))
            .ok_or_else(|| {
                ServiceError::ValidationError("Payment date out of range".to_string())
            })?;

        lines.push(ScheduleLine {
            installment_number: number,
            due_date,
            principal,
            interest,
            amount: principal + interest,
        });
        remaining -= principal;
    }

    Ok(lines)
}

/// Loan principal left after the down payment. A down payment equal to
/// the invoice total is valid and leaves a zero loan.
pub(crate) fn loan_amount_for(
    total_amount: Decimal,
    down_payment: Decimal,
) -> Result<Decimal, ServiceError> {
    if down_payment < Decimal::ZERO || down_payment > total_amount {
        return Err(ServiceError::ValidationError(
            "Down payment must be between zero and the invoice total".to_string(),
        ));
    }
    Ok(total_amount - down_payment)
}

/// Read-path schedule status: a stored `pending` row past its due date
/// shows as `overdue`.
pub fn effective_schedule_status(stored: &str, due_date: NaiveDate, today: NaiveDate) -> String {
    if stored == schedule_status::PENDING && due_date < today {
        return schedule_status::OVERDUE.to_string();
    }
    stored.to_string()
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePlanRequest {
    pub invoice_id: Uuid,
    pub down_payment: Decimal,
    /// Annual interest rate in percent
    pub interest_rate: Decimal,
    #[validate(range(min = 1, max = 120))]
    pub term_months: i32,
    pub first_payment_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkPaidRequest {
    pub paid_amount: Option<Decimal>,
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub installment_number: i32,
    pub due_date: NaiveDate,
    pub principal_amount: Decimal,
    pub interest_amount: Decimal,
    pub amount: Decimal,
    /// Stored status with the overdue rule applied
    pub status: String,
    pub paid_date: Option<NaiveDate>,
    pub paid_amount: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlanResponse {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub total_amount: Decimal,
    pub down_payment: Decimal,
    pub loan_amount: Decimal,
    pub interest_rate: Decimal,
    pub term_months: i32,
    pub first_payment_date: NaiveDate,
    pub schedules: Vec<ScheduleResponse>,
}

/// Service managing installment plans and their amortization schedules.
#[derive(Clone)]
pub struct InstallmentService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl InstallmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates an installment plan for an invoice and persists the full
    /// schedule in one transaction. One plan per invoice; the unique index
    /// on `installment_plans.invoice_id` holds under concurrent creates.
    #[instrument(skip(self, request), fields(invoice_id = %request.invoice_id))]
    pub async fn create_plan(
        &self,
        request: CreatePlanRequest,
    ) -> Result<PlanResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for plan creation");
            ServiceError::DatabaseError(e)
        })?;

        let invoice = InvoiceEntity::find_by_id(request.invoice_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Invoice not found".to_string()))?;

        if invoice.status == "cancelled" {
            return Err(ServiceError::InvalidOperation(
                "Cannot create a plan for a cancelled invoice".to_string(),
            ));
        }

        let existing = PlanEntity::find()
            .filter(installment_plan::Column::InvoiceId.eq(request.invoice_id))
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "Invoice already has an installment plan".to_string(),
            ));
        }

        let loan_amount = loan_amount_for(invoice.total_amount, request.down_payment)?;
        // A fully down-paid invoice leaves nothing to amortize
        let lines = if loan_amount.is_zero() {
            Vec::new()
        } else {
            build_schedule(
                loan_amount,
                request.interest_rate,
                request.term_months,
                request.first_payment_date,
            )?
        };

        let now = Utc::now();
        let plan_id = Uuid::new_v4();
        let plan = PlanActiveModel {
            id: Set(plan_id),
            invoice_id: Set(request.invoice_id),
            total_amount: Set(invoice.total_amount),
            down_payment: Set(request.down_payment),
            loan_amount: Set(loan_amount),
            interest_rate: Set(request.interest_rate),
            term_months: Set(request.term_months),
            first_payment_date: Set(request.first_payment_date),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let plan_model = plan.insert(&txn).await.map_err(|e| {
            error!(error = %e, invoice_id = %request.invoice_id, "Failed to insert installment plan");
            ServiceError::DatabaseError(e)
        })?;

        let rows: Vec<ScheduleActiveModel> = lines
            .iter()
            .map(|line| ScheduleActiveModel {
                id: Set(Uuid::new_v4()),
                plan_id: Set(plan_id),
                installment_number: Set(line.installment_number),
                due_date: Set(line.due_date),
                principal_amount: Set(line.principal),
                interest_amount: Set(line.interest),
                amount: Set(line.amount),
                status: Set(schedule_status::PENDING.to_string()),
                paid_date: Set(None),
                paid_amount: Set(None),
                created_at: Set(now),
                updated_at: Set(Some(now)),
            })
            .collect();
        if !rows.is_empty() {
            ScheduleEntity::insert_many(rows)
                .exec(&txn)
                .await
                .map_err(|e| {
                    error!(error = %e, plan_id = %plan_id, "Failed to insert installment schedules");
                    ServiceError::DatabaseError(e)
                })?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, plan_id = %plan_id, "Failed to commit plan creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            plan_id = %plan_id,
            invoice_id = %request.invoice_id,
            term_months = request.term_months,
            "Installment plan created"
        );
        self.emit(Event::InstallmentPlanCreated {
            plan_id,
            invoice_id: request.invoice_id,
            term_months: request.term_months,
        })
        .await;

        self.plan_response(plan_model).await
    }

    #[instrument(skip(self), fields(plan_id = %plan_id))]
    pub async fn get_plan(&self, plan_id: Uuid) -> Result<Option<PlanResponse>, ServiceError> {
        let plan = PlanEntity::find_by_id(plan_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        match plan {
            Some(model) => Ok(Some(self.plan_response(model).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_plan_for_invoice(
        &self,
        invoice_id: Uuid,
    ) -> Result<Option<PlanResponse>, ServiceError> {
        let plan = PlanEntity::find()
            .filter(installment_plan::Column::InvoiceId.eq(invoice_id))
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        match plan {
            Some(model) => Ok(Some(self.plan_response(model).await?)),
            None => Ok(None),
        }
    }

    /// Marks one installment as paid: conditional `pending -> paid` flip,
    /// so a double mark comes back as a conflict rather than silently
    /// overwriting the recorded payment.
    #[instrument(skip(self, request), fields(schedule_id = %schedule_id))]
    pub async fn mark_paid(
        &self,
        schedule_id: Uuid,
        request: MarkPaidRequest,
    ) -> Result<ScheduleResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();
        let paid_date = request.paid_date.unwrap_or_else(|| now.date_naive());

        let schedule = ScheduleEntity::find_by_id(schedule_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Installment not found".to_string()))?;

        let paid_amount = request.paid_amount.unwrap_or(schedule.amount);
        if paid_amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Paid amount must be positive".to_string(),
            ));
        }

        let result = ScheduleEntity::update_many()
            .col_expr(
                installment_schedule::Column::Status,
                Expr::value(schedule_status::PAID),
            )
            .col_expr(
                installment_schedule::Column::PaidDate,
                Expr::value(Some(paid_date)),
            )
            .col_expr(
                installment_schedule::Column::PaidAmount,
                Expr::value(Some(paid_amount)),
            )
            .col_expr(
                installment_schedule::Column::UpdatedAt,
                Expr::value(Some(now)),
            )
            .filter(installment_schedule::Column::Id.eq(schedule_id))
            .filter(installment_schedule::Column::Status.eq(schedule_status::PENDING))
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            warn!(schedule_id = %schedule_id, "Installment already settled");
            return Err(ServiceError::Conflict(
                "Installment is not pending".to_string(),
            ));
        }

        let updated = ScheduleEntity::find_by_id(schedule_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Installment not found".to_string()))?;

        info!(
            schedule_id = %schedule_id,
            plan_id = %updated.plan_id,
            installment_number = updated.installment_number,
            "Installment marked paid"
        );
        self.emit(Event::InstallmentPaid {
            schedule_id,
            plan_id: updated.plan_id,
            installment_number: updated.installment_number,
        })
        .await;

        Ok(schedule_to_response(updated))
    }

    async fn plan_response(&self, model: PlanModel) -> Result<PlanResponse, ServiceError> {
        let schedules = ScheduleEntity::find()
            .filter(installment_schedule::Column::PlanId.eq(model.id))
            .order_by_asc(installment_schedule::Column::InstallmentNumber)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(PlanResponse {
            id: model.id,
            invoice_id: model.invoice_id,
            total_amount: model.total_amount,
            down_payment: model.down_payment,
            loan_amount: model.loan_amount,
            interest_rate: model.interest_rate,
            term_months: model.term_months,
            first_payment_date: model.first_payment_date,
            schedules: schedules.into_iter().map(schedule_to_response).collect(),
        })
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send installment event");
            }
        }
    }
}

pub(crate) fn schedule_to_response(model: ScheduleModel) -> ScheduleResponse {
    let today = Utc::now().date_naive();
    let status = effective_schedule_status(&model.status, model.due_date, today);
    ScheduleResponse {
        id: model.id,
        plan_id: model.plan_id,
        installment_number: model.installment_number,
        due_date: model.due_date,
        principal_amount: model.principal_amount,
        interest_amount: model.interest_amount,
        amount: model.amount,
        status,
        paid_date: model.paid_date,
        paid_amount: model.paid_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn principals_sum_to_loan_exactly() {
        // 10000 / 10 has no remainder; 10000 / 3 does
        for (loan, term) in [(dec!(10000.00), 10), (dec!(10000.00), 3), (dec!(99999.97), 7)] {
            let lines = build_schedule(loan, dec!(8.5), term, date(2026, 1, 15)).unwrap();
            let sum: Decimal = lines.iter().map(|l| l.principal).sum();
            assert_eq!(sum, loan, "loan {} over {} months", loan, term);
            assert_eq!(lines.len(), term as usize);
        }
    }

    #[test]
    fn zero_interest_yields_principal_only_installments() {
        let lines = build_schedule(dec!(12000.00), Decimal::ZERO, 12, date(2026, 3, 1)).unwrap();
        for line in &lines {
            assert_eq!(line.interest, Decimal::ZERO);
            assert_eq!(line.amount, line.principal);
        }
    }

    #[test]
    fn interest_declines_with_balance() {
        let lines = build_schedule(dec!(10000.00), dec!(12), 10, date(2026, 1, 1)).unwrap();
        // 1% monthly on 10000, then on 9000, ...
        assert_eq!(lines[0].interest, dec!(100.00));
        assert_eq!(lines[1].interest, dec!(90.00));
        assert_eq!(lines[9].interest, dec!(10.00));
    }

    #[test]
    fn due_dates_advance_monthly_and_clamp() {
        let lines = build_schedule(dec!(6000.00), dec!(6), 3, date(2026, 1, 31)).unwrap();
        assert_eq!(lines[0].due_date, date(2026, 1, 31));
        // Jan 31 + 1 month clamps to Feb 28
        assert_eq!(lines[1].due_date, date(2026, 2, 28));
        assert_eq!(lines[2].due_date, date(2026, 3, 31));
    }

    #[test]
    fn invalid_inputs_rejected() {
        let d = date(2026, 1, 1);
        assert!(build_schedule(Decimal::ZERO, dec!(5), 12, d).is_err());
        assert!(build_schedule(dec!(-1.00), dec!(5), 12, d).is_err());
        assert!(build_schedule(dec!(1000.00), dec!(-0.1), 12, d).is_err());
        assert!(build_schedule(dec!(1000.00), dec!(5), 0, d).is_err());
        assert!(build_schedule(dec!(1000.00), dec!(5), 121, d).is_err());
    }

    #[test]
    fn last_installment_absorbs_rounding_remainder() {
        // 1000 / 3 rounds to 333.33; last takes 333.34
        let lines = build_schedule(dec!(1000.00), dec!(0), 3, date(2026, 5, 10)).unwrap();
        assert_eq!(lines[0].principal, dec!(333.33));
        assert_eq!(lines[1].principal, dec!(333.33));
        assert_eq!(lines[2].principal, dec!(333.34));
    }

    #[test]
    fn down_payment_may_equal_invoice_total() {
        assert_eq!(
            loan_amount_for(dec!(50000.00), dec!(50000.00)).unwrap(),
            Decimal::ZERO
        );
        assert_eq!(
            loan_amount_for(dec!(50000.00), dec!(10000.00)).unwrap(),
            dec!(40000.00)
        );
        assert_eq!(loan_amount_for(dec!(50000.00), Decimal::ZERO).unwrap(), dec!(50000.00));
        assert!(loan_amount_for(dec!(50000.00), dec!(50000.01)).is_err());
        assert!(loan_amount_for(dec!(50000.00), dec!(-0.01)).is_err());
    }

    #[test]
    fn overdue_is_derived_from_due_date() {
        let today = date(2026, 6, 1);
        assert_eq!(
            effective_schedule_status(schedule_status::PENDING, date(2026, 5, 31), today),
            "overdue"
        );
        assert_eq!(
            effective_schedule_status(schedule_status::PENDING, date(2026, 6, 1), today),
            "pending"
        );
        assert_eq!(
            effective_schedule_status(schedule_status::PAID, date(2026, 5, 1), today),
            "paid"
        );
    }
}
