use crate::{
    db::DbPool,
    entities::appointment::{
        self, ActiveModel as AppointmentActiveModel, Entity as AppointmentEntity,
        Model as AppointmentModel,
    },
    entities::customer::Entity as CustomerEntity,
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub mod status {
    pub const REQUESTED: &str = "requested";
    pub const CONFIRMED: &str = "confirmed";
    pub const COMPLETED: &str = "completed";
    pub const CANCELLED: &str = "cancelled";
}

/// Statuses an appointment may move FROM when entering `new_status`.
pub fn allowed_sources(new_status: &str) -> Option<&'static [&'static str]> {
    match new_status {
        status::CONFIRMED => Some(&[status::REQUESTED]),
        status::COMPLETED => Some(&[status::CONFIRMED]),
        status::CANCELLED => Some(&[status::REQUESTED, status::CONFIRMED]),
        _ => None,
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookAppointmentRequest {
    pub customer_id: Uuid,
    pub dealer_id: Option<Uuid>,
    /// Variant the customer wants to test drive, if any.
    pub variant_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentFilter {
    pub customer_id: Option<Uuid>,
    pub dealer_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub dealer_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<AppointmentResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct AppointmentService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl AppointmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<AppointmentResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if request.scheduled_at <= Utc::now() {
            return Err(ServiceError::ValidationError(
                "Appointment must be scheduled in the future".to_string(),
            ));
        }

        let db = &*self.db_pool;
        CustomerEntity::find_by_id(request.customer_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;

        let now = Utc::now();
        let model = AppointmentActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(request.customer_id),
            dealer_id: Set(request.dealer_id),
            variant_id: Set(request.variant_id),
            scheduled_at: Set(request.scheduled_at),
            status: Set(status::REQUESTED.to_string()),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let created = model.insert(db).await.map_err(ServiceError::DatabaseError)?;

        info!(appointment_id = %created.id, "Appointment booked");
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::AppointmentBooked {
                    appointment_id: created.id,
                    customer_id: created.customer_id,
                })
                .await
            {
                error!("Failed to send event: {}", e);
            }
        }

        Ok(to_response(created))
    }

    #[instrument(skip(self), fields(appointment_id = %appointment_id))]
    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<AppointmentResponse>, ServiceError> {
        Ok(AppointmentEntity::find_by_id(appointment_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .map(to_response))
    }

    #[instrument(skip(self))]
    pub async fn list_appointments(
        &self,
        filter: AppointmentFilter,
        page: u64,
        per_page: u64,
    ) -> Result<AppointmentListResponse, ServiceError> {
        let mut query = AppointmentEntity::find();
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(appointment::Column::CustomerId.eq(customer_id));
        }
        if let Some(dealer_id) = filter.dealer_id {
            query = query.filter(appointment::Column::DealerId.eq(dealer_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(appointment::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_asc(appointment::Column::ScheduledAt)
            .paginate(&*self.db_pool, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let appointments = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(AppointmentListResponse {
            appointments: appointments.into_iter().map(to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self), fields(appointment_id = %appointment_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: &str,
    ) -> Result<AppointmentResponse, ServiceError> {
        let sources = allowed_sources(new_status).ok_or_else(|| {
            ServiceError::InvalidStatus(format!("Unknown appointment status: {}", new_status))
        })?;

        let db = &*self.db_pool;
        let result = AppointmentEntity::update_many()
            .col_expr(appointment::Column::Status, Expr::value(new_status))
            .col_expr(appointment::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(appointment::Column::Id.eq(appointment_id))
            .filter(appointment::Column::Status.is_in(sources.iter().copied()))
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            return Err(self.transition_conflict(appointment_id, new_status).await);
        }

        let updated = AppointmentEntity::find_by_id(appointment_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Appointment not found".to_string()))?;

        info!(appointment_id = %appointment_id, status = %new_status, "Appointment status updated");
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::AppointmentStatusChanged {
                    appointment_id,
                    new_status: new_status.to_string(),
                })
                .await
            {
                error!("Failed to send event: {}", e);
            }
        }

        Ok(to_response(updated))
    }

    /// Deletes an appointment unless it already ran to completion or was
    /// cancelled.
    #[instrument(skip(self), fields(appointment_id = %appointment_id))]
    pub async fn delete_appointment(&self, appointment_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let result = AppointmentEntity::delete_many()
            .filter(appointment::Column::Id.eq(appointment_id))
            .filter(
                appointment::Column::Status
                    .is_not_in([status::COMPLETED, status::CANCELLED]),
            )
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            let existing = AppointmentEntity::find_by_id(appointment_id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            return Err(match existing {
                Some(appointment) => ServiceError::Conflict(format!(
                    "Appointment is '{}' and cannot be deleted",
                    appointment.status
                )),
                None => ServiceError::NotFound("Appointment not found".to_string()),
            });
        }

        info!(appointment_id = %appointment_id, "Appointment deleted");
        Ok(())
    }

    async fn transition_conflict(&self, appointment_id: Uuid, new_status: &str) -> ServiceError {
        match AppointmentEntity::find_by_id(appointment_id)
            .one(&*self.db_pool)
            .await
        {
            Ok(Some(appointment)) => {
                warn!(
                    appointment_id = %appointment_id,
                    current = %appointment.status,
                    requested = %new_status,
                    "Rejected appointment status transition"
                );
                ServiceError::Conflict(format!(
                    "Cannot move appointment from '{}' to '{}'",
                    appointment.status, new_status
                ))
            }
            Ok(None) => ServiceError::NotFound("Appointment not found".to_string()),
            Err(e) => ServiceError::DatabaseError(e),
        }
    }
}

fn to_response(model: AppointmentModel) -> AppointmentResponse {
    AppointmentResponse {
        id: model.id,
        customer_id: model.customer_id,
        dealer_id: model.dealer_id,
        variant_id: model.variant_id,
        scheduled_at: model.scheduled_at,
        status: model.status,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn completion_requires_confirmation() {
        assert_eq!(allowed_sources(status::COMPLETED), Some(&[status::CONFIRMED][..]));
        assert!(allowed_sources(status::CANCELLED)
            .unwrap()
            .contains(&status::REQUESTED));
        assert!(allowed_sources("rescheduled").is_none());
    }

    #[test]
    fn response_mirrors_stored_appointment() {
        let now = Utc::now();
        let model = AppointmentModel {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            dealer_id: None,
            variant_id: None,
            scheduled_at: now + Duration::days(2),
            status: status::REQUESTED.to_string(),
            notes: Some("bring license".to_string()),
            created_at: now,
            updated_at: None,
        };
        let response = to_response(model.clone());
        assert_eq!(response.id, model.id);
        assert_eq!(response.status, status::REQUESTED);
        assert_eq!(response.notes.as_deref(), Some("bring license"));
        assert_eq!(response.scheduled_at, model.scheduled_at);
    }

    #[tokio::test]
    async fn booking_in_the_past_is_rejected() {
        let service = AppointmentService::new(
            Arc::new(sea_orm::DatabaseConnection::Disconnected),
            None,
        );
        let request = BookAppointmentRequest {
            customer_id: Uuid::new_v4(),
            dealer_id: None,
            variant_id: None,
            scheduled_at: Utc::now() - Duration::hours(1),
            notes: None,
        };
        let result = service.book_appointment(request).await;
        assert!(matches!(result, Err(ServiceError::ValidationError(_))));
    }
}
