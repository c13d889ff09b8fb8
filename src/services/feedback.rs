use crate::{
    db::DbPool,
    entities::customer::Entity as CustomerEntity,
    entities::feedback::{
        self, ActiveModel as FeedbackActiveModel, Entity as FeedbackEntity, Model as FeedbackModel,
    },
    entities::order::Entity as OrderEntity,
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitFeedbackRequest {
    pub customer_id: Uuid,
    /// Order the feedback refers to, if any.
    pub order_id: Option<Uuid>,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackFilter {
    pub customer_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub min_rating: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub order_id: Option<Uuid>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedbackListResponse {
    pub feedback: Vec<FeedbackResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct FeedbackService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl FeedbackService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, rating = request.rating))]
    pub async fn submit_feedback(
        &self,
        request: SubmitFeedbackRequest,
    ) -> Result<FeedbackResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        CustomerEntity::find_by_id(request.customer_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;

        if let Some(order_id) = request.order_id {
            OrderEntity::find_by_id(order_id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
        }

        let model = FeedbackActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(request.customer_id),
            order_id: Set(request.order_id),
            rating: Set(request.rating),
            comment: Set(request.comment),
            created_at: Set(Utc::now()),
        };
        let created = model.insert(db).await.map_err(ServiceError::DatabaseError)?;

        info!(feedback_id = %created.id, "Feedback submitted");
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::FeedbackSubmitted {
                    feedback_id: created.id,
                    customer_id: created.customer_id,
                    rating: created.rating,
                })
                .await
            {
                error!("Failed to send event: {}", e);
            }
        }

        Ok(to_response(created))
    }

    #[instrument(skip(self), fields(feedback_id = %feedback_id))]
    pub async fn get_feedback(
        &self,
        feedback_id: Uuid,
    ) -> Result<Option<FeedbackResponse>, ServiceError> {
        Ok(FeedbackEntity::find_by_id(feedback_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?
            .map(to_response))
    }

    #[instrument(skip(self))]
    pub async fn list_feedback(
        &self,
        filter: FeedbackFilter,
        page: u64,
        per_page: u64,
    ) -> Result<FeedbackListResponse, ServiceError> {
        let mut query = FeedbackEntity::find();
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(feedback::Column::CustomerId.eq(customer_id));
        }
        if let Some(order_id) = filter.order_id {
            query = query.filter(feedback::Column::OrderId.eq(order_id));
        }
        if let Some(min_rating) = filter.min_rating {
            query = query.filter(feedback::Column::Rating.gte(min_rating));
        }

        let paginator = query
            .order_by_desc(feedback::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let feedback = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(FeedbackListResponse {
            feedback: feedback.into_iter().map(to_response).collect(),
            total,
            page,
            per_page,
        })
    }
    #[instrument(skip(self), fields(feedback_id = %feedback_id))]
    pub async fn delete_feedback(&self, feedback_id: Uuid) -> Result<(), ServiceError> {
        let result = FeedbackEntity::delete_by_id(feedback_id)
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Feedback not found".to_string()));
        }
        info!(feedback_id = %feedback_id, "Feedback deleted");
        Ok(())
    }
}

fn to_response(model: FeedbackModel) -> FeedbackResponse {
    FeedbackResponse {
        id: model.id,
        customer_id: model.customer_id,
        order_id: model.order_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_be_between_one_and_five() {
        let mut request = SubmitFeedbackRequest {
            customer_id: Uuid::new_v4(),
            order_id: None,
            rating: 0,
            comment: None,
        };
        assert!(request.validate().is_err());

        request.rating = 6;
        assert!(request.validate().is_err());

        request.rating = 5;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn response_mirrors_stored_feedback() {
        let model = FeedbackModel {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            order_id: Some(Uuid::new_v4()),
            rating: 4,
            comment: Some("smooth delivery".to_string()),
            created_at: Utc::now(),
        };
        let response = to_response(model.clone());
        assert_eq!(response.id, model.id);
        assert_eq!(response.rating, 4);
        assert_eq!(response.order_id, model.order_id);
        assert_eq!(response.comment.as_deref(), Some("smooth delivery"));
    }
}
