//! EVDMS API Library
//!
//! Backend for an EV dealership management platform: vehicle catalog,
//! quotations, orders, dealer wholesale, invoicing, installment financing,
//! payments, appointments and feedback.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::consts as perm;
use crate::auth::AuthRouterExt;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub search: Option<String>,
}

pub(crate) fn default_page() -> u64 {
    1
}
pub(crate) fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Authenticated API surface, mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    // Customers
    let customers_read = Router::new()
        .route("/customers", get(handlers::customers::list_customers))
        .route("/customers/:id", get(handlers::customers::get_customer))
        .with_permission(perm::CUSTOMERS_READ);
    let customers_manage = Router::new()
        .route("/customers", post(handlers::customers::create_customer))
        .route("/customers/:id", put(handlers::customers::update_customer))
        .route(
            "/customers/:id",
            delete(handlers::customers::delete_customer),
        )
        .with_permission(perm::CUSTOMERS_MANAGE);

    // Vehicle catalog
    let vehicles_read = Router::new()
        .route("/vehicle-models", get(handlers::vehicles::list_models))
        .route("/vehicle-models/:id", get(handlers::vehicles::get_model))
        .route("/vehicle-variants", get(handlers::vehicles::list_variants))
        .route(
            "/vehicle-variants/:id",
            get(handlers::vehicles::get_variant),
        )
        .with_permission(perm::VEHICLES_READ);
    let vehicles_manage = Router::new()
        .route("/vehicle-models", post(handlers::vehicles::create_model))
        .route("/vehicle-models/:id", put(handlers::vehicles::update_model))
        .route(
            "/vehicle-variants",
            post(handlers::vehicles::create_variant),
        )
        .route(
            "/vehicle-variants/:id",
            put(handlers::vehicles::update_variant),
        )
        .with_permission(perm::VEHICLES_MANAGE);

    // Dealers
    let dealers_read = Router::new()
        .route("/dealers", get(handlers::dealers::list_dealers))
        .route("/dealers/:id", get(handlers::dealers::get_dealer))
        .with_permission(perm::DEALERS_READ);
    let dealers_manage = Router::new()
        .route("/dealers", post(handlers::dealers::create_dealer))
        .route("/dealers/:id", put(handlers::dealers::update_dealer))
        .route(
            "/dealers/:id/deactivate",
            post(handlers::dealers::deactivate_dealer),
        )
        .with_permission(perm::DEALERS_MANAGE);

    // Quotations
    let quotations_read = Router::new()
        .route("/quotations", get(handlers::quotations::list_quotations))
        .route("/quotations/:id", get(handlers::quotations::get_quotation))
        .with_permission(perm::QUOTATIONS_READ);
    let quotations_create = Router::new()
        .route("/quotations", post(handlers::quotations::create_quotation))
        .route(
            "/quotations/:id",
            put(handlers::quotations::update_quotation),
        )
        .with_permission(perm::QUOTATIONS_CREATE);
    let quotations_transition = Router::new()
        .route(
            "/quotations/:id/send",
            post(handlers::quotations::send_quotation),
        )
        .route(
            "/quotations/:id/accept",
            post(handlers::quotations::accept_quotation),
        )
        .route(
            "/quotations/:id/reject",
            post(handlers::quotations::reject_quotation),
        )
        .with_permission(perm::QUOTATIONS_TRANSITION);
    let quotations_delete = Router::new()
        .route(
            "/quotations/:id",
            delete(handlers::quotations::delete_quotation),
        )
        .with_permission(perm::QUOTATIONS_DELETE);

    // Orders
    let orders_read = Router::new()
        .route("/orders", get(handlers::orders::list_orders))
        .route("/orders/:id", get(handlers::orders::get_order))
        .with_permission(perm::ORDERS_READ);
    let orders_update = Router::new()
        .route(
            "/orders/:id/status",
            put(handlers::orders::update_order_status),
        )
        .route("/orders/:id/cancel", post(handlers::orders::cancel_order))
        .with_permission(perm::ORDERS_UPDATE);
    let orders_delete = Router::new()
        .route("/orders/:id", delete(handlers::orders::delete_order))
        .with_permission(perm::ORDERS_DELETE);

    // Dealer wholesale orders
    let dealer_orders_read = Router::new()
        .route(
            "/dealer-orders",
            get(handlers::dealer_orders::list_dealer_orders),
        )
        .route(
            "/dealer-orders/:id",
            get(handlers::dealer_orders::get_dealer_order),
        )
        .with_permission(perm::DEALER_ORDERS_READ);
    let dealer_orders_manage = Router::new()
        .route(
            "/dealer-orders",
            post(handlers::dealer_orders::create_dealer_order),
        )
        .route(
            "/dealer-orders/:id/status",
            put(handlers::dealer_orders::update_dealer_order_status),
        )
        .route(
            "/dealer-orders/:id/quotation",
            post(handlers::dealer_orders::generate_quotation),
        )
        .with_permission(perm::DEALER_ORDERS_MANAGE);

    // Invoices
    let invoices_read = Router::new()
        .route("/invoices", get(handlers::invoices::list_invoices))
        .route("/invoices/:id", get(handlers::invoices::get_invoice))
        .with_permission(perm::INVOICES_READ);
    let invoices_manage = Router::new()
        .route(
            "/invoices/from-quotation/:quotation_id",
            post(handlers::invoices::accept_dealer_quotation),
        )
        .route(
            "/invoices/:id/status",
            put(handlers::invoices::update_invoice_status),
        )
        .with_permission(perm::INVOICES_MANAGE);

    // Installment financing
    let installments_read = Router::new()
        .route(
            "/installment-plans/:id",
            get(handlers::installments::get_plan),
        )
        .route(
            "/installment-plans/by-invoice/:invoice_id",
            get(handlers::installments::get_plan_for_invoice),
        )
        .with_permission(perm::INSTALLMENTS_READ);
    let installments_manage = Router::new()
        .route(
            "/installment-plans",
            post(handlers::installments::create_plan),
        )
        .route(
            "/installment-schedules/:id/pay",
            post(handlers::installments::mark_installment_paid),
        )
        .with_permission(perm::INSTALLMENTS_MANAGE);

    // Payments
    let payments_read = Router::new()
        .route("/payments", get(handlers::payments::list_payments))
        .route("/payments/:id", get(handlers::payments::get_payment))
        .with_permission(perm::PAYMENTS_READ);
    let payments_manage = Router::new()
        .route("/payments", post(handlers::payments::record_payment))
        .route(
            "/payments/:id/status",
            put(handlers::payments::update_payment_status),
        )
        .with_permission(perm::PAYMENTS_MANAGE);

    // Appointments
    let appointments_read = Router::new()
        .route(
            "/appointments",
            get(handlers::appointments::list_appointments),
        )
        .route(
            "/appointments/:id",
            get(handlers::appointments::get_appointment),
        )
        .with_permission(perm::APPOINTMENTS_READ);
    let appointments_manage = Router::new()
        .route(
            "/appointments",
            post(handlers::appointments::book_appointment),
        )
        .route(
            "/appointments/:id/status",
            put(handlers::appointments::update_appointment_status),
        )
        .route(
            "/appointments/:id",
            delete(handlers::appointments::delete_appointment),
        )
        .with_permission(perm::APPOINTMENTS_MANAGE);

    // Feedback
    let feedback_read = Router::new()
        .route("/feedback", get(handlers::feedback::list_feedback))
        .route("/feedback/:id", get(handlers::feedback::get_feedback))
        .route("/feedback/:id", delete(handlers::feedback::delete_feedback))
        .with_permission(perm::FEEDBACK_READ);
    let feedback_create = Router::new()
        .route("/feedback", post(handlers::feedback::submit_feedback))
        .with_permission(perm::FEEDBACK_CREATE);

    // Uploads
    let uploads = Router::new()
        .route("/uploads/:category", post(handlers::uploads::upload_file))
        .route(
            "/uploads/:category/:filename",
            delete(handlers::uploads::delete_file),
        )
        .with_permission(perm::UPLOADS_MANAGE);

    Router::new()
        .route("/status", get(api_status))
        .merge(customers_read)
        .merge(customers_manage)
        .merge(vehicles_read)
        .merge(vehicles_manage)
        .merge(dealers_read)
        .merge(dealers_manage)
        .merge(quotations_read)
        .merge(quotations_create)
        .merge(quotations_transition)
        .merge(quotations_delete)
        .merge(orders_read)
        .merge(orders_update)
        .merge(orders_delete)
        .merge(dealer_orders_read)
        .merge(dealer_orders_manage)
        .merge(invoices_read)
        .merge(invoices_manage)
        .merge(installments_read)
        .merge(installments_manage)
        .merge(payments_read)
        .merge(payments_manage)
        .merge(appointments_read)
        .merge(appointments_manage)
        .merge(feedback_read)
        .merge(feedback_create)
        .merge(uploads)
}

/// Unauthenticated surface, mounted under `/api/public`.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/quotations/:id/accept",
            post(handlers::public::accept_quotation),
        )
        .route(
            "/quotations/:id/reject",
            post(handlers::public::reject_quotation),
        )
        .route("/appointments", post(handlers::public::request_appointment))
        .route("/feedback", post(handlers::public::submit_feedback))
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "evdms-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;

    #[test]
    fn success_response_carries_data_and_timestamp() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, Some("ok"));
        let meta = response.meta.expect("metadata expected");
        chrono::DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn pagination_rounds_up() {
        let page: PaginatedResponse<u8> = PaginatedResponse::new(vec![], 41, 1, 20);
        assert_eq!(page.total_pages, 3);
        let empty: PaginatedResponse<u8> = PaginatedResponse::new(vec![], 0, 1, 20);
        assert_eq!(empty.total_pages, 0);
    }
}
