pub mod appointments;
pub mod customers;
pub mod dealer_orders;
pub mod dealers;
pub mod feedback;
pub mod installments;
pub mod invoices;
pub mod orders;
pub mod payments;
pub mod public;
pub mod quotations;
pub mod uploads;
pub mod vehicles;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<crate::services::customers::CustomerService>,
    pub dealers: Arc<crate::services::dealers::DealerService>,
    pub vehicles: Arc<crate::services::vehicles::VehicleService>,
    pub quotations: Arc<crate::services::quotations::QuotationService>,
    pub orders: Arc<crate::services::orders::OrderService>,
    pub dealer_orders: Arc<crate::services::dealer_orders::DealerOrderService>,
    pub invoices: Arc<crate::services::invoicing::InvoiceService>,
    pub installments: Arc<crate::services::installments::InstallmentService>,
    pub payments: Arc<crate::services::payments::PaymentService>,
    pub appointments: Arc<crate::services::appointments::AppointmentService>,
    pub feedback: Arc<crate::services::feedback::FeedbackService>,
    pub uploads: Arc<crate::services::uploads::UploadService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let customers = Arc::new(crate::services::customers::CustomerService::new(
            db_pool.clone(),
        ));
        let dealers = Arc::new(crate::services::dealers::DealerService::new(db_pool.clone()));
        let vehicles = Arc::new(crate::services::vehicles::VehicleService::new(
            db_pool.clone(),
        ));
        let quotations = Arc::new(crate::services::quotations::QuotationService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
            config.quotation_validity_days,
        ));
        let orders = Arc::new(crate::services::orders::OrderService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let dealer_orders = Arc::new(crate::services::dealer_orders::DealerOrderService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
            config.quotation_validity_days,
        ));
        let invoices = Arc::new(crate::services::invoicing::InvoiceService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
            config.invoice_payment_term_days,
        ));
        let installments = Arc::new(crate::services::installments::InstallmentService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let payments = Arc::new(crate::services::payments::PaymentService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let appointments = Arc::new(crate::services::appointments::AppointmentService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let feedback = Arc::new(crate::services::feedback::FeedbackService::new(
            db_pool,
            Some(event_sender),
        ));
        let uploads = Arc::new(crate::services::uploads::UploadService::new(
            config.upload_dir.clone(),
        ));

        Self {
            customers,
            dealers,
            vehicles,
            quotations,
            orders,
            dealer_orders,
            invoices,
            installments,
            payments,
            appointments,
            feedback,
            uploads,
        }
    }
}
