use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EVDMS API",
        version = "1.0.0",
        description = r#"
# EV Dealership Management System API

Backend for an electric-vehicle dealership network: vehicle catalog, retail
quotations and orders, dealer wholesale ordering, invoicing, installment
financing, payments, test-drive appointments and customer feedback.

## Authentication

All `/api/v1` endpoints require a JWT bearer token obtained from `/auth/login`:

```
Authorization: Bearer <your-jwt-token>
```

Endpoints under `/api/public` are unauthenticated and intended for customer-facing
links (quotation accept/reject, appointment requests, feedback).

## Error Handling

Failing requests return a consistent error body:

```json
{
  "error": "Conflict",
  "message": "Quotation is 'accepted' and can no longer be rejected",
  "timestamp": "2026-01-01T00:00:00Z"
}
```

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 20) query
parameters and return `items`, `total`, `page`, `limit` and `total_pages`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "vehicles", description = "Vehicle catalog (models and variants)"),
        (name = "customers", description = "Customer master data"),
        (name = "dealers", description = "Dealer master data"),
        (name = "quotations", description = "Retail quotation workflow"),
        (name = "orders", description = "Retail order lifecycle"),
        (name = "dealer-orders", description = "Dealer wholesale ordering"),
        (name = "invoices", description = "Invoicing"),
        (name = "installments", description = "Installment financing"),
        (name = "payments", description = "Payment recording and settlement"),
        (name = "appointments", description = "Test-drive appointments"),
        (name = "feedback", description = "Customer feedback"),
        (name = "uploads", description = "File uploads"),
        (name = "public", description = "Unauthenticated customer-facing endpoints")
    ),
    paths(
        // Vehicle catalog
        crate::handlers::vehicles::list_models,
        crate::handlers::vehicles::get_model,
        crate::handlers::vehicles::create_model,
        crate::handlers::vehicles::update_model,
        crate::handlers::vehicles::list_variants,
        crate::handlers::vehicles::get_variant,
        crate::handlers::vehicles::create_variant,
        crate::handlers::vehicles::update_variant,

        // Customers
        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,

        // Dealers
        crate::handlers::dealers::list_dealers,
        crate::handlers::dealers::get_dealer,
        crate::handlers::dealers::create_dealer,
        crate::handlers::dealers::update_dealer,
        crate::handlers::dealers::deactivate_dealer,

        // Quotations
        crate::handlers::quotations::list_quotations,
        crate::handlers::quotations::get_quotation,
        crate::handlers::quotations::create_quotation,
        crate::handlers::quotations::update_quotation,
        crate::handlers::quotations::send_quotation,
        crate::handlers::quotations::accept_quotation,
        crate::handlers::quotations::reject_quotation,
        crate::handlers::quotations::delete_quotation,

        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::cancel_order,
        crate::handlers::orders::delete_order,

        // Dealer orders
        crate::handlers::dealer_orders::create_dealer_order,
        crate::handlers::dealer_orders::list_dealer_orders,
        crate::handlers::dealer_orders::get_dealer_order,
        crate::handlers::dealer_orders::update_dealer_order_status,
        crate::handlers::dealer_orders::generate_quotation,

        // Invoices
        crate::handlers::invoices::accept_dealer_quotation,
        crate::handlers::invoices::list_invoices,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::update_invoice_status,

        // Installments
        crate::handlers::installments::create_plan,
        crate::handlers::installments::get_plan,
        crate::handlers::installments::get_plan_for_invoice,
        crate::handlers::installments::mark_installment_paid,

        // Payments
        crate::handlers::payments::record_payment,
        crate::handlers::payments::list_payments,
        crate::handlers::payments::get_payment,
        crate::handlers::payments::update_payment_status,

        // Appointments
        crate::handlers::appointments::book_appointment,
        crate::handlers::appointments::list_appointments,
        crate::handlers::appointments::get_appointment,
        crate::handlers::appointments::update_appointment_status,
        crate::handlers::appointments::delete_appointment,

        // Feedback
        crate::handlers::feedback::submit_feedback,
        crate::handlers::feedback::list_feedback,
        crate::handlers::feedback::get_feedback,
        crate::handlers::feedback::delete_feedback,

        // Uploads
        crate::handlers::uploads::upload_file,
        crate::handlers::uploads::delete_file,

        // Public
        crate::handlers::public::accept_quotation,
        crate::handlers::public::reject_quotation,
        crate::handlers::public::request_appointment,
        crate::handlers::public::submit_feedback,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,
            crate::errors::ErrorResponse,

            // Catalog
            crate::services::vehicles::CreateModelRequest,
            crate::services::vehicles::UpdateModelRequest,
            crate::services::vehicles::CreateVariantRequest,
            crate::services::vehicles::UpdateVariantRequest,

            // Customers and dealers
            crate::services::customers::CreateCustomerRequest,
            crate::services::customers::UpdateCustomerRequest,
            crate::services::dealers::CreateDealerRequest,
            crate::services::dealers::UpdateDealerRequest,

            // Quotations
            crate::services::quotations::CreateQuotationRequest,
            crate::services::quotations::UpdateQuotationRequest,
            crate::services::quotations::RejectQuotationRequest,
            crate::services::quotations::QuotationResponse,
            crate::services::quotations::AcceptQuotationResponse,

            // Orders
            crate::services::orders::UpdateOrderStatusRequest,
            crate::services::orders::OrderResponse,
            crate::handlers::orders::CancelOrderRequest,

            // Dealer orders
            crate::services::dealer_orders::CreateDealerOrderRequest,
            crate::services::dealer_orders::DealerOrderItemRequest,
            crate::services::dealer_orders::DealerOrderResponse,
            crate::services::dealer_orders::DealerOrderItemResponse,
            crate::handlers::dealer_orders::UpdateDealerOrderStatusRequest,
            crate::handlers::dealer_orders::GenerateQuotationRequest,

            // Invoicing and financing
            crate::services::invoicing::InvoiceResponse,
            crate::handlers::invoices::UpdateInvoiceStatusRequest,
            crate::services::installments::CreatePlanRequest,
            crate::services::installments::MarkPaidRequest,
            crate::services::installments::PlanResponse,
            crate::services::installments::ScheduleResponse,

            // Payments
            crate::services::payments::RecordPaymentRequest,
            crate::services::payments::PaymentResponse,
            crate::handlers::payments::UpdatePaymentStatusRequest,

            // Engagement
            crate::services::appointments::BookAppointmentRequest,
            crate::services::appointments::AppointmentResponse,
            crate::handlers::appointments::UpdateAppointmentStatusRequest,
            crate::services::feedback::SubmitFeedbackRequest,
            crate::services::feedback::FeedbackResponse,

            // Uploads
            crate::services::uploads::StoredFile,
        )
    ),
    modifiers(&BearerSecurity)
)]
pub struct ApiDocV1;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_generates() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("EVDMS API"));
        assert!(json.contains("/api/v1/quotations"));
        assert!(json.contains("Bearer"));
        // Wire-facing schedule schema is registered; the internal
        // amortization line type stays out of the document.
        assert!(json.contains("ScheduleResponse"));
        assert!(!json.contains("\"ScheduleLine\""));
    }
}
