//! Role and permission enforcement across the authenticated API surface.

mod common;

use axum::http::Method;
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires SQLite integration environment"]
async fn requests_without_a_token_are_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/quotations", None, None)
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore = "requires SQLite integration environment"]
async fn customers_cannot_manage_the_catalog() {
    let app = TestApp::new().await;
    let token = app.token_for("customer", None);

    let response = app
        .request(
            Method::POST,
            "/api/v1/vehicle-models",
            Some(json!({ "name": "Forbidden Model", "base_price": "30000.00" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore = "requires SQLite integration environment"]
async fn dealer_staff_cannot_touch_other_dealers_orders() {
    let app = TestApp::new().await;

    let other_dealer = Uuid::new_v4();
    let token = app.token_for("dealer_staff", Some(Uuid::new_v4()));

    let (_, variant) = app.seed_vehicle("RBAC-SCOPE-SKU", dec!(4000.00)).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/dealer-orders",
            Some(json!({
                "dealer_id": other_dealer,
                "items": [{ "variant_id": variant.id, "quantity": 1 }]
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore = "requires SQLite integration environment"]
async fn only_admins_may_delete_orders() {
    let app = TestApp::new().await;
    let token = app.token_for("evm_staff", None);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/orders/{}", Uuid::new_v4()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore = "requires SQLite integration environment"]
async fn public_routes_accept_anonymous_requests() {
    let app = TestApp::new().await;
    let customer = app.seed_customer("anon@test.com").await;
    let dealer = Uuid::new_v4();
    let (_, variant) = app.seed_vehicle("PUBLIC-APPT-SKU", dec!(2000.00)).await;

    let response = app
        .request(
            Method::POST,
            "/api/public/appointments",
            Some(json!({
                "customer_id": customer.id,
                "dealer_id": dealer,
                "variant_id": variant.id,
                "scheduled_at": "2030-06-01T10:00:00Z"
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), 201);
}
