//! Amortization schedule math plus the installment-plan HTTP flow.

mod common;

use axum::{body, http::Method, response::Response};
use chrono::NaiveDate;
use common::TestApp;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use evdms_api::services::installments::build_schedule;
use evdms_api::services::{customers::CreateCustomerRequest, dealers::CreateDealerRequest};

async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

#[test]
fn principal_portions_sum_to_loan_exactly() {
    // 12000 total with 2000 down: 10000 financed over 10 months.
    let first = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    let schedule = build_schedule(dec!(10000.00), dec!(6.0), 10, first).unwrap();

    assert_eq!(schedule.len(), 10);
    let principal_sum: Decimal = schedule.iter().map(|line| line.principal).sum();
    assert_eq!(principal_sum, dec!(10000.00));
    for (i, line) in schedule.iter().enumerate() {
        assert_eq!(line.installment_number, (i + 1) as i32);
        assert_eq!(line.amount, line.principal + line.interest);
    }
}

#[test]
fn rounding_remainder_lands_in_last_installment() {
    let first = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    // 1000 / 3 does not divide evenly in cents.
    let schedule = build_schedule(dec!(1000.00), dec!(0), 3, first).unwrap();

    assert_eq!(schedule[0].principal, dec!(333.33));
    assert_eq!(schedule[1].principal, dec!(333.33));
    assert_eq!(schedule[2].principal, dec!(333.34));
    let total: Decimal = schedule.iter().map(|line| line.principal).sum();
    assert_eq!(total, dec!(1000.00));
}

#[test]
fn interest_declines_with_outstanding_balance() {
    let first = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let schedule = build_schedule(dec!(12000.00), dec!(12.0), 12, first).unwrap();

    // 1% monthly on the declining balance.
    assert_eq!(schedule[0].interest, dec!(120.00));
    assert!(schedule[1].interest < schedule[0].interest);
    assert!(schedule[11].interest < schedule[1].interest);
}

#[test]
fn schedule_rejects_degenerate_inputs() {
    let first = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    assert!(build_schedule(dec!(0), dec!(5), 12, first).is_err());
    assert!(build_schedule(dec!(1000), dec!(-1), 12, first).is_err());
    assert!(build_schedule(dec!(1000), dec!(5), 0, first).is_err());
    assert!(build_schedule(dec!(1000), dec!(5), 121, first).is_err());
}

/// Drives the dealer wholesale flow far enough to obtain an invoice, then
/// exercises plan creation and schedule payment over HTTP.
#[tokio::test]
#[ignore = "requires SQLite integration environment"]
async fn plan_creation_and_payment_flow() {
    let app = TestApp::new().await;

    let dealer = app
        .state
        .services
        .dealers
        .create_dealer(CreateDealerRequest {
            name: "Plan Flow Motors".to_string(),
            region: Some("north".to_string()),
        })
        .await
        .expect("seed dealer");
    let _ = app
        .state
        .services
        .customers
        .create_customer(CreateCustomerRequest {
            full_name: "Plan Flow Contact".to_string(),
            email: "planflow@test.com".to_string(),
            phone: None,
            address: None,
        })
        .await;
    let (_, variant) = app.seed_vehicle("PLAN-FLOW-SKU", dec!(6000.00)).await;

    let order = app
        .request_authenticated(
            Method::POST,
            "/api/v1/dealer-orders",
            Some(json!({
                "dealer_id": dealer.id,
                "items": [{ "variant_id": variant.id, "quantity": 2 }],
                "notes": "Q4 stock replenishment"
            })),
        )
        .await;
    assert_eq!(order.status(), 201);
    let order_body = response_json(order).await;
    assert_eq!(order_body["data"]["notes"], "Q4 stock replenishment");
    let order_id = order_body["data"]["id"]
        .as_str()
        .expect("dealer order id")
        .to_string();

    let submit = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/dealer-orders/{}/status", order_id),
            Some(json!({ "status": "submitted" })),
        )
        .await;
    assert_eq!(submit.status(), 200);

    let quotation = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/dealer-orders/{}/quotation", order_id),
            Some(json!({ "discount_percent": "0" })),
        )
        .await;
    assert_eq!(quotation.status(), 201);
    let quotation_id = response_json(quotation).await["data"]["id"]
        .as_str()
        .expect("quotation id")
        .to_string();

    let invoice = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/invoices/from-quotation/{}", quotation_id),
            None,
        )
        .await;
    assert_eq!(invoice.status(), 201);
    let invoice_id = response_json(invoice).await["data"]["id"]
        .as_str()
        .expect("invoice id")
        .to_string();

    // 12000 total, 2000 down, 10 months.
    let plan = app
        .request_authenticated(
            Method::POST,
            "/api/v1/installment-plans",
            Some(json!({
                "invoice_id": invoice_id,
                "down_payment": "2000.00",
                "interest_rate": "6.0",
                "term_months": 10,
                "first_payment_date": "2026-10-01"
            })),
        )
        .await;
    assert_eq!(plan.status(), 201);
    let plan_body = response_json(plan).await;
    assert_eq!(plan_body["data"]["loan_amount"], "10000.00");
    let schedules = plan_body["data"]["schedules"]
        .as_array()
        .expect("schedules");
    assert_eq!(schedules.len(), 10);

    let first_schedule_id = schedules[0]["id"].as_str().expect("schedule id");

    let pay = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/installment-schedules/{}/pay", first_schedule_id),
            Some(json!({})),
        )
        .await;
    assert_eq!(pay.status(), 200);
    assert_eq!(response_json(pay).await["data"]["status"], "paid");

    // Paying the same row twice must conflict.
    let again = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/installment-schedules/{}/pay", first_schedule_id),
            Some(json!({})),
        )
        .await;
    assert_eq!(again.status(), 409);
}
