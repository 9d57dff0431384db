//! Router tests over the in-memory ports

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use domain_treasury::ChequeStatus;
use interface_api::{config::ApiConfig, create_router, AppState};
use test_utils::*;

struct TestApp {
    router: Router,
    receivables: ReceivablesScenario,
    payables: PayablesScenario,
}

async fn app(outstanding: Decimal, bank_balance: Decimal) -> TestApp {
    let receivables = ReceivablesScenario::new(outstanding).await;
    let payables = PayablesScenario::new(bank_balance).await;
    let state = AppState::new(receivables.port(), payables.port(), ApiConfig::default()).unwrap();
    TestApp {
        router: create_router(state),
        receivables,
        payables,
    }
}

async fn send(router: &Router, method: &str, uri: &str, role: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder.header("x-caller-role", role);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Decimals serialize as strings
fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.to_string().parse().unwrap(),
        other => panic!("expected a decimal, got {}", other),
    }
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_needs_no_role() {
        let app = app(dec!(0), dec!(0)).await;

        let (status, body) = send(&app.router, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&app.router, "GET", "/health/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["stores"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_api_requires_caller_role() {
        let app = app(dec!(0), dec!(0)).await;
        let uri = format!("/api/v1/customers/{}/outstanding-invoices", app.receivables.customer_id.as_uuid());

        let (status, body) = send(&app.router, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");

        let (status, _) = send(&app.router, "GET", &uri, Some("auditor"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

mod settlement_tests {
    use super::*;

    #[tokio::test]
    async fn test_bank_settlement_across_invoices() {
        let app = app(dec!(1500), dec!(0)).await;
        let s = &app.receivables;
        let product = s.add_product("Ceylon Tea 400g", 50).await;
        let first = s.order("INV-1001").with_line(product, 1, dec!(1000), dec!(0)).insert(&s.store).await;
        let second = s.order("INV-1002").with_line(product, 1, dec!(500), dec!(0)).insert(&s.store).await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/settlements",
            Some("staff"),
            Some(json!({
                "customer_id": s.customer_id.as_uuid(),
                "amount": "1200.00",
                "payment_date": "2024-03-20",
                "method": "bank",
                "deposit_account_id": s.bank_account_id.as_uuid(),
                "selections": [
                    { "invoice_id": first.id().as_uuid(), "settle_amount": "1000.00" },
                    { "invoice_id": second.id().as_uuid(), "settle_amount": "200.00" }
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["created_count"], 2);
        assert_eq!(body["failed_count"], 0);
        assert_eq!(decimal(&body["total_allocated"]), dec!(1200));
        assert_eq!(decimal(&body["customer_outstanding"]), dec!(300));
        assert_eq!(s.account_balance(s.bank_account_id).await, MoneyFixtures::lkr(dec!(1200)));
    }

    #[tokio::test]
    async fn test_over_allocation_is_unprocessable() {
        let app = app(dec!(2000), dec!(0)).await;
        let s = &app.receivables;
        let product = s.add_product("Basmati 5kg", 10).await;
        let first = s.order("INV-2001").with_line(product, 1, dec!(1000), dec!(0)).insert(&s.store).await;
        let second = s.order("INV-2002").with_line(product, 1, dec!(1000), dec!(0)).insert(&s.store).await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/settlements",
            Some("staff"),
            Some(json!({
                "customer_id": s.customer_id.as_uuid(),
                "amount": "1000.00",
                "payment_date": "2024-03-20",
                "method": "cash",
                "selections": [
                    { "invoice_id": first.id().as_uuid(), "settle_amount": "700.00" },
                    { "invoice_id": second.id().as_uuid(), "settle_amount": "500.00" }
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "over_allocation");
        assert_eq!(s.outstanding().await, MoneyFixtures::lkr(dec!(2000)));
    }

    #[tokio::test]
    async fn test_oversized_settle_amounts_are_rejected() {
        let app = app(dec!(2000), dec!(0)).await;
        let s = &app.receivables;
        let product = s.add_product("Basmati 5kg", 10).await;
        let first = s.order("INV-2003").with_line(product, 1, dec!(1000), dec!(0)).insert(&s.store).await;
        let second = s.order("INV-2004").with_line(product, 1, dec!(1000), dec!(0)).insert(&s.store).await;

        // each is just over half of Decimal::MAX
        let huge = "39614081257132168796771976168";
        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/settlements",
            Some("staff"),
            Some(json!({
                "customer_id": s.customer_id.as_uuid(),
                "amount": "1000.00",
                "payment_date": "2024-03-20",
                "method": "cash",
                "selections": [
                    { "invoice_id": first.id().as_uuid(), "settle_amount": huge },
                    { "invoice_id": second.id().as_uuid(), "settle_amount": huge }
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "invalid_amount");
        assert_eq!(s.store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_method_is_bad_request() {
        let app = app(dec!(0), dec!(0)).await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/settlements",
            Some("staff"),
            Some(json!({
                "customer_id": app.receivables.customer_id.as_uuid(),
                "amount": "100.00",
                "payment_date": "2024-03-20",
                "method": "barter",
                "selections": []
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_outstanding_invoices_listing() {
        let app = app(dec!(600), dec!(0)).await;
        let s = &app.receivables;
        let product = s.add_product("Coconut Oil 1L", 20).await;
        s.order("INV-3001")
            .with_line(product, 1, dec!(1000), dec!(0))
            .with_cash_payment(dec!(400))
            .insert(&s.store)
            .await;
        s.order("INV-3002")
            .with_line(product, 1, dec!(800), dec!(0))
            .with_cash_payment(dec!(800))
            .insert(&s.store)
            .await;

        let uri = format!("/api/v1/customers/{}/outstanding-invoices", s.customer_id.as_uuid());
        let (status, body) = send(&app.router, "GET", &uri, Some("staff"), None).await;

        assert_eq!(status, StatusCode::OK);
        let invoices = body.as_array().unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0]["order_number"], "INV-3001");
        assert_eq!(decimal(&invoices[0]["balance"]), dec!(600));
    }

    #[tokio::test]
    async fn test_unknown_customer_is_not_found() {
        let app = app(dec!(0), dec!(0)).await;
        let uri = format!("/api/v1/customers/{}/outstanding-invoices", uuid::Uuid::now_v7());

        let (status, body) = send(&app.router, "GET", &uri, Some("staff"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "customer_not_found");
    }
}

mod cheque_tests {
    use super::*;

    #[tokio::test]
    async fn test_deposited_cheque_returned() {
        let app = app(dec!(0), dec!(0)).await;
        let s = &app.receivables;
        let product = s.add_product("Sugar 1kg", 30).await;
        let seeded = s
            .order("INV-4001")
            .with_line(product, 1, dec!(5000), dec!(0))
            .with_cheque_payment(dec!(5000), ChequeStatus::Deposited)
            .insert(&s.store)
            .await;
        let uri = format!("/api/v1/payments/{}/cheque-status", seeded.payments[0].id.as_uuid());

        let (status, body) = send(&app.router, "POST", &uri, Some("staff"), Some(json!({ "status": "returned" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["previous_status"], "deposited");
        assert_eq!(body["payment"]["cheque_status"], "returned");
        assert_eq!(body["order_payment_status"], "unpaid");
        assert_eq!(decimal(&body["customer_outstanding"]), dec!(5000));
    }

    #[tokio::test]
    async fn test_terminal_cheque_is_conflict() {
        let app = app(dec!(0), dec!(0)).await;
        let s = &app.receivables;
        let product = s.add_product("Flour 1kg", 30).await;
        let seeded = s
            .order("INV-4002")
            .with_line(product, 1, dec!(2500), dec!(0))
            .with_cheque_payment(dec!(2500), ChequeStatus::Passed)
            .insert(&s.store)
            .await;
        let uri = format!("/api/v1/payments/{}/cheque-status", seeded.payments[0].id.as_uuid());

        let (status, body) = send(&app.router, "POST", &uri, Some("admin"), Some(json!({ "status": "returned" }))).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "invalid_transition");
    }

    #[tokio::test]
    async fn test_unknown_payment_is_not_found() {
        let app = app(dec!(0), dec!(0)).await;
        let uri = format!("/api/v1/payments/{}/cheque-status", uuid::Uuid::now_v7());

        let (status, body) = send(&app.router, "POST", &uri, Some("staff"), Some(json!({ "status": "deposited" }))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "payment_not_found");
    }
}

mod adjustment_tests {
    use super::*;

    #[tokio::test]
    async fn test_admin_cancel_restores_balance_and_stock() {
        let app = app(dec!(6000), dec!(0)).await;
        let s = &app.receivables;
        let product = s.add_product("Milk Powder 400g", 5).await;
        let seeded = s
            .order("INV-5001")
            .with_line(product, 10, dec!(1000), dec!(0))
            .with_cash_payment(dec!(4000))
            .insert(&s.store)
            .await;
        let uri = format!("/api/v1/orders/{}/adjustments", seeded.id().as_uuid());

        let (status, body) = send(&app.router, "POST", &uri, Some("admin"), Some(json!({ "action": "cancel" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "cancel");
        assert_eq!(body["order_status"], "cancelled");
        assert_eq!(decimal(&body["customer_credit"]), dec!(6000));
        assert_eq!(decimal(&body["customer_outstanding"]), dec!(0));
        assert_eq!(s.stock(product).await, 15);
    }

    #[tokio::test]
    async fn test_staff_cannot_cancel() {
        let app = app(dec!(1000), dec!(0)).await;
        let s = &app.receivables;
        let product = s.add_product("Dhal 1kg", 5).await;
        let seeded = s.order("INV-5002").with_line(product, 1, dec!(1000), dec!(0)).insert(&s.store).await;
        let uri = format!("/api/v1/orders/{}/adjustments", seeded.id().as_uuid());

        let (status, body) = send(&app.router, "POST", &uri, Some("staff"), Some(json!({ "action": "cancel" }))).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "insufficient_role");
        assert_eq!(s.stock(product).await, 5);
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected() {
        let app = app(dec!(0), dec!(0)).await;
        let uri = format!("/api/v1/orders/{}/adjustments", uuid::Uuid::now_v7());

        let (status, body) = send(&app.router, "POST", &uri, Some("admin"), Some(json!({ "action": "refund" }))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "invalid_action");
    }

    #[tokio::test]
    async fn test_partial_return_recomputes_totals() {
        let app = app(dec!(9000), dec!(0)).await;
        let s = &app.receivables;
        let product = s.add_product("Soap Bar", 0).await;
        let seeded = s
            .order("INV-5003")
            .with_line(product, 25, dec!(400), dec!(0))
            .with_discount(dec!(1000))
            .insert(&s.store)
            .await;
        let uri = format!("/api/v1/orders/{}/adjustments", seeded.id().as_uuid());

        let (status, body) = send(
            &app.router,
            "POST",
            &uri,
            Some("admin"),
            Some(json!({
                "action": "return",
                "items": [{ "order_item_id": seeded.items[0].id.as_uuid(), "quantity": 5 }]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "partial_return");
        assert_eq!(decimal(&body["subtotal"]), dec!(8000));
        assert_eq!(decimal(&body["discount_amount"]), dec!(800));
        assert_eq!(decimal(&body["total_amount"]), dec!(7200));
        assert_eq!(body["units_restocked"], 5);
        assert_eq!(s.stock(product).await, 5);
    }
}

mod supplier_tests {
    use super::*;

    #[tokio::test]
    async fn test_overdraft_needs_confirmation() {
        let app = app(dec!(0), dec!(10000)).await;
        let p = &app.payables;
        let (purchase, _) = p.purchase("GRN-7001").with_line(1, dec!(15000), dec!(0)).insert(&p.store).await;

        let mut body = json!({
            "purchase_id": purchase.id.as_uuid(),
            "amount": "12000.00",
            "payment_date": "2024-03-22",
            "method": "bank",
            "account_id": p.bank_account_id.as_uuid()
        });

        let (status, response) = send(&app.router, "POST", "/api/v1/supplier-payments", Some("staff"), Some(body.clone())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(response["error"], "overdraft_not_confirmed");
        assert_eq!(decimal(&response["details"]["new_balance"]), dec!(-2000));
        assert_eq!(p.account_balance(p.bank_account_id).await, MoneyFixtures::lkr(dec!(10000)));

        body["overdraft_confirmed"] = json!(true);
        let (status, response) = send(&app.router, "POST", "/api/v1/supplier-payments", Some("staff"), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(decimal(&response["account_balance"]), dec!(-2000));
        assert_eq!(decimal(&response["purchase"]["balance_due"]), dec!(3000));
        assert_eq!(response["purchase"]["payment_status"], "partial");
    }

    #[tokio::test]
    async fn test_supplier_cheque_requires_admin() {
        let app = app(dec!(0), dec!(10000)).await;
        let p = &app.payables;
        let (_, cheques) = p
            .purchase("GRN-7002")
            .with_line(1, dec!(6000), dec!(0))
            .with_issued_cheque(dec!(6000), ChequeStatus::Pending, p.bank_account_id)
            .insert(&p.store)
            .await;
        let uri = format!("/api/v1/supplier-payments/{}/cheque-status", cheques[0].id.as_uuid());

        let (status, body) = send(&app.router, "POST", &uri, Some("staff"), Some(json!({ "status": "passed" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "insufficient_role");

        let (status, body) = send(&app.router, "POST", &uri, Some("admin"), Some(json!({ "status": "passed" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["payment"]["cheque_status"], "passed");
        assert_eq!(decimal(&body["account_balance"]), dec!(4000));
    }

    #[tokio::test]
    async fn test_overdraft_preview() {
        let app = app(dec!(0), dec!(10000)).await;
        let p = &app.payables;

        let uri = format!("/api/v1/accounts/{}/overdraft-advisory?amount=2500", p.bank_account_id.as_uuid());
        let (status, body) = send(&app.router, "GET", &uri, Some("staff"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["advisory"].is_null());

        let uri = format!("/api/v1/accounts/{}/overdraft-advisory?amount=12500", p.bank_account_id.as_uuid());
        let (status, body) = send(&app.router, "GET", &uri, Some("staff"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&body["advisory"]["new_balance"]), dec!(-2500));
        assert_eq!(body["advisory"]["facility"], false);
    }
}
