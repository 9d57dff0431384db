//! Scenario tests for domain_payables

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{PurchaseId, SupplierPaymentId};
use domain_payables::{PayablesError, PayablesSettlement, PurchaseStatus, SupplierPaymentRequest};
use domain_treasury::{AccountKind, CallerRole, ChequeStatus, PaymentMethod, PaymentStatus};
use test_utils::*;

fn request(purchase_id: PurchaseId, amount: Decimal, method: PaymentMethod, s: &PayablesScenario) -> SupplierPaymentRequest {
    SupplierPaymentRequest {
        purchase_id,
        amount: MoneyFixtures::lkr(amount),
        payment_date: DateFixtures::payment_date(),
        method,
        cheque: None,
        account_id: Some(s.bank_account_id),
        notes: None,
        overdraft_confirmed: false,
    }
}

mod record_payment_tests {
    use super::*;

    #[tokio::test]
    async fn test_bank_payment_debits_account_immediately() {
        let s = PayablesScenario::new(dec!(50000)).await;
        let (purchase, _) = s.purchase("PO-2001").with_line(10, dec!(2000), dec!(0)).insert(&s.store).await;
        let settlement = PayablesSettlement::new(s.port());

        let outcome = settlement
            .record_supplier_payment(request(purchase.id, dec!(12000), PaymentMethod::Bank, &s), CallerRole::Staff)
            .await
            .unwrap();

        assert_money_eq(outcome.purchase.balance_due, dec!(8000));
        assert_eq!(outcome.purchase.payment_status, PaymentStatus::Partial);
        assert_money_eq(s.account_balance(s.bank_account_id).await, dec!(38000));
        assert!(outcome.advisory.is_none());
        assert!(outcome.payment.payment_number.starts_with("SPAY-"));

        let stored = s.store.purchase(purchase.id).await.unwrap();
        assert_money_eq(stored.balance_due, dec!(8000));
    }

    #[tokio::test]
    async fn test_cheque_payment_waits_for_clearance() {
        let s = PayablesScenario::new(dec!(50000)).await;
        let (purchase, _) = s.purchase("PO-2002").with_line(1, dec!(20000), dec!(0)).insert(&s.store).await;

        let cheque = SupplierPaymentRequest {
            cheque: Some(ChequeFixtures::issued()),
            ..request(purchase.id, dec!(20000), PaymentMethod::Cheque, &s)
        };
        let outcome = PayablesSettlement::new(s.port())
            .record_supplier_payment(cheque, CallerRole::Staff)
            .await
            .unwrap();

        assert_eq!(outcome.payment.cheque_status, Some(ChequeStatus::Pending));
        assert_eq!(outcome.purchase.payment_status, PaymentStatus::Paid);
        assert!(outcome.purchase.balance_due.is_zero());
        assert!(outcome.account_balance.is_none());
        assert_money_eq(s.account_balance(s.bank_account_id).await, dec!(50000));
    }

    #[tokio::test]
    async fn test_overdraft_requires_confirmation() {
        let s = PayablesScenario::new(dec!(5000)).await;
        let (purchase, _) = s.purchase("PO-2003").with_line(1, dec!(8000), dec!(0)).insert(&s.store).await;
        let settlement = PayablesSettlement::new(s.port());

        let err = settlement
            .record_supplier_payment(request(purchase.id, dec!(8000), PaymentMethod::Bank, &s), CallerRole::Staff)
            .await
            .unwrap_err();

        let advisory = err.advisory().expect("advisory expected");
        assert_money_eq(advisory.current_balance, dec!(5000));
        assert_money_eq(advisory.new_balance, dec!(-3000));
        assert!(s.store.supplier_payments(purchase.id).await.is_empty());

        let confirmed = SupplierPaymentRequest {
            overdraft_confirmed: true,
            ..request(purchase.id, dec!(8000), PaymentMethod::Bank, &s)
        };
        let outcome = settlement
            .record_supplier_payment(confirmed, CallerRole::Staff)
            .await
            .unwrap();

        assert!(outcome.advisory.is_some());
        assert_money_eq(s.account_balance(s.bank_account_id).await, dec!(-3000));
    }

    #[tokio::test]
    async fn test_overdraft_preview() {
        let s = PayablesScenario::new(dec!(1000)).await;
        let od = s.add_account("HNB Overdraft", AccountKind::Overdraft, dec!(0)).await;
        let settlement = PayablesSettlement::new(s.port());

        assert!(settlement
            .overdraft_advisory(s.bank_account_id, MoneyFixtures::lkr(dec!(1000)))
            .await
            .unwrap()
            .is_none());

        let advisory = settlement
            .overdraft_advisory(od, MoneyFixtures::lkr(dec!(250)))
            .await
            .unwrap()
            .unwrap();
        assert!(advisory.facility);

        let err = settlement
            .overdraft_advisory(od, MoneyFixtures::lkr_zero())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_amount");

        // an amount near Decimal::MAX would overflow the projected balance
        let err = settlement
            .overdraft_advisory(od, MoneyFixtures::lkr(Decimal::MAX))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_amount");
    }

    #[tokio::test]
    async fn test_payment_cannot_exceed_balance_due() {
        let s = PayablesScenario::new(dec!(50000)).await;
        let (purchase, _) = s
            .purchase("PO-2004")
            .with_line(1, dec!(10000), dec!(0))
            .with_issued_cheque(dec!(6000), ChequeStatus::Pending, s.bank_account_id)
            .insert(&s.store)
            .await;

        let err = PayablesSettlement::new(s.port())
            .record_supplier_payment(request(purchase.id, dec!(4500), PaymentMethod::Cash, &s), CallerRole::Staff)
            .await
            .unwrap_err();

        match err {
            PayablesError::ExceedsPurchaseBalance { balance, .. } => assert_money_eq(balance, dec!(4000)),
            other => panic!("Expected ExceedsPurchaseBalance, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_validation_failures() {
        let s = PayablesScenario::new(dec!(50000)).await;
        let (purchase, _) = s.purchase("PO-2005").with_line(1, dec!(1000), dec!(0)).insert(&s.store).await;
        let (cancelled, _) = s
            .purchase("PO-2006")
            .with_line(1, dec!(1000), dec!(0))
            .with_status(PurchaseStatus::Cancelled)
            .insert(&s.store)
            .await;
        let settlement = PayablesSettlement::new(s.port());

        let cases = vec![
            (request(purchase.id, dec!(0), PaymentMethod::Cash, &s), "invalid_amount"),
            (request(purchase.id, Decimal::MAX, PaymentMethod::Cash, &s), "invalid_amount"),
            (request(PurchaseId::new(), dec!(100), PaymentMethod::Cash, &s), "purchase_not_found"),
            (request(cancelled.id, dec!(100), PaymentMethod::Cash, &s), "purchase_cancelled"),
            (request(purchase.id, dec!(100), PaymentMethod::Credit, &s), "unsupported_method"),
            (
                SupplierPaymentRequest { account_id: None, ..request(purchase.id, dec!(100), PaymentMethod::Cash, &s) },
                "missing_account",
            ),
            (request(purchase.id, dec!(100), PaymentMethod::Cheque, &s), "missing_cheque_details"),
        ];

        for (req, expected) in cases {
            let err = settlement.record_supplier_payment(req, CallerRole::Staff).await.unwrap_err();
            assert_eq!(err.kind(), expected);
        }
        assert!(s.store.supplier_payments(purchase.id).await.is_empty());
        assert_money_eq(s.account_balance(s.bank_account_id).await, dec!(50000));
    }

    #[tokio::test]
    async fn test_stale_purchase_total_recomputed_from_lines() {
        let s = PayablesScenario::new(dec!(50000)).await;
        let (mut purchase, _) = s.purchase("PO-2007").with_line(4, dec!(500), dec!(10)).insert(&s.store).await;
        purchase.total_amount = MoneyFixtures::lkr(dec!(2000));
        purchase.balance_due = MoneyFixtures::lkr(dec!(2000));
        s.store.add_purchase(purchase.clone()).await;

        // 4 x 500 less 10% is 1,800, not the stored 2,000
        let err = PayablesSettlement::new(s.port())
            .record_supplier_payment(request(purchase.id, dec!(1900), PaymentMethod::Cash, &s), CallerRole::Staff)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "exceeds_purchase_balance");
    }
}

mod cheque_tests {
    use super::*;

    #[tokio::test]
    async fn test_passed_cheque_debits_account() {
        let s = PayablesScenario::new(dec!(10000)).await;
        let (purchase, payments) = s
            .purchase("PO-3001")
            .with_line(1, dec!(6000), dec!(0))
            .with_issued_cheque(dec!(6000), ChequeStatus::Pending, s.bank_account_id)
            .insert(&s.store)
            .await;
        assert_eq!(purchase.payment_status, PaymentStatus::Paid);

        let outcome = PayablesSettlement::new(s.port())
            .transition_supplier_cheque(payments[0].id, ChequeStatus::Passed, CallerRole::Admin)
            .await
            .unwrap();

        assert_eq!(outcome.previous_status, ChequeStatus::Pending);
        assert_money_eq(s.account_balance(s.bank_account_id).await, dec!(4000));
        assert!(outcome.advisory.is_none());
        assert_eq!(outcome.purchase.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_passed_cheque_may_overdraw() {
        let s = PayablesScenario::new(dec!(1000)).await;
        let (_, payments) = s
            .purchase("PO-3002")
            .with_line(1, dec!(6000), dec!(0))
            .with_issued_cheque(dec!(6000), ChequeStatus::Pending, s.bank_account_id)
            .insert(&s.store)
            .await;

        let outcome = PayablesSettlement::new(s.port())
            .transition_supplier_cheque(payments[0].id, ChequeStatus::Passed, CallerRole::Admin)
            .await
            .unwrap();

        let advisory = outcome.advisory.unwrap();
        assert_money_eq(advisory.new_balance, dec!(-5000));
        assert_money_eq(s.account_balance(s.bank_account_id).await, dec!(-5000));
    }

    #[tokio::test]
    async fn test_returned_cheque_restores_balance_due() {
        let s = PayablesScenario::new(dec!(10000)).await;
        let (purchase, payments) = s
            .purchase("PO-3003")
            .with_line(2, dec!(2500), dec!(0))
            .with_issued_cheque(dec!(5000), ChequeStatus::Pending, s.bank_account_id)
            .insert(&s.store)
            .await;

        let outcome = PayablesSettlement::new(s.port())
            .transition_supplier_cheque(payments[0].id, ChequeStatus::Returned, CallerRole::Admin)
            .await
            .unwrap();

        assert_money_eq(outcome.purchase.balance_due, dec!(5000));
        assert_eq!(outcome.purchase.payment_status, PaymentStatus::Unpaid);
        assert!(outcome.account_balance.is_none());
        assert_money_eq(s.account_balance(s.bank_account_id).await, dec!(10000));
        assert_money_eq(s.store.purchase(purchase.id).await.unwrap().balance_due, dec!(5000));
    }

    #[tokio::test]
    async fn test_issued_cheque_has_no_deposited_state() {
        let s = PayablesScenario::new(dec!(10000)).await;
        let (_, payments) = s
            .purchase("PO-3004")
            .with_line(1, dec!(1000), dec!(0))
            .with_issued_cheque(dec!(1000), ChequeStatus::Pending, s.bank_account_id)
            .insert(&s.store)
            .await;
        let settlement = PayablesSettlement::new(s.port());

        let err = settlement
            .transition_supplier_cheque(payments[0].id, ChequeStatus::Deposited, CallerRole::Admin)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_transition");

        settlement
            .transition_supplier_cheque(payments[0].id, ChequeStatus::Passed, CallerRole::Admin)
            .await
            .unwrap();
        let err = settlement
            .transition_supplier_cheque(payments[0].id, ChequeStatus::Returned, CallerRole::Admin)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_transition");
        assert_money_eq(s.account_balance(s.bank_account_id).await, dec!(9000));
    }

    #[tokio::test]
    async fn test_cheque_transition_rules() {
        let s = PayablesScenario::new(dec!(10000)).await;
        let (purchase, payments) = s
            .purchase("PO-3005")
            .with_line(1, dec!(3000), dec!(0))
            .with_issued_cheque(dec!(1000), ChequeStatus::Pending, s.bank_account_id)
            .insert(&s.store)
            .await;
        let settlement = PayablesSettlement::new(s.port());

        let err = settlement
            .transition_supplier_cheque(payments[0].id, ChequeStatus::Passed, CallerRole::Staff)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "insufficient_role");

        let err = settlement
            .transition_supplier_cheque(SupplierPaymentId::new(), ChequeStatus::Passed, CallerRole::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, PayablesError::PaymentNotFound(_)));

        let cash = settlement
            .record_supplier_payment(request(purchase.id, dec!(500), PaymentMethod::Cash, &s), CallerRole::Staff)
            .await
            .unwrap();
        let err = settlement
            .transition_supplier_cheque(cash.payment.id, ChequeStatus::Passed, CallerRole::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, PayablesError::NotACheque(_)));
    }
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_payments_never_exceed_purchase_total(
            unit_cost in amount_strategy(100, 20000),
            quantity in 1u32..20,
            attempts in prop::collection::vec(amount_with_cents_strategy(), 1..6),
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let s = PayablesScenario::new(dec!(0)).await;
                let (purchase, _) = s.purchase("PO-P").with_line(quantity, unit_cost, dec!(0)).insert(&s.store).await;
                let settlement = PayablesSettlement::new(s.port());

                let mut accepted = Decimal::ZERO;
                for amount in attempts {
                    let req = SupplierPaymentRequest {
                        overdraft_confirmed: true,
                        ..request(purchase.id, amount, PaymentMethod::Bank, &s)
                    };
                    match settlement.record_supplier_payment(req, CallerRole::Staff).await {
                        Ok(_) => accepted += amount,
                        Err(e) => assert_eq!(e.kind(), "exceeds_purchase_balance"),
                    }
                }

                let stored = s.store.purchase(purchase.id).await.unwrap();
                assert!(accepted <= purchase.total_amount.amount());
                assert!(!stored.balance_due.is_negative());
                assert_money_eq(stored.balance_due, purchase.total_amount.amount() - accepted);
                assert_money_eq(s.account_balance(s.bank_account_id).await, -accepted);
            });
        }
    }
}
