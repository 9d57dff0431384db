//! Cheque rules, payment status and overdraft advisories

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{BankId, Currency, Money};
use domain_treasury::{
    counts_toward_balance, generate_payment_number, validate_transition, AccountKind, CallerRole,
    ChequeDirection, ChequeMeta, ChequeStatus, CompanyAccount, PaymentStatus, TreasuryError,
};

fn lkr(v: rust_decimal::Decimal) -> Money {
    Money::new(v, Currency::LKR)
}

mod lifecycle_tests {
    use super::*;
    use ChequeStatus::*;

    const ALL: [ChequeStatus; 4] = [Pending, Deposited, Passed, Returned];

    #[test]
    fn test_received_cheque_transitions() {
        let allowed = [
            (Pending, Deposited),
            (Pending, Passed),
            (Pending, Returned),
            (Deposited, Passed),
            (Deposited, Returned),
        ];

        for from in ALL {
            for to in ALL {
                let result = validate_transition(ChequeDirection::Received, from, to);
                assert_eq!(result.is_ok(), allowed.contains(&(from, to)), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_issued_cheques_skip_deposit() {
        for from in ALL {
            for to in ALL {
                let ok = validate_transition(ChequeDirection::Issued, from, to).is_ok();
                assert_eq!(ok, from == Pending && matches!(to, Passed | Returned), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_terminal_statuses_reject_everything() {
        for from in [Passed, Returned] {
            assert!(from.is_terminal());
            let err = validate_transition(ChequeDirection::Received, from, Deposited).unwrap_err();
            assert_eq!(err.kind(), "invalid_transition");
        }
    }

    #[test]
    fn test_only_returned_cheques_stop_counting() {
        assert!(counts_toward_balance(None));
        assert!(counts_toward_balance(Some(Pending)));
        assert!(counts_toward_balance(Some(Deposited)));
        assert!(counts_toward_balance(Some(Passed)));
        assert!(!counts_toward_balance(Some(Returned)));
    }
}

mod cheque_details_tests {
    use super::*;

    #[test]
    fn test_received_cheque_needs_bank() {
        let meta = ChequeMeta {
            cheque_number: Some("  452201 ".to_string()),
            cheque_date: NaiveDate::from_ymd_opt(2026, 2, 1),
            bank_id: None,
        };

        let err = meta.validate(true).unwrap_err();
        assert!(matches!(err, TreasuryError::MissingChequeDetails(ref m) if m.contains("bank")));

        let details = meta.validate(false).unwrap();
        assert_eq!(details.cheque_number, "452201");
    }

    #[test]
    fn test_complete_cheque_validates() {
        let meta = ChequeMeta {
            cheque_number: Some("452201".to_string()),
            cheque_date: NaiveDate::from_ymd_opt(2026, 2, 1),
            bank_id: Some(BankId::new_v7()),
        };
        assert!(meta.validate(true).is_ok());
    }

    #[test]
    fn test_blank_number_is_missing() {
        let meta = ChequeMeta {
            cheque_number: Some("   ".to_string()),
            cheque_date: None,
            bank_id: None,
        };
        let err = meta.validate(false).unwrap_err();
        assert_eq!(err.kind(), "missing_cheque_details");
        assert!(err.to_string().contains("cheque number"));
        assert!(err.to_string().contains("cheque date"));
    }
}

mod status_tests {
    use super::*;

    #[test]
    fn test_payment_status_boundaries() {
        assert_eq!(PaymentStatus::from_amounts(lkr(dec!(0)), lkr(dec!(5000))), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::from_amounts(lkr(dec!(0.01)), lkr(dec!(5000))), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::from_amounts(lkr(dec!(5000)), lkr(dec!(5000))), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from_amounts(lkr(dec!(6000)), lkr(dec!(5000))), PaymentStatus::Paid);
    }

    #[test]
    fn test_zero_total_is_paid() {
        assert_eq!(PaymentStatus::from_amounts(lkr(dec!(0)), lkr(dec!(0))), PaymentStatus::Paid);
    }

    #[test]
    fn test_payment_numbers_are_distinct() {
        let numbers: std::collections::HashSet<String> =
            (0..200).map(|_| generate_payment_number("PAY")).collect();
        assert_eq!(numbers.len(), 200);
        assert!(numbers.iter().all(|n| n.starts_with("PAY-")));
    }
}

mod account_tests {
    use super::*;

    #[test]
    fn test_advisory_only_when_balance_falls_short() {
        let bank = CompanyAccount::new("Hatton National Current", AccountKind::Bank, lkr(dec!(10000)));

        assert!(bank.overdraft_advisory(lkr(dec!(10000))).is_none());

        let advisory = bank.overdraft_advisory(lkr(dec!(13000))).unwrap();
        assert_eq!(advisory.new_balance, lkr(dec!(-3000)));
        assert!(!advisory.facility);
        assert!(advisory.to_string().contains("Hatton National Current"));
    }

    #[test]
    fn test_overdraft_accounts_flag_facility() {
        let od = CompanyAccount::new("Seylan OD", AccountKind::Overdraft, lkr(dec!(0)));
        let advisory = od.overdraft_advisory(lkr(dec!(500))).unwrap();
        assert!(advisory.facility);
    }

    #[test]
    fn test_only_admin_passes_role_check() {
        assert!(CallerRole::Admin.require_admin("cancel an order").is_ok());
        let err = CallerRole::Staff.require_admin("cancel an order").unwrap_err();
        assert_eq!(err.kind(), "insufficient_role");
        assert_eq!("STAFF".parse::<CallerRole>().unwrap(), CallerRole::Staff);
    }
}
