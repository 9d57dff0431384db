//! Pre-built Test Fixtures
//!
//! Consistent, predictable values for unit and scenario tests. The ledger
//! runs in a single currency; fixtures use LKR throughout.

use chrono::NaiveDate;
use core_kernel::{BankId, Currency, Money};
use domain_treasury::ChequeMeta;
use rust_decimal::Decimal;

/// Currency used by every fixture
pub const TEST_CURRENCY: Currency = Currency::LKR;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// An LKR amount
    pub fn lkr(amount: Decimal) -> Money {
        Money::new(amount, TEST_CURRENCY)
    }

    pub fn lkr_zero() -> Money {
        Money::zero(TEST_CURRENCY)
    }

    /// A USD amount for currency mismatch tests
    pub fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }
}

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    /// Billing date of seeded orders and purchases (Jan 15, 2026)
    pub fn invoice_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    /// Date payments are received or made (Feb 1, 2026)
    pub fn payment_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    /// Post-dated cheque date (Feb 28, 2026)
    pub fn cheque_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
    }
}

/// Fixture for cheque metadata
pub struct ChequeFixtures;

impl ChequeFixtures {
    /// Complete metadata for a received cheque
    pub fn received() -> ChequeMeta {
        ChequeMeta {
            cheque_number: Some("100452".to_string()),
            cheque_date: Some(DateFixtures::cheque_date()),
            bank_id: Some(BankId::new()),
        }
    }

    /// Complete metadata for an issued cheque (bank not required)
    pub fn issued() -> ChequeMeta {
        ChequeMeta {
            cheque_number: Some("000871".to_string()),
            cheque_date: Some(DateFixtures::cheque_date()),
            bank_id: None,
        }
    }
}
