//! Scenario Builders
//!
//! Seed the in-memory ports with a customer or supplier, company accounts,
//! and orders or purchases built from their lines. Tests specify only the
//! figures they care about; totals and payment status are derived the same
//! way the services derive them.

use std::sync::Arc;

use chrono::Utc;
use core_kernel::{
    AccountId, CustomerId, Money, OrderId, PaymentId, ProductId, PurchaseId, SupplierId,
    SupplierPaymentId,
};
use domain_payables::{MockPayablesPort, PayablesPort, Purchase, PurchaseItem, PurchaseStatus, SupplierPayment};
use domain_receivables::{
    counted_total, Customer, MockReceivablesPort, Order, OrderItem, OrderStatus, Payment, Product,
    ReceivablesPort,
};
use domain_treasury::{
    AccountKind, ChequeDetails, ChequeStatus, CompanyAccount, PaymentMethod, PaymentStatus,
};
use rust_decimal::Decimal;

use crate::fixtures::{DateFixtures, MoneyFixtures, TEST_CURRENCY};

fn cheque_details(number: &str) -> ChequeDetails {
    ChequeDetails {
        cheque_number: number.to_string(),
        cheque_date: DateFixtures::cheque_date(),
        bank_id: None,
    }
}

/// A customer with a bank and a cash account in a fresh mock store
pub struct ReceivablesScenario {
    pub store: MockReceivablesPort,
    pub customer_id: CustomerId,
    pub bank_account_id: AccountId,
    pub cash_account_id: AccountId,
}

impl ReceivablesScenario {
    /// Seeds a customer owing `outstanding` and two company accounts
    pub async fn new(outstanding: Decimal) -> Self {
        let store = MockReceivablesPort::new();

        let customer = Customer {
            id: CustomerId::new_v7(),
            name: "Perera Distributors".to_string(),
            outstanding_balance: MoneyFixtures::lkr(outstanding),
        };
        let customer_id = customer.id;
        store.add_customer(customer).await;

        let bank = CompanyAccount::new("Commercial Bank Current", AccountKind::Bank, MoneyFixtures::lkr_zero());
        let cash = CompanyAccount::new("Cash In Hand", AccountKind::Cash, MoneyFixtures::lkr_zero());
        let (bank_account_id, cash_account_id) = (bank.id, cash.id);
        store.add_account(bank).await;
        store.add_account(cash).await;

        Self {
            store,
            customer_id,
            bank_account_id,
            cash_account_id,
        }
    }

    /// The store as the port the services take
    pub fn port(&self) -> Arc<dyn ReceivablesPort> {
        Arc::new(self.store.clone())
    }

    pub async fn add_product(&self, name: &str, stock: i64) -> ProductId {
        let product = Product {
            id: ProductId::new_v7(),
            name: name.to_string(),
            stock_quantity: stock,
        };
        let id = product.id;
        self.store.add_product(product).await;
        id
    }

    /// Starts an order for this scenario's customer
    pub fn order(&self, order_number: &str) -> TestOrderBuilder {
        TestOrderBuilder::new(self.customer_id, order_number)
    }

    pub async fn outstanding(&self) -> Money {
        self.store
            .customer(self.customer_id)
            .await
            .map(|c| c.outstanding_balance)
            .unwrap_or_else(MoneyFixtures::lkr_zero)
    }

    pub async fn stock(&self, product_id: ProductId) -> i64 {
        self.store.product(product_id).await.map(|p| p.stock_quantity).unwrap_or_default()
    }

    pub async fn account_balance(&self, account_id: AccountId) -> Money {
        self.store
            .account(account_id)
            .await
            .map(|a| a.current_balance)
            .unwrap_or_else(MoneyFixtures::lkr_zero)
    }
}

/// An order as seeded into the store
#[derive(Debug, Clone)]
pub struct SeededOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
}

impl SeededOrder {
    pub fn id(&self) -> OrderId {
        self.order.id
    }
}

struct PaymentSpec {
    amount: Decimal,
    method: PaymentMethod,
    cheque_status: Option<ChequeStatus>,
}

/// Builder for a seeded order
pub struct TestOrderBuilder {
    customer_id: CustomerId,
    order_number: String,
    lines: Vec<(ProductId, u32, Decimal, Decimal)>,
    discount_amount: Decimal,
    payments: Vec<PaymentSpec>,
    status: OrderStatus,
}

impl TestOrderBuilder {
    pub fn new(customer_id: CustomerId, order_number: &str) -> Self {
        Self {
            customer_id,
            order_number: order_number.to_string(),
            lines: Vec::new(),
            discount_amount: Decimal::ZERO,
            payments: Vec::new(),
            status: OrderStatus::Confirmed,
        }
    }

    /// Adds a line priced at `unit_price` with an item discount in percent
    pub fn with_line(mut self, product_id: ProductId, quantity: u32, unit_price: Decimal, discount_percent: Decimal) -> Self {
        self.lines.push((product_id, quantity, unit_price, discount_percent));
        self
    }

    /// Sets the absolute order-level discount
    pub fn with_discount(mut self, amount: Decimal) -> Self {
        self.discount_amount = amount;
        self
    }

    pub fn with_cash_payment(mut self, amount: Decimal) -> Self {
        self.payments.push(PaymentSpec {
            amount,
            method: PaymentMethod::Cash,
            cheque_status: None,
        });
        self
    }

    pub fn with_cheque_payment(mut self, amount: Decimal, status: ChequeStatus) -> Self {
        self.payments.push(PaymentSpec {
            amount,
            method: PaymentMethod::Cheque,
            cheque_status: Some(status),
        });
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// Builds the order and writes it, its lines and its payments
    pub async fn insert(self, store: &MockReceivablesPort) -> SeededOrder {
        let order_id = OrderId::new_v7();
        let items: Vec<OrderItem> = self
            .lines
            .iter()
            .map(|(product_id, qty, price, disc)| {
                OrderItem::new(order_id, *product_id, *qty, MoneyFixtures::lkr(*price), *disc)
            })
            .collect();

        let payments: Vec<Payment> = self
            .payments
            .iter()
            .enumerate()
            .map(|(n, spec)| Payment {
                id: PaymentId::new_v7(),
                payment_number: format!("PAY-{}-{}", self.order_number, n + 1),
                order_id,
                customer_id: self.customer_id,
                amount: MoneyFixtures::lkr(spec.amount),
                payment_date: DateFixtures::payment_date(),
                method: spec.method,
                cheque: spec.cheque_status.map(|_| cheque_details("200310")),
                cheque_status: spec.cheque_status,
                deposit_account_id: None,
                notes: None,
                created_at: Utc::now(),
            })
            .collect();

        let subtotal = Money::sum(TEST_CURRENCY, items.iter().map(|i| i.line_total));
        let discount_amount = MoneyFixtures::lkr(self.discount_amount);
        let total_amount = subtotal - discount_amount;
        let paid = counted_total(TEST_CURRENCY, &payments);

        let order = Order {
            id: order_id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            order_date: DateFixtures::invoice_date(),
            subtotal,
            discount_amount,
            total_amount,
            payment_status: PaymentStatus::from_amounts(paid, total_amount),
            status: self.status,
            updated_at: Utc::now(),
        };

        store.add_order(order.clone()).await;
        for item in &items {
            store.add_order_item(item.clone()).await;
        }
        for payment in &payments {
            store.add_payment(payment.clone()).await;
        }

        SeededOrder { order, items, payments }
    }
}

/// A supplier and a paying bank account in a fresh mock store
pub struct PayablesScenario {
    pub store: MockPayablesPort,
    pub supplier_id: SupplierId,
    pub bank_account_id: AccountId,
}

impl PayablesScenario {
    /// Seeds a bank account holding `bank_balance`
    pub async fn new(bank_balance: Decimal) -> Self {
        let store = MockPayablesPort::new();
        let bank = CompanyAccount::new("Sampath Bank Current", AccountKind::Bank, MoneyFixtures::lkr(bank_balance));
        let bank_account_id = bank.id;
        store.add_account(bank).await;

        Self {
            store,
            supplier_id: SupplierId::new_v7(),
            bank_account_id,
        }
    }

    pub fn port(&self) -> Arc<dyn PayablesPort> {
        Arc::new(self.store.clone())
    }

    pub async fn add_account(&self, name: &str, kind: AccountKind, balance: Decimal) -> AccountId {
        let account = CompanyAccount::new(name, kind, MoneyFixtures::lkr(balance));
        let id = account.id;
        self.store.add_account(account).await;
        id
    }

    pub fn purchase(&self, purchase_number: &str) -> TestPurchaseBuilder {
        TestPurchaseBuilder::new(self.supplier_id, purchase_number)
    }

    pub async fn account_balance(&self, account_id: AccountId) -> Money {
        self.store
            .account(account_id)
            .await
            .map(|a| a.current_balance)
            .unwrap_or_else(MoneyFixtures::lkr_zero)
    }
}

/// Builder for a seeded purchase
pub struct TestPurchaseBuilder {
    supplier_id: SupplierId,
    purchase_number: String,
    lines: Vec<(u32, Decimal, Decimal)>,
    discount_amount: Decimal,
    cheques: Vec<(Decimal, ChequeStatus, AccountId)>,
    status: PurchaseStatus,
}

impl TestPurchaseBuilder {
    pub fn new(supplier_id: SupplierId, purchase_number: &str) -> Self {
        Self {
            supplier_id,
            purchase_number: purchase_number.to_string(),
            lines: Vec::new(),
            discount_amount: Decimal::ZERO,
            cheques: Vec::new(),
            status: PurchaseStatus::Received,
        }
    }

    pub fn with_line(mut self, quantity: u32, unit_cost: Decimal, discount_percent: Decimal) -> Self {
        self.lines.push((quantity, unit_cost, discount_percent));
        self
    }

    pub fn with_discount(mut self, amount: Decimal) -> Self {
        self.discount_amount = amount;
        self
    }

    /// Adds an issued cheque already recorded against the purchase
    pub fn with_issued_cheque(mut self, amount: Decimal, status: ChequeStatus, account_id: AccountId) -> Self {
        self.cheques.push((amount, status, account_id));
        self
    }

    pub fn with_status(mut self, status: PurchaseStatus) -> Self {
        self.status = status;
        self
    }

    /// Builds the purchase and writes it with its lines and cheques
    ///
    /// Returns the purchase and the seeded supplier payments.
    pub async fn insert(self, store: &MockPayablesPort) -> (Purchase, Vec<SupplierPayment>) {
        let purchase_id = PurchaseId::new_v7();
        let items: Vec<PurchaseItem> = self
            .lines
            .iter()
            .map(|(qty, cost, disc)| {
                PurchaseItem::new(purchase_id, ProductId::new_v7(), *qty, MoneyFixtures::lkr(*cost), *disc)
            })
            .collect();

        let payments: Vec<SupplierPayment> = self
            .cheques
            .iter()
            .enumerate()
            .map(|(n, (amount, status, account_id))| SupplierPayment {
                id: SupplierPaymentId::new_v7(),
                payment_number: format!("SPAY-{}-{}", self.purchase_number, n + 1),
                purchase_id,
                supplier_id: self.supplier_id,
                amount: MoneyFixtures::lkr(*amount),
                payment_date: DateFixtures::payment_date(),
                method: PaymentMethod::Cheque,
                cheque: Some(cheque_details("000871")),
                cheque_status: Some(*status),
                account_id: *account_id,
                notes: None,
                created_at: Utc::now(),
            })
            .collect();

        let subtotal = Money::sum(TEST_CURRENCY, items.iter().map(|i| i.line_total));
        let discount_amount = MoneyFixtures::lkr(self.discount_amount);
        let mut purchase = Purchase {
            id: purchase_id,
            purchase_number: self.purchase_number,
            supplier_id: self.supplier_id,
            purchase_date: DateFixtures::invoice_date(),
            subtotal,
            discount_amount,
            total_amount: subtotal - discount_amount,
            balance_due: subtotal - discount_amount,
            payment_status: PaymentStatus::Unpaid,
            status: self.status,
            updated_at: Utc::now(),
        };
        purchase.apply_paid(domain_payables::counted_total(TEST_CURRENCY, &payments));

        store.add_purchase(purchase.clone()).await;
        for item in items {
            store.add_purchase_item(item).await;
        }
        for payment in &payments {
            store.add_supplier_payment(payment.clone()).await;
        }

        (purchase, payments)
    }
}
