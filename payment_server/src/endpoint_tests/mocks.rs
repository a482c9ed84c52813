use chrono::{TimeZone, Utc};
use mockall::mock;
use payment_engine::{
    db_types::{NewTransaction, NewUserPayment, Transaction, TransactionQueryFilter, UserPayment},
    traits::{StoreError, TransactionStore, UserPaymentStore},
};
use pgw_common::PaymentStatus;
use processor_tools::{InvoiceCreated, InvoiceStatus, NewInvoice, PaymentProcessor, ProcessorError};

mock! {
    pub Database {}
    impl TransactionStore for Database {
        async fn create_transaction(&self, transaction: NewTransaction) -> Result<Transaction, StoreError>;
        async fn update_status(&self, invoice_id: &str, status: &PaymentStatus) -> Result<Transaction, StoreError>;
        async fn update_payment_info(&self, invoice_id: &str, amount_paid: f64, currency: &str) -> Result<Transaction, StoreError>;
        async fn fetch_transaction(&self, invoice_id: &str) -> Result<Transaction, StoreError>;
        async fn list_transactions(&self, filter: TransactionQueryFilter, page: u32, per_page: u32) -> Result<(Vec<Transaction>, i64), StoreError>;
    }
    impl UserPaymentStore for Database {
        async fn insert_user_payment(&self, payment: NewUserPayment) -> Result<UserPayment, StoreError>;
        async fn fetch_user_payment(&self, user_id: &str, invoice_id: &str) -> Result<Option<UserPayment>, StoreError>;
        async fn fetch_payments_for_user(&self, user_id: &str) -> Result<Vec<UserPayment>, StoreError>;
        async fn update_user_payment_status(&self, user_id: &str, invoice_id: &str, status: &PaymentStatus) -> Result<(), StoreError>;
        async fn update_status_for_invoice(&self, invoice_id: &str, status: &PaymentStatus) -> Result<u64, StoreError>;
    }
}

mock! {
    pub Processor {}
    impl PaymentProcessor for Processor {
        fn name(&self) -> &'static str;
        async fn create_invoice(&self, invoice: NewInvoice) -> Result<InvoiceCreated, ProcessorError>;
        async fn invoice_status(&self, invoice_id: &str) -> Result<InvoiceStatus, ProcessorError>;
        fn checkout_url(&self, invoice_id: &str) -> String;
    }
}

/// A processor mock that can be named in log messages.
pub fn named_processor() -> MockProcessor {
    let mut processor = MockProcessor::new();
    processor.expect_name().return_const("MockProcessor");
    processor
}

pub fn transaction(invoice_id: &str, status: PaymentStatus) -> Transaction {
    let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Transaction {
        id: 1,
        invoice_id: invoice_id.to_string(),
        order_id: "ORD-1".to_string(),
        status,
        price_amount: 13.9,
        price_currency: "USD".to_string(),
        amount_paid: None,
        payment_currency: None,
        buyer_email: None,
        created_at,
        updated_at: created_at,
        paid_at: None,
    }
}

pub fn user_payment(user_id: &str, invoice_id: &str, status: PaymentStatus) -> UserPayment {
    UserPayment {
        id: 1,
        user_id: user_id.to_string(),
        invoice_id: invoice_id.to_string(),
        amount: 13.9,
        currency: "USD".to_string(),
        status,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    }
}
